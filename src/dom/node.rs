//! DOM (Document Object Model) implementation
//!
//! Nodes live in an arena owned by [`Document`] and are addressed by
//! [`NodeId`] handles. Handles are never invalidated: a node removed from the
//! tree keeps its slot and simply becomes detached, which is what lets the
//! loading engine hold non-owning references to elements the page may drop.

use super::geometry::Rect;
use cssparser::{Delimiter, ParseError, Parser, ParserInput};

/// Handle to a node in a [`Document`] arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Node types in the DOM
#[derive(Debug, Clone, PartialEq)]
pub enum NodeType {
    /// Document root
    Document,
    /// Element node (e.g., <div>)
    Element(ElementData),
    /// Text node
    Text(String),
    /// Comment node
    Comment(String),
}

/// Data for element nodes
#[derive(Debug, Clone, PartialEq)]
pub struct ElementData {
    /// Tag name, lowercase (e.g., "div", "img")
    pub tag_name: String,
    /// Element attributes in source order
    attributes: Vec<(String, String)>,
}

impl ElementData {
    /// Create a new element
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into().to_ascii_lowercase(),
            attributes: Vec::new(),
        }
    }

    /// Get an attribute value
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|(k, _)| k == name)
    }

    /// Set an attribute value, keeping its position if it already exists
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Remove an attribute, returning its previous value
    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let pos = self.attributes.iter().position(|(k, _)| k == name)?;
        Some(self.attributes.remove(pos).1)
    }

    /// All attributes in source order
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Get the ID attribute
    pub fn id(&self) -> Option<&str> {
        self.get_attribute("id")
    }
}

/// A change applied to the tree, recorded in the order it happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    AttributeSet { node: NodeId, name: String },
    AttributeRemoved { node: NodeId, name: String },
    ChildInserted { parent: NodeId, child: NodeId },
    ChildRemoved { parent: NodeId, child: NodeId },
}

/// A node slot in the arena
#[derive(Debug, Clone)]
struct Node {
    node_type: NodeType,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Border box in document coordinates, assigned by layout
    layout: Option<Rect>,
}

/// The DOM document
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    mutations: Vec<Mutation>,
}

impl Document {
    /// Create a new empty document
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                node_type: NodeType::Document,
                parent: None,
                children: Vec::new(),
                layout: None,
            }],
            mutations: Vec::new(),
        }
    }

    /// Create a document with the `html > head + body` skeleton
    pub fn with_skeleton() -> Self {
        let mut doc = Self::new();
        let html = doc.create_element("html");
        let head = doc.create_element("head");
        let body = doc.create_element("body");
        doc.append_child(doc.root(), html);
        doc.append_child(html, head);
        doc.append_child(html, body);
        doc.mutations.clear();
        doc
    }

    /// The document node
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes ever created, attached or not
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes[0].children.is_empty()
    }

    fn push(&mut self, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            node_type,
            parent: None,
            children: Vec::new(),
            layout: None,
        });
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag_name: &str) -> NodeId {
        self.push(NodeType::Element(ElementData::new(tag_name)))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, content: impl Into<String>) -> NodeId {
        self.push(NodeType::Text(content.into()))
    }

    /// Create a detached comment node
    pub fn create_comment(&mut self, content: impl Into<String>) -> NodeId {
        self.push(NodeType::Comment(content.into()))
    }

    pub fn node_type(&self, id: NodeId) -> &NodeType {
        &self.nodes[id.0].node_type
    }

    /// Get element data if this is an element
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.nodes.get(id.0)?.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes.get_mut(id.0)?.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.tag_name.as_str())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].children.first().copied()
    }

    /// Whether the node is reachable from the document root
    pub fn is_connected(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            if current == self.root() {
                return true;
            }
            match self.nodes[current.0].parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Remove a node from its parent. Its subtree stays intact.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != id);
            self.mutations.push(Mutation::ChildRemoved { parent, child: id });
        }
    }

    /// Insert `child` into `parent` before `reference`, or at the end when
    /// `reference` is `None`. The child is moved if it already has a parent.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        self.detach(child);
        let siblings = &mut self.nodes[parent.0].children;
        let pos = reference
            .and_then(|r| siblings.iter().position(|c| *c == r))
            .unwrap_or(siblings.len());
        siblings.insert(pos, child);
        self.nodes[child.0].parent = Some(parent);
        self.mutations.push(Mutation::ChildInserted { parent, child });
    }

    /// Add a child node at the end
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.insert_before(parent, child, None);
    }

    /// Add a child node in front of the current first child
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) {
        let first = self.first_child(parent);
        self.insert_before(parent, child, first);
    }

    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.get_attribute(name)
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.element(id).is_some_and(|e| e.has_attribute(name))
    }

    /// Set an attribute on an element. Non-elements are ignored.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        if let Some(element) = self.element_mut(id) {
            element.set_attribute(name, value);
            self.mutations.push(Mutation::AttributeSet {
                node: id,
                name: name.to_string(),
            });
        }
    }

    /// Remove an attribute, returning its previous value
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Option<String> {
        let removed = self.element_mut(id)?.remove_attribute(name)?;
        self.mutations.push(Mutation::AttributeRemoved {
            node: id,
            name: name.to_string(),
        });
        Some(removed)
    }

    /// Set one declaration of the inline `style` attribute, replacing an
    /// existing declaration of the same property.
    pub fn set_style_property(&mut self, id: NodeId, property: &str, value: &str) {
        let current = self.get_attribute(id, "style").unwrap_or_default();
        let mut declarations: Vec<String> = inline_declarations(current)
            .into_iter()
            .filter(|(name, _)| !name.as_deref().is_some_and(|n| n.eq_ignore_ascii_case(property)))
            .map(|(_, text)| text.to_string())
            .collect();
        declarations.push(format!("{}: {}", property, value));
        self.set_attribute(id, "style", declarations.join("; "));
    }

    /// All descendants of `id` in tree order, excluding `id` itself
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    /// Attached elements in tree order
    pub fn elements(&self) -> Vec<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .filter(|id| self.is_element(*id))
            .collect()
    }

    /// Attached elements with the given tag name
    pub fn elements_by_tag_name(&self, tag_name: &str) -> Vec<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .filter(|id| self.tag_name(*id) == Some(tag_name))
            .collect()
    }

    /// Attached elements carrying the given attribute
    pub fn elements_with_attribute(&self, name: &str) -> Vec<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .filter(|id| self.has_attribute(*id, name))
            .collect()
    }

    /// First descendant element with the given tag name
    pub fn find_descendant(&self, id: NodeId, tag_name: &str) -> Option<NodeId> {
        self.descendants(id)
            .into_iter()
            .find(|d| self.tag_name(*d) == Some(tag_name))
    }

    pub fn get_element_by_id(&self, element_id: &str) -> Option<NodeId> {
        self.elements()
            .into_iter()
            .find(|id| self.element(*id).and_then(|e| e.id()) == Some(element_id))
    }

    /// The `<html>` element
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(self.root())
            .iter()
            .copied()
            .find(|c| self.is_element(*c))
    }

    pub fn head(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        self.children(html)
            .iter()
            .copied()
            .find(|c| self.tag_name(*c) == Some("head"))
    }

    pub fn body(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        self.children(html)
            .iter()
            .copied()
            .find(|c| self.tag_name(*c) == Some("body"))
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .into_iter()
            .filter_map(|d| match self.node_type(d) {
                NodeType::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Assign a layout box to a node
    pub fn set_layout(&mut self, id: NodeId, rect: Rect) {
        self.nodes[id.0].layout = Some(rect);
    }

    pub fn layout(&self, id: NodeId) -> Option<Rect> {
        self.nodes[id.0].layout
    }

    /// Box of the node, falling back to the union of its descendants' boxes
    /// for containers that were not laid out themselves. Detached nodes have
    /// no box.
    pub fn bounding_rect(&self, id: NodeId) -> Option<Rect> {
        if !self.is_connected(id) {
            return None;
        }
        if let Some(rect) = self.layout(id) {
            return Some(rect);
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|d| self.layout(d))
            .reduce(|acc, r| acc.union(&r))
    }

    /// Mutations recorded since the last call to [`Document::take_mutations`]
    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    pub fn take_mutations(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.mutations)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Splits an inline style attribute into top-level declarations.
///
/// Each entry pairs the property name, when the declaration starts with one,
/// with its source text. Semicolons inside `url()` and other blocks do not
/// end a declaration.
fn inline_declarations(style: &str) -> Vec<(Option<String>, &str)> {
    let mut input = ParserInput::new(style);
    let mut parser = Parser::new(&mut input);
    let mut declarations = Vec::new();

    while !parser.is_exhausted() {
        let start = parser.position();
        let name = parser
            .parse_until_before(Delimiter::Semicolon, |p| {
                let name = p.expect_ident().map(|n| n.to_string()).ok();
                while p.next().is_ok() {}
                Ok::<_, ParseError<()>>(name)
            })
            .ok()
            .flatten();
        let text = parser.slice_from(start).trim();
        if !text.is_empty() {
            declarations.push((name, text));
        }
        // the semicolon, or end of input
        let _ = parser.next();
    }
    declarations
}
