//! HTML5 parser implementation using html5ever
//!
//! html5ever builds an `RcDom`, which is then copied into the arena
//! [`Document`]. Whitespace-only text between elements is dropped, except
//! inside raw-text containers like `style` and `script`.

use super::node::{Document, NodeId};
use crate::utils::{LazyError, Result};
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::ParseOpts;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// HTML5 parser using html5ever
pub struct HtmlParser {
    opts: ParseOpts,
}

impl HtmlParser {
    /// Create a new HTML parser
    pub fn new() -> Self {
        Self {
            opts: ParseOpts {
                tree_builder: TreeBuilderOpts {
                    drop_doctype: true,
                    ..Default::default()
                },
                ..Default::default()
            },
        }
    }

    /// Parse HTML content into a DOM document
    pub fn parse(&self, content: &str) -> Result<Document> {
        if content.trim().is_empty() {
            return Ok(Document::with_skeleton());
        }

        let dom = parse_document(RcDom::default(), self.opts.clone())
            .from_utf8()
            .read_from(&mut content.as_bytes())
            .map_err(|e| LazyError::HtmlParse(e.to_string()))?;

        let mut document = Document::new();
        let root = document.root();
        for child in dom.document.children.borrow().iter() {
            Self::convert_node(&mut document, root, child, false);
        }
        document.take_mutations();
        Ok(document)
    }

    fn convert_node(document: &mut Document, parent: NodeId, handle: &Handle, raw_text: bool) {
        match &handle.data {
            NodeData::Element { name, attrs, .. } => {
                let tag = name.local.to_string();
                let id = document.create_element(&tag);
                for attr in attrs.borrow().iter() {
                    let name = match &attr.name.prefix {
                        Some(prefix) => format!("{}:{}", prefix, attr.name.local),
                        None => attr.name.local.to_string(),
                    };
                    document.set_attribute(id, &name, attr.value.to_string());
                }
                document.append_child(parent, id);

                let raw = matches!(tag.as_str(), "style" | "script" | "textarea" | "title");
                for child in handle.children.borrow().iter() {
                    Self::convert_node(document, id, child, raw);
                }
            }
            NodeData::Text { contents } => {
                let text = contents.borrow();
                if raw_text || !text.trim().is_empty() {
                    let id = document.create_text(text.to_string());
                    document.append_child(parent, id);
                }
            }
            NodeData::Comment { contents } => {
                let id = document.create_comment(contents.to_string());
                document.append_child(parent, id);
            }
            NodeData::Document
            | NodeData::Doctype { .. }
            | NodeData::ProcessingInstruction { .. } => {}
        }
    }
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_html() {
        let parser = HtmlParser::new();
        let doc = parser.parse("").unwrap();
        assert!(doc.head().is_some());
        assert!(doc.body().is_some());
    }

    #[test]
    fn test_parse_fragment_gets_skeleton() {
        let parser = HtmlParser::new();
        let doc = parser.parse(r#"<img data-src="a.jpg">"#).unwrap();
        assert!(doc.head().is_some());
        let imgs = doc.elements_by_tag_name("img");
        assert_eq!(imgs.len(), 1);
        assert_eq!(doc.get_attribute(imgs[0], "data-src"), Some("a.jpg"));
    }

    #[test]
    fn test_parse_keeps_style_text() {
        let parser = HtmlParser::new();
        let doc = parser
            .parse("<html><head><style critical>body { margin: 0 }</style></head></html>")
            .unwrap();
        let style = doc.elements_by_tag_name("style")[0];
        assert!(doc.has_attribute(style, "critical"));
        assert_eq!(doc.text_content(style), "body { margin: 0 }");
    }

    #[test]
    fn test_parse_nested_elements() {
        let parser = HtmlParser::new();
        let doc = parser
            .parse(
                r#"
            <html>
                <body>
                    <picture>
                        <source data-srcset="a.webp" type="image/webp">
                        <img data-src="a.jpg">
                    </picture>
                </body>
            </html>
        "#,
            )
            .unwrap();
        let picture = doc.elements_by_tag_name("picture")[0];
        assert!(doc.find_descendant(picture, "source").is_some());
        assert!(doc.find_descendant(picture, "img").is_some());
    }

    #[test]
    fn test_parse_keeps_attribute_prefix() {
        let parser = HtmlParser::new();
        let doc = parser
            .parse(r##"<svg><use id="u" xlink:href="#icon"></use></svg>"##)
            .unwrap();
        let node = doc.get_element_by_id("u").unwrap();
        assert_eq!(doc.get_attribute(node, "xlink:href"), Some("#icon"));
        assert_eq!(doc.get_attribute(node, "href"), None);
        assert!(crate::dom::serialize::to_html(&doc).contains(r##"xlink:href="#icon""##));
    }

    #[test]
    fn test_parse_malformed_html() {
        // html5ever should handle malformed HTML gracefully
        let parser = HtmlParser::new();
        let doc = parser.parse("<p>Unclosed paragraph<div>Another").unwrap();
        assert_eq!(doc.elements_by_tag_name("div").len(), 1);
    }
}
