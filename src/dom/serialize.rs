//! HTML serialization of a [`Document`]

use super::node::{Document, NodeId, NodeType};
use std::fmt::Write;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["style", "script"];

/// Serialize the whole document, doctype included
pub fn to_html(document: &Document) -> String {
    let mut out = String::from("<!DOCTYPE html>");
    for child in document.children(document.root()) {
        write_node(document, *child, false, &mut out);
    }
    out
}

/// Serialize a single node and its subtree
pub fn node_to_html(document: &Document, id: NodeId) -> String {
    let mut out = String::new();
    write_node(document, id, false, &mut out);
    out
}

fn write_node(document: &Document, id: NodeId, raw_text: bool, out: &mut String) {
    match document.node_type(id) {
        NodeType::Document => {
            for child in document.children(id) {
                write_node(document, *child, false, out);
            }
        }
        NodeType::Element(element) => {
            let tag = element.tag_name.as_str();
            out.push('<');
            out.push_str(tag);
            for (name, value) in element.attributes() {
                if value.is_empty() {
                    let _ = write!(out, " {}", name);
                } else {
                    let _ = write!(out, " {}=\"{}\"", name, escape(value, true));
                }
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&tag) {
                return;
            }
            let raw = RAW_TEXT_ELEMENTS.contains(&tag);
            for child in document.children(id) {
                write_node(document, *child, raw, out);
            }
            let _ = write!(out, "</{}>", tag);
        }
        NodeType::Text(text) if raw_text => out.push_str(text),
        NodeType::Text(text) => out.push_str(&escape(text, false)),
        NodeType::Comment(text) => {
            let _ = write!(out, "<!--{}-->", text);
        }
    }
}

fn escape(text: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' if attribute => out.push_str("&quot;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::HtmlParser;

    #[test]
    fn test_void_and_boolean_attributes() {
        let mut doc = Document::with_skeleton();
        let body = doc.body().unwrap();
        let video = doc.create_element("video");
        doc.set_attribute(video, "data-autoload", "");
        let source = doc.create_element("source");
        doc.set_attribute(source, "src", "clip.mp4");
        doc.append_child(body, video);
        doc.append_child(video, source);

        assert_eq!(
            node_to_html(&doc, video),
            r#"<video data-autoload><source src="clip.mp4"></video>"#
        );
    }

    #[test]
    fn test_escaping() {
        let mut doc = Document::with_skeleton();
        let body = doc.body().unwrap();
        let div = doc.create_element("div");
        doc.set_attribute(div, "style", r#"background-image: url("a&b.png")"#);
        let text = doc.create_text("1 < 2");
        doc.append_child(body, div);
        doc.append_child(div, text);

        assert_eq!(
            node_to_html(&doc, div),
            r#"<div style="background-image: url(&quot;a&amp;b.png&quot;)">1 &lt; 2</div>"#
        );
    }

    #[test]
    fn test_style_text_is_raw() {
        let doc = HtmlParser::new()
            .parse("<html><head><style>a > b { color: red }</style></head><body></body></html>")
            .unwrap();
        let html = to_html(&doc);
        assert!(html.contains("<style>a > b { color: red }</style>"));
        assert!(html.starts_with("<!DOCTYPE html><html><head>"));
    }
}
