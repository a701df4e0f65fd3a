//! Flow layout assigning document-coordinate boxes to elements
//!
//! This is deliberately coarse: every visible box is stacked vertically
//! in tree order, full container width unless a `width` attribute narrows it.
//! It only has to place media well enough for viewport proximity checks.

use super::geometry::Rect;
use super::node::{Document, NodeId, NodeType};

/// Default text metrics for approximating text height
#[derive(Debug, Clone, Copy)]
pub struct FontMetrics {
    /// Line height in pixels
    pub line_height: f32,
    /// Average character width (approximation)
    pub char_width: f32,
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self {
            line_height: 19.2,
            char_width: 8.0,
        }
    }
}

/// Height given to replaced elements that carry no `height` attribute
const DEFAULT_MEDIA_HEIGHT: f32 = 150.0;

/// Layout engine for stacking boxes
pub struct LayoutEngine {
    viewport_width: f32,
    font_metrics: FontMetrics,
}

impl LayoutEngine {
    /// Create a new layout engine
    pub fn new(viewport_width: f32) -> Self {
        Self {
            viewport_width,
            font_metrics: FontMetrics::default(),
        }
    }

    /// Compute and store boxes for every visible element. Returns the total
    /// document height.
    pub fn compute(&self, document: &mut Document) -> f32 {
        let root = document.root();
        let children = document.children(root).to_vec();
        let mut cursor = 0.0;
        for child in children {
            cursor += self.layout_node(document, child, 0.0, cursor, self.viewport_width);
        }
        cursor
    }

    /// Lay out one node at `y`, returning the height it occupies
    fn layout_node(&self, document: &mut Document, id: NodeId, x: f32, y: f32, width: f32) -> f32 {
        let tag = match document.node_type(id) {
            NodeType::Element(element) => element.tag_name.clone(),
            NodeType::Text(text) => return self.text_height(text, width),
            NodeType::Comment(_) | NodeType::Document => return 0.0,
        };

        if is_hidden(&tag) {
            return 0.0;
        }

        let width = attribute_px(document, id, "width").map_or(width, |w| w.min(width));

        if is_replaced(&tag) {
            let height = attribute_px(document, id, "height").unwrap_or(DEFAULT_MEDIA_HEIGHT);
            document.set_layout(id, Rect::new(x, y, width, height));
            return height;
        }

        let children = document.children(id).to_vec();
        let mut content_height = 0.0;
        for child in children {
            content_height += self.layout_node(document, child, x, y + content_height, width);
        }

        let height = match attribute_px(document, id, "height") {
            Some(h) => h,
            // A background placeholder usually has no content of its own
            None if content_height == 0.0 && document.has_attribute(id, "data-bg") => {
                DEFAULT_MEDIA_HEIGHT
            }
            None => content_height,
        };
        document.set_layout(id, Rect::new(x, y, width, height));
        height
    }

    fn text_height(&self, text: &str, width: f32) -> f32 {
        let chars = text.trim().chars().count() as f32;
        if chars == 0.0 || width <= 0.0 {
            return 0.0;
        }
        let per_line = (width / self.font_metrics.char_width).max(1.0);
        (chars / per_line).ceil() * self.font_metrics.line_height
    }
}

fn is_hidden(tag: &str) -> bool {
    matches!(
        tag,
        "head" | "meta" | "title" | "link" | "style" | "script" | "noscript" | "source" | "template"
    )
}

fn is_replaced(tag: &str) -> bool {
    matches!(tag, "img" | "iframe" | "video" | "canvas" | "embed" | "object")
}

fn attribute_px(document: &Document, id: NodeId, name: &str) -> Option<f32> {
    document
        .get_attribute(id, name)?
        .trim()
        .trim_end_matches("px")
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::HtmlParser;

    #[test]
    fn test_media_stacks_vertically() {
        let mut doc = HtmlParser::new()
            .parse(
                r#"<body>
                    <img data-src="a.jpg" height="400">
                    <img data-src="b.jpg">
                    <iframe data-src="c.html" width="200" height="100"></iframe>
                </body>"#,
            )
            .unwrap();
        let total = LayoutEngine::new(390.0).compute(&mut doc);

        let imgs = doc.elements_by_tag_name("img");
        let iframe = doc.elements_by_tag_name("iframe")[0];
        assert_eq!(doc.layout(imgs[0]), Some(Rect::new(0.0, 0.0, 390.0, 400.0)));
        assert_eq!(doc.layout(imgs[1]), Some(Rect::new(0.0, 400.0, 390.0, 150.0)));
        assert_eq!(doc.layout(iframe), Some(Rect::new(0.0, 550.0, 200.0, 100.0)));
        assert_eq!(total, 650.0);
    }

    #[test]
    fn test_background_block_gets_default_height() {
        let mut doc = HtmlParser::new()
            .parse(r#"<div data-bg="hero.jpg"></div><div height="20px"></div>"#)
            .unwrap();
        LayoutEngine::new(390.0).compute(&mut doc);

        let divs = doc.elements_by_tag_name("div");
        assert_eq!(doc.layout(divs[0]).map(|r| r.height), Some(150.0));
        assert_eq!(doc.layout(divs[1]).map(|r| r.y), Some(150.0));
    }

    #[test]
    fn test_head_is_not_laid_out() {
        let mut doc = HtmlParser::new()
            .parse("<head><style>p{}</style></head><body><p>hello</p></body>")
            .unwrap();
        LayoutEngine::new(390.0).compute(&mut doc);
        let head = doc.head().unwrap();
        assert_eq!(doc.layout(head), None);
    }
}
