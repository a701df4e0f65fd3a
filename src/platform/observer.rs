//! Intersection and resize observation
//!
//! Both observers follow browser semantics closely enough for the engine:
//! an intersection target is reported once after it starts being observed
//! and again each time its visible state flips; a resize observer reports
//! only when the watched size differs from the last one it saw.

use crate::dom::{Document, NodeId, Rect, Viewport};

/// Intersection observer configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionObserverInit {
    /// Pixels added around the viewport on every side
    pub root_margin: f32,
    /// Intersection ratio at which a target counts as visible
    pub threshold: f32,
}

/// One intersection report
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    pub target: NodeId,
    pub is_intersecting: bool,
    pub intersection_ratio: f32,
}

#[derive(Debug, Clone)]
struct ObservedTarget {
    node: NodeId,
    /// Visible state at the last report; `None` until the first report
    last_visible: Option<bool>,
}

/// Viewport-intersection observer
#[derive(Debug, Clone)]
pub struct IntersectionObserver {
    init: IntersectionObserverInit,
    targets: Vec<ObservedTarget>,
}

impl IntersectionObserver {
    pub fn new(init: IntersectionObserverInit) -> Self {
        Self {
            init,
            targets: Vec::new(),
        }
    }

    pub fn init(&self) -> IntersectionObserverInit {
        self.init
    }

    /// Start observing a target. Observing an observed target is a no-op.
    pub fn observe(&mut self, node: NodeId) {
        if !self.is_observing(node) {
            self.targets.push(ObservedTarget {
                node,
                last_visible: None,
            });
        }
    }

    /// Stop observing a target. Returns false if it was not observed.
    pub fn unobserve(&mut self, node: NodeId) -> bool {
        let before = self.targets.len();
        self.targets.retain(|t| t.node != node);
        self.targets.len() != before
    }

    pub fn is_observing(&self, node: NodeId) -> bool {
        self.targets.iter().any(|t| t.node == node)
    }

    /// Stop observing everything
    pub fn disconnect(&mut self) {
        self.targets.clear();
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Compute the reports due for the current layout and viewport
    pub fn take_records(&mut self, document: &Document, viewport: &Viewport) -> Vec<IntersectionEntry> {
        let root = viewport.rect().expand(self.init.root_margin);
        let threshold = self.init.threshold;
        let mut records = Vec::new();

        for target in &mut self.targets {
            let (is_intersecting, ratio) = match document.bounding_rect(target.node) {
                Some(rect) => measure(&rect, &root),
                None => (false, 0.0),
            };
            let visible = is_intersecting && ratio >= threshold;
            if target.last_visible != Some(visible) {
                target.last_visible = Some(visible);
                records.push(IntersectionEntry {
                    target: target.node,
                    is_intersecting,
                    intersection_ratio: ratio,
                });
            }
        }
        records
    }
}

/// Intersection state and ratio of `rect` against `root`
fn measure(rect: &Rect, root: &Rect) -> (bool, f32) {
    match rect.intersection(root) {
        Some(overlap) if rect.area() > 0.0 => (true, overlap.area() / rect.area()),
        // Zero-area targets that touch the root are fully "visible"
        Some(_) => (true, 1.0),
        None => (false, 0.0),
    }
}

/// One resize report
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeEntry {
    pub target: NodeId,
    pub width: f32,
    pub height: f32,
}

/// Size-change observer for a single target
#[derive(Debug, Clone)]
pub struct ResizeObserver {
    target: NodeId,
    last_size: (f32, f32),
}

impl ResizeObserver {
    /// Watch `target`, whose current size is `size`
    pub fn observe(target: NodeId, size: (f32, f32)) -> Self {
        Self {
            target,
            last_size: size,
        }
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    /// Report the new size if it changed since the last report
    pub fn take_record(&mut self, size: (f32, f32)) -> Option<ResizeEntry> {
        if size == self.last_size {
            return None;
        }
        self.last_size = size;
        Some(ResizeEntry {
            target: self.target,
            width: size.0,
            height: size.1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_with_image(y: f32) -> (Document, NodeId) {
        let mut doc = Document::with_skeleton();
        let body = doc.body().unwrap();
        let img = doc.create_element("img");
        doc.append_child(body, img);
        doc.set_layout(img, Rect::new(0.0, y, 300.0, 200.0));
        (doc, img)
    }

    fn observer(margin: f32) -> IntersectionObserver {
        IntersectionObserver::new(IntersectionObserverInit {
            root_margin: margin,
            threshold: 0.0,
        })
    }

    #[test]
    fn test_initial_report() {
        let (doc, img) = page_with_image(2000.0);
        let mut io = observer(0.0);
        io.observe(img);

        let records = io.take_records(&doc, &Viewport::new(400.0, 800.0));
        assert_eq!(records.len(), 1);
        assert!(!records[0].is_intersecting);

        // No change, no report
        assert!(io.take_records(&doc, &Viewport::new(400.0, 800.0)).is_empty());
    }

    #[test]
    fn test_reports_on_state_change() {
        let (doc, img) = page_with_image(1000.0);
        let mut io = observer(0.0);
        io.observe(img);
        let mut viewport = Viewport::new(400.0, 800.0);
        io.take_records(&doc, &viewport);

        viewport.scroll_y = 300.0;
        let records = io.take_records(&doc, &viewport);
        assert_eq!(records.len(), 1);
        assert!(records[0].is_intersecting);
        assert!((records[0].intersection_ratio - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_root_margin_extends_viewport() {
        let (doc, img) = page_with_image(1000.0);
        let mut io = observer(250.0);
        io.observe(img);
        let records = io.take_records(&doc, &Viewport::new(400.0, 800.0));
        assert!(records[0].is_intersecting);
    }

    #[test]
    fn test_reobserve_reports_again() {
        let (doc, img) = page_with_image(2000.0);
        let mut io = observer(0.0);
        io.observe(img);
        io.take_records(&doc, &Viewport::new(400.0, 800.0));

        assert!(io.unobserve(img));
        io.observe(img);
        assert_eq!(io.take_records(&doc, &Viewport::new(400.0, 800.0)).len(), 1);
    }

    #[test]
    fn test_detached_target_not_intersecting() {
        let (mut doc, img) = page_with_image(0.0);
        doc.detach(img);
        let mut io = observer(0.0);
        io.observe(img);
        let records = io.take_records(&doc, &Viewport::new(400.0, 800.0));
        assert!(!records[0].is_intersecting);
    }

    #[test]
    fn test_resize_observer_reports_changes_only() {
        let doc = Document::with_skeleton();
        let html = doc.document_element().unwrap();
        let mut ro = ResizeObserver::observe(html, (400.0, 800.0));

        assert_eq!(ro.take_record((400.0, 800.0)), None);
        let entry = ro.take_record((800.0, 400.0)).unwrap();
        assert_eq!(entry.target, html);
        assert_eq!((entry.width, entry.height), (800.0, 400.0));
        assert_eq!(ro.take_record((800.0, 400.0)), None);
    }
}
