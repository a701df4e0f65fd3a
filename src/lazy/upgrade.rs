//! Resource upgrade dispatcher
//!
//! Turns placeholder attributes into live ones for a single element,
//! following the [`UpgradeDescriptor`] of its kind. Upgrading never fails:
//! branches that need a missing platform feature are skipped and a rejected
//! decode is only logged.
//!
//! [`UpgradeDescriptor`]: super::descriptor::UpgradeDescriptor

use super::descriptor::{
    AUTOLOAD_ATTRIBUTE, BACKGROUND_PROMOTION, ElementKind, Promotion, Target,
};
use crate::dom::{Document, NodeId};
use crate::platform::{Capabilities, MediaHost};

/// Applies per-kind upgrades
#[derive(Debug, Clone, Copy)]
pub struct UpgradeDispatcher {
    capabilities: Capabilities,
}

impl UpgradeDispatcher {
    pub fn new(capabilities: Capabilities) -> Self {
        Self { capabilities }
    }

    /// Upgrade `node` according to its kind, returning the kind used
    pub fn upgrade(&self, document: &mut Document, media: &mut dyn MediaHost, node: NodeId) -> ElementKind {
        let kind = ElementKind::classify(document, node);
        self.upgrade_as(document, media, node, kind);
        log::debug!("upgraded {} element {:?}", kind.as_str(), node);
        kind
    }

    fn upgrade_as(&self, document: &mut Document, media: &mut dyn MediaHost, node: NodeId, kind: ElementKind) {
        let descriptor = kind.descriptor();

        if descriptor.native_hints {
            self.apply_native_hints(document, node, kind);
        }

        promote_all(document, node, descriptor.promotions);

        if !descriptor.source_promotions.is_empty() {
            let sources: Vec<NodeId> = document
                .children(node)
                .iter()
                .copied()
                .filter(|c| document.tag_name(*c) == Some("source"))
                .collect();
            for source in sources {
                promote_all(document, source, descriptor.source_promotions);
            }
        }

        if descriptor.upgrade_nested_image {
            if let Some(img) = document.find_descendant(node, "img") {
                self.upgrade_as(document, media, img, ElementKind::Image);
            }
        }

        // data-bg is honoured on every kind
        if kind != ElementKind::Background {
            promote(document, node, &BACKGROUND_PROMOTION);
        }

        if descriptor.decode && self.capabilities.image_decode {
            if let Some(src) = document.get_attribute(node, "src").map(str::to_string) {
                if let Err(e) = media.decode_image(node, &src) {
                    log::debug!("ignoring failed decode of {}: {}", src, e);
                }
            }
        }

        // Buffer only. Playback stays behind a user gesture.
        if descriptor.autoload && document.has_attribute(node, AUTOLOAD_ATTRIBUTE) {
            media.load_media(node);
        }
    }

    fn apply_native_hints(&self, document: &mut Document, node: NodeId, kind: ElementKind) {
        if self.capabilities.native_lazy_loading {
            set_if_absent(document, node, "loading", "lazy");
            if kind == ElementKind::Image {
                set_if_absent(document, node, "decoding", "async");
            }
        }
        if self.capabilities.fetch_priority && kind == ElementKind::Image {
            set_if_absent(document, node, "fetchpriority", "low");
        }
    }
}

fn set_if_absent(document: &mut Document, node: NodeId, name: &str, value: &str) {
    if !document.has_attribute(node, name) {
        document.set_attribute(node, name, value);
    }
}

fn promote_all(document: &mut Document, node: NodeId, promotions: &[Promotion]) {
    for promotion in promotions {
        promote(document, node, promotion);
    }
}

/// Move one placeholder value to its target and drop the placeholder
fn promote(document: &mut Document, node: NodeId, promotion: &Promotion) {
    let Some(value) = document.remove_attribute(node, promotion.placeholder) else {
        return;
    };
    match promotion.target {
        Target::Attribute(name) => document.set_attribute(node, name, value),
        Target::BackgroundImage => {
            document.set_style_property(node, "background-image", &css_url(&value))
        }
    }
}

/// `url("…")` with the value escaped as a CSS string
fn css_url(value: &str) -> String {
    let mut out = String::from("url(");
    // Writing into a String cannot fail
    let _ = cssparser::serialize_string(value, &mut out);
    out.push(')');
    out
}
