//! Element kinds and their static upgrade descriptors

use crate::dom::{Document, NodeId};

/// Placeholder attributes that mark an element as lazily loaded
pub const PLACEHOLDER_ATTRIBUTES: &[&str] =
    &["data-src", "data-srcset", "data-sizes", "data-poster", "data-bg"];

/// Marker asking for a video to be buffered once it is upgraded
pub const AUTOLOAD_ATTRIBUTE: &str = "data-autoload";

/// Kind of a lazily loaded element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementKind {
    Image,
    Picture,
    Iframe,
    Video,
    Background,
    Generic,
}

impl ElementKind {
    /// Kind of `node`, chosen by tag first and by placeholder second
    pub fn classify(document: &Document, node: NodeId) -> Self {
        match document.tag_name(node) {
            Some("img") => Self::Image,
            Some("picture") => Self::Picture,
            Some("iframe") => Self::Iframe,
            Some("video") => Self::Video,
            _ if document.has_attribute(node, "data-bg")
                && !document.has_attribute(node, "data-src")
                && !document.has_attribute(node, "data-srcset") =>
            {
                Self::Background
            }
            _ => Self::Generic,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Picture => "picture",
            Self::Iframe => "iframe",
            Self::Video => "video",
            Self::Background => "background",
            Self::Generic => "generic",
        }
    }

    pub fn descriptor(&self) -> &'static UpgradeDescriptor {
        match self {
            Self::Image => &IMAGE,
            Self::Picture => &PICTURE,
            Self::Iframe => &IFRAME,
            Self::Video => &VIDEO,
            Self::Background => &BACKGROUND,
            Self::Generic => &GENERIC,
        }
    }
}

/// Where a placeholder value goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Attribute(&'static str),
    /// The inline `background-image` style
    BackgroundImage,
}

/// One placeholder promotion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Promotion {
    pub placeholder: &'static str,
    pub target: Target,
}

const fn attr(placeholder: &'static str, target: &'static str) -> Promotion {
    Promotion {
        placeholder,
        target: Target::Attribute(target),
    }
}

const SRCSET: Promotion = attr("data-srcset", "srcset");
const SIZES: Promotion = attr("data-sizes", "sizes");
const SRC: Promotion = attr("data-src", "src");
const POSTER: Promotion = attr("data-poster", "poster");

/// The background promotion, applicable to any element
pub const BACKGROUND_PROMOTION: Promotion = Promotion {
    placeholder: "data-bg",
    target: Target::BackgroundImage,
};

/// How one kind of element is upgraded. Promotions run in table order, so
/// responsive candidates are always in place before the base URL.
#[derive(Debug)]
pub struct UpgradeDescriptor {
    /// Promotions on the element itself
    pub promotions: &'static [Promotion],
    /// Promotions on each child `source`, applied before the element's own
    pub source_promotions: &'static [Promotion],
    /// Apply the image upgrade to the descendant `img`
    pub upgrade_nested_image: bool,
    /// Set native lazy-loading hints when supported
    pub native_hints: bool,
    /// Decode ahead of paint when supported
    pub decode: bool,
    /// Honour `data-autoload`
    pub autoload: bool,
}

static IMAGE: UpgradeDescriptor = UpgradeDescriptor {
    promotions: &[SRCSET, SIZES, SRC],
    source_promotions: &[],
    upgrade_nested_image: false,
    native_hints: true,
    decode: true,
    autoload: false,
};

static PICTURE: UpgradeDescriptor = UpgradeDescriptor {
    promotions: &[],
    source_promotions: &[SRCSET, SIZES],
    upgrade_nested_image: true,
    native_hints: false,
    decode: false,
    autoload: false,
};

static IFRAME: UpgradeDescriptor = UpgradeDescriptor {
    promotions: &[SRC],
    source_promotions: &[],
    upgrade_nested_image: false,
    native_hints: true,
    decode: false,
    autoload: false,
};

static VIDEO: UpgradeDescriptor = UpgradeDescriptor {
    promotions: &[POSTER],
    source_promotions: &[SRCSET, SRC],
    upgrade_nested_image: false,
    native_hints: false,
    decode: false,
    autoload: true,
};

static BACKGROUND: UpgradeDescriptor = UpgradeDescriptor {
    promotions: &[BACKGROUND_PROMOTION],
    source_promotions: &[],
    upgrade_nested_image: false,
    native_hints: false,
    decode: false,
    autoload: false,
};

static GENERIC: UpgradeDescriptor = UpgradeDescriptor {
    promotions: &[SRCSET, SRC],
    source_promotions: &[],
    upgrade_nested_image: false,
    native_hints: false,
    decode: false,
    autoload: false,
};
