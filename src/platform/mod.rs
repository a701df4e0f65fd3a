//! Platform primitives the loading engine relies on
//!
//! In a browser these are host objects whose presence varies by engine and
//! version. Here each primitive is modelled explicitly and its availability
//! is declared up front in [`Capabilities`], so every consumer performs a
//! capability check instead of probing for a global.

mod events;
mod media;
mod observer;
mod scheduler;

pub use events::{EventType, Listener, ListenerId, ListenerOptions, ListenerRegistry, Subscriber};
pub use media::{DecodeError, MediaHost, MediaRequest, RecordingMediaHost};
#[cfg(test)]
pub use media::MockMediaHost;
pub use observer::{
    IntersectionEntry, IntersectionObserver, IntersectionObserverInit, ResizeEntry, ResizeObserver,
};
pub use scheduler::{Resume, Scheduler, Task};

use serde::Deserialize;

/// Which optional platform features the host provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    /// Viewport-intersection observation
    pub intersection_observer: bool,
    /// Element size-change observation
    pub resize_observer: bool,
    /// `loading="lazy"` and `decoding="async"` are honoured
    pub native_lazy_loading: bool,
    /// `fetchpriority` is honoured
    pub fetch_priority: bool,
    /// Images can be decoded ahead of paint
    pub image_decode: bool,
    /// Idle-period callbacks
    pub idle_callback: bool,
}

impl Capabilities {
    /// A current evergreen browser
    pub fn modern() -> Self {
        Self {
            intersection_observer: true,
            resize_observer: true,
            native_lazy_loading: true,
            fetch_priority: true,
            image_decode: true,
            idle_callback: true,
        }
    }

    /// A browser with none of the optional primitives
    pub fn legacy() -> Self {
        Self {
            intersection_observer: false,
            resize_observer: false,
            native_lazy_loading: false,
            fetch_priority: false,
            image_decode: false,
            idle_callback: false,
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::modern()
    }
}

/// Effective connection type as reported by the network information facility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum EffectiveType {
    #[serde(rename = "slow-2g")]
    Slow2g,
    #[serde(rename = "2g")]
    TwoG,
    #[serde(rename = "3g")]
    ThreeG,
    #[serde(rename = "4g")]
    FourG,
    #[serde(other)]
    Unknown,
}

impl EffectiveType {
    /// Parse the facility's string form. Anything unrecognised is `Unknown`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "slow-2g" => Self::Slow2g,
            "2g" => Self::TwoG,
            "3g" => Self::ThreeG,
            "4g" => Self::FourG,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Slow2g => "slow-2g",
            Self::TwoG => "2g",
            Self::ThreeG => "3g",
            Self::FourG => "4g",
            Self::Unknown => "unknown",
        }
    }

    /// Whether this connection class counts as constrained
    pub fn is_constrained(&self) -> bool {
        matches!(self, Self::Slow2g | Self::TwoG | Self::ThreeG)
    }
}

/// Connection hints, when the platform exposes them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ConnectionInfo {
    pub effective_type: EffectiveType,
    #[serde(default)]
    pub save_data: bool,
}

/// Everything the host tells the engine about itself
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Environment {
    pub capabilities: Capabilities,
    /// `None` when the connection-information facility is missing
    pub connection: Option<ConnectionInfo>,
    pub prefers_reduced_motion: bool,
}
