//! Adaptive lazy loading
//!
//! Control flows from the boot sequencer through the profile classifier and
//! source selector, then, once the page is idle, into the observation engine,
//! which calls the upgrade dispatcher for each element that comes near the
//! viewport.

mod boot;
mod descriptor;
mod engine;
mod profile;
mod selector;
mod upgrade;

pub use boot::{
    boot_stylesheet, inject_stylesheet, relocate_critical_styles, BootOutcome, BootReport,
    BootSequencer, BOOT_STYLE_ID, CRITICAL_ATTRIBUTE,
};
pub use descriptor::{
    ElementKind, Promotion, Target, UpgradeDescriptor, AUTOLOAD_ATTRIBUTE, BACKGROUND_PROMOTION,
    PLACEHOLDER_ATTRIBUTES,
};
pub use engine::{collect_candidates, EngineStats, LazyEngine, PendingSet, StrategyKind};
pub use profile::{classify, NetworkProfile};
pub use selector::{apply_slow_variants, SLOW_VARIANTS};
pub use upgrade::UpgradeDispatcher;
