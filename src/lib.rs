//! # lazyboot - Adaptive Lazy Resource Loading
//!
//! Defers below-the-fold and bandwidth-heavy media in a rendered page until
//! it comes near the viewport, picks lighter sources on constrained
//! connections, and falls back to scroll polling when the platform lacks
//! observation primitives.
//!
//! ## Architecture
//!
//! - **dom**: arena document, HTML parsing and serialization, flow layout
//! - **platform**: observers, listeners, scheduler and media hooks, gated by
//!   declared capabilities
//! - **lazy**: profile classification, source selection, upgrade dispatch,
//!   the observation engine and the boot sequence
//! - **page**: the host event loop that drives all of the above
//! - **config**: tunables, loadable from TOML
//! - **utils**: shared error types

pub mod config;
pub mod dom;
pub mod lazy;
pub mod page;
pub mod platform;
pub mod utils;

// Re-export main types for convenience
pub use config::{EngineSettings, LazyConfig};
pub use lazy::{BootOutcome, LazyEngine, NetworkProfile};
pub use page::Page;
pub use platform::{Capabilities, Environment};
pub use utils::error::{LazyError, Result};

/// Crate version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = "lazyboot";
