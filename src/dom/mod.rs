//! Document model the loading engine operates on
//!
//! Parsing, an arena DOM with attribute mutation tracking, a coarse flow
//! layout for viewport proximity, and serialization back to HTML.

mod geometry;
pub mod html;
mod layout;
mod node;
pub mod serialize;

pub use geometry::{Rect, Viewport};
pub use html::HtmlParser;
pub use layout::LayoutEngine;
pub use node::{Document, ElementData, Mutation, NodeId, NodeType};
