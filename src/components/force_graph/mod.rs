//! Force-directed architecture diagram.
//!
//! Lays out typed nodes and directed links on an HTML canvas with:
//! - A validated, immutable graph built from a JSON [`GraphData`] payload
//! - A d3-style force solver (springs, Barnes–Hut repulsion, centering, collision)
//! - Node dragging, hover emphasis, and resize re-centering via explicit intents
//! - A lifecycle engine owning one solver and frame loop per mount
//!
//! # Example
//!
//! ```ignore
//! use arch_diagram::{ArchitectureDiagram, GraphData};
//!
//! let data = GraphData::sample();
//! view! { <ArchitectureDiagram data=Signal::derive(move || data.clone()) /> }
//! ```

mod component;
mod error;
mod graph;
mod interaction;
mod lifecycle;
mod quadtree;
mod render;
mod rng;
mod simulation;
mod state;
mod theme;
mod types;

pub use component::ArchitectureDiagram;
pub use error::{EngineError, GraphValidationError, LinkEndpoint};
pub use interaction::InteractionConfig;
pub use lifecycle::{DiagramEngine, EngineConfig, FrameHandle, FrameScheduler, Surface};
pub use render::{Arrowhead, Disc, Frame, Label, Placeholder, Segment};
pub use simulation::ForceConfig;
pub use theme::{Color, KindStyle, LabelStyle, LinkStyle, NodeStyle, PlaceholderStyle, Theme};
pub use types::{GraphData, GraphLink, GraphNode, NodeKind, Viewport, ViewportConfig};
