//! Interactive knowledge graph visualization.
//!
//! Renders a node/edge dataset on an HTML canvas with:
//! - Force-directed placement plus circular, grid, concentric and hierarchical layouts
//! - Category colors and degree-based node sizes
//! - Selection with neighborhood highlight, label search and attribute filtering,
//!   all layered over the same graph without touching the dataset
//! - Pan, zoom, fit, node dragging and PNG export
//!
//! Everything except `component` and `render` is plain Rust and runs natively.
//!
//! # Example
//!
//! ```ignore
//! use knowledge_graph_canvas::{GraphDataset, KnowledgeGraphCanvas};
//!
//! let data = Signal::derive(move || Arc::new(GraphDataset::from_json(json).unwrap_or_default()));
//! view! { <KnowledgeGraphCanvas data=data search_term=term filter=filter /> }
//! ```

mod component;
mod controller;
mod error;
mod layout;
mod model;
mod overlay;
mod render;
mod style;
mod surface;
mod types;
mod viewport;

pub use component::KnowledgeGraphCanvas;
pub use controller::{ExportRequest, InteractionEvent, Reaction};
pub use error::{Endpoint, GraphError};
pub use layout::{LayoutAlgorithm, LayoutOptions, LayoutProgress, place};
pub use model::build;
pub use overlay::{ElementState, FilterPredicate, MAX_IMPORTANCE, MIN_IMPORTANCE, Restyle};
pub use style::{EDGE_COLOR, StyleConfig, StyleResolver};
pub use surface::{GraphSurface, ListenerId, SurfaceConfig};
pub use types::{GraphDataset, GraphEdge, GraphNode, StatsSummary};
pub use viewport::ViewportConfig;
