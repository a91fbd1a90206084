//! Interactive state for exploring system-health graphs.
//!
//! A [`Session`] owns the [`GraphModel`], the current selection and the
//! collapse state of compound nodes. Renderers implement [`RenderAdapter`]
//! and receive the visible graph plus per-node styles from the session.

pub mod config;
pub mod error;
pub mod health;
pub mod hierarchy;
pub mod model;
pub mod render;
pub mod selection;
pub mod session;

pub use config::{DetailDisclosure, EdgeCurve, LayoutAlgorithm, LayoutConfig, SelectionMode, ViewConfig};
pub use error::GraphError;
pub use health::{HealthPalette, Rgb, Segment, compute_segments};
pub use hierarchy::{HierarchyController, NodeState, VisibleEdge, VisibleGraph};
pub use model::{Edge, GraphModel, Node};
pub use render::{EdgeStyle, NodeStyle, RenderAdapter, StyleSource, ViewEvent};
pub use selection::SelectionController;
pub use session::{PendingRender, Session};
