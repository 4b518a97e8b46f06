//! Interactive task dependency graph: build, layout, view persistence and
//! interaction over a canvas-backed graph engine.

mod builder;
mod component;
mod engine;
mod error;
mod interaction;
mod layout;
mod menu;
mod render;
mod state;
mod types;
mod view_state;

pub use builder::{BuildOptions, BuildReport, build_graph};
pub use component::TaskGraph;
pub use engine::{CellRef, EdgeCell, GraphEngine, Point, Rect, Vertex, ViewState};
pub use error::{GraphError, MenuError, ParseDirectionError};
pub use interaction::{ClickOutcome, InteractionController};
pub use layout::{HierarchicalLayout, LayoutAlgorithm, LayoutOptions, run_layout};
pub use menu::{PopupStrategy, VertexOnlyPopup};
pub use state::{MountOptions, TaskGraphState};
pub use types::{
	ActionsFn, ClickFn, ContextMenuFn, DoubleClickFn, DrawVertexFn, GraphConfig, LayoutDirection,
	MenuItem, MenuProvider, RefreshFn, RenderCellFn, StatusFn, TaskKey, TaskNode, VertexSize,
	ready_menu,
};
pub use view_state::ViewStateStore;
