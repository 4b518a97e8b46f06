use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use log::{debug, error};

use super::builder::{BuildOptions, build_graph};
use super::engine::{CellRef, GraphEngine, Point, ViewState};
use super::error::GraphError;
use super::interaction::{ClickOutcome, InteractionController};
use super::layout::{HierarchicalLayout, LayoutOptions, run_layout};
use super::menu::{PopupStrategy, VertexOnlyPopup};
use super::types::{
	DEFAULT_VERTEX_KEY, DrawVertexFn, GraphConfig, LayoutDirection, MenuProvider, RenderCellFn,
	TaskNode, VertexSize,
};
use super::view_state::ViewStateStore;

/// Pointer travel, in pixels, after which a press counts as a pan.
pub const CLICK_SLOP: f64 = 3.0;

/// Everything a graph instance is built from, apart from the data.
#[derive(Clone)]
pub struct MountOptions {
	pub vertex_key: String,
	pub vertex_size: VertexSize,
	pub config: GraphConfig,
	pub direction: LayoutDirection,
	pub render_cell: Option<RenderCellFn>,
	pub draw_vertex: Option<DrawVertexFn>,
	/// Gates the context menu; vertices only unless replaced.
	pub popup_strategy: Arc<dyn PopupStrategy>,
}

impl Default for MountOptions {
	fn default() -> Self {
		Self {
			vertex_key: DEFAULT_VERTEX_KEY.to_string(),
			vertex_size: VertexSize::default(),
			config: GraphConfig::default(),
			direction: LayoutDirection::default(),
			render_cell: None,
			draw_vertex: None,
			popup_strategy: Arc::new(VertexOnlyPopup),
		}
	}
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub moved: bool,
	pub start: Point,
	pub view_start: ViewState,
}

/// One mounted graph: the engine plus the interaction state bound to it.
pub struct TaskGraphState {
	pub engine: GraphEngine,
	pub interaction: InteractionController,
	pub pan: PanState,
	pub width: f64,
	pub height: f64,
}

impl TaskGraphState {
	/// Creates the engine, builds and lays out `data`, then restores the
	/// saved view. `None` data leaves an empty canvas.
	pub fn mount(
		options: &MountOptions,
		data: Option<&[Arc<TaskNode>]>,
		views: &ViewStateStore,
		width: f64,
		height: f64,
	) -> Result<Self, GraphError> {
		let mut engine = GraphEngine::create(options.config.clone(), options.popup_strategy.clone());
		if let Some(render_cell) = options.render_cell.clone() {
			engine.render_vertex(render_cell);
		}

		let mut current = None;
		if let Some(roots) = data {
			if let [only] = roots {
				current = Some(only.clone());
			}
			let report = build_graph(
				&mut engine,
				roots,
				&BuildOptions {
					vertex_key: &options.vertex_key,
					vertex_size: options.vertex_size,
					draw_vertex: options.draw_vertex.as_ref(),
				},
			)?;
			let layout = HierarchicalLayout::new(LayoutOptions::with_direction(options.direction));
			run_layout(&mut engine, &layout)?;
			views.restore(&mut engine);
			debug!(
				"mounted task graph with {} vertices and {} edges",
				report.vertices, report.edges
			);
		}

		Ok(Self {
			engine,
			interaction: InteractionController::new(current),
			pan: PanState::default(),
			width,
			height,
		})
	}

	pub fn teardown(&mut self) {
		self.engine.dispose();
	}

	pub fn current(&self) -> Option<Arc<TaskNode>> {
		self.interaction.current().cloned()
	}

	pub fn press(&mut self, at: Point) {
		self.pan = PanState {
			active: self.engine.cell_at(at).is_none(),
			moved: false,
			start: at,
			view_start: self.engine.view(),
		};
	}

	pub fn drag_to(&mut self, at: Point) {
		let (dx, dy) = (at.x - self.pan.start.x, at.y - self.pan.start.y);
		if dx.hypot(dy) > CLICK_SLOP {
			self.pan.moved = true;
		}
		if self.pan.active && self.pan.moved {
			let start = self.pan.view_start;
			self.engine.set_view(ViewState {
				dx: start.dx + dx / start.scale,
				dy: start.dy + dy / start.scale,
				..start
			});
		}
	}

	/// Ends a press. Returns true when it should be treated as a click.
	pub fn release(&mut self) -> bool {
		let was_click = !self.pan.moved;
		self.pan = PanState::default();
		was_click
	}

	pub fn click(&mut self, at: Point) -> Result<ClickOutcome, GraphError> {
		let cell = self.engine.cell_at(at);
		self.interaction.click(&mut self.engine, cell)
	}

	pub fn double_click(&self, at: Point) -> Option<Arc<TaskNode>> {
		self.interaction
			.double_click(&self.engine, self.engine.cell_at(at))
	}

	pub fn wheel(&mut self, at: Point, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		self.engine.zoom_at(at, factor);
	}

	pub fn tooltip_at(&self, at: Point) -> Option<String> {
		self.engine.cell_at(at).and_then(|c| self.engine.tooltip_for(c))
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

/// Mounts into `slot`, disposing whatever was there first.
pub fn remount(
	slot: &RefCell<Option<TaskGraphState>>,
	options: &MountOptions,
	data: Option<&[Arc<TaskNode>]>,
	views: &ViewStateStore,
	width: f64,
	height: f64,
) -> Option<Arc<TaskNode>> {
	if let Some(mut old) = slot.borrow_mut().take() {
		old.teardown();
	}
	match TaskGraphState::mount(options, data, views, width, height) {
		Ok(state) => {
			let current = state.current();
			*slot.borrow_mut() = Some(state);
			current
		}
		Err(err) => {
			error!("failed to build task graph: {err}");
			None
		}
	}
}

/// Right-click flow: select the cell, fetch entries for a vertex, then show
/// the menu if anything was added. No borrow of `slot` is held while the
/// provider is pending.
pub async fn open_context_menu(
	slot: Rc<RefCell<Option<TaskGraphState>>>,
	provider: Option<Arc<dyn MenuProvider + Send + Sync>>,
	at: Point,
) -> bool {
	let (ticket, node) = {
		let mut guard = slot.borrow_mut();
		let Some(state) = guard.as_mut() else {
			return false;
		};
		let cell: Option<CellRef> = state.engine.cell_at(at);
		state.interaction.select_for_popup(&mut state.engine, cell);
		state.engine.prepare_popup(at, cell)
	};

	let items = match (node, provider) {
		(Some(node), Some(provider)) => provider.menu_for(node).await,
		_ => Ok(Vec::new()),
	};

	let mut guard = slot.borrow_mut();
	match guard.as_mut() {
		Some(state) => state.engine.complete_popup(ticket, items),
		None => false,
	}
}
