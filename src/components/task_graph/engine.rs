//! Graph engine: the cell model, view transform, selection, highlight
//! overlays and popup menu behind the task graph canvas.

use std::sync::Arc;

use log::{debug, warn};
use petgraph::Direction;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};

use super::error::{GraphError, MenuError};
use super::menu::{PopupMenu, PopupStrategy};
use super::types::{GraphConfig, MenuItem, RenderCellFn, TaskNode};

pub const ZOOM_FACTOR: f64 = 1.2;
pub const MIN_SCALE: f64 = 0.1;
pub const MAX_SCALE: f64 = 10.0;
/// Edge hit tolerance in screen pixels.
pub const EDGE_TOLERANCE: f64 = 4.0;
pub const SURFACE_PADDING: f64 = 20.0;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
}

impl Rect {
	pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
		Self {
			x,
			y,
			width,
			height,
		}
	}

	pub fn right(&self) -> f64 {
		self.x + self.width
	}

	pub fn bottom(&self) -> f64 {
		self.y + self.height
	}

	pub fn center(&self) -> Point {
		Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
	}

	pub fn contains(&self, p: Point) -> bool {
		p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
	}

	pub fn union(&self, other: &Rect) -> Rect {
		let (x, y) = (self.x.min(other.x), self.y.min(other.y));
		Rect::new(
			x,
			y,
			self.right().max(other.right()) - x,
			self.bottom().max(other.bottom()) - y,
		)
	}
}

/// A rendered task. `value` is the raw payload it was built from.
#[derive(Clone, Debug)]
pub struct Vertex {
	pub id: Option<String>,
	pub value: Arc<TaskNode>,
	pub style: String,
	pub geometry: Rect,
}

/// Routed edge; `points` is empty until a layout pass has run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EdgeCell {
	pub points: Vec<Point>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellRef {
	Vertex(NodeIndex),
	Edge(EdgeIndex),
}

impl CellRef {
	pub fn is_vertex(&self) -> bool {
		matches!(self, CellRef::Vertex(_))
	}

	pub fn vertex(&self) -> Option<NodeIndex> {
		match self {
			CellRef::Vertex(idx) => Some(*idx),
			CellRef::Edge(_) => None,
		}
	}
}

/// Pan/zoom of the view. Screen = (model + translate) * scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewState {
	pub scale: f64,
	pub dx: f64,
	pub dy: f64,
}

impl Default for ViewState {
	fn default() -> Self {
		Self {
			scale: 1.0,
			dx: 0.0,
			dy: 0.0,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayId(pub usize);

#[derive(Clone, Debug, PartialEq)]
pub struct Highlight {
	pub id: OverlayId,
	pub edge: EdgeIndex,
	pub color: String,
	pub stroke_width: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollPosition {
	pub left: f64,
	pub top: f64,
}

/// Handle to a pending popup, stale once a newer popup was prepared.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PopupTicket(pub u64);

pub struct GraphEngine {
	config: GraphConfig,
	model: StableDiGraph<Vertex, EdgeCell>,
	update_level: usize,
	revision: u64,
	view: ViewState,
	selection: Option<CellRef>,
	overlays: Vec<Highlight>,
	next_overlay: usize,
	formatter: Option<RenderCellFn>,
	popup_strategy: Arc<dyn PopupStrategy>,
	popup: PopupMenu,
	scroll_reset_pending: bool,
	disposed: bool,
}

impl GraphEngine {
	pub fn create(config: GraphConfig, popup_strategy: Arc<dyn PopupStrategy>) -> Self {
		debug!("creating graph engine (tooltips: {})", config.tooltips);
		Self {
			config,
			model: StableDiGraph::new(),
			update_level: 0,
			revision: 0,
			view: ViewState::default(),
			selection: None,
			overlays: Vec::new(),
			next_overlay: 0,
			formatter: None,
			popup_strategy,
			popup: PopupMenu::default(),
			scroll_reset_pending: false,
			disposed: false,
		}
	}

	/// Releases cells, overlays, the menu and the formatter. Safe to call twice.
	pub fn dispose(&mut self) {
		if self.disposed {
			return;
		}
		debug!(
			"disposing graph engine ({} vertices, {} edges)",
			self.model.node_count(),
			self.model.edge_count()
		);
		self.model.clear();
		self.overlays.clear();
		self.selection = None;
		self.formatter = None;
		self.popup.hide();
		self.popup.clear();
		self.popup.clear_listeners();
		self.update_level = 0;
		self.scroll_reset_pending = false;
		self.disposed = true;
	}

	pub fn is_disposed(&self) -> bool {
		self.disposed
	}

	fn ensure_live(&self) -> Result<(), GraphError> {
		if self.disposed {
			Err(GraphError::Disposed)
		} else {
			Ok(())
		}
	}

	pub fn config(&self) -> &GraphConfig {
		&self.config
	}

	// ── update brackets ─────────────────────────────────────────────────

	pub fn begin_update(&mut self) {
		self.update_level += 1;
	}

	pub fn end_update(&mut self) {
		if self.update_level == 0 {
			debug!("end_update without matching begin_update");
			return;
		}
		self.update_level -= 1;
		if self.update_level == 0 && !self.disposed {
			self.revision += 1;
		}
	}

	/// Runs `f` inside one update bracket. The bracket closes even when `f`
	/// returns an error; nothing is rolled back.
	pub fn batch<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
		self.begin_update();
		let out = f(self);
		self.end_update();
		out
	}

	/// Number of times the visuals were revalidated.
	pub fn revision(&self) -> u64 {
		self.revision
	}

	// ── model ───────────────────────────────────────────────────────────

	pub fn insert_vertex(
		&mut self,
		id: Option<String>,
		value: Arc<TaskNode>,
		geometry: Rect,
		style: String,
	) -> Result<NodeIndex, GraphError> {
		self.ensure_live()?;
		Ok(self.batch(|engine| {
			engine.model.add_node(Vertex {
				id,
				value,
				style,
				geometry,
			})
		}))
	}

	pub fn insert_edge(
		&mut self,
		source: NodeIndex,
		target: NodeIndex,
	) -> Result<EdgeIndex, GraphError> {
		self.ensure_live()?;
		for idx in [source, target] {
			if !self.model.contains_node(idx) {
				return Err(GraphError::UnknownVertex(idx.index()));
			}
		}
		Ok(self.batch(|engine| engine.model.add_edge(source, target, EdgeCell::default())))
	}

	pub fn has_edge(&self, source: NodeIndex, target: NodeIndex) -> bool {
		self.model.find_edge(source, target).is_some()
	}

	pub fn vertex(&self, idx: NodeIndex) -> Option<&Vertex> {
		self.model.node_weight(idx)
	}

	pub fn vertex_mut(&mut self, idx: NodeIndex) -> Option<&mut Vertex> {
		self.model.node_weight_mut(idx)
	}

	pub fn edge(&self, idx: EdgeIndex) -> Option<&EdgeCell> {
		self.model.edge_weight(idx)
	}

	pub fn edge_mut(&mut self, idx: EdgeIndex) -> Option<&mut EdgeCell> {
		self.model.edge_weight_mut(idx)
	}

	pub fn edge_endpoints(&self, idx: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
		self.model.edge_endpoints(idx)
	}

	pub fn vertices(&self) -> impl Iterator<Item = (NodeIndex, &Vertex)> {
		self.model
			.node_indices()
			.filter_map(|idx| self.model.node_weight(idx).map(|v| (idx, v)))
	}

	pub fn edges(&self) -> impl Iterator<Item = (EdgeIndex, NodeIndex, NodeIndex, &EdgeCell)> {
		self.model
			.edge_references()
			.map(|e| (e.id(), e.source(), e.target(), e.weight()))
	}

	pub fn vertex_count(&self) -> usize {
		self.model.node_count()
	}

	pub fn edge_count(&self) -> usize {
		self.model.edge_count()
	}

	pub fn outgoing_edges(&self, idx: NodeIndex) -> Vec<EdgeIndex> {
		self.model
			.edges_directed(idx, Direction::Outgoing)
			.map(|e| e.id())
			.collect()
	}

	pub fn incoming_edges(&self, idx: NodeIndex) -> Vec<EdgeIndex> {
		self.model
			.edges_directed(idx, Direction::Incoming)
			.map(|e| e.id())
			.collect()
	}

	pub(crate) fn model(&self) -> &StableDiGraph<Vertex, EdgeCell> {
		&self.model
	}

	// ── rendering hooks ─────────────────────────────────────────────────

	pub fn render_vertex(&mut self, formatter: RenderCellFn) {
		self.formatter = Some(formatter);
	}

	/// Text for a vertex; empty without a formatter.
	pub fn label(&self, idx: NodeIndex) -> String {
		match (self.formatter.as_ref(), self.model.node_weight(idx)) {
			(Some(format), Some(vertex)) => format(vertex, self),
			_ => String::new(),
		}
	}

	pub fn tooltip_for(&self, cell: CellRef) -> Option<String> {
		if !self.config.tooltips {
			return None;
		}
		let label = self.label(cell.vertex()?);
		(!label.is_empty()).then_some(label)
	}

	// ── selection and overlays ──────────────────────────────────────────

	pub fn set_selection_cell(&mut self, cell: Option<CellRef>) {
		self.selection = cell.filter(|c| self.contains(*c));
	}

	pub fn selection_cell(&self) -> Option<CellRef> {
		self.selection
	}

	pub fn clear_selection(&mut self) {
		self.selection = None;
	}

	pub fn contains(&self, cell: CellRef) -> bool {
		match cell {
			CellRef::Vertex(idx) => self.model.contains_node(idx),
			CellRef::Edge(idx) => self.model.edge_weight(idx).is_some(),
		}
	}

	pub fn add_highlight(
		&mut self,
		edge: EdgeIndex,
		color: &str,
		stroke_width: f64,
	) -> Result<OverlayId, GraphError> {
		self.ensure_live()?;
		if self.model.edge_weight(edge).is_none() {
			return Err(GraphError::UnknownEdge(edge.index()));
		}
		let id = OverlayId(self.next_overlay);
		self.next_overlay += 1;
		self.overlays.push(Highlight {
			id,
			edge,
			color: color.to_string(),
			stroke_width,
		});
		Ok(id)
	}

	pub fn dispose_highlight(&mut self, id: OverlayId) -> Result<(), GraphError> {
		let pos = self
			.overlays
			.iter()
			.position(|h| h.id == id)
			.ok_or(GraphError::UnknownOverlay(id.0))?;
		self.overlays.remove(pos);
		Ok(())
	}

	pub fn highlights(&self) -> &[Highlight] {
		&self.overlays
	}

	// ── view ────────────────────────────────────────────────────────────

	pub fn view(&self) -> ViewState {
		self.view
	}

	pub fn set_view(&mut self, view: ViewState) {
		self.view = ViewState {
			scale: view.scale.clamp(MIN_SCALE, MAX_SCALE),
			..view
		};
	}

	pub fn zoom_in(&mut self) {
		self.view.scale = (self.view.scale * ZOOM_FACTOR).min(MAX_SCALE);
	}

	pub fn zoom_out(&mut self) {
		self.view.scale = (self.view.scale / ZOOM_FACTOR).max(MIN_SCALE);
	}

	/// Zooms keeping the model point under `at` fixed on screen.
	pub fn zoom_at(&mut self, at: Point, factor: f64) {
		let anchor = self.screen_to_model(at);
		self.view.scale = (self.view.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
		self.view.dx = at.x / self.view.scale - anchor.x;
		self.view.dy = at.y / self.view.scale - anchor.y;
	}

	pub fn pan_by(&mut self, dx: f64, dy: f64) {
		self.view.dx += dx / self.view.scale;
		self.view.dy += dy / self.view.scale;
	}

	pub fn screen_to_model(&self, p: Point) -> Point {
		Point::new(
			p.x / self.view.scale - self.view.dx,
			p.y / self.view.scale - self.view.dy,
		)
	}

	pub fn model_to_screen(&self, p: Point) -> Point {
		Point::new(
			(p.x + self.view.dx) * self.view.scale,
			(p.y + self.view.dy) * self.view.scale,
		)
	}

	pub fn graph_bounds(&self) -> Option<Rect> {
		let mut bounds: Option<Rect> = None;
		for (_, vertex) in self.vertices() {
			bounds = Some(match bounds {
				Some(b) => b.union(&vertex.geometry),
				None => vertex.geometry,
			});
		}
		for (_, _, _, edge) in self.edges() {
			for p in &edge.points {
				let r = Rect::new(p.x, p.y, 0.0, 0.0);
				bounds = Some(bounds.map_or(r, |b| b.union(&r)));
			}
		}
		bounds
	}

	fn screen_bounds(&self) -> Option<Rect> {
		self.graph_bounds().map(|b| {
			let origin = self.model_to_screen(Point::new(b.x, b.y));
			Rect::new(
				origin.x,
				origin.y,
				b.width * self.view.scale,
				b.height * self.view.scale,
			)
		})
	}

	/// Drawing surface needed to scroll over the whole graph.
	pub fn surface_size(&self, viewport: (f64, f64)) -> (f64, f64) {
		match self.screen_bounds() {
			Some(b) => (
				viewport.0.max(b.right() + SURFACE_PADDING),
				viewport.1.max(b.bottom() + SURFACE_PADDING),
			),
			None => viewport,
		}
	}

	pub fn request_scroll_reset(&mut self) {
		self.scroll_reset_pending = true;
	}

	pub fn scroll_reset_pending(&self) -> bool {
		self.scroll_reset_pending
	}

	/// Scroll offsets that bring the top-left of the graph into view.
	pub fn reset_scroll_position(&mut self) -> ScrollPosition {
		self.scroll_reset_pending = false;
		match self.screen_bounds() {
			Some(b) => ScrollPosition {
				left: (b.x - SURFACE_PADDING).max(0.0),
				top: (b.y - SURFACE_PADDING).max(0.0),
			},
			None => ScrollPosition::default(),
		}
	}

	// ── hit testing ─────────────────────────────────────────────────────

	/// Topmost cell under a screen point; vertices win over edges.
	pub fn cell_at(&self, screen: Point) -> Option<CellRef> {
		let p = self.screen_to_model(screen);
		let vertex = self
			.model
			.node_indices()
			.filter(|idx| self.model[*idx].geometry.contains(p))
			.last();
		if let Some(idx) = vertex {
			return Some(CellRef::Vertex(idx));
		}

		let tolerance = EDGE_TOLERANCE / self.view.scale;
		self.model
			.edge_references()
			.filter(|e| {
				let route = self.edge_route(e.id());
				route
					.windows(2)
					.any(|seg| distance_to_segment(p, seg[0], seg[1]) <= tolerance)
			})
			.map(|e| CellRef::Edge(e.id()))
			.last()
	}

	/// Polyline of an edge in model space, falling back to a straight
	/// center-to-center line before layout.
	pub fn edge_route(&self, idx: EdgeIndex) -> Vec<Point> {
		let Some((source, target)) = self.model.edge_endpoints(idx) else {
			return Vec::new();
		};
		match self.model.edge_weight(idx) {
			Some(edge) if edge.points.len() >= 2 => edge.points.clone(),
			_ => vec![
				self.model[source].geometry.center(),
				self.model[target].geometry.center(),
			],
		}
	}

	// ── popup menu ──────────────────────────────────────────────────────

	pub fn popup_menu(&self) -> &PopupMenu {
		&self.popup
	}

	pub fn popup_menu_mut(&mut self) -> &mut PopupMenu {
		&mut self.popup
	}

	/// Shows the menu if the popup strategy accepts the current selection.
	pub fn show_menu(&mut self) -> bool {
		if !self.popup_strategy.accepts(self.selection) {
			return false;
		}
		self.popup.show();
		true
	}

	/// Positions the menu and drops existing items. The returned payload is
	/// the vertex whose entries should be fetched, if `cell` is one.
	pub fn prepare_popup(
		&mut self,
		at: Point,
		cell: Option<CellRef>,
	) -> (PopupTicket, Option<Arc<TaskNode>>) {
		let ticket = PopupTicket(self.popup.reset(at));
		let node = cell
			.and_then(|c| c.vertex())
			.and_then(|idx| self.model.node_weight(idx))
			.map(|v| v.value.clone());
		(ticket, node)
	}

	/// Adds fetched entries and shows the menu when any were added.
	pub fn complete_popup(
		&mut self,
		ticket: PopupTicket,
		items: Result<Vec<MenuItem>, MenuError>,
	) -> bool {
		if self.disposed || self.popup.generation() != ticket.0 {
			debug!("dropping stale context menu result");
			return false;
		}
		match items {
			Ok(items) => self.popup.populate(items),
			Err(err) => warn!("context menu not shown: {err}"),
		}
		if self.popup.item_count() > 0 && self.show_menu() {
			self.popup.fire_shown();
			return true;
		}
		false
	}
}

impl Drop for GraphEngine {
	fn drop(&mut self) {
		self.dispose();
	}
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
	let (vx, vy) = (b.x - a.x, b.y - a.y);
	let len_sq = vx * vx + vy * vy;
	let t = if len_sq < f64::EPSILON {
		0.0
	} else {
		(((p.x - a.x) * vx + (p.y - a.y) * vy) / len_sq).clamp(0.0, 1.0)
	};
	let (cx, cy) = (a.x + t * vx, a.y + t * vy);
	((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::task_graph::menu::VertexOnlyPopup;

	fn engine() -> GraphEngine {
		GraphEngine::create(GraphConfig::default(), Arc::new(VertexOnlyPopup))
	}

	fn node(id: &str) -> Arc<TaskNode> {
		let mut fields = serde_json::Map::new();
		fields.insert("taskId".into(), id.into());
		Arc::new(TaskNode {
			fields,
			..Default::default()
		})
	}

	fn vertex_at(engine: &mut GraphEngine, id: &str, x: f64, y: f64) -> NodeIndex {
		engine
			.insert_vertex(
				Some(id.into()),
				node(id),
				Rect::new(x, y, 100.0, 40.0),
				String::new(),
			)
			.unwrap()
	}

	#[test]
	fn batch_revalidates_once() {
		let mut engine = engine();
		let before = engine.revision();
		engine.batch(|g| {
			let a = vertex_at(g, "a", 0.0, 0.0);
			let b = vertex_at(g, "b", 0.0, 100.0);
			g.insert_edge(a, b).unwrap();
		});
		assert_eq!(engine.revision(), before + 1);

		vertex_at(&mut engine, "c", 0.0, 200.0);
		assert_eq!(engine.revision(), before + 2);
	}

	#[test]
	fn unbalanced_end_update_is_ignored() {
		let mut engine = engine();
		engine.end_update();
		assert_eq!(engine.revision(), 0);
	}

	#[test]
	fn edges_are_directed() {
		let mut engine = engine();
		let a = vertex_at(&mut engine, "a", 0.0, 0.0);
		let b = vertex_at(&mut engine, "b", 0.0, 100.0);
		let c = vertex_at(&mut engine, "c", 200.0, 100.0);
		let ab = engine.insert_edge(a, b).unwrap();
		let ca = engine.insert_edge(c, a).unwrap();

		assert_eq!(engine.outgoing_edges(a), vec![ab]);
		assert_eq!(engine.incoming_edges(a), vec![ca]);
		assert!(engine.has_edge(a, b));
		assert!(!engine.has_edge(b, a));
	}

	#[test]
	fn dispose_is_idempotent_and_blocks_mutation() {
		let mut engine = engine();
		let a = vertex_at(&mut engine, "a", 0.0, 0.0);
		engine.set_selection_cell(Some(CellRef::Vertex(a)));
		engine.dispose();
		engine.dispose();

		assert!(engine.is_disposed());
		assert_eq!(engine.vertex_count(), 0);
		assert_eq!(engine.selection_cell(), None);
		assert_eq!(
			engine.insert_vertex(None, node("x"), Rect::default(), String::new()),
			Err(GraphError::Disposed)
		);
	}

	#[test]
	fn label_defaults_to_empty() {
		let mut engine = engine();
		let a = vertex_at(&mut engine, "a", 0.0, 0.0);
		assert_eq!(engine.label(a), "");

		engine.render_vertex(Arc::new(|v: &Vertex, _: &GraphEngine| {
			v.id.clone().unwrap_or_default()
		}));
		assert_eq!(engine.label(a), "a");
		assert_eq!(engine.tooltip_for(CellRef::Vertex(a)), None);
	}

	#[test]
	fn tooltips_follow_config() {
		let mut engine = GraphEngine::create(
			GraphConfig {
				tooltips: true,
				..Default::default()
			},
			Arc::new(VertexOnlyPopup),
		);
		let a = vertex_at(&mut engine, "a", 0.0, 0.0);
		engine.render_vertex(Arc::new(|_: &Vertex, _: &GraphEngine| "extract".to_string()));
		assert_eq!(engine.tooltip_for(CellRef::Vertex(a)).as_deref(), Some("extract"));
	}

	#[test]
	fn hit_testing_prefers_vertices() {
		let mut engine = engine();
		let a = vertex_at(&mut engine, "a", 0.0, 0.0);
		let b = vertex_at(&mut engine, "b", 0.0, 200.0);
		let e = engine.insert_edge(a, b).unwrap();

		assert_eq!(engine.cell_at(Point::new(50.0, 20.0)), Some(CellRef::Vertex(a)));
		assert_eq!(engine.cell_at(Point::new(51.0, 120.0)), Some(CellRef::Edge(e)));
		assert_eq!(engine.cell_at(Point::new(400.0, 400.0)), None);
	}

	#[test]
	fn hit_testing_follows_view() {
		let mut engine = engine();
		let a = vertex_at(&mut engine, "a", 0.0, 0.0);
		engine.set_view(ViewState {
			scale: 2.0,
			dx: 10.0,
			dy: 0.0,
		});
		assert_eq!(engine.cell_at(Point::new(10.0, 10.0)), None);
		assert_eq!(engine.cell_at(Point::new(30.0, 10.0)), Some(CellRef::Vertex(a)));
	}

	#[test]
	fn zoom_is_clamped() {
		let mut engine = engine();
		for _ in 0..100 {
			engine.zoom_in();
		}
		assert_eq!(engine.view().scale, MAX_SCALE);
		for _ in 0..100 {
			engine.zoom_out();
		}
		assert_eq!(engine.view().scale, MIN_SCALE);
	}

	#[test]
	fn zoom_at_keeps_anchor_fixed() {
		let mut engine = engine();
		engine.pan_by(30.0, 15.0);
		let at = Point::new(120.0, 80.0);
		let before = engine.screen_to_model(at);
		engine.zoom_at(at, 1.1);
		let after = engine.screen_to_model(at);
		assert!((before.x - after.x).abs() < 1e-9);
		assert!((before.y - after.y).abs() < 1e-9);
	}

	#[test]
	fn highlights_require_live_edges() {
		let mut engine = engine();
		let a = vertex_at(&mut engine, "a", 0.0, 0.0);
		let b = vertex_at(&mut engine, "b", 0.0, 100.0);
		let e = engine.insert_edge(a, b).unwrap();

		let id = engine.add_highlight(e, "#2491F7", 2.0).unwrap();
		assert_eq!(engine.highlights().len(), 1);
		engine.dispose_highlight(id).unwrap();
		assert!(engine.highlights().is_empty());
		assert_eq!(engine.dispose_highlight(id), Err(GraphError::UnknownOverlay(id.0)));
	}

	#[test]
	fn scroll_reset_targets_graph_origin() {
		let mut engine = engine();
		vertex_at(&mut engine, "a", 100.0, 60.0);
		engine.request_scroll_reset();
		assert!(engine.scroll_reset_pending());

		let pos = engine.reset_scroll_position();
		assert!(!engine.scroll_reset_pending());
		assert_eq!(pos, ScrollPosition { left: 80.0, top: 40.0 });
		assert_eq!(engine.surface_size((100.0, 100.0)), (220.0, 120.0));
	}
}
