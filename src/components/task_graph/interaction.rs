use std::sync::Arc;

use petgraph::stable_graph::NodeIndex;

use super::engine::{CellRef, GraphEngine, OverlayId};
use super::error::GraphError;
use super::types::TaskNode;

pub const HIGHLIGHT_COLOR: &str = "#2491F7";
pub const HIGHLIGHT_STROKE_WIDTH: f64 = 2.0;

/// What a click resolved to.
#[derive(Clone, Debug, PartialEq)]
pub enum ClickOutcome {
	/// A vertex was clicked; the host `on_click` callback should run.
	Vertex(NodeIndex),
	Edge,
	Canvas,
}

/// Tracks the current task and the edge overlays drawn for it.
#[derive(Debug, Default)]
pub struct InteractionController {
	current: Option<Arc<TaskNode>>,
	overlays: Vec<OverlayId>,
}

impl InteractionController {
	pub fn new(current: Option<Arc<TaskNode>>) -> Self {
		Self {
			current,
			overlays: Vec::new(),
		}
	}

	pub fn current(&self) -> Option<&Arc<TaskNode>> {
		self.current.as_ref()
	}

	pub fn overlay_count(&self) -> usize {
		self.overlays.len()
	}

	pub fn click(
		&mut self,
		engine: &mut GraphEngine,
		cell: Option<CellRef>,
	) -> Result<ClickOutcome, GraphError> {
		engine.popup_menu_mut().hide();
		self.clear_highlights(engine);

		match cell {
			Some(CellRef::Vertex(idx)) => {
				let vertex = engine
					.vertex(idx)
					.ok_or(GraphError::UnknownVertex(idx.index()))?;
				self.current = Some(vertex.value.clone());
				engine.set_selection_cell(Some(CellRef::Vertex(idx)));

				let mut edges = engine.outgoing_edges(idx);
				edges.extend(engine.incoming_edges(idx));
				for edge in edges {
					let id = engine.add_highlight(edge, HIGHLIGHT_COLOR, HIGHLIGHT_STROKE_WIDTH)?;
					self.overlays.push(id);
				}
				Ok(ClickOutcome::Vertex(idx))
			}
			Some(edge @ CellRef::Edge(_)) => {
				self.current = None;
				engine.set_selection_cell(Some(edge));
				Ok(ClickOutcome::Edge)
			}
			None => {
				self.current = None;
				engine.clear_selection();
				Ok(ClickOutcome::Canvas)
			}
		}
	}

	/// Payload for the double-click callback; only vertices qualify.
	pub fn double_click(&self, engine: &GraphEngine, cell: Option<CellRef>) -> Option<Arc<TaskNode>> {
		let idx = cell?.vertex()?;
		engine.vertex(idx).map(|v| v.value.clone())
	}

	/// Right-click selects the cell under the pointer before the menu pops up.
	pub fn select_for_popup(&self, engine: &mut GraphEngine, cell: Option<CellRef>) {
		engine.set_selection_cell(cell);
	}

	fn clear_highlights(&mut self, engine: &mut GraphEngine) {
		for id in self.overlays.drain(..) {
			// overlays vanish with a disposed engine
			let _ = engine.dispose_highlight(id);
		}
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::components::task_graph::builder::{BuildOptions, build_graph};
	use crate::components::task_graph::menu::VertexOnlyPopup;
	use crate::components::task_graph::types::{GraphConfig, TaskKey, VertexSize};

	fn built() -> GraphEngine {
		let data: Vec<Arc<TaskNode>> = serde_json::from_value(json!([{
			"taskId": "b",
			"parentNode": [{ "taskId": "a" }],
			"childNode": [{ "taskId": "c" }, { "taskId": "d" }]
		}]))
		.unwrap();
		let mut engine = GraphEngine::create(GraphConfig::default(), Arc::new(VertexOnlyPopup));
		build_graph(
			&mut engine,
			&data,
			&BuildOptions {
				vertex_key: "taskId",
				vertex_size: VertexSize::default(),
				draw_vertex: None,
			},
		)
		.unwrap();
		engine
	}

	fn find(engine: &GraphEngine, id: &str) -> NodeIndex {
		engine
			.vertices()
			.find(|(_, v)| v.id.as_deref() == Some(id))
			.map(|(idx, _)| idx)
			.unwrap()
	}

	#[test]
	fn vertex_click_highlights_incident_edges() {
		let mut engine = built();
		let mut controller = InteractionController::default();
		let b = find(&engine, "b");

		let outcome = controller.click(&mut engine, Some(CellRef::Vertex(b))).unwrap();
		assert_eq!(outcome, ClickOutcome::Vertex(b));
		assert_eq!(controller.overlay_count(), 3);
		assert_eq!(engine.highlights().len(), 3);
		assert!(
			engine
				.highlights()
				.iter()
				.all(|h| h.color == HIGHLIGHT_COLOR && h.stroke_width == HIGHLIGHT_STROKE_WIDTH)
		);
		assert_eq!(controller.current().and_then(|n| n.key("taskId")), Some(TaskKey::from("b")));
		assert_eq!(engine.selection_cell(), Some(CellRef::Vertex(b)));
	}

	#[test]
	fn next_click_replaces_previous_overlays() {
		let mut engine = built();
		let mut controller = InteractionController::default();
		let (b, c) = (find(&engine, "b"), find(&engine, "c"));

		controller.click(&mut engine, Some(CellRef::Vertex(b))).unwrap();
		controller.click(&mut engine, Some(CellRef::Vertex(c))).unwrap();

		let expected = engine.outgoing_edges(c).len() + engine.incoming_edges(c).len();
		assert_eq!(expected, 1);
		assert_eq!(engine.highlights().len(), expected);
		assert_eq!(controller.overlay_count(), expected);
	}

	#[test]
	fn canvas_click_clears_selection_without_overlays() {
		let mut engine = built();
		let mut controller = InteractionController::default();
		let b = find(&engine, "b");
		controller.click(&mut engine, Some(CellRef::Vertex(b))).unwrap();

		let outcome = controller.click(&mut engine, None).unwrap();
		assert_eq!(outcome, ClickOutcome::Canvas);
		assert!(engine.highlights().is_empty());
		assert_eq!(engine.selection_cell(), None);
		assert!(controller.current().is_none());
	}

	#[test]
	fn edge_click_selects_edge_only() {
		let mut engine = built();
		let mut controller = InteractionController::default();
		let edge = engine.edges().map(|(idx, ..)| idx).next().unwrap();

		let outcome = controller.click(&mut engine, Some(CellRef::Edge(edge))).unwrap();
		assert_eq!(outcome, ClickOutcome::Edge);
		assert!(engine.highlights().is_empty());
		assert_eq!(engine.selection_cell(), Some(CellRef::Edge(edge)));
		assert!(controller.current().is_none());
	}

	#[test]
	fn double_click_only_reports_vertices() {
		let engine = built();
		let controller = InteractionController::default();
		let a = find(&engine, "a");
		let edge = engine.edges().map(|(idx, ..)| idx).next().unwrap();

		let payload = controller.double_click(&engine, Some(CellRef::Vertex(a))).unwrap();
		assert_eq!(payload.key("taskId"), Some(TaskKey::from("a")));
		assert!(controller.double_click(&engine, Some(CellRef::Edge(edge))).is_none());
		assert!(controller.double_click(&engine, None).is_none());
		assert!(engine.highlights().is_empty());
	}

	#[test]
	fn click_hides_open_menu() {
		let mut engine = built();
		let mut controller = InteractionController::default();
		engine.popup_menu_mut().show();
		controller.click(&mut engine, None).unwrap();
		assert!(!engine.popup_menu().is_visible());
	}
}
