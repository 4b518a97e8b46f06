//! Hierarchical layout of the built graph.
//!
//! Ranks come from the longest path from a source, cycles are broken at the
//! node with the fewest unresolved predecessors. Ranks are ordered with one
//! downward and one upward barycenter sweep, then packed and centred on the
//! widest rank.

use std::collections::{HashMap, HashSet, VecDeque};

use log::debug;
use petgraph::Direction;
use petgraph::stable_graph::NodeIndex;

use super::engine::{GraphEngine, Point, Rect};
use super::error::GraphError;
use super::types::LayoutDirection;

pub const INTER_RANK_SPACING: f64 = 40.0;
pub const INTRA_CELL_SPACING: f64 = 60.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EdgeStyle {
	/// Vertical exit, horizontal channel halfway between ranks, vertical entry.
	#[default]
	TopToBottom,
	Straight,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutOptions {
	pub direction: LayoutDirection,
	pub inter_rank_spacing: f64,
	pub intra_cell_spacing: f64,
	pub edge_style: EdgeStyle,
	/// Leaves edges as straight center lines instead of applying `edge_style`.
	pub disable_edge_style: bool,
}

impl Default for LayoutOptions {
	fn default() -> Self {
		Self {
			direction: LayoutDirection::North,
			inter_rank_spacing: INTER_RANK_SPACING,
			intra_cell_spacing: INTRA_CELL_SPACING,
			edge_style: EdgeStyle::TopToBottom,
			disable_edge_style: false,
		}
	}
}

impl LayoutOptions {
	pub fn with_direction(direction: LayoutDirection) -> Self {
		Self {
			direction,
			..Default::default()
		}
	}
}

pub trait LayoutAlgorithm {
	/// Assigns vertex geometry and edge routes for every cell in the engine.
	fn execute(&self, engine: &mut GraphEngine) -> Result<(), GraphError>;
}

#[derive(Clone, Debug, Default)]
pub struct HierarchicalLayout {
	pub options: LayoutOptions,
}

impl HierarchicalLayout {
	pub fn new(options: LayoutOptions) -> Self {
		Self { options }
	}
}

/// Runs `layout` inside its own update bracket.
pub fn run_layout(engine: &mut GraphEngine, layout: &dyn LayoutAlgorithm) -> Result<(), GraphError> {
	engine.batch(|engine| layout.execute(engine))
}

impl LayoutAlgorithm for HierarchicalLayout {
	fn execute(&self, engine: &mut GraphEngine) -> Result<(), GraphError> {
		if engine.is_disposed() {
			return Err(GraphError::Disposed);
		}
		let nodes: Vec<NodeIndex> = engine.vertices().map(|(idx, _)| idx).collect();
		if nodes.is_empty() {
			return Ok(());
		}

		let ranks = assign_ranks(engine, &nodes);
		let mut layers = group_layers(&nodes, &ranks);
		order_layers(engine, &mut layers);
		self.place(engine, &layers)?;
		self.route(engine)?;

		debug!(
			"laid out {} vertices in {} ranks ({})",
			nodes.len(),
			layers.len(),
			self.options.direction
		);
		Ok(())
	}
}

fn assign_ranks(engine: &GraphEngine, nodes: &[NodeIndex]) -> HashMap<NodeIndex, usize> {
	let model = engine.model();
	let mut in_degree: HashMap<NodeIndex, usize> = nodes
		.iter()
		.map(|&idx| {
			let deg = model
				.neighbors_directed(idx, Direction::Incoming)
				.filter(|&p| p != idx)
				.count();
			(idx, deg)
		})
		.collect();

	let mut ranks: HashMap<NodeIndex, usize> = HashMap::new();
	let mut queued: HashSet<NodeIndex> = HashSet::new();
	let mut queue: VecDeque<NodeIndex> = VecDeque::new();

	for &idx in nodes {
		if in_degree[&idx] == 0 {
			queue.push_back(idx);
			queued.insert(idx);
			ranks.insert(idx, 0);
		}
	}

	while queued.len() < nodes.len() || !queue.is_empty() {
		let Some(current) = queue.pop_front() else {
			// cycle: release the waiting node with the fewest unresolved inputs
			let Some(&next) = nodes
				.iter()
				.filter(|idx| !queued.contains(*idx))
				.min_by_key(|idx| in_degree[*idx])
			else {
				break;
			};
			let rank = model
				.neighbors_directed(next, Direction::Incoming)
				.filter_map(|p| ranks.get(&p).map(|r| r + 1))
				.max()
				.unwrap_or(0);
			ranks.insert(next, rank);
			queued.insert(next);
			queue.push_back(next);
			continue;
		};

		let rank = ranks[&current];
		let targets: Vec<NodeIndex> = model
			.neighbors_directed(current, Direction::Outgoing)
			.filter(|&t| t != current && !queued.contains(&t))
			.collect();
		for target in targets {
			let entry = ranks.entry(target).or_insert(0);
			*entry = (*entry).max(rank + 1);
			if let Some(deg) = in_degree.get_mut(&target) {
				*deg = deg.saturating_sub(1);
				if *deg == 0 && queued.insert(target) {
					queue.push_back(target);
				}
			}
		}
	}

	ranks
}

fn group_layers(nodes: &[NodeIndex], ranks: &HashMap<NodeIndex, usize>) -> Vec<Vec<NodeIndex>> {
	let depth = ranks.values().copied().max().unwrap_or(0);
	let mut layers = vec![Vec::new(); depth + 1];
	for &idx in nodes {
		layers[ranks.get(&idx).copied().unwrap_or(0)].push(idx);
	}
	layers.retain(|layer| !layer.is_empty());
	layers
}

fn order_layers(engine: &GraphEngine, layers: &mut [Vec<NodeIndex>]) {
	if layers.len() <= 1 {
		return;
	}
	let mut position: HashMap<NodeIndex, f64> = HashMap::new();
	for layer in layers.iter() {
		for (i, &idx) in layer.iter().enumerate() {
			position.insert(idx, i as f64);
		}
	}

	for i in 1..layers.len() {
		sweep(engine, &mut layers[i], &mut position, Direction::Incoming);
	}
	for i in (0..layers.len() - 1).rev() {
		sweep(engine, &mut layers[i], &mut position, Direction::Outgoing);
	}
}

fn sweep(
	engine: &GraphEngine,
	layer: &mut Vec<NodeIndex>,
	position: &mut HashMap<NodeIndex, f64>,
	towards: Direction,
) {
	let model = engine.model();
	let mut keyed: Vec<(NodeIndex, f64)> = layer
		.iter()
		.map(|&idx| {
			let linked: Vec<f64> = model
				.neighbors_directed(idx, towards)
				.filter(|&n| n != idx)
				.filter_map(|n| position.get(&n).copied())
				.collect();
			let center = if linked.is_empty() {
				position.get(&idx).copied().unwrap_or(0.0)
			} else {
				linked.iter().sum::<f64>() / linked.len() as f64
			};
			(idx, center)
		})
		.collect();

	keyed.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
	*layer = keyed.into_iter().map(|(idx, _)| idx).collect();
	for (i, idx) in layer.iter().enumerate() {
		position.insert(*idx, i as f64);
	}
}

impl HierarchicalLayout {
	fn place(&self, engine: &mut GraphEngine, layers: &[Vec<NodeIndex>]) -> Result<(), GraphError> {
		let vertical = matches!(
			self.options.direction,
			LayoutDirection::North | LayoutDirection::South
		);
		// (extent along a rank, thickness across ranks)
		let size_of = |engine: &GraphEngine, idx: NodeIndex| -> Result<(f64, f64), GraphError> {
			let g = engine
				.vertex(idx)
				.ok_or(GraphError::UnknownVertex(idx.index()))?
				.geometry;
			Ok(if vertical {
				(g.width, g.height)
			} else {
				(g.height, g.width)
			})
		};

		let mut spans = Vec::with_capacity(layers.len());
		for layer in layers {
			let mut span = 0.0;
			let mut thickness: f64 = 0.0;
			for &idx in layer {
				let (along, across) = size_of(engine, idx)?;
				span += along;
				thickness = thickness.max(across);
			}
			span += self.options.intra_cell_spacing * layer.len().saturating_sub(1) as f64;
			spans.push((span, thickness));
		}
		let widest = spans.iter().map(|(s, _)| *s).fold(0.0, f64::max);
		let total: f64 = spans.iter().map(|(_, t)| *t).sum::<f64>()
			+ self.options.inter_rank_spacing * layers.len().saturating_sub(1) as f64;

		let mut rank_offset = 0.0;
		for (layer, (span, thickness)) in layers.iter().zip(&spans) {
			let mut along = (widest - span) / 2.0;
			for &idx in layer {
				let (extent, across) = size_of(engine, idx)?;
				// centre each cell within its rank band
				let across_offset = rank_offset + (thickness - across) / 2.0;
				let across_pos = match self.options.direction {
					LayoutDirection::North | LayoutDirection::West => across_offset,
					LayoutDirection::South | LayoutDirection::East => total - across_offset - across,
				};
				let vertex = engine
					.vertex_mut(idx)
					.ok_or(GraphError::UnknownVertex(idx.index()))?;
				let g = vertex.geometry;
				vertex.geometry = if vertical {
					Rect::new(along, across_pos, g.width, g.height)
				} else {
					Rect::new(across_pos, along, g.width, g.height)
				};
				along += extent + self.options.intra_cell_spacing;
			}
			rank_offset += thickness + self.options.inter_rank_spacing;
		}
		Ok(())
	}

	fn route(&self, engine: &mut GraphEngine) -> Result<(), GraphError> {
		let routes: Vec<_> = engine
			.edges()
			.map(|(idx, source, target, _)| (idx, source, target))
			.collect();
		for (idx, source, target) in routes {
			let (Some(s), Some(t)) = (engine.vertex(source), engine.vertex(target)) else {
				return Err(GraphError::UnknownEdge(idx.index()));
			};
			let points = if self.options.disable_edge_style {
				vec![s.geometry.center(), t.geometry.center()]
			} else {
				match self.options.edge_style {
					EdgeStyle::TopToBottom => top_to_bottom(&s.geometry, &t.geometry),
					EdgeStyle::Straight => vec![s.geometry.center(), t.geometry.center()],
				}
			};
			if let Some(edge) = engine.edge_mut(idx) {
				edge.points = points;
			}
		}
		Ok(())
	}
}

fn top_to_bottom(source: &Rect, target: &Rect) -> Vec<Point> {
	let (sx, tx) = (source.center().x, target.center().x);
	let (start_y, end_y) = if target.y >= source.bottom() {
		(source.bottom(), target.y)
	} else if source.y >= target.bottom() {
		(source.y, target.bottom())
	} else {
		// overlapping bands: leave from the bottom and enter from the bottom
		let y = source.bottom().max(target.bottom());
		return vec![
			Point::new(sx, source.bottom()),
			Point::new(sx, y + INTER_RANK_SPACING / 2.0),
			Point::new(tx, y + INTER_RANK_SPACING / 2.0),
			Point::new(tx, target.bottom()),
		];
	};
	if (sx - tx).abs() < f64::EPSILON {
		return vec![Point::new(sx, start_y), Point::new(tx, end_y)];
	}
	let mid = (start_y + end_y) / 2.0;
	vec![
		Point::new(sx, start_y),
		Point::new(sx, mid),
		Point::new(tx, mid),
		Point::new(tx, end_y),
	]
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use serde_json::json;

	use super::*;
	use crate::components::task_graph::builder::{BuildOptions, build_graph};
	use crate::components::task_graph::menu::VertexOnlyPopup;
	use crate::components::task_graph::types::{GraphConfig, TaskNode, VertexSize};

	fn built(value: serde_json::Value) -> GraphEngine {
		let data: Vec<Arc<TaskNode>> = serde_json::from_value(value).unwrap();
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

	fn geometry(engine: &GraphEngine, id: &str) -> Rect {
		engine
			.vertices()
			.find(|(_, v)| v.id.as_deref() == Some(id))
			.map(|(_, v)| v.geometry)
			.unwrap()
	}

	fn diamond() -> serde_json::Value {
		json!([{
			"taskId": "a",
			"childNode": [
				{ "taskId": "b", "childNode": [{ "taskId": "d" }] },
				{ "taskId": "c", "childNode": [{ "taskId": "d" }] }
			]
		}])
	}

	#[test]
	fn north_stacks_ranks_downwards() {
		let mut engine = built(diamond());
		run_layout(&mut engine, &HierarchicalLayout::default()).unwrap();

		let (a, b, c, d) = (
			geometry(&engine, "a"),
			geometry(&engine, "b"),
			geometry(&engine, "c"),
			geometry(&engine, "d"),
		);
		assert_eq!(a.y, 0.0);
		assert_eq!(b.y, 50.0 + INTER_RANK_SPACING);
		assert_eq!(b.y, c.y);
		assert_eq!(d.y, 2.0 * (50.0 + INTER_RANK_SPACING));
		assert_eq!((b.x - c.x).abs(), 210.0 + INTRA_CELL_SPACING);
		// single-vertex ranks are centred on the widest rank
		assert_eq!(a.center().x, (b.center().x + c.center().x) / 2.0);
		assert_eq!(a.x, d.x);
	}

	#[test]
	fn south_reverses_rank_order() {
		let mut engine = built(diamond());
		let layout = HierarchicalLayout::new(LayoutOptions::with_direction(LayoutDirection::South));
		run_layout(&mut engine, &layout).unwrap();
		assert!(geometry(&engine, "a").y > geometry(&engine, "b").y);
		assert_eq!(geometry(&engine, "d").y, 0.0);
	}

	#[test]
	fn west_lays_ranks_left_to_right() {
		let mut engine = built(diamond());
		let layout = HierarchicalLayout::new(LayoutOptions::with_direction(LayoutDirection::West));
		run_layout(&mut engine, &layout).unwrap();
		let (a, b) = (geometry(&engine, "a"), geometry(&engine, "b"));
		assert_eq!(a.x, 0.0);
		assert_eq!(b.x, 210.0 + INTER_RANK_SPACING);
	}

	#[test]
	fn longest_path_decides_rank() {
		let mut engine = built(json!([{
			"taskId": "a",
			"childNode": [
				{ "taskId": "b", "childNode": [{ "taskId": "c" }] },
				{ "taskId": "c" }
			]
		}]));
		run_layout(&mut engine, &HierarchicalLayout::default()).unwrap();
		assert!(geometry(&engine, "c").y > geometry(&engine, "b").y);
	}

	#[test]
	fn cycles_terminate() {
		let mut engine = built(json!([{
			"taskId": "a",
			"childNode": [{ "taskId": "b", "childNode": [{ "taskId": "a" }] }]
		}]));
		assert_eq!(engine.edge_count(), 2);
		run_layout(&mut engine, &HierarchicalLayout::default()).unwrap();
		assert_ne!(geometry(&engine, "a").y, geometry(&engine, "b").y);
	}

	#[test]
	fn routes_are_orthogonal() {
		let mut engine = built(diamond());
		run_layout(&mut engine, &HierarchicalLayout::default()).unwrap();
		for (_, _, _, edge) in engine.edges() {
			assert!(edge.points.len() >= 2);
			for seg in edge.points.windows(2) {
				assert!(seg[0].x == seg[1].x || seg[0].y == seg[1].y);
			}
		}
	}

	#[test]
	fn layout_is_one_update() {
		let mut engine = built(diamond());
		let before = engine.revision();
		run_layout(&mut engine, &HierarchicalLayout::default()).unwrap();
		assert_eq!(engine.revision(), before + 1);
	}

	#[test]
	fn straight_routes_when_edge_style_disabled() {
		let mut engine = built(diamond());
		let layout = HierarchicalLayout::new(LayoutOptions {
			disable_edge_style: true,
			..Default::default()
		});
		run_layout(&mut engine, &layout).unwrap();
		assert!(engine.edges().all(|(_, _, _, e)| e.points.len() == 2));
	}
}
