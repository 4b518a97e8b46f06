//! Flattens a forest of task records into engine vertices and edges.
//!
//! Traversal is a depth-first walk over an explicit stack seeded with every
//! root. Both `childNode` and `parentNode` are expanded, and the direction of
//! each edge is decided by looking at the record that led to the current
//! node: if its `childNode` names the current node the edge runs towards the
//! current node, otherwise away from it. Siblings are visited in stack (LIFO)
//! order.
//!
//! Vertices are interned by key: a record whose key was already inserted
//! reuses that vertex. Every distinct record is still expanded once, so a
//! stub occurrence seen before the full record does not hide its links.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use log::debug;
use petgraph::stable_graph::NodeIndex;

use super::engine::{CellRef, GraphEngine, Rect};
use super::error::GraphError;
use super::types::{DrawVertexFn, TaskKey, TaskNode, VertexSize};

pub struct BuildOptions<'a> {
	pub vertex_key: &'a str,
	pub vertex_size: VertexSize,
	pub draw_vertex: Option<&'a DrawVertexFn>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BuildReport {
	pub vertices: usize,
	pub edges: usize,
	/// Root vertices in input order.
	pub roots: Vec<NodeIndex>,
}

struct Pending {
	/// Vertex and record this node was reached from.
	parent_link: Option<(NodeIndex, Arc<TaskNode>)>,
	node: Arc<TaskNode>,
}

/// Inserts `roots` and everything reachable from them inside one update
/// bracket.
pub fn build_graph(
	engine: &mut GraphEngine,
	roots: &[Arc<TaskNode>],
	options: &BuildOptions<'_>,
) -> Result<BuildReport, GraphError> {
	engine.batch(|engine| insert_forest(engine, roots, options))
}

fn insert_forest(
	engine: &mut GraphEngine,
	roots: &[Arc<TaskNode>],
	options: &BuildOptions<'_>,
) -> Result<BuildReport, GraphError> {
	let (width, height) = options.vertex_size.resolved();
	let mut interned: HashMap<TaskKey, NodeIndex> = HashMap::new();
	// records already expanded; `roots` keeps every pointer alive for the walk
	let mut expanded: HashSet<*const TaskNode> = HashSet::new();
	let mut report = BuildReport::default();
	let mut root_slots: Vec<Option<NodeIndex>> = vec![None; roots.len()];

	let mut stack: Vec<(Option<usize>, Pending)> = roots
		.iter()
		.enumerate()
		.map(|(slot, node)| {
			(
				Some(slot),
				Pending {
					parent_link: None,
					node: node.clone(),
				},
			)
		})
		.collect();

	while let Some((root_slot, Pending { parent_link, node })) = stack.pop() {
		let key = node.key(options.vertex_key);
		let existing = key.as_ref().and_then(|k| interned.get(k)).copied();

		let vertex = match existing {
			Some(idx) => idx,
			None => {
				let style = options
					.draw_vertex
					.map(|draw| draw(node.as_ref()))
					.unwrap_or_default();
				let idx = engine.insert_vertex(
					key.as_ref().map(ToString::to_string),
					node.clone(),
					Rect::new(0.0, 0.0, width, height),
					style,
				)?;
				if let Some(k) = key.clone() {
					interned.insert(k, idx);
				}
				report.vertices += 1;
				idx
			}
		};

		match parent_link {
			Some((link, link_record)) => {
				let link_is_source = match key.as_ref() {
					Some(k) => link_record.has_child(options.vertex_key, k),
					// keyless records can only be matched by identity
					None => link_record.child_node.iter().any(|c| Arc::ptr_eq(c, &node)),
				};
				let (source, target) = if link_is_source {
					(link, vertex)
				} else {
					(vertex, link)
				};
				if source != target && !engine.has_edge(source, target) {
					engine.insert_edge(source, target)?;
					report.edges += 1;
				}
			}
			None => {
				engine.set_selection_cell(Some(CellRef::Vertex(vertex)));
				if let Some(slot) = root_slot {
					root_slots[slot] = Some(vertex);
				}
			}
		}

		if !expanded.insert(Arc::as_ptr(&node)) {
			continue;
		}
		for next in node.child_node.iter().chain(node.parent_node.iter()) {
			stack.push((
				None,
				Pending {
					parent_link: Some((vertex, node.clone())),
					node: next.clone(),
				},
			));
		}
	}

	report.roots = root_slots.into_iter().flatten().collect();
	debug!(
		"built task graph: {} vertices, {} edges from {} roots",
		report.vertices,
		report.edges,
		roots.len()
	);
	Ok(report)
}
