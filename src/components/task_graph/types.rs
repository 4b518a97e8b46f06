use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use futures::future::LocalBoxFuture;
use leptos::prelude::AnyView;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use web_sys::MouseEvent;

use super::engine::{GraphEngine, Vertex};
use super::error::{MenuError, ParseDirectionError};

pub const DEFAULT_VERTEX_KEY: &str = "taskId";
pub const DEFAULT_VERTEX_WIDTH: f64 = 210.0;
pub const DEFAULT_VERTEX_HEIGHT: f64 = 50.0;

/// A task record as delivered by the host page.
///
/// Payload fields are kept verbatim; `childNode` / `parentNode` describe
/// forward and backward dependencies. Absent and `null` link lists are empty.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskNode {
	#[serde(
		default,
		deserialize_with = "nullable_links",
		skip_serializing_if = "Vec::is_empty"
	)]
	pub child_node: Vec<Arc<TaskNode>>,
	#[serde(
		default,
		deserialize_with = "nullable_links",
		skip_serializing_if = "Vec::is_empty"
	)]
	pub parent_node: Vec<Arc<TaskNode>>,
	#[serde(flatten)]
	pub fields: Map<String, Value>,
}

fn nullable_links<'de, D>(deserializer: D) -> Result<Vec<Arc<TaskNode>>, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(Option::<Vec<Arc<TaskNode>>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Identifier of a task record.
///
/// The JSON type is part of the identity: `1` and `"1"` are different tasks.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TaskKey {
	Text(String),
	Number(String),
	Flag(bool),
}

impl fmt::Display for TaskKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TaskKey::Text(s) | TaskKey::Number(s) => f.write_str(s),
			TaskKey::Flag(b) => write!(f, "{b}"),
		}
	}
}

impl From<&str> for TaskKey {
	fn from(s: &str) -> Self {
		TaskKey::Text(s.to_string())
	}
}

impl From<i64> for TaskKey {
	fn from(n: i64) -> Self {
		TaskKey::Number(n.to_string())
	}
}

impl TaskNode {
	pub fn get(&self, field: &str) -> Option<&Value> {
		self.fields.get(field)
	}

	/// Identifier under `field`; structured values have none.
	pub fn key(&self, field: &str) -> Option<TaskKey> {
		match self.fields.get(field)? {
			Value::String(s) => Some(TaskKey::Text(s.clone())),
			Value::Number(n) => Some(TaskKey::Number(n.to_string())),
			Value::Bool(b) => Some(TaskKey::Flag(*b)),
			_ => None,
		}
	}

	pub fn has_child(&self, field: &str, key: &TaskKey) -> bool {
		self.child_node
			.iter()
			.any(|child| child.key(field).as_ref() == Some(key))
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VertexSize {
	pub width: Option<f64>,
	pub height: Option<f64>,
}

impl VertexSize {
	pub fn resolved(&self) -> (f64, f64) {
		(
			self.width
				.filter(|w| *w > 0.0)
				.unwrap_or(DEFAULT_VERTEX_WIDTH),
			self.height
				.filter(|h| *h > 0.0)
				.unwrap_or(DEFAULT_VERTEX_HEIGHT),
		)
	}
}

/// Engine flags; unknown keys are carried through untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphConfig {
	#[serde(default)]
	pub tooltips: bool,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

/// Direction ranks flow in. `North` puts sources at the top.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutDirection {
	#[default]
	North,
	South,
	West,
	East,
}

impl FromStr for LayoutDirection {
	type Err = ParseDirectionError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"" | "north" => Ok(Self::North),
			"south" => Ok(Self::South),
			"west" => Ok(Self::West),
			"east" => Ok(Self::East),
			other => Err(ParseDirectionError(other.to_string())),
		}
	}
}

impl fmt::Display for LayoutDirection {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::North => "north",
			Self::South => "south",
			Self::West => "west",
			Self::East => "east",
		})
	}
}

/// Context menu entry. Only two levels are rendered.
#[derive(Clone, Default)]
pub struct MenuItem {
	pub title: String,
	pub callback: Option<MenuCallback>,
	pub disabled: bool,
	pub children: Vec<MenuItem>,
}

impl MenuItem {
	pub fn new(title: impl Into<String>) -> Self {
		Self {
			title: title.into(),
			..Default::default()
		}
	}

	pub fn on_select(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
		self.callback = Some(Arc::new(callback));
		self
	}

	pub fn disabled(mut self, disabled: bool) -> Self {
		self.disabled = disabled;
		self
	}

	pub fn child(mut self, item: MenuItem) -> Self {
		self.children.push(item);
		self
	}
}

impl fmt::Debug for MenuItem {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MenuItem")
			.field("title", &self.title)
			.field("disabled", &self.disabled)
			.field("children", &self.children)
			.finish_non_exhaustive()
	}
}

pub type MenuCallback = Arc<dyn Fn() + Send + Sync>;
pub type MenuFuture = LocalBoxFuture<'static, Result<Vec<MenuItem>, MenuError>>;

/// Supplies context menu entries for a vertex payload, possibly asynchronously.
pub trait MenuProvider {
	fn menu_for(&self, node: Arc<TaskNode>) -> MenuFuture;
}

impl<F> MenuProvider for F
where
	F: Fn(Arc<TaskNode>) -> MenuFuture,
{
	fn menu_for(&self, node: Arc<TaskNode>) -> MenuFuture {
		self(node)
	}
}

/// Wraps a synchronous item list as a ready future.
pub fn ready_menu(items: Vec<MenuItem>) -> MenuFuture {
	Box::pin(futures::future::ready(Ok(items)))
}

pub type RenderCellFn = Arc<dyn Fn(&Vertex, &GraphEngine) -> String + Send + Sync>;
pub type DrawVertexFn = Arc<dyn Fn(&TaskNode) -> String + Send + Sync>;
pub type RefreshFn = Arc<dyn Fn(&GraphEngine) + Send + Sync>;
pub type ClickFn = Arc<dyn Fn(&Vertex, &GraphEngine, &MouseEvent) + Send + Sync>;
pub type DoubleClickFn = Arc<dyn Fn(&TaskNode) + Send + Sync>;
pub type ContextMenuFn = Arc<dyn MenuProvider + Send + Sync>;
pub type StatusFn = Arc<dyn Fn(Option<Arc<TaskNode>>) -> AnyView + Send + Sync>;
pub type ActionsFn = Arc<dyn Fn() -> AnyView + Send + Sync>;
