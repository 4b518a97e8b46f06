use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use super::engine::{CellRef, Point};
use super::types::{MenuCallback, MenuItem};

/// Decides whether a popup menu may be shown for the current selection.
///
/// Each engine holds its own strategy handle; nothing is patched globally.
pub trait PopupStrategy: Send + Sync {
	fn accepts(&self, selection: Option<CellRef>) -> bool;
}

/// Only vertices open a context menu.
#[derive(Clone, Copy, Debug, Default)]
pub struct VertexOnlyPopup;

impl PopupStrategy for VertexOnlyPopup {
	fn accepts(&self, selection: Option<CellRef>) -> bool {
		selection.is_some_and(|cell| cell.is_vertex())
	}
}

#[derive(Clone)]
pub struct MenuEntry {
	pub title: String,
	pub enabled: bool,
	pub callback: Option<MenuCallback>,
	/// Index of the top-level entry this one is nested under.
	pub parent: Option<usize>,
}

impl fmt::Debug for MenuEntry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MenuEntry")
			.field("title", &self.title)
			.field("enabled", &self.enabled)
			.field("parent", &self.parent)
			.finish_non_exhaustive()
	}
}

// Shared across engines so a ticket from a disposed engine never matches a
// popup of its replacement.
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

#[derive(Default)]
pub struct PopupMenu {
	entries: Vec<MenuEntry>,
	item_count: usize,
	visible: bool,
	position: Point,
	generation: u64,
	shown: u64,
	listeners: Vec<Box<dyn Fn()>>,
}

impl PopupMenu {
	/// Starts a new popup: hides, repositions and clears the menu.
	pub(crate) fn reset(&mut self, at: Point) -> u64 {
		self.hide();
		self.clear();
		self.position = at;
		self.generation = NEXT_GENERATION.fetch_add(1, Ordering::Relaxed);
		self.generation
	}

	pub fn clear(&mut self) {
		self.entries.clear();
		self.item_count = 0;
	}

	pub fn add_item(
		&mut self,
		title: &str,
		callback: Option<MenuCallback>,
		parent: Option<usize>,
		enabled: bool,
	) -> usize {
		self.entries.push(MenuEntry {
			title: title.to_string(),
			enabled,
			callback,
			parent,
		});
		self.item_count += 1;
		self.entries.len() - 1
	}

	/// Adds top-level items and one level of children; deeper levels are
	/// dropped.
	pub fn populate(&mut self, items: Vec<MenuItem>) {
		for item in items {
			let parent = self.add_item(&item.title, item.callback, None, !item.disabled);
			for child in item.children {
				self.add_item(&child.title, child.callback, Some(parent), !child.disabled);
			}
		}
	}

	pub fn show(&mut self) {
		self.visible = true;
	}

	pub fn hide(&mut self) {
		self.visible = false;
	}

	pub fn is_visible(&self) -> bool {
		self.visible
	}

	pub fn position(&self) -> Point {
		self.position
	}

	pub fn entries(&self) -> &[MenuEntry] {
		&self.entries
	}

	pub fn children_of(&self, parent: usize) -> impl Iterator<Item = (usize, &MenuEntry)> {
		self.entries
			.iter()
			.enumerate()
			.filter(move |(_, e)| e.parent == Some(parent))
	}

	pub fn item_count(&self) -> usize {
		self.item_count
	}

	pub fn generation(&self) -> u64 {
		self.generation
	}

	/// Runs an entry's callback and hides the menu. Disabled entries and
	/// entries without a callback are ignored.
	pub fn activate(&mut self, index: usize) -> bool {
		let Some(callback) = self
			.entries
			.get(index)
			.filter(|e| e.enabled)
			.and_then(|e| e.callback.clone())
		else {
			return false;
		};
		self.hide();
		callback();
		true
	}

	pub fn on_shown(&mut self, listener: impl Fn() + 'static) {
		self.listeners.push(Box::new(listener));
	}

	pub(crate) fn clear_listeners(&mut self) {
		self.listeners.clear();
	}

	pub(crate) fn fire_shown(&mut self) {
		self.shown += 1;
		for listener in &self.listeners {
			listener();
		}
	}

	/// How many times the menu fired its shown event.
	pub fn shown_count(&self) -> u64 {
		self.shown
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;
	use std::sync::atomic::AtomicUsize;

	use petgraph::stable_graph::{EdgeIndex, NodeIndex};

	use super::*;

	#[test]
	fn vertex_only_rejects_edges_and_canvas() {
		let strategy = VertexOnlyPopup;
		assert!(strategy.accepts(Some(CellRef::Vertex(NodeIndex::new(0)))));
		assert!(!strategy.accepts(Some(CellRef::Edge(EdgeIndex::new(0)))));
		assert!(!strategy.accepts(None));
	}

	#[test]
	fn populate_keeps_two_levels_and_inverts_disabled() {
		let mut menu = PopupMenu::default();
		menu.populate(vec![
			MenuItem::new("run").child(MenuItem::new("run once")).child(
				MenuItem::new("run downstream")
					.disabled(true)
					.child(MenuItem::new("too deep")),
			),
			MenuItem::new("kill").disabled(true),
		]);

		let titles: Vec<_> = menu.entries().iter().map(|e| e.title.as_str()).collect();
		assert_eq!(titles, ["run", "run once", "run downstream", "kill"]);
		assert_eq!(menu.item_count(), 4);
		assert_eq!(menu.children_of(0).count(), 2);
		assert!(!menu.entries()[2].enabled);
		assert!(!menu.entries()[3].enabled);
		assert!(menu.entries()[1].enabled);
	}

	#[test]
	fn reset_clears_items_and_bumps_generation() {
		let mut menu = PopupMenu::default();
		menu.populate(vec![MenuItem::new("a")]);
		menu.show();

		let first = menu.reset(Point::new(4.0, 5.0));
		let generation = menu.reset(Point::new(4.0, 5.0));
		assert!(generation > first);
		assert_eq!(menu.generation(), generation);
		assert_eq!(menu.item_count(), 0);
		assert!(!menu.is_visible());
		assert_eq!(menu.position(), Point::new(4.0, 5.0));
	}

	#[test]
	fn activate_honours_enabled_flag() {
		let hits = Arc::new(AtomicUsize::new(0));
		let (h1, h2) = (hits.clone(), hits.clone());
		let mut menu = PopupMenu::default();
		menu.populate(vec![
			MenuItem::new("ok").on_select(move || {
				h1.fetch_add(1, Ordering::SeqCst);
			}),
			MenuItem::new("off").disabled(true).on_select(move || {
				h2.fetch_add(10, Ordering::SeqCst);
			}),
		]);
		menu.show();

		assert!(!menu.activate(1));
		assert!(menu.is_visible());
		assert!(menu.activate(0));
		assert!(!menu.is_visible());
		assert!(!menu.activate(9));
		assert_eq!(hits.load(Ordering::SeqCst), 1);
	}
}
