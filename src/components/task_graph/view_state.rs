use log::debug;

use super::engine::{GraphEngine, ViewState};

/// Pan/zoom snapshot carried across rebuilds of one mounted component.
///
/// Only a view that was panned into positive translation is remembered;
/// the engine default of a zero translate never overwrites a snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ViewStateStore {
	saved: Option<ViewState>,
}

impl ViewStateStore {
	pub fn saved(&self) -> Option<ViewState> {
		self.saved
	}

	/// Records the engine view ahead of a refresh. Returns whether a
	/// snapshot was taken.
	pub fn capture(&mut self, engine: &GraphEngine) -> bool {
		let view = engine.view();
		if view.dx > 0.0 {
			debug!("saving view state {view:?}");
			self.saved = Some(view);
			true
		} else {
			false
		}
	}

	/// Reapplies the snapshot and asks for a scroll reset on the next tick.
	pub fn restore(&self, engine: &mut GraphEngine) {
		if let Some(view) = self.saved {
			engine.set_view(view);
		}
		engine.request_scroll_reset();
	}

	pub fn discard(&mut self) {
		self.saved = None;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::Arc;

	use crate::components::task_graph::menu::VertexOnlyPopup;
	use crate::components::task_graph::types::GraphConfig;

	fn engine() -> GraphEngine {
		GraphEngine::create(GraphConfig::default(), Arc::new(VertexOnlyPopup))
	}

	#[test]
	fn positive_translate_is_captured_and_restored() {
		let mut before = engine();
		before.zoom_in();
		before.pan_by(48.0, -12.0);
		let snapshot = before.view();

		let mut store = ViewStateStore::default();
		assert!(store.capture(&before));

		let mut after = engine();
		store.restore(&mut after);
		assert_eq!(after.view(), snapshot);
		assert!(after.scroll_reset_pending());
	}

	#[test]
	fn untouched_view_is_not_captured() {
		let mut store = ViewStateStore::default();
		assert!(!store.capture(&engine()));

		let mut panned_left = engine();
		panned_left.pan_by(-30.0, 0.0);
		assert!(!store.capture(&panned_left));
		assert_eq!(store.saved(), None);

		let mut after = engine();
		after.zoom_in();
		let zoomed = after.view();
		store.restore(&mut after);
		assert_eq!(after.view(), zoomed);
		assert!(after.scroll_reset_pending());
	}

	#[test]
	fn later_non_positive_view_keeps_previous_snapshot() {
		let mut store = ViewStateStore::default();
		let mut panned = engine();
		panned.pan_by(10.0, 10.0);
		store.capture(&panned);

		store.capture(&engine());
		assert_eq!(store.saved().map(|v| v.dx), Some(10.0));

		store.discard();
		assert_eq!(store.saved(), None);
	}
}
