use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use leptos::html::{Canvas, Div};
use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{debug, error};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlDivElement, MouseEvent, WheelEvent};

use super::engine::Point;
use super::interaction::ClickOutcome;
use super::menu::{PopupStrategy, VertexOnlyPopup};
use super::render;
use super::state::{MountOptions, TaskGraphState, open_context_menu, remount};
use super::types::{
	ActionsFn, ClickFn, ContextMenuFn, DEFAULT_VERTEX_KEY, DoubleClickFn, DrawVertexFn,
	GraphConfig, LayoutDirection, RefreshFn, RenderCellFn, StatusFn, TaskNode, VertexSize,
};
use super::view_state::ViewStateStore;

type Slot = Rc<RefCell<Option<TaskGraphState>>>;

#[derive(Clone, Debug, PartialEq)]
struct MenuRow {
	index: usize,
	title: String,
	enabled: bool,
	nested: bool,
}

#[derive(Clone, Debug, PartialEq)]
struct MenuSnapshot {
	x: f64,
	y: f64,
	rows: Vec<MenuRow>,
}

fn menu_snapshot(slot: &Slot) -> Option<MenuSnapshot> {
	let guard = slot.borrow();
	let menu = guard.as_ref()?.engine.popup_menu();
	if !menu.is_visible() {
		return None;
	}
	let mut rows = Vec::new();
	for (index, entry) in menu.entries().iter().enumerate() {
		if entry.parent.is_some() {
			continue;
		}
		rows.push(MenuRow {
			index,
			title: entry.title.clone(),
			enabled: entry.enabled,
			nested: false,
		});
		rows.extend(menu.children_of(index).map(|(child, e)| MenuRow {
			index: child,
			title: e.title.clone(),
			enabled: e.enabled,
			nested: true,
		}));
	}
	Some(MenuSnapshot {
		x: menu.position().x,
		y: menu.position().y,
		rows,
	})
}

fn pointer(canvas_ref: NodeRef<Canvas>, ev: &MouseEvent) -> Option<Point> {
	let canvas: HtmlCanvasElement = canvas_ref.get_untracked()?;
	let rect = canvas.get_bounding_client_rect();
	Some(Point::new(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Grows the canvas so the container can scroll over the whole graph.
fn fit_surface(state: &mut TaskGraphState, canvas: &HtmlCanvasElement, container: &HtmlDivElement) {
	let viewport = (
		container.client_width() as f64,
		container.client_height() as f64,
	);
	let (w, h) = state.engine.surface_size(viewport);
	if canvas.width() != w as u32 || canvas.height() != h as u32 {
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
	}
	state.resize(w, h);
}

#[component]
pub fn TaskGraph(
	#[prop(into)] graph_data: Signal<Option<Vec<Arc<TaskNode>>>>,
	#[prop(into, default = Signal::stored(false))] loading: Signal<bool>,
	#[prop(into, default = DEFAULT_VERTEX_KEY.to_string())] vertex_key: String,
	#[prop(optional)] vertex_size: VertexSize,
	#[prop(optional)] config: GraphConfig,
	#[prop(optional)] direction: LayoutDirection,
	#[prop(optional)] on_refresh: Option<RefreshFn>,
	#[prop(optional)] on_render_cell: Option<RenderCellFn>,
	#[prop(optional)] on_draw_vertex: Option<DrawVertexFn>,
	#[prop(optional)] on_click: Option<ClickFn>,
	#[prop(optional)] on_context_menu: Option<ContextMenuFn>,
	#[prop(optional)] on_double_click: Option<DoubleClickFn>,
	/// Renders the bottom status panel for the current task.
	#[prop(optional)]
	status: Option<StatusFn>,
	/// Extra toolbar controls, placed before refresh and zoom.
	#[prop(optional)]
	actions: Option<ActionsFn>,
	/// Decides which selections may open the context menu.
	#[prop(optional)]
	popup_strategy: Option<Arc<dyn PopupStrategy>>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<Canvas>::new();
	let container_ref = NodeRef::<Div>::new();
	let tooltips = config.tooltips;
	let mount_options = MountOptions {
		vertex_key,
		vertex_size,
		config,
		direction,
		render_cell: on_render_cell,
		draw_vertex: on_draw_vertex,
		popup_strategy: popup_strategy.unwrap_or_else(|| Arc::new(VertexOnlyPopup)),
	};

	let state: Slot = Rc::new(RefCell::new(None));
	let views: Rc<RefCell<ViewStateStore>> = Rc::new(RefCell::new(ViewStateStore::default()));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let alive = Rc::new(Cell::new(true));

	let current = RwSignal::new(None::<Arc<TaskNode>>);
	let menu_view = RwSignal::new(None::<MenuSnapshot>);
	let tooltip = RwSignal::new(None::<String>);

	// handles that reactive closures and cleanup can carry
	let slot_handle = StoredValue::new_local(state.clone());
	let views_handle = StoredValue::new_local(views.clone());
	let alive_handle = StoredValue::new_local(alive.clone());

	let (state_init, views_init, animate_init, alive_init) =
		(state.clone(), views.clone(), animate.clone(), alive.clone());
	Effect::new(move |_| {
		let data = graph_data.get();
		let (Some(canvas), Some(container)) = (canvas_ref.get(), container_ref.get()) else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let container: HtmlDivElement = container.into();
		let (w, h) = (
			container.client_width() as f64,
			container.client_height() as f64,
		);

		let selected = remount(
			&state_init,
			&mount_options,
			data.as_deref(),
			&views_init.borrow(),
			w,
			h,
		);
		if let Some(ref mut s) = *state_init.borrow_mut() {
			s.engine
				.popup_menu_mut()
				.on_shown(|| debug!("task graph context menu shown"));
			fit_surface(s, &canvas, &container);
		}
		current.set(selected);
		menu_view.set(None);

		// scrollbars follow the restored transform on the next tick
		let (state_scroll, canvas_scroll, container_scroll) =
			(state_init.clone(), canvas.clone(), container.clone());
		set_timeout(
			move || {
				if let Some(ref mut s) = *state_scroll.borrow_mut() {
					if !s.engine.scroll_reset_pending() {
						return;
					}
					fit_surface(s, &canvas_scroll, &container_scroll);
					let pos = s.engine.reset_scroll_position();
					container_scroll.set_scroll_left(pos.left as i32);
					container_scroll.set_scroll_top(pos.top as i32);
				}
			},
			Duration::ZERO,
		);

		if animate_init.borrow().is_some() {
			return;
		}
		let ctx: CanvasRenderingContext2d = match canvas.get_context("2d") {
			Ok(Some(ctx)) => match ctx.dyn_into() {
				Ok(ctx) => ctx,
				Err(_) => {
					error!("canvas 2d context has an unexpected type");
					return;
				}
			},
			_ => {
				error!("canvas 2d context unavailable");
				return;
			}
		};
		let (state_anim, animate_inner, alive_anim) =
			(state_init.clone(), animate_init.clone(), alive_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if !alive_anim.get() {
				return;
			}
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				fit_surface(s, &canvas, &container);
				render::render(s, &ctx);
			}
			if let (Some(cb), Some(window)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let (Some(cb), Some(window)) = (&*animate_init.borrow(), web_sys::window()) {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	on_cleanup(move || {
		let _ = alive_handle.try_with_value(|alive| alive.set(false));
		let _ = slot_handle.try_with_value(|slot| {
			if let Some(mut s) = slot.borrow_mut().take() {
				s.teardown();
			}
		});
		let _ = views_handle.try_with_value(|views| views.borrow_mut().discard());
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if ev.button() != 0 {
			return;
		}
		let Some(at) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.press(at);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(at) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			if ev.buttons() & 1 != 0 {
				s.drag_to(at);
			} else if tooltips {
				let tip = s.tooltip_at(at);
				if tooltip.get_untracked() != tip {
					tooltip.set(tip);
				}
			}
		}
	};

	let (state_mu, on_click_mu) = (state.clone(), on_click.clone());
	let on_mouseup = move |ev: MouseEvent| {
		if ev.button() != 0 {
			return;
		}
		let Some(at) = pointer(canvas_ref, &ev) else {
			return;
		};
		let mut guard = state_mu.borrow_mut();
		let Some(s) = guard.as_mut() else {
			return;
		};
		if !s.release() {
			return;
		}
		menu_view.set(None);
		match s.click(at) {
			Ok(outcome) => {
				current.set(s.current());
				if let (ClickOutcome::Vertex(idx), Some(cb)) = (outcome, on_click_mu.as_ref()) {
					if let Some(vertex) = s.engine.vertex(idx) {
						cb(vertex, &s.engine, &ev);
					}
				}
			}
			Err(err) => error!("click handling failed: {err}"),
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.release();
		}
		tooltip.set(None);
	};

	let state_dc = state.clone();
	let on_dblclick = move |ev: MouseEvent| {
		let Some(at) = pointer(canvas_ref, &ev) else {
			return;
		};
		let node = state_dc
			.borrow()
			.as_ref()
			.and_then(|s| s.double_click(at));
		if let (Some(node), Some(cb)) = (node, on_double_click.as_ref()) {
			cb(&node);
		}
	};

	let state_cm = state.clone();
	let on_contextmenu = move |ev: MouseEvent| {
		ev.prevent_default();
		let Some(at) = pointer(canvas_ref, &ev) else {
			return;
		};
		let (slot, provider) = (state_cm.clone(), on_context_menu.clone());
		menu_view.set(None);
		spawn_local(async move {
			let shown = open_context_menu(slot.clone(), provider, at).await;
			menu_view.set(if shown { menu_snapshot(&slot) } else { None });
		});
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(at) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			s.wheel(at, ev.delta_y());
		}
	};

	let (state_rf, views_rf) = (state.clone(), views.clone());
	let on_refresh_click = move |_: MouseEvent| {
		if let Some(ref s) = *state_rf.borrow() {
			views_rf.borrow_mut().capture(&s.engine);
			if let Some(cb) = on_refresh.as_ref() {
				cb(&s.engine);
			}
		}
	};

	let state_zi = state.clone();
	let on_zoom_in = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_zi.borrow_mut() {
			s.engine.zoom_in();
		}
	};

	let state_zo = state.clone();
	let on_zoom_out = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_zo.borrow_mut() {
			s.engine.zoom_out();
		}
	};

	let activate = move |index: usize| {
		slot_handle.with_value(|slot| {
			if let Some(ref mut s) = *slot.borrow_mut() {
				s.engine.popup_menu_mut().activate(index);
			}
		});
		menu_view.set(None);
	};

	view! {
		<div class="graph-editor">
			<div class="task-graph" style="position: relative; width: 100%; height: 100%;">
				<div
					node_ref=container_ref
					style="position: relative; overflow: auto; width: 100%; height: 100%;"
				>
					<canvas
						node_ref=canvas_ref
						class="task-graph-canvas"
						title=move || tooltip.get().unwrap_or_default()
						on:mousedown=on_mousedown
						on:mousemove=on_mousemove
						on:mouseup=on_mouseup
						on:mouseleave=on_mouseleave
						on:dblclick=on_dblclick
						on:contextmenu=on_contextmenu
						on:wheel=on_wheel
						style="display: block; cursor: default;"
					/>
					{move || {
						menu_view
							.get()
							.map(|menu| {
								view! {
									<ul
										class="task-graph-menu"
										style=format!(
											"position: absolute; left: {}px; top: {}px;",
											menu.x,
											menu.y,
										)
										on:contextmenu=|ev: MouseEvent| ev.prevent_default()
									>
										{menu
											.rows
											.into_iter()
											.map(|row| {
												let index = row.index;
												view! {
													<li
														class="task-graph-menu-item"
														class:disabled=!row.enabled
														class:nested=row.nested
														on:click=move |_| activate(index)
													>
														{row.title}
													</li>
												}
											})
											.collect_view()}
									</ul>
								}
							})
					}}
				</div>
				{move || {
					loading
						.get()
						.then(|| view! { <div class="task-graph-loading">"Loading..."</div> })
				}}
			</div>
			<div class="graph-bottom">
				{move || status.as_ref().map(|render_status| render_status(current.get()))}
			</div>
			<div class="graph-toolbar">
				{actions.as_ref().map(|render_actions| render_actions())}
				<button class="graph-toolbar-button" title="Refresh" on:click=on_refresh_click>
					"⟳"
				</button>
				<button class="graph-toolbar-button" title="Zoom in" on:click=on_zoom_in>
					"+"
				</button>
				<button class="graph-toolbar-button" title="Zoom out" on:click=on_zoom_out>
					"−"
				</button>
			</div>
		</div>
	}
}
