use std::sync::Arc;

use leptos::prelude::*;
use log::info;
use serde_json::{Value, json};

use crate::components::task_graph::{
	ContextMenuFn, DoubleClickFn, DrawVertexFn, GraphConfig, GraphEngine, MenuItem, RefreshFn,
	RenderCellFn, StatusFn, TaskGraph, TaskNode, Vertex, ready_menu,
};

/// Sample workflow: a root task with upstream and downstream dependencies.
fn sample_workflow(revision: u32) -> Vec<Arc<TaskNode>> {
	let task = |id: u32, name: &str, status: &str| {
		json!({ "taskId": id, "taskName": name, "status": status, "revision": revision })
	};
	let mut root = task(1, "daily_orders", "running");
	root["parentNode"] = json!([task(10, "ods_orders", "success"), task(11, "ods_users", "success")]);

	let mut report = task(3, "dws_report", "waiting");
	report["childNode"] = json!([task(5, "ads_dashboard", "waiting")]);
	let mut metrics = task(2, "dwd_metrics", "failed");
	metrics["childNode"] = json!([report.clone(), task(4, "dws_alerts", "waiting")]);
	root["childNode"] = json!([metrics]);

	match serde_json::from_value::<TaskNode>(root) {
		Ok(node) => vec![Arc::new(node)],
		Err(err) => {
			log::error!("invalid sample workflow: {err}");
			Vec::new()
		}
	}
}

fn field<'a>(node: &'a TaskNode, name: &str) -> &'a str {
	node.get(name).and_then(Value::as_str).unwrap_or_default()
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let revision = RwSignal::new(0u32);
	let graph_data = Signal::derive(move || Some(sample_workflow(revision.get())));

	let render_cell: RenderCellFn = Arc::new(|vertex: &Vertex, _: &GraphEngine| {
		format!(
			"<b>{}</b><br/>{}",
			field(&vertex.value, "taskName"),
			field(&vertex.value, "status")
		)
	});
	let draw_vertex: DrawVertexFn = Arc::new(|node: &TaskNode| match field(node, "status") {
		"failed" => "fillColor=#fff1f0;strokeColor=#ff5f5c".to_string(),
		"success" => "fillColor=#f6ffed;strokeColor=#b7eb8f".to_string(),
		"waiting" => "dashed=1".to_string(),
		_ => String::new(),
	});
	let context_menu: ContextMenuFn = Arc::new(|node: Arc<TaskNode>| {
		let name = field(&node, "taskName").to_string();
		let failed = field(&node, "status") == "failed";
		let (rerun, rerun_downstream) = (name.clone(), name.clone());
		ready_menu(vec![
			MenuItem::new("Rerun")
				.disabled(!failed)
				.on_select(move || info!("rerun {rerun}"))
				.child(
					MenuItem::new("Rerun with downstream")
						.on_select(move || info!("rerun {rerun_downstream} and downstream")),
				),
			MenuItem::new("View log").on_select(move || info!("open log of {name}")),
		])
	});

	let on_refresh: RefreshFn = Arc::new(move |_: &GraphEngine| revision.update(|r| *r += 1));
	let on_double_click: DoubleClickFn =
		Arc::new(|node: &TaskNode| info!("open task {}", field(node, "taskName")));
	let status: StatusFn = Arc::new(|current: Option<Arc<TaskNode>>| {
		let text = current
			.map(|node| format!("{} ({})", field(&node, "taskName"), field(&node, "status")))
			.unwrap_or_else(|| "No task selected".to_string());
		view! { <span class="graph-status">{text}</span> }.into_any()
	});
	let config = GraphConfig {
		tooltips: true,
		..Default::default()
	};

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<TaskGraph
					graph_data=graph_data
					config=config
					on_render_cell=render_cell
					on_draw_vertex=draw_vertex
					on_context_menu=context_menu
					on_refresh=on_refresh
					on_double_click=on_double_click
					status=status
				/>
				<div class="graph-overlay">
					<h1>"Task Dependencies"</h1>
					<p class="subtitle">
						"Click a task to trace its edges. Right-click for actions. Drag background to pan, scroll to zoom."
					</p>
				</div>
			</div>
		</ErrorBoundary>
	}
}
