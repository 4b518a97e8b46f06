// dependencies are used through the library crate
#![allow(unused_crate_dependencies)]

use leptos::prelude::*;
use task_graph_canvas::{App, init_logging};

fn main() {
	init_logging();
	mount_to_body(|| view! { <App /> })
}
