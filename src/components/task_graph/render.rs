use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::engine::{CellRef, GraphEngine, Point};
use super::state::TaskGraphState;

const BACKGROUND: &str = "#ffffff";
const EDGE_COLOR: &str = "#3f87ff";
const VERTEX_FILL: &str = "#edf6ff";
const VERTEX_STROKE: &str = "#a7cdf0";
const SELECTED_STROKE: &str = "#2491f7";
const LABEL_COLOR: &str = "#333333";
const CORNER_RADIUS: f64 = 4.0;
const ARROW_SIZE: f64 = 7.0;
const FONT_SIZE: f64 = 12.0;
const LINE_HEIGHT: f64 = 16.0;

/// Reads `fillColor` / `strokeColor` / `fontColor` out of a `key=value;` style.
#[derive(Debug, Default, PartialEq)]
pub struct VertexStyle<'a> {
	pub fill: Option<&'a str>,
	pub stroke: Option<&'a str>,
	pub font: Option<&'a str>,
	pub dashed: bool,
}

impl<'a> VertexStyle<'a> {
	pub fn parse(style: &'a str) -> Self {
		let mut parsed = Self::default();
		for (key, value) in style
			.split(';')
			.filter_map(|pair| pair.split_once('='))
			.map(|(k, v)| (k.trim(), v.trim()))
		{
			match key {
				"fillColor" => parsed.fill = Some(value),
				"strokeColor" => parsed.stroke = Some(value),
				"fontColor" => parsed.font = Some(value),
				"dashed" => parsed.dashed = value == "1" || value == "true",
				_ => {}
			}
		}
		parsed
	}
}

/// Strips markup from a formatter result so it can be drawn as text.
pub fn plain_text(label: &str) -> String {
	let mut out = String::with_capacity(label.len());
	let mut in_tag = false;
	let mut rest = label;
	while let Some(ch) = rest.chars().next() {
		if !in_tag && rest.starts_with("<br") {
			out.push('\n');
		}
		match ch {
			'<' => in_tag = true,
			'>' if in_tag => in_tag = false,
			_ if !in_tag => out.push(ch),
			_ => {}
		}
		rest = &rest[ch.len_utf8()..];
	}
	out.replace("&nbsp;", " ")
		.replace("&lt;", "<")
		.replace("&gt;", ">")
		.replace("&amp;", "&")
}

pub fn render(state: &TaskGraphState, ctx: &CanvasRenderingContext2d) {
	let engine = &state.engine;
	let view = engine.view();
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.scale(view.scale, view.scale);
	let _ = ctx.translate(view.dx, view.dy);
	draw_edges(engine, ctx);
	draw_highlights(engine, ctx);
	draw_vertices(engine, ctx);
	ctx.restore();
}

fn stroke_route(ctx: &CanvasRenderingContext2d, route: &[Point]) {
	let Some((first, rest)) = route.split_first() else {
		return;
	};
	ctx.begin_path();
	ctx.move_to(first.x, first.y);
	for p in rest {
		ctx.line_to(p.x, p.y);
	}
	ctx.stroke();
}

fn draw_arrow(ctx: &CanvasRenderingContext2d, from: Point, tip: Point, size: f64) {
	let (dx, dy) = (tip.x - from.x, tip.y - from.y);
	let dist = (dx * dx + dy * dy).sqrt();
	if dist < 0.001 {
		return;
	}
	let (ux, uy) = (dx / dist, dy / dist);
	let (back_x, back_y) = (tip.x - ux * size, tip.y - uy * size);
	let (px, py) = (-uy * size * 0.5, ux * size * 0.5);
	ctx.begin_path();
	ctx.move_to(tip.x, tip.y);
	ctx.line_to(back_x + px, back_y + py);
	ctx.line_to(back_x - px, back_y - py);
	ctx.close_path();
	ctx.fill();
}

fn draw_edges(engine: &GraphEngine, ctx: &CanvasRenderingContext2d) {
	let k = engine.view().scale;
	ctx.set_stroke_style_str(EDGE_COLOR);
	ctx.set_fill_style_str(EDGE_COLOR);
	ctx.set_line_width(1.0 / k.max(0.5));
	let _ = ctx.set_line_dash(&js_sys::Array::new());

	for (idx, ..) in engine.edges() {
		let route = engine.edge_route(idx);
		stroke_route(ctx, &route);
		if let [.., from, tip] = route.as_slice() {
			draw_arrow(ctx, *from, *tip, ARROW_SIZE);
		}
	}
}

fn draw_highlights(engine: &GraphEngine, ctx: &CanvasRenderingContext2d) {
	for highlight in engine.highlights() {
		let route = engine.edge_route(highlight.edge);
		ctx.set_stroke_style_str(&highlight.color);
		ctx.set_fill_style_str(&highlight.color);
		ctx.set_line_width(highlight.stroke_width);
		stroke_route(ctx, &route);
		if let [.., from, tip] = route.as_slice() {
			draw_arrow(ctx, *from, *tip, ARROW_SIZE + highlight.stroke_width);
		}
	}
}

fn draw_vertices(engine: &GraphEngine, ctx: &CanvasRenderingContext2d) {
	let selected = engine.selection_cell();
	let k = engine.view().scale;

	for (idx, vertex) in engine.vertices() {
		let g = vertex.geometry;
		let style = VertexStyle::parse(&vertex.style);
		let is_selected = selected == Some(CellRef::Vertex(idx));

		ctx.begin_path();
		let _ = ctx.round_rect_with_f64(g.x, g.y, g.width, g.height, CORNER_RADIUS);
		ctx.set_fill_style_str(style.fill.unwrap_or(VERTEX_FILL));
		ctx.fill();

		let dash = if style.dashed {
			js_sys::Array::of2(&JsValue::from_f64(4.0), &JsValue::from_f64(3.0))
		} else {
			js_sys::Array::new()
		};
		let _ = ctx.set_line_dash(&dash);
		ctx.set_line_width(if is_selected { 2.0 } else { 1.0 });
		ctx.set_stroke_style_str(if is_selected {
			SELECTED_STROKE
		} else {
			style.stroke.unwrap_or(VERTEX_STROKE)
		});
		ctx.stroke();
		let _ = ctx.set_line_dash(&js_sys::Array::new());

		// labels are unreadable when zoomed far out
		if k < 0.3 {
			continue;
		}
		let label = plain_text(&engine.label(idx));
		let lines: Vec<&str> = label.lines().filter(|l| !l.trim().is_empty()).collect();
		if lines.is_empty() {
			continue;
		}
		ctx.set_fill_style_str(style.font.unwrap_or(LABEL_COLOR));
		ctx.set_font(&format!("{FONT_SIZE}px sans-serif"));
		ctx.set_text_align("center");
		ctx.set_text_baseline("middle");
		let center = g.center();
		let top = center.y - LINE_HEIGHT * (lines.len() as f64 - 1.0) / 2.0;
		for (i, line) in lines.iter().enumerate() {
			let _ = ctx.fill_text_with_max_width(
				line.trim(),
				center.x,
				top + LINE_HEIGHT * i as f64,
				g.width - 8.0,
			);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn style_string_is_parsed() {
		let style = VertexStyle::parse("fillColor=#fff1f0; strokeColor=#ff5f5c;dashed=1;rounded");
		assert_eq!(style.fill, Some("#fff1f0"));
		assert_eq!(style.stroke, Some("#ff5f5c"));
		assert_eq!(style.font, None);
		assert!(style.dashed);
		assert_eq!(VertexStyle::parse(""), VertexStyle::default());
	}

	#[test]
	fn markup_is_flattened() {
		assert_eq!(
			plain_text("<div class=\"name\">extract</div><br/>owner &amp; admin"),
			"extract\nowner & admin"
		);
		assert_eq!(plain_text("plain"), "plain");
	}
}
