use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::state::{EdgeRole, GraphScene, NODE_RADIUS};

const BACKGROUND: &str = "#ffffff";
const NODE_STROKE: &str = "#333";
const TEXT: &str = "#000000";

pub fn render(scene: &GraphScene, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, scene.width, scene.height);
	ctx.save();
	let _ = ctx.translate(scene.transform.x, scene.transform.y);
	let _ = ctx.scale(scene.transform.k, scene.transform.k);
	draw_edges(scene, ctx);
	draw_nodes(scene, ctx);
	ctx.restore();
}

fn draw_edges(scene: &GraphScene, ctx: &CanvasRenderingContext2d) {
	let positions = scene.positions();
	let arrow_size = 10.0;
	ctx.set_font("12px sans-serif");
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");

	for edge in scene.edges() {
		let (Some(&(x1, y1)), Some(&(x2, y2))) = (positions.get(&edge.link.source), positions.get(&edge.link.target)) else {
			continue;
		};
		let (dx, dy) = (x2 - x1, y2 - y1);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}
		let color = edge.tint.current().css();
		let (ux, uy) = (dx / dist, dy / dist);
		let end_gap = if scene.is_directed() { NODE_RADIUS + arrow_size } else { NODE_RADIUS };

		ctx.set_stroke_style_str(&color);
		ctx.set_line_width(edge.width.current());
		ctx.begin_path();
		ctx.move_to(x1 + ux * NODE_RADIUS, y1 + uy * NODE_RADIUS);
		ctx.line_to(x2 - ux * end_gap, y2 - uy * end_gap);
		ctx.stroke();

		if scene.is_directed() {
			let (tip_x, tip_y) = (x2 - ux * NODE_RADIUS, y2 - uy * NODE_RADIUS);
			let (back_x, back_y) = (tip_x - ux * arrow_size, tip_y - uy * arrow_size);
			let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
			ctx.set_fill_style_str(&color);
			ctx.begin_path();
			ctx.move_to(tip_x, tip_y);
			ctx.line_to(back_x + px, back_y + py);
			ctx.line_to(back_x - px, back_y - py);
			ctx.close_path();
			ctx.fill();
		}

		ctx.set_fill_style_str(TEXT);
		let _ = ctx.fill_text(&format!("{}", edge.link.weight), (x1 + x2) / 2.0 - uy * 10.0, (y1 + y2) / 2.0 + ux * 10.0);
	}
}

fn draw_nodes(scene: &GraphScene, ctx: &CanvasRenderingContext2d) {
	let pending = scene.pending();
	let show_distances = scene.shows_distances();

	scene.graph.visit_nodes(|node| {
		let info = &node.data.user_data;
		let (x, y) = (node.x() as f64, node.y() as f64);

		ctx.begin_path();
		let _ = ctx.arc(x, y, NODE_RADIUS, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&info.tint.current().css());
		ctx.fill();
		if pending == Some(info.id) {
			ctx.set_stroke_style_str(&EdgeRole::Highlighted.color().css());
			ctx.set_line_width(3.0);
		} else {
			ctx.set_stroke_style_str(NODE_STROKE);
			ctx.set_line_width(1.5);
		}
		ctx.stroke();

		ctx.set_font("bold 14px sans-serif");
		ctx.set_text_align("center");
		ctx.set_text_baseline("middle");
		ctx.set_fill_style_str(TEXT);
		let _ = ctx.fill_text(&info.id.to_string(), x, y);

		if show_distances {
			let top = y + NODE_RADIUS * 1.4;
			ctx.set_fill_style_str("rgba(255, 255, 255, 0.7)");
			ctx.fill_rect(x - 20.0, top, 40.0, 24.0);
			ctx.set_stroke_style_str("#ddd");
			ctx.set_line_width(1.0);
			ctx.stroke_rect(x - 20.0, top, 40.0, 24.0);
			ctx.set_font("14px sans-serif");
			ctx.set_fill_style_str(TEXT);
			let _ = ctx.fill_text(&info.distance, x, top + 12.0);
		}
	});
}
