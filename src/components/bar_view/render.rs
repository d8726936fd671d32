use js_sys::Array;
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::{Band, BarScene};

/// Chart margins: top, right, bottom, left. The top margin leaves room for
/// the pointer arrows.
pub const MARGIN: (f64, f64, f64, f64) = (150.0, 60.0, 75.0, 50.0);

const BACKGROUND: &str = "#ffffff";
const I_POINTER: &str = "#FF5722";
const J_POINTER: &str = "#2196F3";
const AXIS: &str = "#666666";
const TEXT: &str = "#000000";
const Y_TICKS: usize = 5;

/// Short label for a bar value: thousands are abbreviated past 9999.
fn value_label(value: f64) -> String {
	if value > 9999.0 {
		format!("{}k", (value / 1000.0).round())
	} else if value.fract() == 0.0 {
		format!("{value}")
	} else {
		format!("{value:.1}")
	}
}

pub fn render(scene: &BarScene, ctx: &CanvasRenderingContext2d) {
	let (top, right, bottom, left) = MARGIN;
	let inner_width = (scene.width - left - right).max(1.0);
	let inner_height = (scene.height - top - bottom).max(1.0);

	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, scene.width, scene.height);
	ctx.save();
	let _ = ctx.translate(left, top);
	let _ = ctx.scale(scene.zoom, scene.zoom);

	let domain = scene.domain().current().max(f64::EPSILON);
	let y = |value: f64| inner_height - value / domain * inner_height;

	draw_axes(scene, ctx, inner_width, inner_height, domain);
	let band = scene.band(inner_width);

	ctx.set_text_align("center");
	ctx.set_text_baseline("alphabetic");
	for (i, bar) in scene.bars().iter().enumerate() {
		let target = bar.value.target();
		let top_y = y(bar.value.current());

		ctx.set_fill_style_str(&bar.tint.current().css());
		ctx.fill_rect(band.x(i), top_y, band.bandwidth, inner_height - top_y);

		ctx.set_font(if target > 999.0 { "10px sans-serif" } else { "12px sans-serif" });
		ctx.set_fill_style_str(TEXT);
		let _ = ctx.fill_text(&value_label(target), band.center(i), top_y - 5.0);
	}

	draw_range(scene, ctx, &band, inner_height);
	draw_pointers(scene, ctx, &band);
	ctx.restore();
}

fn draw_axes(scene: &BarScene, ctx: &CanvasRenderingContext2d, inner_width: f64, inner_height: f64, domain: f64) {
	ctx.set_stroke_style_str(AXIS);
	ctx.set_line_width(1.0);
	ctx.begin_path();
	ctx.move_to(0.0, 0.0);
	ctx.line_to(0.0, inner_height);
	ctx.line_to(inner_width, inner_height);
	ctx.stroke();

	ctx.set_font("11px sans-serif");
	ctx.set_fill_style_str(TEXT);
	ctx.set_text_align("right");
	ctx.set_text_baseline("middle");
	for k in 0..=Y_TICKS {
		let value = domain * k as f64 / Y_TICKS as f64;
		let ty = inner_height - inner_height * k as f64 / Y_TICKS as f64;
		ctx.begin_path();
		ctx.move_to(-6.0, ty);
		ctx.line_to(0.0, ty);
		ctx.stroke();
		let _ = ctx.fill_text(&value_label((value * 10.0).round() / 10.0), -9.0, ty);
	}

	let band = scene.band(inner_width);
	ctx.set_text_align("center");
	ctx.set_text_baseline("top");
	for i in 0..scene.len() {
		let _ = ctx.fill_text(&i.to_string(), band.center(i), inner_height + 6.0);
	}
}

fn draw_range(scene: &BarScene, ctx: &CanvasRenderingContext2d, band: &Band, inner_height: f64) {
	let Some((low, high)) = scene.range() else {
		return;
	};
	let (x1, x2) = (band.x(low), band.x(high) + band.bandwidth);
	let y = inner_height + 28.0;
	ctx.set_stroke_style_str(AXIS);
	ctx.set_line_width(1.5);
	let dash = Array::of2(&JsValue::from_f64(4.0), &JsValue::from_f64(4.0));
	let _ = ctx.set_line_dash(&dash);
	ctx.begin_path();
	ctx.move_to(x1, y - 6.0);
	ctx.line_to(x1, y);
	ctx.line_to(x2, y);
	ctx.line_to(x2, y - 6.0);
	ctx.stroke();
	let _ = ctx.set_line_dash(&Array::new());
}

fn draw_arrow(ctx: &CanvasRenderingContext2d, x: f64, color: &str, label: &str) {
	ctx.set_stroke_style_str(color);
	ctx.set_line_width(3.0);
	ctx.begin_path();
	ctx.move_to(x, -50.0);
	ctx.line_to(x, -30.0);
	ctx.line_to(x - 6.0, -36.0);
	ctx.move_to(x, -30.0);
	ctx.line_to(x + 6.0, -36.0);
	ctx.stroke();

	ctx.set_font("bold 14px sans-serif");
	ctx.set_text_align("center");
	ctx.set_text_baseline("alphabetic");
	ctx.set_fill_style_str(color);
	let _ = ctx.fill_text(label, x, -60.0);
}

fn draw_pointers(scene: &BarScene, ctx: &CanvasRenderingContext2d, band: &Band) {
	let (i, j) = scene.pointers();
	if let Some(i) = i.filter(|&i| i >= -1) {
		// i = -1 sits one band left of the first bar.
		let x = if i >= 0 {
			band.center(i as usize)
		} else {
			band.x(0) - band.bandwidth / 2.0
		};
		draw_arrow(ctx, x, I_POINTER, &format!("i={i}"));
	}
	if let Some(j) = j.filter(|&j| j >= 0) {
		draw_arrow(ctx, band.center(j as usize), J_POINTER, &format!("j={j}"));
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn labels_abbreviate_large_values() {
		assert_eq!(value_label(42.0), "42");
		assert_eq!(value_label(2.5), "2.5");
		assert_eq!(value_label(12_400.0), "12k");
	}
}
