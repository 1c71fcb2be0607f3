use std::f64::consts::PI;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlAnchorElement, HtmlCanvasElement};

use super::controller::ExportRequest;
use super::style::{EDGE_LABEL_COLOR, LABEL_COLOR};
use super::surface::GraphSurface;

const BACKGROUND: &str = "#ffffff";
const ARROW_SIZE: f64 = 8.0;

pub fn render(surface: &GraphSurface, ctx: &CanvasRenderingContext2d) {
	paint(surface, ctx, BACKGROUND);
}

fn paint(surface: &GraphSurface, ctx: &CanvasRenderingContext2d, background: &str) {
	let viewport = surface.viewport();
	ctx.set_fill_style_str(background);
	ctx.fill_rect(0.0, 0.0, viewport.width, viewport.height);
	ctx.save();
	let _ = ctx.translate(viewport.transform.x, viewport.transform.y);
	let _ = ctx.scale(viewport.transform.k, viewport.transform.k);
	draw_edges(surface, ctx);
	draw_nodes(surface, ctx);
	ctx.restore();
}

fn draw_edges(surface: &GraphSurface, ctx: &CanvasRenderingContext2d) {
	let elements = surface.elements();
	for (i, link) in elements.links.iter().enumerate() {
		let (Some(a), Some(b)) = (surface.position(link.source), surface.position(link.target))
		else {
			continue;
		};
		let (dx, dy) = (b.x - a.x, b.y - a.y);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}
		let style = surface.edge_style(i);
		let (r1, r2) = (
			surface.node_style(link.source).size / 2.0,
			surface.node_style(link.target).size / 2.0,
		);
		let (ux, uy) = (dx / dist, dy / dist);

		ctx.set_stroke_style_str(style.color);
		ctx.set_line_width(style.width);
		ctx.begin_path();
		ctx.move_to(a.x + ux * r1, a.y + uy * r1);
		ctx.line_to(b.x - ux * (r2 + ARROW_SIZE), b.y - uy * (r2 + ARROW_SIZE));
		ctx.stroke();

		ctx.set_fill_style_str(style.color);
		let (tip_x, tip_y) = (b.x - ux * r2, b.y - uy * r2);
		let (back_x, back_y) = (tip_x - ux * ARROW_SIZE, tip_y - uy * ARROW_SIZE);
		let (px, py) = (-uy * ARROW_SIZE * 0.5, ux * ARROW_SIZE * 0.5);
		ctx.begin_path();
		ctx.move_to(tip_x, tip_y);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();

		if link.label.is_empty() {
			continue;
		}
		// Keep text upright whichever way the edge points.
		let mut angle = dy.atan2(dx);
		if angle.abs() > PI / 2.0 {
			angle += PI;
		}
		ctx.save();
		let _ = ctx.translate((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
		let _ = ctx.rotate(angle);
		ctx.set_font("10px sans-serif");
		ctx.set_text_align("center");
		ctx.set_text_baseline("middle");
		ctx.set_fill_style_str(EDGE_LABEL_COLOR);
		let _ = ctx.fill_text(&link.label, 0.0, -10.0);
		ctx.restore();
	}
}

fn draw_nodes(surface: &GraphSurface, ctx: &CanvasRenderingContext2d) {
	let hovered = surface.controller().hovered();
	for (i, vertex) in surface.elements().vertices.iter().enumerate() {
		let Some(p) = surface.position(i) else {
			continue;
		};
		let style = surface.node_style(i);
		let radius = style.size / 2.0;
		ctx.set_global_alpha(style.alpha);

		if let Some(halo) = style.halo {
			ctx.begin_path();
			let _ = ctx.arc(p.x, p.y, radius + 6.0, 0.0, 2.0 * PI);
			ctx.set_fill_style_str(halo);
			ctx.fill();
		}

		ctx.begin_path();
		let _ = ctx.arc(p.x, p.y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&style.color);
		ctx.fill();

		if let Some((color, width)) = style.border {
			ctx.set_stroke_style_str(color);
			ctx.set_line_width(width);
			ctx.stroke();
		} else if hovered == Some(i) {
			ctx.set_stroke_style_str("rgba(0, 0, 0, 0.3)");
			ctx.set_line_width(2.0);
			ctx.stroke();
		}

		ctx.set_font("12px sans-serif");
		ctx.set_text_align("center");
		ctx.set_text_baseline("middle");
		ctx.set_line_width(2.0);
		ctx.set_stroke_style_str("#ffffff");
		let _ = ctx.stroke_text(&vertex.label, p.x, p.y);
		ctx.set_fill_style_str(LABEL_COLOR);
		let _ = ctx.fill_text(&vertex.label, p.x, p.y);
		ctx.set_global_alpha(1.0);
	}
}

/// Rasterize the surface at `request.scale` onto an opaque background and
/// trigger a browser download.
pub fn export_png(surface: &GraphSurface, request: &ExportRequest) -> Result<(), JsValue> {
	let document = web_sys::window()
		.and_then(|w| w.document())
		.ok_or_else(|| JsValue::from_str("no document"))?;
	let viewport = surface.viewport();

	let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
	canvas.set_width((viewport.width * request.scale) as u32);
	canvas.set_height((viewport.height * request.scale) as u32);
	let ctx: CanvasRenderingContext2d = canvas
		.get_context("2d")?
		.ok_or_else(|| JsValue::from_str("no 2d context"))?
		.dyn_into()?;
	ctx.scale(request.scale, request.scale)?;
	paint(surface, &ctx, request.background);

	let url = canvas.to_data_url_with_type("image/png")?;
	let link: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
	link.set_href(&url);
	link.set_download(&request.file_name);
	link.click();
	Ok(())
}
