//! Canvas drawing for the hypergraph view.
//!
//! The adapter consumes the session's current attribute tables and draws the
//! whole frame: background, edges, then nodes, with emphasized nodes in a
//! final pass so they sit on top of dimmed neighbors. All per-element visual
//! decisions (opacity, color, width, glow) were already made by the highlight
//! engine; nothing here re-derives them.

use std::collections::HashMap;
use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::highlight::{EdgeAttrs, NodeAttrs};
use super::state::{HypergraphState, NODE_RADIUS, NodeVisual};
use super::theme::Theme;

/// Renders the complete frame.
pub fn render(state: &HypergraphState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	draw_background(state, ctx, theme);

	let positions = state.node_positions();

	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);

	draw_edges(state, ctx, &positions);
	draw_nodes(state, ctx, theme);

	ctx.restore();

	if theme.background.vignette > 0.0 {
		draw_vignette(state, ctx, theme);
	}
}

fn draw_background(state: &HypergraphState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	if theme.background.use_gradient {
		if let Ok(gradient) = ctx.create_radial_gradient(
			state.width / 2.0,
			state.height / 2.0,
			0.0,
			state.width / 2.0,
			state.height / 2.0,
			state.width.max(state.height) * 0.8,
		) {
			let _ = gradient.add_color_stop(0.0, &theme.background.color_secondary.to_css());
			let _ = gradient.add_color_stop(1.0, &theme.background.color.to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
	} else {
		ctx.set_fill_style_str(&theme.background.color.to_css());
	}

	ctx.fill_rect(0.0, 0.0, state.width, state.height);
}

fn draw_vignette(state: &HypergraphState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	let Ok(gradient) = ctx.create_radial_gradient(
		state.width / 2.0,
		state.height / 2.0,
		state.width.min(state.height) * 0.3,
		state.width / 2.0,
		state.height / 2.0,
		state.width.max(state.height) * 0.7,
	) else {
		return;
	};

	let _ = gradient.add_color_stop(0.0, "rgba(0, 0, 0, 0)");
	let _ = gradient.add_color_stop(
		1.0,
		&format!("rgba(0, 0, 0, {})", theme.background.vignette),
	);

	#[allow(deprecated)]
	ctx.set_fill_style(&gradient);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
}

fn draw_edges(
	state: &HypergraphState,
	ctx: &CanvasRenderingContext2d,
	positions: &HashMap<String, (f64, f64)>,
) {
	let k = state.transform.k;

	for edge in &state.graph.edges {
		let Some(attrs) = state.attrs.edges.get(&edge.id) else {
			continue;
		};
		// Dangling endpoints have no position; the edge stays undrawn.
		let (Some(&(x1, y1)), Some(&(x2, y2))) =
			(positions.get(&edge.from), positions.get(&edge.to))
		else {
			continue;
		};

		if attrs.glow {
			draw_edge_line(ctx, x1, y1, x2, y2, attrs, (attrs.width + 6.0) / k, 0.25);
		}
		draw_edge_line(ctx, x1, y1, x2, y2, attrs, attrs.width / k, attrs.opacity);
	}
}

fn draw_edge_line(
	ctx: &CanvasRenderingContext2d,
	x1: f64,
	y1: f64,
	x2: f64,
	y2: f64,
	attrs: &EdgeAttrs,
	width: f64,
	alpha: f64,
) {
	let color = attrs.color;
	ctx.set_stroke_style_str(&format!(
		"rgba({}, {}, {}, {})",
		color.r,
		color.g,
		color.b,
		alpha * color.a
	));
	ctx.set_line_width(width);
	ctx.begin_path();
	ctx.move_to(x1, y1);
	ctx.line_to(x2, y2);
	ctx.stroke();
}

fn draw_nodes(state: &HypergraphState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	// Pass 1: dimmed and ambient nodes.
	state.sim.visit_nodes(|node| {
		if let Some(attrs) = state.attrs.nodes.get(&node.data.user_data.id) {
			if !attrs.glow {
				draw_node(ctx, &node.data.user_data, node.x() as f64, node.y() as f64, attrs, state.transform.k, theme);
			}
		}
	});

	// Pass 2: emphasized nodes on top.
	state.sim.visit_nodes(|node| {
		if let Some(attrs) = state.attrs.nodes.get(&node.data.user_data.id) {
			if attrs.glow {
				let (x, y) = (node.x() as f64, node.y() as f64);
				draw_node_glow(ctx, &node.data.user_data, x, y);
				draw_node(ctx, &node.data.user_data, x, y, attrs, state.transform.k, theme);
			}
		}
	});
}

fn draw_node_glow(ctx: &CanvasRenderingContext2d, visual: &NodeVisual, x: f64, y: f64) {
	let radius = NODE_RADIUS * visual.size;
	let glow_radius = radius * 3.0;
	let Ok(gradient) = ctx.create_radial_gradient(x, y, radius * 0.5, x, y, glow_radius) else {
		return;
	};

	let halo = visual.border.with_alpha(0.35);
	let _ = gradient.add_color_stop(0.0, &halo.to_css());
	let _ = gradient.add_color_stop(1.0, "rgba(0, 0, 0, 0)");

	ctx.begin_path();
	let _ = ctx.arc(x, y, glow_radius, 0.0, 2.0 * PI);
	#[allow(deprecated)]
	ctx.set_fill_style(&gradient);
	ctx.fill();
}

fn draw_node(
	ctx: &CanvasRenderingContext2d,
	visual: &NodeVisual,
	x: f64,
	y: f64,
	attrs: &NodeAttrs,
	k: f64,
	theme: &Theme,
) {
	let radius = NODE_RADIUS * visual.size;

	ctx.set_global_alpha(attrs.opacity);

	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(&visual.fill.to_css());
	ctx.fill();

	ctx.set_stroke_style_str(&visual.border.to_css());
	ctx.set_line_width(attrs.border_width / k);
	ctx.stroke();

	ctx.set_global_alpha(1.0);

	let font_size = 10.0 / k.max(0.5);
	let font = if attrs.bold_label {
		format!("bold {}px {}", font_size, theme.canvas_font)
	} else {
		format!("{}px {}", font_size, theme.canvas_font)
	};
	let label_alpha = attrs.label_color.a * attrs.opacity.max(0.3);
	ctx.set_fill_style_str(&attrs.label_color.with_alpha(label_alpha).to_css());
	ctx.set_font(&font);
	let _ = ctx.fill_text(&visual.label, x + radius + 4.0, y + 3.0);
}
