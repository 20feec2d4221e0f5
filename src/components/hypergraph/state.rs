//! Per-load session state for the hypergraph view.
//!
//! One [`HypergraphState`] is created when a graph arrives and the surface
//! has area, and dropped on teardown or reload. It owns everything whose
//! lifetime is one loaded graph: the simulation instance, the neighborhood
//! cache, the highlight engine and its current attribute tables, the
//! selection machine, and the layout lifecycle. Dropping the session is what
//! destroys the simulation and the cache together, so they can never outlive
//! the graph they were built from.

use std::collections::HashMap;
use std::f64::consts::PI;
use std::rc::Rc;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use super::colors;
use super::highlight::{FrameAttrs, HighlightEngine};
use super::lifecycle::{FreezeCause, LayoutLifecycle, fit_transform};
use super::model::Graph;
use super::neighborhood::NeighborhoodIndex;
use super::selection::SelectionMachine;
use super::theme::{Color, Theme};

/// Base node radius in world units.
pub const NODE_RADIUS: f64 = 5.0;
/// Hit detection radius in world units.
pub const HIT_RADIUS: f64 = 12.0;
/// A press that travels further than this (screen px) is a drag, not a click.
pub const CLICK_SLOP: f64 = 4.0;

/// Mean per-tick displacement below which the layout counts as calm.
const SETTLE_EPSILON: f64 = 0.1;
/// Consecutive calm ticks required before the layout counts as stabilized.
const SETTLE_TICKS: u32 = 5;

/// Per-node display metadata attached to each simulation node.
#[derive(Clone, Debug)]
pub struct NodeVisual {
	/// The table node's id.
	pub id: String,
	/// Qualified display name.
	pub label: String,
	/// Schema fill color.
	pub fill: Color,
	/// Schema border color.
	pub border: Color,
	/// Size multiplier (1.0 = normal, >1.0 = more connected).
	pub size: f64,
}

/// Pan and zoom transform applied to the entire graph view.
#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	/// Zoom factor, kept within the lifecycle's zoom range.
	pub k: f64,
}

/// Tracks an in-progress node drag operation.
#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<DefaultNodeIdx>,
	pub node_id: Option<String>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
	/// Travelled beyond the click slop.
	pub moved: bool,
}

/// Tracks an in-progress canvas pan operation.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
	/// Travelled beyond the click slop.
	pub moved: bool,
}

/// Derives the external simulation's "stabilized" completion signal from
/// observed node movement: the layout counts as converged once the mean
/// per-tick displacement stays below a threshold for a few consecutive ticks.
#[derive(Debug, Default)]
struct SettleDetector {
	prev: Vec<(f32, f32)>,
	calm_ticks: u32,
}

impl SettleDetector {
	fn observe(&mut self, positions: &[(f32, f32)]) -> bool {
		if self.prev.len() != positions.len() {
			self.prev = positions.to_vec();
			self.calm_ticks = 0;
			return false;
		}

		let total: f64 = self
			.prev
			.iter()
			.zip(positions)
			.map(|(a, b)| {
				let (dx, dy) = ((b.0 - a.0) as f64, (b.1 - a.1) as f64);
				(dx * dx + dy * dy).sqrt()
			})
			.sum();
		let mean = total / positions.len().max(1) as f64;

		self.prev = positions.to_vec();
		if mean < SETTLE_EPSILON {
			self.calm_ticks += 1;
		} else {
			self.calm_ticks = 0;
		}
		self.calm_ticks >= SETTLE_TICKS
	}
}

/// Session state combining the loaded graph, the physics simulation, and all
/// per-load engines.
pub struct HypergraphState {
	/// The loaded graph; single source of truth for topology.
	pub graph: Rc<Graph>,
	/// The external force simulation, destroyed with the session.
	pub sim: ForceGraph<NodeVisual, ()>,
	/// Current render attributes, applied by the render adapter each frame.
	pub attrs: FrameAttrs,
	/// Idle/Hovering/Selected machine.
	pub selection: SelectionMachine,
	/// Freeze latch and zoom owner.
	pub lifecycle: LayoutLifecycle,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub width: f64,
	pub height: f64,
	highlight: HighlightEngine,
	neighborhoods: NeighborhoodIndex,
	settle: SettleDetector,
	physics_enabled: bool,
	iterations: u32,
}

impl HypergraphState {
	/// Builds the session for a freshly loaded graph. The previous session
	/// (and with it the previous neighborhood cache) must already be dropped;
	/// a fresh index here is what makes reload invalidation atomic.
	pub fn new(graph: Rc<Graph>, width: f64, height: f64, theme: &Theme) -> Self {
		let schema_colors = colors::assign_schema_colors(&graph.nodes);

		let mut sim = ForceGraph::new(SimulationParameters {
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
		});

		// Connectivity drives node size: hub tables read larger.
		let mut edge_counts: HashMap<&str, usize> = HashMap::new();
		for edge in &graph.edges {
			*edge_counts.entry(edge.from.as_str()).or_insert(0) += 1;
			*edge_counts.entry(edge.to.as_str()).or_insert(0) += 1;
		}
		let max_edges = edge_counts.values().copied().max().unwrap_or(1).max(1);

		let mut id_to_idx = HashMap::new();
		for (i, node) in graph.nodes.iter().enumerate() {
			let palette = schema_colors[&node.schema];
			let angle = (i as f64) * 2.0 * PI / graph.nodes.len().max(1) as f64;
			let (x, y) = (
				(width / 2.0 + 100.0 * angle.cos()) as f32,
				(height / 2.0 + 100.0 * angle.sin()) as f32,
			);

			let node_edges = edge_counts.get(node.id.as_str()).copied().unwrap_or(0);
			let edge_factor = (node_edges as f64 / max_edges as f64).sqrt();
			let size = 0.9 + 0.7 * edge_factor;

			let idx = sim.add_node(NodeData {
				x,
				y,
				mass: 10.0,
				is_anchor: false,
				user_data: NodeVisual {
					id: node.id.clone(),
					label: node.label.clone(),
					fill: palette.fill,
					border: palette.border,
					size,
				},
			});
			id_to_idx.insert(node.id.clone(), idx);
		}

		for edge in &graph.edges {
			if let (Some(&src), Some(&tgt)) = (id_to_idx.get(&edge.from), id_to_idx.get(&edge.to))
			{
				sim.add_edge(src, tgt, EdgeData::default());
			}
		}

		let highlight = HighlightEngine::new(&graph, theme);
		let attrs = highlight.ambient(&graph);

		Self {
			graph,
			sim,
			attrs,
			selection: SelectionMachine::new(),
			lifecycle: LayoutLifecycle::new(),
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			width,
			height,
			highlight,
			neighborhoods: NeighborhoodIndex::new(),
			settle: SettleDetector::default(),
			physics_enabled: true,
			iterations: 0,
		}
	}

	/// Whether the simulation is still live.
	pub fn physics_enabled(&self) -> bool {
		self.physics_enabled
	}

	/// Elapsed simulation iterations.
	pub fn iterations(&self) -> u32 {
		self.iterations
	}

	/// Advances the simulation one frame and routes its progress/stabilized
	/// signals into the freeze race. Returns the cause when this tick froze
	/// the layout.
	pub fn tick(&mut self, dt: f32) -> Option<FreezeCause> {
		if !self.physics_enabled {
			return None;
		}

		self.sim.update(dt);
		self.iterations += 1;

		let positions: Vec<(f32, f32)> = {
			let mut out = Vec::with_capacity(self.graph.nodes.len());
			self.sim.visit_nodes(|node| out.push((node.x(), node.y())));
			out
		};

		let cause = if self.settle.observe(&positions) {
			self.lifecycle.on_stabilized()
		} else {
			self.lifecycle.on_progress(self.iterations)
		};

		if cause.is_some() {
			self.freeze();
		}
		cause
	}

	/// The hard freeze deadline fired. Returns the cause when the deadline
	/// won the race.
	pub fn freeze_deadline(&mut self) -> Option<FreezeCause> {
		let cause = self.lifecycle.on_timeout();
		if cause.is_some() {
			self.freeze();
		}
		cause
	}

	/// Stops the simulation, fits the camera to the node extents with no
	/// animation, and records the fitted scale as the zoom state.
	fn freeze(&mut self) {
		self.physics_enabled = false;

		let Some(extents) = self.node_extents() else {
			return;
		};
		let (x, y, k) = fit_transform(extents.0, extents.1, self.width, self.height);
		self.transform = ViewTransform { x, y, k };
		self.lifecycle.record_zoom(k);
	}

	fn node_extents(&self) -> Option<((f64, f64), (f64, f64))> {
		let mut min = (f64::INFINITY, f64::INFINITY);
		let mut max = (f64::NEG_INFINITY, f64::NEG_INFINITY);
		let mut any = false;
		self.sim.visit_nodes(|node| {
			let (x, y) = (node.x() as f64, node.y() as f64);
			min = (min.0.min(x), min.1.min(y));
			max = (max.0.max(x), max.1.max(y));
			any = true;
		});
		any.then_some((min, max))
	}

	/// World-space positions keyed by node id, captured once per frame for
	/// edge drawing and centering.
	pub fn node_positions(&self) -> HashMap<String, (f64, f64)> {
		let mut out = HashMap::with_capacity(self.graph.nodes.len());
		self.sim.visit_nodes(|node| {
			out.insert(
				node.data.user_data.id.clone(),
				(node.x() as f64, node.y() as f64),
			);
		});
		out
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Hit test at a screen position, returning the node id and simulation
	/// index of the topmost hit.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<(String, DefaultNodeIdx)> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found = None;
		self.sim.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			let hit = HIT_RADIUS * node.data.user_data.size;
			if (dx * dx + dy * dy).sqrt() < hit {
				found = Some((node.data.user_data.id.clone(), node.index()));
			}
		});
		found
	}

	/// Recomputes the attribute tables to focus `id`'s neighborhood.
	pub fn set_focus(&mut self, id: &str) {
		let graph = Rc::clone(&self.graph);
		let nb = self.neighborhoods.neighborhood_of(&graph, id);
		self.attrs = self.highlight.focus(&graph, &nb);
	}

	/// Restores the ambient attribute baseline.
	pub fn set_ambient(&mut self) {
		self.attrs = self.highlight.ambient(&self.graph);
	}

	/// Re-centers the camera on a node at the current zoom.
	pub fn center_on(&mut self, id: &str) {
		if let Some(&(nx, ny)) = self.node_positions().get(id) {
			self.transform.x = self.width / 2.0 - self.transform.k * nx;
			self.transform.y = self.height / 2.0 - self.transform.k * ny;
		}
	}

	/// Starts an animated zoom toward `scale`. Returns the clamped target.
	pub fn set_zoom(&mut self, scale: f64) -> f64 {
		self.lifecycle.set_zoom(scale)
	}

	/// Advances the animated zoom, keeping the surface center fixed.
	pub fn tick_zoom(&mut self, dt_ms: f64) {
		let old_k = self.transform.k;
		if let Some(k) = self.lifecycle.tick_tween(dt_ms) {
			self.apply_zoom_about(self.width / 2.0, self.height / 2.0, old_k, k);
		}
	}

	/// Immediate wheel zoom about the cursor; clamped and recorded as the
	/// current zoom state. Returns the applied scale.
	pub fn wheel_zoom(&mut self, sx: f64, sy: f64, factor: f64) -> f64 {
		let old_k = self.transform.k;
		let new_k = self.lifecycle.record_zoom(old_k * factor);
		self.apply_zoom_about(sx, sy, old_k, new_k);
		new_k
	}

	fn apply_zoom_about(&mut self, sx: f64, sy: f64, old_k: f64, new_k: f64) {
		if old_k <= 0.0 {
			self.transform.k = new_k;
			return;
		}
		let ratio = new_k / old_k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::hypergraph::model;

	fn make_session() -> HypergraphState {
		let graph = model::load(
			r#"{
				"nodes": [
					{"id": "a", "label": "s.a"},
					{"id": "b", "label": "s.b"},
					{"id": "c", "label": "t.c"}
				],
				"edges": [
					{"id": "ab", "from": "a", "to": "b", "label": ""},
					{"id": "bc", "from": "b", "to": "c", "label": ""}
				]
			}"#,
		)
		.unwrap();
		HypergraphState::new(Rc::new(graph), 800.0, 600.0, &Theme::default())
	}

	#[test]
	fn session_starts_ambient_with_physics_on() {
		let state = make_session();
		assert!(state.physics_enabled());
		assert_eq!(state.attrs.nodes.len(), 3);
		assert_eq!(state.attrs.edges.len(), 2);
		assert!((state.attrs.nodes["a"].opacity - 1.0).abs() < 1e-9);
	}

	#[test]
	fn ticking_freezes_exactly_once() {
		let mut state = make_session();

		let mut causes = Vec::new();
		for _ in 0..200 {
			if let Some(cause) = state.tick(0.016) {
				causes.push(cause);
			}
		}

		assert_eq!(causes.len(), 1);
		assert!(!state.physics_enabled());
		assert!(state.lifecycle.is_frozen());
		// A deadline arriving after the freeze is a no-op.
		assert_eq!(state.freeze_deadline(), None);
	}

	#[test]
	fn freeze_records_a_clamped_zoom() {
		let mut state = make_session();
		for _ in 0..200 {
			state.tick(0.016);
		}
		let k = state.lifecycle.zoom();
		assert!(k >= crate::components::hypergraph::lifecycle::MIN_ZOOM);
		assert!(k <= crate::components::hypergraph::lifecycle::MAX_ZOOM);
		assert!((state.transform.k - k).abs() < 1e-9);
	}

	#[test]
	fn deadline_freezes_when_nothing_else_has() {
		let mut state = make_session();
		assert!(matches!(state.freeze_deadline(), Some(FreezeCause::Timeout)));
		assert!(!state.physics_enabled());
	}

	#[test]
	fn focus_and_ambient_drive_the_attribute_tables() {
		let mut state = make_session();

		state.set_focus("a");
		assert!((state.attrs.nodes["c"].opacity - 0.15).abs() < 1e-9);

		state.set_ambient();
		assert!((state.attrs.nodes["c"].opacity - 1.0).abs() < 1e-9);
	}

	#[test]
	fn wheel_zoom_respects_the_zoom_range() {
		let mut state = make_session();
		for _ in 0..100 {
			state.wheel_zoom(400.0, 300.0, 1.5);
		}
		assert!((state.transform.k - 2.0).abs() < 1e-9);

		for _ in 0..100 {
			state.wheel_zoom(400.0, 300.0, 0.5);
		}
		assert!((state.transform.k - 0.1).abs() < 1e-9);
	}

	#[test]
	fn center_on_puts_the_node_at_the_surface_center() {
		let mut state = make_session();
		state.center_on("a");

		let (nx, ny) = state.node_positions()["a"];
		let sx = state.transform.x + state.transform.k * nx;
		let sy = state.transform.y + state.transform.k * ny;
		assert!((sx - 400.0).abs() < 1e-6);
		assert!((sy - 300.0).abs() < 1e-6);
	}
}
