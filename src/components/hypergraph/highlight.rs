//! Render-attribute computation for focus and ambient states.
//!
//! The engine owns no topology: it takes the graph and a neighborhood and
//! produces a full attribute table classifying every node and every edge as
//! either emphasized or dimmed (focus), or restores the rest-state baseline
//! (ambient). Classification is total; there is no third state.
//!
//! Edge identity colors are assigned once per graph load by cycling the edge
//! palette over insertion order, then remembered, so an edge keeps its color
//! for the life of the loaded graph.

use std::collections::HashMap;

use super::colors;
use super::model::Graph;
use super::neighborhood::Neighborhood;
use super::theme::{Color, Theme};

/// Opacity of nodes outside the focused neighborhood.
pub const DIMMED_NODE_OPACITY: f64 = 0.15;
/// Opacity of edges outside the focused neighborhood.
pub const DIMMED_EDGE_OPACITY: f64 = 0.1;
/// Rest-state edge opacity.
pub const AMBIENT_EDGE_OPACITY: f64 = 0.4;
/// Line width (screen px) of an emphasized edge.
pub const EMPHASIZED_EDGE_WIDTH: f64 = 4.0;
/// Line width of a dimmed edge.
pub const DIMMED_EDGE_WIDTH: f64 = 1.0;
/// Line width of an ambient edge.
pub const AMBIENT_EDGE_WIDTH: f64 = 2.0;
/// Border width (screen px) of an emphasized node.
pub const EMPHASIZED_BORDER_WIDTH: f64 = 3.0;
/// Border width of a dimmed node.
pub const DIMMED_BORDER_WIDTH: f64 = 1.0;
/// Border width of an ambient node.
pub const AMBIENT_BORDER_WIDTH: f64 = 1.5;

/// Per-node render attributes.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeAttrs {
	/// Fill/border opacity.
	pub opacity: f64,
	/// Whether the label is drawn bold.
	pub bold_label: bool,
	/// Border stroke width in screen pixels.
	pub border_width: f64,
	/// Whether the node gets a glow halo.
	pub glow: bool,
	/// Label color.
	pub label_color: Color,
}

/// Per-edge render attributes.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeAttrs {
	/// Stroke color.
	pub color: Color,
	/// Stroke opacity.
	pub opacity: f64,
	/// Line width in screen pixels.
	pub width: f64,
	/// Whether the edge gets a colored glow.
	pub glow: bool,
}

/// Full per-element attribute tables for one visual state.
#[derive(Clone, Debug, Default)]
pub struct FrameAttrs {
	/// Attributes keyed by node id; covers every node in the graph.
	pub nodes: HashMap<String, NodeAttrs>,
	/// Attributes keyed by edge id; covers every edge in the graph.
	pub edges: HashMap<String, EdgeAttrs>,
}

/// Computes attribute deltas for focus/ambient states.
pub struct HighlightEngine {
	/// Identity color per edge id, fixed at graph load.
	edge_colors: HashMap<String, Color>,
	label_color: Color,
	label_color_muted: Color,
	edge_dim_color: Color,
}

impl HighlightEngine {
	/// Builds the engine for a freshly loaded graph, assigning each edge its
	/// identity color by insertion order.
	pub fn new(graph: &Graph, theme: &Theme) -> Self {
		let edge_colors = graph
			.edges
			.iter()
			.enumerate()
			.map(|(i, e)| (e.id.clone(), colors::edge_identity_color(i)))
			.collect();

		Self {
			edge_colors,
			label_color: theme.label_color,
			label_color_muted: theme.label_color_muted,
			edge_dim_color: theme.edge_dim_color,
		}
	}

	/// The remembered identity color for an edge.
	pub fn edge_color(&self, edge_id: &str) -> Color {
		self.edge_colors
			.get(edge_id)
			.copied()
			.unwrap_or(self.edge_dim_color)
	}

	/// Attribute tables focusing one neighborhood: members emphasized,
	/// everything else dimmed.
	pub fn focus(&self, graph: &Graph, neighborhood: &Neighborhood) -> FrameAttrs {
		let nodes = graph
			.nodes
			.iter()
			.map(|n| {
				let attrs = if neighborhood.nodes.contains(&n.id) {
					NodeAttrs {
						opacity: 1.0,
						bold_label: true,
						border_width: EMPHASIZED_BORDER_WIDTH,
						glow: true,
						label_color: self.label_color,
					}
				} else {
					NodeAttrs {
						opacity: DIMMED_NODE_OPACITY,
						bold_label: false,
						border_width: DIMMED_BORDER_WIDTH,
						glow: false,
						label_color: self.label_color_muted,
					}
				};
				(n.id.clone(), attrs)
			})
			.collect();

		let edges = graph
			.edges
			.iter()
			.map(|e| {
				let attrs = if neighborhood.edges.contains(&e.id) {
					EdgeAttrs {
						color: self.edge_color(&e.id),
						opacity: 1.0,
						width: EMPHASIZED_EDGE_WIDTH,
						glow: true,
					}
				} else {
					EdgeAttrs {
						color: self.edge_dim_color,
						opacity: DIMMED_EDGE_OPACITY,
						width: DIMMED_EDGE_WIDTH,
						glow: false,
					}
				};
				(e.id.clone(), attrs)
			})
			.collect();

		FrameAttrs { nodes, edges }
	}

	/// The rest-state baseline shown when nothing is selected. This is what
	/// `focus` must be able to fully reverse.
	pub fn ambient(&self, graph: &Graph) -> FrameAttrs {
		let nodes = graph
			.nodes
			.iter()
			.map(|n| {
				(
					n.id.clone(),
					NodeAttrs {
						opacity: 1.0,
						bold_label: false,
						border_width: AMBIENT_BORDER_WIDTH,
						glow: false,
						label_color: self.label_color,
					},
				)
			})
			.collect();

		let edges = graph
			.edges
			.iter()
			.map(|e| {
				(
					e.id.clone(),
					EdgeAttrs {
						color: self.edge_color(&e.id),
						opacity: AMBIENT_EDGE_OPACITY,
						width: AMBIENT_EDGE_WIDTH,
						glow: false,
					},
				)
			})
			.collect();

		FrameAttrs { nodes, edges }
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::hypergraph::model;
	use crate::components::hypergraph::neighborhood::NeighborhoodIndex;

	fn make_test_graph() -> Graph {
		model::load(
			r#"{
				"nodes": [
					{"id": "a", "label": "s.a"},
					{"id": "b", "label": "s.b"},
					{"id": "c", "label": "s.c"}
				],
				"edges": [
					{"id": "ab", "from": "a", "to": "b", "label": ""},
					{"id": "bc", "from": "b", "to": "c", "label": ""}
				]
			}"#,
		)
		.unwrap()
	}

	#[test]
	fn focus_classifies_every_element_exactly_once() {
		let graph = make_test_graph();
		let engine = HighlightEngine::new(&graph, &Theme::default());
		let mut index = NeighborhoodIndex::new();
		let nb = index.neighborhood_of(&graph, "a");

		let attrs = engine.focus(&graph, &nb);
		assert_eq!(attrs.nodes.len(), graph.nodes.len());
		assert_eq!(attrs.edges.len(), graph.edges.len());

		for node in &graph.nodes {
			let a = &attrs.nodes[&node.id];
			if nb.nodes.contains(&node.id) {
				assert_eq!(a.opacity, 1.0);
				assert!(a.bold_label && a.glow);
			} else {
				assert_eq!(a.opacity, DIMMED_NODE_OPACITY);
				assert!(!a.bold_label && !a.glow);
			}
		}
	}

	#[test]
	fn focus_on_a_dims_c_and_the_far_edge() {
		let graph = make_test_graph();
		let engine = HighlightEngine::new(&graph, &Theme::default());
		let mut index = NeighborhoodIndex::new();
		let nb = index.neighborhood_of(&graph, "a");

		assert!(nb.nodes.contains("a") && nb.nodes.contains("b"));
		assert!(!nb.nodes.contains("c"));

		let attrs = engine.focus(&graph, &nb);
		assert_eq!(attrs.nodes["c"].opacity, DIMMED_NODE_OPACITY);

		let ab = &attrs.edges["ab"];
		assert_eq!(ab.color, engine.edge_color("ab"));
		assert_eq!(ab.width, EMPHASIZED_EDGE_WIDTH);
		assert!(ab.glow);

		let bc = &attrs.edges["bc"];
		assert_eq!(bc.color, Theme::default().edge_dim_color);
		assert_eq!(bc.opacity, DIMMED_EDGE_OPACITY);
		assert_eq!(bc.width, DIMMED_EDGE_WIDTH);
	}

	#[test]
	fn ambient_restores_the_baseline_after_focus() {
		let graph = make_test_graph();
		let engine = HighlightEngine::new(&graph, &Theme::default());
		let mut index = NeighborhoodIndex::new();

		let baseline = engine.ambient(&graph);
		let nb = index.neighborhood_of(&graph, "b");
		let _focused = engine.focus(&graph, &nb);
		let restored = engine.ambient(&graph);

		for node in &graph.nodes {
			assert_eq!(restored.nodes[&node.id].opacity, 1.0);
			assert_eq!(restored.nodes[&node.id], baseline.nodes[&node.id]);
		}
		for edge in &graph.edges {
			let attrs = &restored.edges[&edge.id];
			assert_eq!(attrs.color, engine.edge_color(&edge.id));
			assert_eq!(attrs.opacity, AMBIENT_EDGE_OPACITY);
			assert_eq!(attrs, &baseline.edges[&edge.id]);
		}
	}

	#[test]
	fn edge_identity_colors_are_stable_per_load() {
		let graph = make_test_graph();
		let engine = HighlightEngine::new(&graph, &Theme::default());
		let mut index = NeighborhoodIndex::new();

		let before = engine.edge_color("ab");
		let nb = index.neighborhood_of(&graph, "a");
		let focused = engine.focus(&graph, &nb);
		let ambient = engine.ambient(&graph);

		assert_eq!(focused.edges["ab"].color, before);
		assert_eq!(ambient.edges["ab"].color, before);
	}

	#[test]
	fn ambient_differs_from_all_emphasized() {
		let graph = make_test_graph();
		let engine = HighlightEngine::new(&graph, &Theme::default());

		let ambient = engine.ambient(&graph);
		assert_eq!(ambient.edges["ab"].width, AMBIENT_EDGE_WIDTH);
		assert!(!ambient.nodes["a"].bold_label);
		assert!(!ambient.edges["ab"].glow);
	}
}
