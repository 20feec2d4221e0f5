//! Deterministic color assignment for schema groups, label tags, and edges.
//!
//! Assignment is a pure function of the distinct key set: keys are sorted
//! ascending and indexed into a fixed palette with modulo wraparound, so the
//! same key set yields the same mapping regardless of node order or which
//! Graph instance produced it. The legend and the node styling stay consistent
//! across reloads of the same content. Far-apart keys can collide once a
//! palette wraps; that is accepted.

use std::collections::{BTreeMap, BTreeSet};

use super::model::TableNode;
use super::theme::Color;

/// Border/fill pair assigned to a schema group.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SchemaColors {
	/// Node border color.
	pub border: Color,
	/// Node fill color.
	pub fill: Color,
}

/// Five border/fill pairs cycled over schema names.
const SCHEMA_PALETTE: [SchemaColors; 5] = [
	SchemaColors {
		border: Color::rgb(94, 129, 172),
		fill: Color::rgb(46, 62, 83),
	},
	SchemaColors {
		border: Color::rgb(163, 190, 140),
		fill: Color::rgb(76, 89, 65),
	},
	SchemaColors {
		border: Color::rgb(208, 135, 112),
		fill: Color::rgb(97, 63, 52),
	},
	SchemaColors {
		border: Color::rgb(180, 142, 173),
		fill: Color::rgb(84, 66, 81),
	},
	SchemaColors {
		border: Color::rgb(235, 203, 139),
		fill: Color::rgb(110, 95, 65),
	},
];

/// Ten colors cycled over label tags.
const LABEL_PALETTE: [Color; 10] = [
	Color::rgb(31, 119, 180),
	Color::rgb(255, 127, 14),
	Color::rgb(44, 160, 44),
	Color::rgb(214, 39, 40),
	Color::rgb(148, 103, 189),
	Color::rgb(140, 86, 75),
	Color::rgb(227, 119, 194),
	Color::rgb(127, 127, 127),
	Color::rgb(188, 189, 34),
	Color::rgb(23, 190, 207),
];

/// Identity colors cycled over edges by insertion order.
const EDGE_PALETTE: [Color; 8] = [
	Color::rgb(88, 166, 255),
	Color::rgb(63, 185, 80),
	Color::rgb(210, 153, 34),
	Color::rgb(248, 81, 73),
	Color::rgb(163, 113, 247),
	Color::rgb(219, 109, 40),
	Color::rgb(57, 197, 187),
	Color::rgb(236, 110, 173),
];

/// Assigns a border/fill pair to every distinct schema name.
pub fn assign_schema_colors(nodes: &[TableNode]) -> BTreeMap<String, SchemaColors> {
	let distinct: BTreeSet<&str> = nodes.iter().map(|n| n.schema.as_str()).collect();
	distinct
		.into_iter()
		.enumerate()
		.map(|(i, schema)| (schema.to_string(), SCHEMA_PALETTE[i % SCHEMA_PALETTE.len()]))
		.collect()
}

/// Assigns a single color to every distinct label tag.
pub fn assign_label_colors(nodes: &[TableNode]) -> BTreeMap<String, Color> {
	let distinct: BTreeSet<&str> = nodes
		.iter()
		.flat_map(|n| n.label_tags.iter().map(|t| t.as_str()))
		.collect();
	distinct
		.into_iter()
		.enumerate()
		.map(|(i, tag)| (tag.to_string(), LABEL_PALETTE[i % LABEL_PALETTE.len()]))
		.collect()
}

/// The identity color for the edge at a given insertion index.
pub fn edge_identity_color(edge_index: usize) -> Color {
	EDGE_PALETTE[edge_index % EDGE_PALETTE.len()]
}

#[cfg(test)]
mod tests {
	use super::*;

	fn node(id: &str, schema: &str, tags: &[&str]) -> TableNode {
		TableNode {
			id: id.to_string(),
			label: format!("{schema}.{id}"),
			schema: schema.to_string(),
			row_count: None,
			columns: Vec::new(),
			label_tags: tags.iter().map(|t| t.to_string()).collect(),
		}
	}

	#[test]
	fn schema_assignment_is_order_independent() {
		let forward = vec![
			node("a", "public", &[]),
			node("b", "audit", &[]),
			node("c", "sales", &[]),
		];
		let reversed: Vec<_> = forward.iter().rev().cloned().collect();

		assert_eq!(
			assign_schema_colors(&forward),
			assign_schema_colors(&reversed)
		);
	}

	#[test]
	fn schema_assignment_follows_sorted_order() {
		let nodes = vec![node("a", "zeta", &[]), node("b", "alpha", &[])];
		let colors = assign_schema_colors(&nodes);

		assert_eq!(colors["alpha"], SCHEMA_PALETTE[0]);
		assert_eq!(colors["zeta"], SCHEMA_PALETTE[1]);
	}

	#[test]
	fn schema_palette_wraps_around() {
		let nodes: Vec<_> = (0..7)
			.map(|i| node(&format!("t{i}"), &format!("s{i}"), &[]))
			.collect();
		let colors = assign_schema_colors(&nodes);

		assert_eq!(colors["s0"], colors["s5"]);
		assert_eq!(colors["s1"], colors["s6"]);
	}

	#[test]
	fn label_assignment_covers_distinct_tags_once() {
		let nodes = vec![
			node("a", "s", &["fact", "core"]),
			node("b", "s", &["core", "stale"]),
		];
		let colors = assign_label_colors(&nodes);

		assert_eq!(colors.len(), 3);
		assert_eq!(colors["core"], LABEL_PALETTE[0]);
		assert_eq!(colors["fact"], LABEL_PALETTE[1]);
		assert_eq!(colors["stale"], LABEL_PALETTE[2]);
	}

	#[test]
	fn identical_key_sets_from_different_graphs_agree() {
		let one = vec![node("x", "public", &["fact"])];
		let two = vec![
			node("y", "public", &["fact"]),
			node("z", "public", &["fact"]),
		];

		assert_eq!(assign_schema_colors(&one), assign_schema_colors(&two));
		assert_eq!(assign_label_colors(&one), assign_label_colors(&two));
	}

	#[test]
	fn edge_colors_cycle_by_insertion_index() {
		assert_eq!(edge_identity_color(0), EDGE_PALETTE[0]);
		assert_eq!(edge_identity_color(8), EDGE_PALETTE[0]);
		assert_eq!(edge_identity_color(11), EDGE_PALETTE[3]);
	}
}
