//! Canonical in-memory graph model.
//!
//! [`load`] turns the raw payload into a validated [`Graph`]: schemas are
//! derived from labels, missing `edges` default to empty, and summary stats
//! are recomputed whenever the payload's counters disagree with the node/edge
//! sequences. The sequences are authoritative; a stale summary never wins.

use log::{info, warn};
use thiserror::Error;

use super::types::{RawGraph, RawStats};

/// Schema assigned to tables whose label carries no `.` separator.
pub const DEFAULT_SCHEMA: &str = "main";

/// Errors that terminate a load attempt. None of these trigger an automatic
/// retry; the user re-triggers the load.
#[derive(Debug, Error)]
pub enum GraphError {
	/// Network or transport failure while retrieving the payload.
	#[error("failed to fetch graph data: {0}")]
	FetchFailure(String),
	/// Payload is missing a required array field or is not valid JSON.
	#[error("graph payload has an invalid format: {0}")]
	InvalidFormat(String),
	/// The canvas rendering context could not be initialized.
	#[error("render engine failed to initialize: {0}")]
	RenderEngineLoadFailure(String),
}

/// A table node after normalization.
#[derive(Clone, Debug)]
pub struct TableNode {
	/// Unique identifier.
	pub id: String,
	/// Qualified display name, `"schema.table"` or bare.
	pub label: String,
	/// Derived schema: the label prefix before the first `.`, or
	/// [`DEFAULT_SCHEMA`].
	pub schema: String,
	/// Approximate row count, when known.
	pub row_count: Option<u64>,
	/// Column names in table order.
	pub columns: Vec<String>,
	/// Semantic tags attached to the table.
	pub label_tags: Vec<String>,
}

/// A join relationship after normalization.
#[derive(Clone, Debug)]
pub struct JoinEdge {
	/// Unique identifier.
	pub id: String,
	/// Source node id. May dangle; dangling endpoints degrade, never abort.
	pub from: String,
	/// Target node id.
	pub to: String,
	/// Free-text join description.
	pub label: String,
}

/// Summary counters, either trusted from the payload or recomputed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GraphStats {
	/// Number of nodes.
	pub node_count: u64,
	/// Number of edges.
	pub edge_count: u64,
	/// Number of tables.
	pub table_count: u64,
	/// Total number of columns across all tables.
	pub column_count: u64,
}

/// Canonical graph: ordered node and edge sequences plus coherent stats.
/// Single source of truth for topology; everything else derives views.
#[derive(Clone, Debug)]
pub struct Graph {
	/// Table nodes in payload order.
	pub nodes: Vec<TableNode>,
	/// Join edges in payload order.
	pub edges: Vec<JoinEdge>,
	/// Coherent summary counters.
	pub stats: GraphStats,
}

impl Graph {
	/// Looks up a node by id.
	pub fn node(&self, id: &str) -> Option<&TableNode> {
		self.nodes.iter().find(|n| n.id == id)
	}

	/// Whether any node carries the given id.
	pub fn contains_node(&self, id: &str) -> bool {
		self.nodes.iter().any(|n| n.id == id)
	}
}

/// Derives the schema portion of a qualified label.
fn derive_schema(label: &str) -> String {
	match label.split_once('.') {
		Some((schema, _)) => schema.to_string(),
		None => DEFAULT_SCHEMA.to_string(),
	}
}

fn recompute_stats(nodes: &[TableNode], edges: &[JoinEdge]) -> GraphStats {
	GraphStats {
		node_count: nodes.len() as u64,
		edge_count: edges.len() as u64,
		table_count: nodes.len() as u64,
		column_count: nodes.iter().map(|n| n.columns.len() as u64).sum(),
	}
}

fn resolve_stats(raw: Option<RawStats>, nodes: &[TableNode], edges: &[JoinEdge]) -> GraphStats {
	match raw {
		Some(s) if s.edge_count == edges.len() as u64 => GraphStats {
			node_count: s.node_count,
			edge_count: s.edge_count,
			table_count: s.table_count,
			column_count: s.column_count,
		},
		Some(s) => {
			warn!(
				"tablegraph: payload stats disagree with sequences ({} edges reported, {} present), recomputing",
				s.edge_count,
				edges.len()
			);
			recompute_stats(nodes, edges)
		}
		None => recompute_stats(nodes, edges),
	}
}

/// Parses and normalizes a raw payload into a [`Graph`].
///
/// Pure transform: no caches are touched here. Callers own pushing the result
/// into the cache-invalidating session.
pub fn load(payload: &str) -> Result<Graph, GraphError> {
	let raw: RawGraph =
		serde_json::from_str(payload).map_err(|e| GraphError::InvalidFormat(e.to_string()))?;

	let nodes: Vec<TableNode> = raw
		.nodes
		.into_iter()
		.map(|n| TableNode {
			schema: derive_schema(&n.label),
			id: n.id,
			label: n.label,
			row_count: n.row_count,
			columns: n.columns.unwrap_or_default(),
			label_tags: n.label_tags,
		})
		.collect();

	let edges: Vec<JoinEdge> = raw
		.edges
		.into_iter()
		.map(|e| JoinEdge {
			id: e.id,
			from: e.from,
			to: e.to,
			label: e.label,
		})
		.collect();

	// Dangling endpoints are tolerated: the neighborhood of a dangling id
	// degrades to the node alone instead of aborting the load.
	for edge in &edges {
		for endpoint in [&edge.from, &edge.to] {
			if !nodes.iter().any(|n| &n.id == endpoint) {
				warn!(
					"tablegraph: edge {} references unknown node {}",
					edge.id, endpoint
				);
			}
		}
	}

	let stats = resolve_stats(raw.stats, &nodes, &edges);
	info!(
		"tablegraph: loaded {} tables, {} joins",
		nodes.len(),
		edges.len()
	);

	Ok(Graph {
		nodes,
		edges,
		stats,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn loads_nodes_and_edges() {
		let graph = load(
			r#"{
				"nodes": [
					{"id": "t1", "label": "public.users", "columns": ["id", "name"]},
					{"id": "t2", "label": "orders", "rowCount": 42, "labelTags": ["fact"]}
				],
				"edges": [
					{"id": "e1", "from": "t1", "to": "t2", "label": "orders.user_id = users.id"}
				]
			}"#,
		)
		.unwrap();

		assert_eq!(graph.nodes.len(), 2);
		assert_eq!(graph.edges.len(), 1);
		assert_eq!(graph.nodes[0].schema, "public");
		assert_eq!(graph.nodes[1].schema, DEFAULT_SCHEMA);
		assert_eq!(graph.nodes[1].row_count, Some(42));
		assert_eq!(graph.nodes[1].label_tags, vec!["fact".to_string()]);
	}

	#[test]
	fn missing_edges_defaults_to_empty() {
		let graph = load(r#"{"nodes": [{"id": "a", "label": "a"}]}"#).unwrap();
		assert!(graph.edges.is_empty());
		assert_eq!(graph.stats.edge_count, 0);
	}

	#[test]
	fn missing_nodes_is_invalid_format() {
		let err = load(r#"{"edges": []}"#).unwrap_err();
		assert!(matches!(err, GraphError::InvalidFormat(_)));
	}

	#[test]
	fn non_sequence_nodes_is_invalid_format() {
		let err = load(r#"{"nodes": {"id": "a"}}"#).unwrap_err();
		assert!(matches!(err, GraphError::InvalidFormat(_)));
	}

	#[test]
	fn absent_stats_are_recomputed() {
		let graph = load(
			r#"{
				"nodes": [{"id": "a", "label": "s.a", "columns": ["x", "y"]},
				          {"id": "b", "label": "s.b", "columns": ["z"]}],
				"edges": [{"id": "e", "from": "a", "to": "b", "label": ""}]
			}"#,
		)
		.unwrap();

		assert_eq!(
			graph.stats,
			GraphStats {
				node_count: 2,
				edge_count: 1,
				table_count: 2,
				column_count: 3,
			}
		);
	}

	#[test]
	fn stale_stats_are_recomputed() {
		let graph = load(
			r#"{
				"nodes": [{"id": "a", "label": "a"}],
				"edges": [],
				"stats": {"nodeCount": 99, "edgeCount": 7, "tableCount": 99, "columnCount": 5}
			}"#,
		)
		.unwrap();

		assert_eq!(graph.stats.node_count, 1);
		assert_eq!(graph.stats.edge_count, 0);
	}

	#[test]
	fn coherent_stats_are_trusted() {
		let graph = load(
			r#"{
				"nodes": [{"id": "a", "label": "a"}],
				"edges": [],
				"stats": {"nodeCount": 1, "edgeCount": 0, "tableCount": 1, "columnCount": 12}
			}"#,
		)
		.unwrap();

		// The server may count columns the sequences don't carry.
		assert_eq!(graph.stats.column_count, 12);
	}

	#[test]
	fn dangling_edge_endpoints_are_tolerated() {
		let graph = load(
			r#"{
				"nodes": [{"id": "a", "label": "a"}],
				"edges": [{"id": "e", "from": "a", "to": "ghost", "label": ""}]
			}"#,
		)
		.unwrap();

		assert_eq!(graph.edges.len(), 1);
	}
}
