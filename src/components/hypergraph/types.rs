//! Wire-format types for the hypergraph payload.
//!
//! These mirror what the graph endpoint returns: `nodes` is mandatory,
//! `edges` and `stats` may be omitted and are defaulted during normalization.

use serde::Deserialize;

/// A table as it appears on the wire.
#[derive(Clone, Debug, Deserialize)]
pub struct RawNode {
	/// Unique identifier. Edges reference nodes by this id.
	pub id: String,
	/// Qualified display name, `"schema.table"` or a bare table name.
	pub label: String,
	/// Approximate row count, when the server knows it.
	#[serde(default, rename = "rowCount")]
	pub row_count: Option<u64>,
	/// Column names in table order.
	#[serde(default)]
	pub columns: Option<Vec<String>>,
	/// Semantic tags attached to the table (zero or more).
	#[serde(default, rename = "labelTags")]
	pub label_tags: Vec<String>,
}

/// A join relationship as it appears on the wire.
#[derive(Clone, Debug, Deserialize)]
pub struct RawEdge {
	/// Unique identifier for this edge.
	pub id: String,
	/// Source node id.
	pub from: String,
	/// Target node id.
	pub to: String,
	/// Free-text join description (e.g. `"orders.user_id = users.id"`).
	#[serde(default)]
	pub label: String,
}

/// Summary counters the server may send alongside the sequences.
#[derive(Clone, Debug, Deserialize)]
pub struct RawStats {
	/// Number of nodes.
	#[serde(default, rename = "nodeCount")]
	pub node_count: u64,
	/// Number of edges.
	#[serde(default, rename = "edgeCount")]
	pub edge_count: u64,
	/// Number of tables.
	#[serde(default, rename = "tableCount")]
	pub table_count: u64,
	/// Total number of columns across all tables.
	#[serde(default, rename = "columnCount")]
	pub column_count: u64,
}

/// Complete raw payload. Deserialization fails when `nodes` is missing or not
/// a sequence; everything else is optional.
#[derive(Clone, Debug, Deserialize)]
pub struct RawGraph {
	/// Table nodes. Required.
	pub nodes: Vec<RawNode>,
	/// Join edges. Defaults to empty when omitted.
	#[serde(default)]
	pub edges: Vec<RawEdge>,
	/// Optional summary counters; recomputed when absent or incoherent.
	#[serde(default)]
	pub stats: Option<RawStats>,
}
