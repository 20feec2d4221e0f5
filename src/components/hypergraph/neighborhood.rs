//! Memoized one-hop connectivity queries.
//!
//! The first query for a node scans the edge list once and caches the result;
//! repeated queries during hover/selection churn are O(1) lookups returning
//! the same `Rc`. The cache lives exactly as long as one loaded graph: it is
//! cleared whole when a new graph replaces the current one, never partially.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use super::model::Graph;

/// Nodes and edges reachable from a node via one edge hop, including the
/// node itself.
#[derive(Clone, Debug, Default)]
pub struct Neighborhood {
	/// Connected node ids, plus the queried id.
	pub nodes: HashSet<String>,
	/// Ids of edges touching the queried node.
	pub edges: HashSet<String>,
}

/// Lazily-built, whole-graph-lifetime cache of neighborhoods.
#[derive(Debug, Default)]
pub struct NeighborhoodIndex {
	cache: HashMap<String, Rc<Neighborhood>>,
}

impl NeighborhoodIndex {
	pub fn new() -> Self {
		Self::default()
	}

	/// The one-hop neighborhood of `id`.
	///
	/// An id no node carries degrades to `{id}` with no edges rather than
	/// failing; a dangling reference should not crash the view.
	pub fn neighborhood_of(&mut self, graph: &Graph, id: &str) -> Rc<Neighborhood> {
		if let Some(hit) = self.cache.get(id) {
			return Rc::clone(hit);
		}

		let mut nodes = HashSet::new();
		let mut edges = HashSet::new();
		nodes.insert(id.to_string());

		for edge in &graph.edges {
			if edge.from == id || edge.to == id {
				edges.insert(edge.id.clone());
				nodes.insert(edge.from.clone());
				nodes.insert(edge.to.clone());
			}
		}

		let entry = Rc::new(Neighborhood { nodes, edges });
		self.cache.insert(id.to_string(), Rc::clone(&entry));
		entry
	}

	/// Clears the entire cache. Must run synchronously whenever a new graph
	/// replaces the current one, even a structurally identical one.
	pub fn invalidate(&mut self) {
		self.cache.clear();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::hypergraph::model;

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
	fn every_node_is_in_its_own_neighborhood() {
		let graph = make_test_graph();
		let mut index = NeighborhoodIndex::new();

		for id in ["a", "b", "c"] {
			assert!(index.neighborhood_of(&graph, id).nodes.contains(id));
		}
	}

	#[test]
	fn collects_one_hop_nodes_and_edges() {
		let graph = make_test_graph();
		let mut index = NeighborhoodIndex::new();

		let nb = index.neighborhood_of(&graph, "b");
		assert_eq!(nb.nodes.len(), 3);
		assert_eq!(nb.edges.len(), 2);

		let nb = index.neighborhood_of(&graph, "a");
		assert!(nb.nodes.contains("a") && nb.nodes.contains("b"));
		assert!(!nb.nodes.contains("c"));
		assert!(nb.edges.contains("ab") && !nb.edges.contains("bc"));
	}

	#[test]
	fn repeated_queries_return_the_cached_entry() {
		let graph = make_test_graph();
		let mut index = NeighborhoodIndex::new();

		let first = index.neighborhood_of(&graph, "a");
		let second = index.neighborhood_of(&graph, "a");
		assert!(Rc::ptr_eq(&first, &second));
	}

	#[test]
	fn invalidate_clears_everything() {
		let graph = make_test_graph();
		let mut index = NeighborhoodIndex::new();

		let before = index.neighborhood_of(&graph, "a");
		index.invalidate();
		let after = index.neighborhood_of(&graph, "a");

		assert!(!Rc::ptr_eq(&before, &after));
	}

	#[test]
	fn unknown_id_degrades_to_itself_alone() {
		let graph = make_test_graph();
		let mut index = NeighborhoodIndex::new();

		let nb = index.neighborhood_of(&graph, "ghost");
		assert_eq!(nb.nodes.len(), 1);
		assert!(nb.nodes.contains("ghost"));
		assert!(nb.edges.is_empty());
	}
}
