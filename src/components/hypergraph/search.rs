//! Text-query-to-focus translation.
//!
//! The component debounces keystrokes (200 ms, last write wins) and hands the
//! settled text to [`resolve_query`]. Matching is a case-insensitive substring
//! scan over node labels in canonical sequence order; the first match wins.

use super::model::Graph;

/// Debounce delay between the last keystroke and query resolution.
pub const SEARCH_DEBOUNCE_MS: i32 = 200;

/// What a settled query asks the view to do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
	/// Empty or whitespace-only query: restore ambient, clear selection.
	Clear,
	/// A label matched: select this node and zoom to it.
	Select(String),
	/// Nothing matched: ambient, selection stays cleared, detail panel closes.
	NoMatch,
}

/// Resolves a settled query against the loaded graph.
pub fn resolve_query(graph: &Graph, text: &str) -> SearchOutcome {
	let needle = text.trim();
	if needle.is_empty() {
		return SearchOutcome::Clear;
	}

	let needle = needle.to_lowercase();
	graph
		.nodes
		.iter()
		.find(|n| n.label.to_lowercase().contains(&needle))
		.map(|n| SearchOutcome::Select(n.id.clone()))
		.unwrap_or(SearchOutcome::NoMatch)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::hypergraph::model;

	fn make_test_graph() -> Graph {
		model::load(
			r#"{
				"nodes": [
					{"id": "t1", "label": "public.users"},
					{"id": "t2", "label": "public.user_sessions"},
					{"id": "t3", "label": "audit.events"}
				]
			}"#,
		)
		.unwrap()
	}

	#[test]
	fn empty_and_whitespace_queries_clear() {
		let graph = make_test_graph();
		assert_eq!(resolve_query(&graph, ""), SearchOutcome::Clear);
		assert_eq!(resolve_query(&graph, "   "), SearchOutcome::Clear);
	}

	#[test]
	fn match_is_case_insensitive_substring() {
		let graph = make_test_graph();
		assert_eq!(
			resolve_query(&graph, "EVENTS"),
			SearchOutcome::Select("t3".to_string())
		);
	}

	#[test]
	fn first_match_in_sequence_order_wins() {
		let graph = make_test_graph();
		// "user" matches t1 and t2; canonical order picks t1.
		assert_eq!(
			resolve_query(&graph, "user"),
			SearchOutcome::Select("t1".to_string())
		);
	}

	#[test]
	fn no_match_reports_no_match() {
		let graph = make_test_graph();
		assert_eq!(resolve_query(&graph, "payments"), SearchOutcome::NoMatch);
	}
}
