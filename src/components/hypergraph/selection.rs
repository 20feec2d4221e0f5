//! Selection state machine gating highlight and side-panel behavior.
//!
//! Selection pins the view: hover transitions are structurally impossible in
//! `Selected`, not suppressed by a flag check. Each transition returns the
//! effect the caller applies; the machine itself touches no attrs, panel, or
//! camera. There is no terminal state; this is a persistent UI loop.

/// Current interaction state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SelectionState {
	/// Nothing hovered or selected.
	#[default]
	Idle,
	/// Pointer is over a node; transient preview.
	Hovering(String),
	/// A node is pinned by click or search.
	Selected(String),
}

/// What the caller must apply after a transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectionEffect {
	/// No visual change required.
	None,
	/// Focus the node's neighborhood.
	Focus {
		/// Node to focus.
		id: String,
		/// Open the detail panel keyed by the node's label.
		open_panel: bool,
		/// Re-center the camera on the node.
		zoom_to_fit: bool,
	},
	/// Restore the ambient baseline.
	Ambient {
		/// Close the detail panel.
		close_panel: bool,
		/// Clear the search text.
		clear_search: bool,
	},
}

/// The Idle/Hovering/Selected machine.
#[derive(Debug, Default)]
pub struct SelectionMachine {
	state: SelectionState,
}

impl SelectionMachine {
	pub fn new() -> Self {
		Self::default()
	}

	/// Current state.
	pub fn state(&self) -> &SelectionState {
		&self.state
	}

	/// Pointer entered a node. Ignored entirely while `Selected`.
	pub fn hover(&mut self, id: &str) -> SelectionEffect {
		match &self.state {
			SelectionState::Selected(_) => SelectionEffect::None,
			SelectionState::Hovering(current) if current == id => SelectionEffect::None,
			_ => {
				self.state = SelectionState::Hovering(id.to_string());
				SelectionEffect::Focus {
					id: id.to_string(),
					open_panel: false,
					zoom_to_fit: false,
				}
			}
		}
	}

	/// Pointer left the hovered node.
	pub fn leave(&mut self) -> SelectionEffect {
		match &self.state {
			SelectionState::Hovering(_) => {
				self.state = SelectionState::Idle;
				SelectionEffect::Ambient {
					close_panel: false,
					clear_search: false,
				}
			}
			_ => SelectionEffect::None,
		}
	}

	/// A node was clicked, or a search query matched it.
	pub fn select(&mut self, id: &str, zoom_to_fit: bool) -> SelectionEffect {
		self.state = SelectionState::Selected(id.to_string());
		SelectionEffect::Focus {
			id: id.to_string(),
			open_panel: true,
			zoom_to_fit,
		}
	}

	/// Empty canvas was clicked.
	pub fn click_background(&mut self) -> SelectionEffect {
		match &self.state {
			SelectionState::Selected(_) => {
				self.state = SelectionState::Idle;
				SelectionEffect::Ambient {
					close_panel: true,
					clear_search: true,
				}
			}
			SelectionState::Hovering(_) => {
				self.state = SelectionState::Idle;
				SelectionEffect::Ambient {
					close_panel: false,
					clear_search: false,
				}
			}
			SelectionState::Idle => SelectionEffect::None,
		}
	}

	/// A query resolved to empty or no match: back to ambient, panel closed,
	/// selection cleared. The search text itself is left to the input.
	pub fn clear_to_ambient(&mut self) -> SelectionEffect {
		self.state = SelectionState::Idle;
		SelectionEffect::Ambient {
			close_panel: true,
			clear_search: false,
		}
	}

	/// Forced reset when a new graph replaces the current one.
	pub fn graph_reloaded(&mut self) -> SelectionEffect {
		self.state = SelectionState::Idle;
		SelectionEffect::Ambient {
			close_panel: true,
			clear_search: true,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn hover_previews_without_opening_the_panel() {
		let mut sm = SelectionMachine::new();

		let effect = sm.hover("a");
		assert_eq!(sm.state(), &SelectionState::Hovering("a".to_string()));
		assert_eq!(
			effect,
			SelectionEffect::Focus {
				id: "a".to_string(),
				open_panel: false,
				zoom_to_fit: false,
			}
		);
	}

	#[test]
	fn re_hovering_the_same_node_is_a_no_op() {
		let mut sm = SelectionMachine::new();
		sm.hover("a");
		assert_eq!(sm.hover("a"), SelectionEffect::None);
	}

	#[test]
	fn leave_returns_to_idle_and_ambient() {
		let mut sm = SelectionMachine::new();
		sm.hover("a");

		let effect = sm.leave();
		assert_eq!(sm.state(), &SelectionState::Idle);
		assert_eq!(
			effect,
			SelectionEffect::Ambient {
				close_panel: false,
				clear_search: false,
			}
		);
	}

	#[test]
	fn click_opens_panel_and_pins_selection() {
		let mut sm = SelectionMachine::new();
		sm.hover("a");

		let effect = sm.select("a", false);
		assert_eq!(sm.state(), &SelectionState::Selected("a".to_string()));
		assert_eq!(
			effect,
			SelectionEffect::Focus {
				id: "a".to_string(),
				open_panel: true,
				zoom_to_fit: false,
			}
		);
	}

	#[test]
	fn hover_is_ignored_while_selected() {
		let mut sm = SelectionMachine::new();
		sm.select("a", false);

		assert_eq!(sm.hover("b"), SelectionEffect::None);
		assert_eq!(sm.state(), &SelectionState::Selected("a".to_string()));
		assert_eq!(sm.leave(), SelectionEffect::None);
	}

	#[test]
	fn background_click_clears_selection_panel_and_search() {
		let mut sm = SelectionMachine::new();
		sm.select("a", false);

		let effect = sm.click_background();
		assert_eq!(sm.state(), &SelectionState::Idle);
		assert_eq!(
			effect,
			SelectionEffect::Ambient {
				close_panel: true,
				clear_search: true,
			}
		);
	}

	#[test]
	fn background_click_while_idle_does_nothing() {
		let mut sm = SelectionMachine::new();
		assert_eq!(sm.click_background(), SelectionEffect::None);
	}

	#[test]
	fn cleared_query_after_a_selection_restores_ambient_and_closes_the_panel() {
		let mut sm = SelectionMachine::new();
		sm.select("a", true);

		let effect = sm.clear_to_ambient();
		assert_eq!(sm.state(), &SelectionState::Idle);
		assert_eq!(
			effect,
			SelectionEffect::Ambient {
				close_panel: true,
				clear_search: false,
			}
		);
	}

	#[test]
	fn search_selection_carries_the_zoom_flag() {
		let mut sm = SelectionMachine::new();
		let effect = sm.select("t1", true);
		assert!(matches!(
			effect,
			SelectionEffect::Focus {
				zoom_to_fit: true,
				..
			}
		));
	}

	#[test]
	fn reload_forces_idle_from_any_state() {
		let mut sm = SelectionMachine::new();
		sm.select("a", false);
		sm.graph_reloaded();
		assert_eq!(sm.state(), &SelectionState::Idle);

		sm.hover("b");
		sm.graph_reloaded();
		assert_eq!(sm.state(), &SelectionState::Idle);
	}
}
