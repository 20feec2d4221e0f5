//! Interactive hypergraph view of tables and join relationships.
//!
//! Tables are nodes, joins are edges. The view renders them on an HTML
//! canvas with:
//! - Force-directed layout that freezes once the arrangement settles
//! - Deterministic schema/label-tag coloring shared with the legend
//! - Neighborhood highlighting on hover and selection
//! - Debounced label search, pan, zoom, and node dragging
//!
//! # Example
//!
//! ```ignore
//! use tablegraph::{Graph, HypergraphCanvas};
//!
//! let graph = RwSignal::new(None::<Graph>);
//! let query = RwSignal::new(String::new());
//! let selected = RwSignal::new(None::<String>);
//! let zoom = RwSignal::new(1.0);
//! let error = RwSignal::new(None::<String>);
//!
//! view! {
//!     <HypergraphCanvas graph=graph query=query selected=selected
//!         zoom=zoom error=error fullscreen=true />
//! }
//! ```

pub mod colors;
mod component;
pub mod highlight;
pub mod lifecycle;
pub mod model;
pub mod neighborhood;
mod render;
pub mod search;
pub mod selection;
mod state;
pub mod theme;
mod timing;
mod types;

pub use component::HypergraphCanvas;
pub use model::{Graph, GraphError};
pub use theme::Theme;
