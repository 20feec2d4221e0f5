//! tablegraph: interactive hypergraph visualization of database tables.
//!
//! This crate provides a WASM-based graph exploration view that renders a
//! table/join graph with physics-based layout, neighborhood highlighting,
//! label search, and a schema-colored legend.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::Response;

pub mod components;

pub use components::hypergraph::{Graph, GraphError, HypergraphCanvas};

use components::hypergraph::{colors, model};

/// Endpoint serving the `{nodes, edges, stats}` payload.
const GRAPH_ENDPOINT: &str = "/api/hypergraph";

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("tablegraph: logging initialized");
}

fn fetch_err(e: wasm_bindgen::JsValue) -> GraphError {
	GraphError::FetchFailure(format!("{e:?}"))
}

/// Retrieves and parses the graph payload. One attempt; every failure is
/// terminal for this load and surfaced to the caller.
async fn fetch_graph(url: &str) -> Result<Graph, GraphError> {
	let window =
		web_sys::window().ok_or_else(|| GraphError::FetchFailure("no window".to_string()))?;

	let response = JsFuture::from(window.fetch_with_str(url))
		.await
		.map_err(fetch_err)?;
	let response: Response = response
		.dyn_into()
		.map_err(|_| GraphError::FetchFailure("unexpected fetch result".to_string()))?;
	if !response.ok() {
		return Err(GraphError::FetchFailure(format!(
			"HTTP {}",
			response.status()
		)));
	}

	let text = JsFuture::from(response.text().map_err(fetch_err)?)
		.await
		.map_err(fetch_err)?;
	let text = text
		.as_string()
		.ok_or_else(|| GraphError::FetchFailure("non-text response body".to_string()))?;

	model::load(&text)
}

/// Main application component.
///
/// Fetches the graph once, renders the hypergraph canvas, and owns the
/// overlay collaborators: search box, zoom slider, legend, detail panel, and
/// the visible error state. Load failures never retry automatically; the
/// reload button re-triggers the fetch.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let graph = RwSignal::new(None::<Graph>);
	let error = RwSignal::new(None::<String>);
	let query = RwSignal::new(String::new());
	let selected = RwSignal::new(None::<String>);
	let zoom = RwSignal::new(1.0_f64);

	let load = move || {
		error.set(None);
		spawn_local(async move {
			match fetch_graph(GRAPH_ENDPOINT).await {
				Ok(g) => graph.set(Some(g)),
				Err(e) => {
					warn!("tablegraph: load failed: {e}");
					error.set(Some(e.to_string()));
				}
			}
		});
	};
	load();

	let legend = move || {
		graph.get().map(|g| {
			let schemas = colors::assign_schema_colors(&g.nodes);
			let tags = colors::assign_label_colors(&g.nodes);
			let schema_entries = schemas
				.into_iter()
				.map(|(name, c)| {
					let swatch = format!(
						"background: {}; border: 2px solid {};",
						c.fill.to_css(),
						c.border.to_css()
					);
					view! {
						<div class="legend-entry">
							<span class="legend-swatch" style=swatch></span>
							{name}
						</div>
					}
				})
				.collect_view();
			let tag_entries = tags
				.into_iter()
				.map(|(name, c)| {
					let swatch = format!("background: {};", c.to_css());
					view! {
						<div class="legend-entry">
							<span class="legend-swatch" style=swatch></span>
							{name}
						</div>
					}
				})
				.collect::<Vec<_>>();
			view! {
				<div class="graph-legend">
					<h3>"Schemas"</h3>
					{schema_entries}
					{(!tag_entries.is_empty()).then(|| view! { <h3>"Labels"</h3> })}
					{tag_entries}
				</div>
			}
		})
	};

	let panel = move || {
		selected.get().map(|label| {
			let details = graph
				.get()
				.and_then(|g| g.nodes.iter().find(|n| n.label == label).cloned());
			view! {
				<aside class="detail-panel">
					<header>
						<h2>{label.clone()}</h2>
						<button on:click=move |_| selected.set(None)>"Close"</button>
					</header>
					{details.map(|node| {
						let rows = node.row_count.map(|rows| {
							view! {
								<dt>"Rows"</dt>
								<dd>{rows.to_string()}</dd>
							}
						});
						let columns = (!node.columns.is_empty()).then(|| {
							view! {
								<dt>"Columns"</dt>
								<dd>{node.columns.join(", ")}</dd>
							}
						});
						let labels = (!node.label_tags.is_empty()).then(|| {
							view! {
								<dt>"Labels"</dt>
								<dd>{node.label_tags.join(", ")}</dd>
							}
						});
						view! {
							<dl>
								<dt>"Schema"</dt>
								<dd>{node.schema.clone()}</dd>
								{rows}
								{columns}
								{labels}
							</dl>
						}
					})}
				</aside>
			}
		})
	};

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Table Hypergraph" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			<HypergraphCanvas
				graph=graph
				query=query
				selected=selected
				zoom=zoom
				error=error
				fullscreen=true
			/>
			<div class="graph-overlay">
				<h1>"Table Hypergraph"</h1>
				<input
					type="search"
					class="graph-search"
					placeholder="Search tables…"
					prop:value=move || query.get()
					on:input=move |ev| query.set(event_target_value(&ev))
				/>
				<label class="zoom-control">
					"Zoom"
					<input
						type="range"
						min="0.1"
						max="2.0"
						step="0.05"
						prop:value=move || zoom.get().to_string()
						on:input=move |ev| {
							if let Ok(v) = event_target_value(&ev).parse::<f64>() {
								zoom.set(v);
							}
						}
					/>
				</label>
				{legend}
			</div>
			{panel}
			{move || {
				error
					.get()
					.map(|message| {
						view! {
							<div class="graph-error">
								<p>{message}</p>
								<button on:click=move |_| load()>"Reload"</button>
							</div>
						}
					})
			}}
		</div>
	}
}
