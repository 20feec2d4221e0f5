//! Leptos component wrapping the hypergraph canvas.
//!
//! Wires the engine to the platform: waits for the surface to gain area,
//! builds the per-load session, runs the rAF loop that advances physics and
//! applies the attribute tables, and translates mouse/wheel/search input into
//! selection-machine transitions. Every asynchronous callback (timers, rAF,
//! events) re-borrows the session slot and no-ops once it is empty, so
//! callbacks that outlive a teardown or reload do nothing.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use log::info;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::lifecycle::{FREEZE_TIMEOUT_MS, SURFACE_POLL_MS};
use super::model::{Graph, GraphError};
use super::render;
use super::search::{self, SEARCH_DEBOUNCE_MS, SearchOutcome};
use super::selection::SelectionEffect;
use super::state::{CLICK_SLOP, HypergraphState};
use super::theme::Theme;
use super::timing::{CancelTimer, poll_until};

/// Shared handle to the live session; `None` while loading or after teardown.
type SessionSlot = Rc<RefCell<Option<HypergraphState>>>;

/// Applies a selection-machine effect to the session and the collaborator
/// signals (detail panel, search box).
fn apply_effect(
	slot: &SessionSlot,
	effect: SelectionEffect,
	selected: RwSignal<Option<String>>,
	query: RwSignal<String>,
) {
	let mut borrow = slot.borrow_mut();
	let Some(state) = borrow.as_mut() else {
		return;
	};

	match effect {
		SelectionEffect::None => {}
		SelectionEffect::Focus {
			id,
			open_panel,
			zoom_to_fit,
		} => {
			state.set_focus(&id);
			if zoom_to_fit {
				state.center_on(&id);
			}
			if open_panel {
				let label = state
					.graph
					.node(&id)
					.map(|n| n.label.clone())
					.unwrap_or_else(|| id.clone());
				selected.set(Some(label));
			}
		}
		SelectionEffect::Ambient {
			close_panel,
			clear_search,
		} => {
			state.set_ambient();
			if close_panel {
				selected.set(None);
			}
			if clear_search {
				query.set(String::new());
			}
		}
	}
}

fn surface_size(canvas: &HtmlCanvasElement, fullscreen: bool) -> (f64, f64) {
	if fullscreen {
		let window: Window = web_sys::window().unwrap();
		(
			window.inner_width().unwrap().as_f64().unwrap(),
			window.inner_height().unwrap().as_f64().unwrap(),
		)
	} else {
		(
			canvas
				.parent_element()
				.map(|p| p.client_width() as f64)
				.unwrap_or(0.0),
			canvas
				.parent_element()
				.map(|p| p.client_height() as f64)
				.unwrap_or(0.0),
		)
	}
}

/// Renders the interactive hypergraph on a canvas element.
///
/// `graph` drives the session lifecycle: every new value tears the previous
/// session down (simulation, neighborhood cache, selection) and builds a
/// fresh one once the surface reports a non-zero size. `query`, `selected`,
/// and `zoom` are the contracts with the search box, the detail panel, and
/// the zoom slider.
#[component]
pub fn HypergraphCanvas(
	#[prop(into)] graph: Signal<Option<Graph>>,
	/// Search text; the component debounces and resolves it.
	query: RwSignal<String>,
	/// Detail-panel collaborator: `Some(label)` opens, `None` closes.
	selected: RwSignal<Option<String>>,
	/// Zoom slider binding, clamped by the lifecycle controller.
	zoom: RwSignal<f64>,
	/// Load-error surface for render-engine initialization failures.
	error: RwSignal<Option<String>>,
	#[prop(default = false)] fullscreen: bool,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let session: SessionSlot = Rc::new(RefCell::new(None));
	let draw_ctx: Rc<RefCell<Option<CanvasRenderingContext2d>>> = Rc::new(RefCell::new(None));
	let theme = Rc::new(Theme::default());
	let alive = Rc::new(Cell::new(true));

	let poll_timer = Rc::new(RefCell::new(CancelTimer::new()));
	let deadline_timer = Rc::new(RefCell::new(CancelTimer::new()));
	let debounce_timer = Rc::new(RefCell::new(CancelTimer::new()));

	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));

	// Animation loop: advance physics, route freeze signals, apply the
	// attribute tables. Started once; it no-ops while no session is live.
	{
		let (session_anim, ctx_anim, theme_anim, alive_anim) = (
			session.clone(),
			draw_ctx.clone(),
			theme.clone(),
			alive.clone(),
		);
		let animate_inner = animate.clone();
		*animate.borrow_mut() = Some(Closure::new(move || {
			if !alive_anim.get() {
				return;
			}
			{
				let mut session = session_anim.borrow_mut();
				let ctx = ctx_anim.borrow();
				if let (Some(state), Some(ctx)) = (session.as_mut(), ctx.as_ref()) {
					if let Some(cause) = state.tick(0.016) {
						info!("tablegraph: layout frozen ({cause:?})");
						zoom.set(state.lifecycle.zoom());
					}
					state.tick_zoom(16.0);
					render::render(state, ctx, &theme_anim);
				}
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				let _ = web_sys::window()
					.unwrap()
					.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate.borrow() {
			let _ = web_sys::window()
				.unwrap()
				.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	}

	// Session lifecycle: reacts to every new graph value. The old session is
	// dropped synchronously (cache and simulation die together) before the
	// surface poll for the replacement begins.
	{
		let (session_init, ctx_init) = (session.clone(), draw_ctx.clone());
		let (poll_init, deadline_init) = (poll_timer.clone(), deadline_timer.clone());
		let theme_init = theme.clone();
		Effect::new(move |_| {
			let next = graph.get();

			poll_init.borrow_mut().cancel();
			deadline_init.borrow_mut().cancel();
			*session_init.borrow_mut() = None;
			selected.set(None);
			query.set(String::new());

			let Some(graph) = next else {
				return;
			};
			let Some(canvas) = canvas_ref.get() else {
				return;
			};
			let canvas: HtmlCanvasElement = canvas.into();

			let graph = Rc::new(graph);
			let (session_ready, ctx_ready) = (session_init.clone(), ctx_init.clone());
			let deadline_ready = deadline_init.clone();
			let theme_ready = theme_init.clone();

			// A zero-area surface would seed a degenerate layout; retry on a
			// short poll until the host reports real dimensions.
			poll_until(poll_init.clone(), SURFACE_POLL_MS, move || {
				let (w, h) = surface_size(&canvas, fullscreen);
				if w <= 0.0 || h <= 0.0 {
					return false;
				}

				canvas.set_width(w as u32);
				canvas.set_height(h as u32);

				let ctx = canvas
					.get_context("2d")
					.ok()
					.flatten()
					.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok());
				let Some(ctx) = ctx else {
					error.set(Some(
						GraphError::RenderEngineLoadFailure(
							"2d canvas context unavailable".to_string(),
						)
						.to_string(),
					));
					return true;
				};

				*ctx_ready.borrow_mut() = Some(ctx);
				*session_ready.borrow_mut() = Some(HypergraphState::new(
					Rc::clone(&graph),
					w,
					h,
					&theme_ready,
				));
				zoom.set(1.0);

				// Hard deadline for the freeze race.
				let session_deadline = session_ready.clone();
				deadline_ready
					.borrow_mut()
					.schedule(FREEZE_TIMEOUT_MS, move || {
						if let Some(state) = session_deadline.borrow_mut().as_mut() {
							if let Some(cause) = state.freeze_deadline() {
								info!("tablegraph: layout frozen ({cause:?})");
								zoom.set(state.lifecycle.zoom());
							}
						}
					});
				true
			});
		});
	}

	// Debounced search: every keystroke reschedules; only the settled text
	// is resolved against the graph.
	{
		let session_search = session.clone();
		let debounce = debounce_timer.clone();
		Effect::new(move |_| {
			let text = query.get();
			let session_fire = session_search.clone();
			debounce
				.borrow_mut()
				.schedule(SEARCH_DEBOUNCE_MS, move || {
					let outcome = {
						let borrow = session_fire.borrow();
						let Some(state) = borrow.as_ref() else {
							return;
						};
						search::resolve_query(&state.graph, &text)
					};
					let effect = {
						let mut borrow = session_fire.borrow_mut();
						let Some(state) = borrow.as_mut() else {
							return;
						};
						match outcome {
							SearchOutcome::Select(id) => state.selection.select(&id, true),
							SearchOutcome::Clear | SearchOutcome::NoMatch => {
								state.selection.clear_to_ambient()
							}
						}
					};
					apply_effect(&session_fire, effect, selected, query);
				});
		});
	}

	// Zoom slider: animate toward externally requested scales. Values the
	// engine itself published (freeze fit, wheel) round-trip as no-ops.
	{
		let session_zoom = session.clone();
		Effect::new(move |_| {
			let requested = zoom.get();
			if let Some(state) = session_zoom.borrow_mut().as_mut() {
				if (requested - state.lifecycle.zoom()).abs() > 0.001 {
					state.set_zoom(requested);
				}
			}
		});
	}

	// Fullscreen canvases track the window size.
	if fullscreen {
		let session_resize = session.clone();
		*resize_cb.borrow_mut() = Some(Closure::new(move || {
			let Some(canvas) = canvas_ref.get_untracked() else {
				return;
			};
			let canvas: HtmlCanvasElement = canvas.into();
			let win: Window = web_sys::window().unwrap();
			let (nw, nh) = (
				win.inner_width().unwrap().as_f64().unwrap(),
				win.inner_height().unwrap().as_f64().unwrap(),
			);
			canvas.set_width(nw as u32);
			canvas.set_height(nh as u32);
			if let Some(state) = session_resize.borrow_mut().as_mut() {
				state.resize(nw, nh);
			}
		}));
		if let Some(ref cb) = *resize_cb.borrow() {
			if let Some(window) = web_sys::window() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}
	}

	let session_md = session.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get_untracked() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let rect = canvas.get_bounding_client_rect();
		let (x, y) = (
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		);

		if let Some(state) = session_md.borrow_mut().as_mut() {
			if let Some((id, idx)) = state.node_at_position(x, y) {
				state.drag.active = true;
				state.drag.node_idx = Some(idx);
				state.drag.node_id = Some(id);
				state.drag.start_x = x;
				state.drag.start_y = y;
				state.drag.moved = false;
				let mut start = (0.0, 0.0);
				state.sim.visit_nodes(|node| {
					if node.index() == idx {
						start = (node.x(), node.y());
					}
				});
				state.drag.node_start_x = start.0;
				state.drag.node_start_y = start.1;
			} else {
				state.pan.active = true;
				state.pan.start_x = x;
				state.pan.start_y = y;
				state.pan.transform_start_x = state.transform.x;
				state.pan.transform_start_y = state.transform.y;
				state.pan.moved = false;
			}
		}
	};

	let session_mm = session.clone();
	let (selected_mm, query_mm) = (selected, query);
	let on_mousemove = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get_untracked() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let rect = canvas.get_bounding_client_rect();
		let (x, y) = (
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		);

		let effect = {
			let mut borrow = session_mm.borrow_mut();
			let Some(state) = borrow.as_mut() else {
				return;
			};

			if state.drag.active {
				let (dx, dy) = (x - state.drag.start_x, y - state.drag.start_y);
				if (dx * dx + dy * dy).sqrt() > CLICK_SLOP {
					state.drag.moved = true;
				}
				if state.drag.moved {
					if let Some(idx) = state.drag.node_idx {
						let (nx, ny) = (
							state.drag.node_start_x + (dx / state.transform.k) as f32,
							state.drag.node_start_y + (dy / state.transform.k) as f32,
						);
						state.sim.visit_nodes_mut(|node| {
							if node.index() == idx {
								node.data.x = nx;
								node.data.y = ny;
								node.data.is_anchor = true;
							}
						});
					}
				}
				SelectionEffect::None
			} else if state.pan.active {
				let (dx, dy) = (x - state.pan.start_x, y - state.pan.start_y);
				if (dx * dx + dy * dy).sqrt() > CLICK_SLOP {
					state.pan.moved = true;
				}
				if state.pan.moved {
					state.transform.x = state.pan.transform_start_x + dx;
					state.transform.y = state.pan.transform_start_y + dy;
				}
				SelectionEffect::None
			} else {
				match state.node_at_position(x, y) {
					Some((id, _)) => state.selection.hover(&id),
					None => state.selection.leave(),
				}
			}
		};
		apply_effect(&session_mm, effect, selected_mm, query_mm);
	};

	let session_mu = session.clone();
	let (selected_mu, query_mu) = (selected, query);
	let on_mouseup = move |_: MouseEvent| {
		let effect = {
			let mut borrow = session_mu.borrow_mut();
			let Some(state) = borrow.as_mut() else {
				return;
			};

			let effect = if state.drag.active {
				if state.drag.moved {
					// A real drag anchors the node where it was dropped.
					if let Some(idx) = state.drag.node_idx {
						state.sim.visit_nodes_mut(|node| {
							if node.index() == idx {
								node.data.is_anchor = true;
							}
						});
					}
					SelectionEffect::None
				} else {
					match state.drag.node_id.take() {
						Some(id) => state.selection.select(&id, false),
						None => SelectionEffect::None,
					}
				}
			} else if state.pan.active && !state.pan.moved {
				state.selection.click_background()
			} else {
				SelectionEffect::None
			};

			state.drag = Default::default();
			state.pan = Default::default();
			effect
		};
		apply_effect(&session_mu, effect, selected_mu, query_mu);
	};

	let session_ml = session.clone();
	let (selected_ml, query_ml) = (selected, query);
	let on_mouseleave = move |_: MouseEvent| {
		let effect = {
			let mut borrow = session_ml.borrow_mut();
			let Some(state) = borrow.as_mut() else {
				return;
			};
			state.drag = Default::default();
			state.pan = Default::default();
			state.selection.leave()
		};
		apply_effect(&session_ml, effect, selected_ml, query_ml);
	};

	let session_wh = session.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(canvas) = canvas_ref.get_untracked() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let rect = canvas.get_bounding_client_rect();
		let (x, y) = (
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		);

		if let Some(state) = session_wh.borrow_mut().as_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			let applied = state.wheel_zoom(x, y, factor);
			zoom.set(applied);
		}
	};

	// Teardown: kill the liveness flag, drop the session (destroying the
	// simulation), and cancel every pending timer. Callbacks still in flight
	// find an empty slot and do nothing.
	{
		let (session_drop, alive_drop) = (session.clone(), alive.clone());
		let (poll_drop, deadline_drop, debounce_drop) = (
			poll_timer.clone(),
			deadline_timer.clone(),
			debounce_timer.clone(),
		);
		// The handles are `Rc` (`!Send`), but `on_cleanup` requires a
		// `Send + Sync` closure. In single-threaded CSR wasm the closure only
		// ever runs on the owning thread, so `SendWrapper` satisfies the bound
		// without changing behavior.
		let cleanup = leptos::__reexports::send_wrapper::SendWrapper::new(move || {
			alive_drop.set(false);
			*session_drop.borrow_mut() = None;
			poll_drop.borrow_mut().cancel();
			deadline_drop.borrow_mut().cancel();
			debounce_drop.borrow_mut().cancel();
		});
		on_cleanup(move || (cleanup.take())());
	}

	view! {
		<canvas
			node_ref=canvas_ref
			class="hypergraph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
