//! Cancellable timers and the one-shot latch.
//!
//! `CancelTimer` wraps `setTimeout` with cancel-and-reschedule semantics: a
//! new `schedule` implicitly cancels the outstanding callback for the same
//! logical operation, so the last write wins. Used for the search debounce,
//! the surface-size poll, and the freeze deadline.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;

/// Fires at most once, ever. "Whichever signal arrives first wins" collapses
/// to checking this latch.
#[derive(Clone, Copy, Debug, Default)]
pub struct OnceLatch {
	fired: bool,
}

impl OnceLatch {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns `true` exactly once; every later call returns `false`.
	pub fn fire(&mut self) -> bool {
		!std::mem::replace(&mut self.fired, true)
	}

	/// Whether the latch has fired.
	pub fn fired(&self) -> bool {
		self.fired
	}
}

/// A `setTimeout` handle where scheduling replaces any pending callback.
#[derive(Default)]
pub struct CancelTimer {
	handle: Option<i32>,
	// Kept alive until the timeout fires or is cancelled.
	closure: Option<Closure<dyn FnMut()>>,
}

impl CancelTimer {
	pub fn new() -> Self {
		Self::default()
	}

	/// Schedules `callback` after `delay_ms`, cancelling any pending schedule.
	pub fn schedule(&mut self, delay_ms: i32, callback: impl FnMut() + 'static) {
		self.cancel();

		let Some(window) = web_sys::window() else {
			return;
		};
		let closure = Closure::new(callback);
		match window.set_timeout_with_callback_and_timeout_and_arguments_0(
			closure.as_ref().unchecked_ref(),
			delay_ms,
		) {
			Ok(handle) => {
				self.handle = Some(handle);
				self.closure = Some(closure);
			}
			Err(_) => {
				self.closure = None;
			}
		}
	}

	/// Cancels the pending callback, if any.
	pub fn cancel(&mut self) {
		if let Some(handle) = self.handle.take() {
			if let Some(window) = web_sys::window() {
				window.clear_timeout_with_handle(handle);
			}
		}
		self.closure = None;
	}
}

impl Drop for CancelTimer {
	fn drop(&mut self) {
		self.cancel();
	}
}

/// Schedules a retrying callback on a shared timer: `poll` runs and, as long
/// as it returns `false`, is rescheduled after `interval_ms`. Used to wait for
/// the host surface to report a non-zero size before starting the simulation.
pub fn poll_until(
	timer: Rc<RefCell<CancelTimer>>,
	interval_ms: i32,
	poll: impl Fn() -> bool + 'static,
) {
	if poll() {
		return;
	}
	let poll = Rc::new(poll);
	schedule_poll(timer, interval_ms, poll);
}

fn schedule_poll(timer: Rc<RefCell<CancelTimer>>, interval_ms: i32, poll: Rc<dyn Fn() -> bool>) {
	let timer_next = Rc::clone(&timer);
	timer.borrow_mut().schedule(interval_ms, move || {
		if !poll() {
			schedule_poll(Rc::clone(&timer_next), interval_ms, Rc::clone(&poll));
		}
	});
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn latch_fires_exactly_once() {
		let mut latch = OnceLatch::new();
		assert!(!latch.fired());
		assert!(latch.fire());
		assert!(latch.fired());
		assert!(!latch.fire());
		assert!(!latch.fire());
	}
}
