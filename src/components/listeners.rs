//! Browser hooks owned by a mounted visualization. Every hook is an RAII
//! handle: dropping it (on unmount) detaches the listener or stops the clock.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::{debug, error};
use wasm_bindgen::prelude::*;
use web_sys::{Event, EventTarget, HtmlCanvasElement, HtmlInputElement, KeyboardEvent};

use crate::error::{VizError, VizResult};
use crate::playback::{Command, Ticker, TimerGuard};

const FALLBACK_SIZE: (f64, f64) = (800.0, 500.0);

/// Sizes `canvas` to its container and returns the new size.
pub fn fit_to_parent(canvas: &HtmlCanvasElement) -> (f64, f64) {
	let (w, h) = canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.filter(|&(w, h)| w > 0.0 && h > 0.0)
		.unwrap_or(FALLBACK_SIZE);
	canvas.set_width(w as u32);
	canvas.set_height(h as u32);
	(w, h)
}

/// The hooks one mounted visualization holds until it unmounts.
pub struct MountedHooks {
	_frame: Option<AnimationLoop>,
	_keys: Option<ListenerGuard>,
	_resize: Option<ListenerGuard>,
}

impl MountedHooks {
	/// Bundles the hooks so they drop together.
	pub fn new(frame: Option<AnimationLoop>, keys: Option<ListenerGuard>, resize: Option<ListenerGuard>) -> Self {
		Self {
			_frame: frame,
			_keys: keys,
			_resize: resize,
		}
	}
}

/// An attached DOM event listener, removed on drop.
pub struct ListenerGuard {
	target: EventTarget,
	event: &'static str,
	callback: Closure<dyn FnMut(Event)>,
}

impl ListenerGuard {
	/// Listens for `event` on `target`.
	pub fn attach(target: EventTarget, event: &'static str, handler: impl FnMut(Event) + 'static) -> Option<Self> {
		let callback = Closure::<dyn FnMut(Event)>::new(handler);
		if let Err(err) = target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref()) {
			error!("could not listen for {event}: {err:?}");
			return None;
		}
		Some(Self {
			target,
			event,
			callback,
		})
	}

	/// Listens for `event` on the window.
	pub fn on_window(event: &'static str, handler: impl FnMut(Event) + 'static) -> Option<Self> {
		let window = web_sys::window()?;
		Self::attach(window.into(), event, handler)
	}
}

impl Drop for ListenerGuard {
	fn drop(&mut self) {
		let _ = self
			.target
			.remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
	}
}

/// Right, Left, Space and R drive playback unless the user is typing.
pub fn keyboard_shortcuts(dispatch: impl Fn(Command) + 'static) -> Option<ListenerGuard> {
	ListenerGuard::on_window("keydown", move |ev: Event| {
		let Some(ev) = ev.dyn_ref::<KeyboardEvent>() else {
			return;
		};
		if ev.target().is_some_and(|t| t.is_instance_of::<HtmlInputElement>()) {
			return;
		}
		if let Some(command) = Command::from_key(&ev.key()) {
			ev.prevent_default();
			dispatch(command);
		}
	})
}

/// `setInterval` clock. The tick handler is bound after construction because
/// it usually needs a handle to the player that owns this ticker.
pub struct IntervalTicker {
	callback: Closure<dyn FnMut()>,
	handler: Rc<RefCell<Option<Box<dyn Fn()>>>>,
}

impl IntervalTicker {
	/// A stopped ticker with no handler bound.
	pub fn new() -> Self {
		let handler: Rc<RefCell<Option<Box<dyn Fn()>>>> = Rc::new(RefCell::new(None));
		let slot = handler.clone();
		let callback = Closure::<dyn FnMut()>::new(move || {
			if let Some(on_tick) = slot.borrow().as_ref() {
				on_tick();
			}
		});
		Self { callback, handler }
	}

	/// Slot for the tick handler; fill it once the owner exists.
	pub fn handler(&self) -> Rc<RefCell<Option<Box<dyn Fn()>>>> {
		self.handler.clone()
	}
}

impl Default for IntervalTicker {
	fn default() -> Self {
		Self::new()
	}
}

impl Ticker for IntervalTicker {
	fn start(&mut self, period_ms: u32) -> VizResult<TimerGuard> {
		let window = web_sys::window().ok_or_else(|| VizError::Timer("no window".into()))?;
		let handle = window
			.set_interval_with_callback_and_timeout_and_arguments_0(
				self.callback.as_ref().unchecked_ref(),
				period_ms.min(i32::MAX as u32) as i32,
			)
			.map_err(|err| VizError::Timer(format!("{err:?}")))?;
		debug!("interval {handle} started every {period_ms}ms");
		Ok(TimerGuard::new(move || {
			if let Some(window) = web_sys::window() {
				window.clear_interval_with_handle(handle);
			}
		}))
	}
}

/// Keeps a `requestAnimationFrame` loop alive; the loop ends on drop.
pub struct AnimationLoop {
	alive: Rc<Cell<bool>>,
}

impl AnimationLoop {
	/// Calls `frame(dt_ms)` once per animation frame.
	pub fn start(mut frame: impl FnMut(f64) + 'static) -> Option<Self> {
		let window = web_sys::window()?;
		let alive = Rc::new(Cell::new(true));
		let animate: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
		let (animate_inner, alive_inner) = (animate.clone(), alive.clone());
		let mut last: Option<f64> = None;

		*animate.borrow_mut() = Some(Closure::new(move |now: f64| {
			if !alive_inner.get() {
				// Breaks the self-reference so the closure is freed.
				let _ = animate_inner.borrow_mut().take();
				return;
			}
			let dt = last.map_or(16.0, |prev| (now - prev).clamp(0.0, 100.0));
			last = Some(now);
			frame(dt);
			if let (Some(window), Some(cb)) = (web_sys::window(), animate_inner.borrow().as_ref()) {
				let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		let requested = animate
			.borrow()
			.as_ref()
			.map(|cb| window.request_animation_frame(cb.as_ref().unchecked_ref()));
		if let Some(Err(err)) = requested {
			error!("requestAnimationFrame failed: {err:?}");
			let _ = animate.borrow_mut().take();
			return None;
		}
		Some(Self { alive })
	}
}

impl Drop for AnimationLoop {
	fn drop(&mut self) {
		self.alive.set(false);
	}
}
