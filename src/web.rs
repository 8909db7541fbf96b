//! Browser bindings, through [`web_sys`].
//!
//! These only do anything useful on `wasm32` targets running in a browser.
//! Failing DOM calls are logged rather than propagated, since there's nothing a caller could do about them.

use crate::{
	auto_resize::{InputListener, TextInput},
	behavior::{AttachError, CleanupAction},
};
use js_sys::{Function, Object, WeakMap, WeakRef};
use tracing::{error, instrument, trace, warn};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{Element, Event, EventTarget, HtmlInputElement};

const INPUT: &str = "input";

impl TextInput for HtmlInputElement {
	type Listener = DomInputListener;

	fn text_len(&self) -> usize {
		self.value().chars().count()
	}

	fn set_width_ch(&self, width: usize) {
		if let Err(error) = self.style().set_property("width", &format!("{}ch", width)) {
			error!(?error, "Failed to set input width.");
		}
	}

	fn add_input_listener(&self, handler: Box<dyn Fn(&Self)>) -> DomInputListener {
		// The handler gets the element from the event, so the listener doesn't keep it alive.
		let closure = Closure::wrap(Box::new(move |event: Event| {
			match event.current_target().and_then(|target| target.dyn_into::<HtmlInputElement>().ok()) {
				Some(input) => handler(&input),
				None => warn!("Input event without an input element as its current target."),
			}
		}) as Box<dyn Fn(Event)>);

		if let Err(error) = self.add_event_listener_with_callback(INPUT, closure.as_ref().unchecked_ref()) {
			error!(?error, "Failed to add input listener.");
		}
		trace!("Added input listener.");
		DomInputListener {
			target: WeakRef::new(AsRef::<Object>::as_ref(self)),
			closure,
		}
	}
}

/// An `input` event listener on a DOM element. Dropping it without [removing](`InputListener::remove`) it
/// makes the listener throw into JavaScript on the next event.
///
/// The element is only referenced weakly, so a pending listener doesn't keep it alive.
#[derive(Debug)]
pub struct DomInputListener {
	target: WeakRef,
	closure: Closure<dyn Fn(Event)>,
}
impl InputListener for DomInputListener {
	fn remove(self) {
		let target: EventTarget = match self.target.deref() {
			Some(target) => target.unchecked_into(),
			None => {
				trace!("Input element is already gone.");
				return;
			}
		};
		if let Err(error) = target.remove_event_listener_with_callback(INPUT, self.closure.as_ref().unchecked_ref()) {
			error!(?error, "Failed to remove input listener.");
		}
		trace!("Removed input listener.");
	}
}

/// Keeps cleanup actions in a JavaScript [***WeakMap***](https://developer.mozilla.org/en-US/docs/Web/JavaScript/Reference/Global_Objects/WeakMap)
/// keyed by the element itself.
///
/// The map doesn't keep elements alive. An element that is dropped from the document without being detached
/// can still be collected as long as its cleanup action doesn't hold on to it strongly,
/// which [`DomInputListener`] doesn't.
/// The Rust side of a cleanup action that never runs is not freed, though.
#[derive(Debug)]
pub struct DomBehaviorRegistry {
	cleanups: WeakMap,
}
impl Default for DomBehaviorRegistry {
	fn default() -> Self {
		Self::new()
	}
}
impl DomBehaviorRegistry {
	#[must_use]
	pub fn new() -> Self {
		Self { cleanups: WeakMap::new() }
	}

	/// # Errors
	///
	/// Iff `element` already has a behavior attached through this registry. `on_attach` is not called in that case.
	#[instrument(skip_all)]
	pub fn attach<E: AsRef<Element>>(&self, element: &E, on_attach: impl FnOnce(&E) -> CleanupAction) -> Result<(), AttachError<Element>> {
		let key: &Object = element.as_ref().as_ref();
		if self.cleanups.has(key) {
			warn!("Behavior already attached. Detach it first.");
			return Err(AttachError::AlreadyAttached(element.as_ref().clone()));
		}

		let cleanup = on_attach(element);
		if self.cleanups.has(key) {
			warn!("Behavior was attached re-entrantly. Discarding the newer one.");
			cleanup.run();
			return Err(AttachError::AlreadyAttached(element.as_ref().clone()));
		}

		self.cleanups.set(key, &Closure::once_into_js(move || cleanup.run()));
		trace!("Attached behavior.");
		Ok(())
	}

	/// Runs and forgets the cleanup action for `element`. Returns whether there was one.
	#[instrument(skip_all)]
	pub fn detach<E: AsRef<Element>>(&self, element: &E) -> bool {
		let key: &Object = element.as_ref().as_ref();
		let cleanup = self.cleanups.get(key);
		if !self.cleanups.delete(key) {
			return false;
		}

		match cleanup.dyn_into::<Function>() {
			Ok(cleanup) => {
				if let Err(error) = cleanup.call0(&JsValue::UNDEFINED) {
					error!(?error, "Cleanup action threw.");
				}
				trace!("Detached behavior.");
			}
			Err(entry) => error!(?entry, "Cleanup entry is not a function."),
		}
		true
	}

	/// # Errors
	///
	/// Only if the old cleanup action attached a behavior to `element` again.
	pub fn reattach<E: AsRef<Element>>(&self, element: &E, on_attach: impl FnOnce(&E) -> CleanupAction) -> Result<(), AttachError<Element>> {
		self.detach(element);
		self.attach(element, on_attach)
	}

	pub fn is_attached<E: AsRef<Element>>(&self, element: &E) -> bool {
		self.cleanups.has(element.as_ref().as_ref())
	}
}

/// The current `window.location.pathname`, to hand to [`RouteTable::resolve`](`crate::router::RouteTable::resolve`).
#[must_use]
pub fn current_path() -> Option<String> {
	let window = web_sys::window()?;
	match window.location().pathname() {
		Ok(path) => Some(path),
		Err(error) => {
			error!(?error, "Failed to read the location path.");
			None
		}
	}
}
