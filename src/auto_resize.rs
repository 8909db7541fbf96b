//! Keeps a text input exactly as wide as its content, plus a small margin.

use crate::{behavior::CleanupAction, directive::Behavior};
use tracing::trace;

/// Margin in `ch` units used by [`AutoResize::new`].
pub const DEFAULT_MARGIN: usize = 2;

/// A text input as far as [`AutoResize`] is concerned.
pub trait TextInput {
	type Listener: InputListener;

	/// Content length, in characters.
	fn text_len(&self) -> usize;

	/// Sets the rendered width, in `ch` units.
	fn set_width_ch(&self, width: usize);

	/// Calls `handler` with the changed element after each content change.
	fn add_input_listener(&self, handler: Box<dyn Fn(&Self)>) -> Self::Listener;
}

/// A registered input listener, which can unregister itself.
///
/// Implementations should refer to their element only weakly,
/// since they end up in cleanup actions that may outlive it.
pub trait InputListener: 'static {
	fn remove(self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoResize {
	margin: usize,
}
impl Default for AutoResize {
	fn default() -> Self {
		Self::new()
	}
}
impl AutoResize {
	#[must_use]
	pub fn new() -> Self {
		Self::with_margin(DEFAULT_MARGIN)
	}

	#[must_use]
	pub fn with_margin(margin: usize) -> Self {
		Self { margin }
	}

	#[must_use]
	pub fn margin(self) -> usize {
		self.margin
	}

	#[must_use]
	pub fn width_for(self, text_len: usize) -> usize {
		text_len.saturating_add(self.margin)
	}

	/// Adjusts `input` once, without subscribing to changes.
	pub fn adjust<E: TextInput + ?Sized>(self, input: &E) {
		let width = self.width_for(input.text_len());
		trace!(width, "Adjusting width.");
		input.set_width_ch(width);
	}

	/// Adjusts `input` now and after each content change, until the returned action runs.
	pub fn mount<E: TextInput + ?Sized + 'static>(self, input: &E) -> CleanupAction {
		self.adjust(input);
		let listener = input.add_input_listener(Box::new(move |input: &E| self.adjust(input)));
		CleanupAction::new(move || listener.remove())
	}
}
impl<E: TextInput + ?Sized + 'static> Behavior<E> for AutoResize {
	fn mounted(&self, element: &E) -> CleanupAction {
		self.mount(element)
	}
}
