//! Wires a [`Behavior`] into the two lifecycle hooks a rendering host calls per element.

use crate::behavior::{AttachError, BehaviorRegistry, CleanupAction, ElementId, Identified};
use core::{fmt::Debug, hash::Hash};
use tracing::debug;

/// Reactive logic that is set up when an element is mounted.
///
/// The returned [`CleanupAction`] must undo everything `mounted` did.
pub trait Behavior<E: ?Sized> {
	fn mounted(&self, element: &E) -> CleanupAction;
}
impl<E: ?Sized, F> Behavior<E> for F
where
	F: Fn(&E) -> CleanupAction,
{
	fn mounted(&self, element: &E) -> CleanupAction {
		self(element)
	}
}

/// One behavior plus the registry tracking which elements it is currently bound to.
///
/// The host calls [`Directive::on_element_created`] once an element exists
/// and [`Directive::on_element_destroyed`] just before it goes away.
#[derive(Debug)]
pub struct Directive<B, I = ElementId>
where
	I: Eq + Hash,
{
	behavior: B,
	registry: BehaviorRegistry<I>,
}
impl<B, I> Directive<B, I>
where
	I: Eq + Hash + Clone + Debug,
{
	pub fn new(behavior: B) -> Self {
		Self { behavior, registry: BehaviorRegistry::new() }
	}

	/// Mount hook.
	///
	/// # Errors
	///
	/// Iff the element is already bound, which means the host called this twice without an unmount in between.
	pub fn on_element_created<E>(&self, element: &E) -> Result<(), AttachError<I>>
	where
		E: Identified<Identity = I> + ?Sized,
		B: Behavior<E>,
	{
		self.registry.attach(element, |element| self.behavior.mounted(element))
	}

	/// Unmount hook. Returns whether a behavior was released.
	pub fn on_element_destroyed<E>(&self, element: &E) -> bool
	where
		E: Identified<Identity = I> + ?Sized,
	{
		let released = self.registry.detach(element);
		if !released {
			debug!("Unmounted element had no behavior bound.");
		}
		released
	}

	pub fn behavior(&self) -> &B {
		&self.behavior
	}

	pub fn registry(&self) -> &BehaviorRegistry<I> {
		&self.registry
	}
}
