//! Identity-keyed bookkeeping for behaviors bound to an element's lifetime.
//!
//! A [`BehaviorRegistry`] never stores elements, only their [identities](`Identified`) and the
//! [`CleanupAction`] that undoes whatever was set up when the behavior was attached.
//! It therefore can't be the reason an otherwise unreferenced element stays alive,
//! as long as cleanup actions themselves only hold on to elements weakly.

use core::{
	cell::RefCell,
	fmt::{self, Debug, Display, Formatter},
	hash::Hash,
	sync::atomic::{AtomicU64, Ordering},
};
use hashbrown::{hash_map::Entry, HashMap};
use tracing::{instrument, trace, warn};

/// An opaque, process-unique element identity.
///
/// Identities are handed out by a monotonic counter and are never reused,
/// so a stale registry entry can't be confused with a newer element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(u64);
impl ElementId {
	/// Mints a new identity that no other element has had or will have.
	#[must_use]
	pub fn fresh() -> Self {
		static NEXT: AtomicU64 = AtomicU64::new(1);
		Self(NEXT.fetch_add(1, Ordering::Relaxed))
	}

	#[must_use]
	pub fn get(self) -> u64 {
		self.0
	}
}
impl Display for ElementId {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// Maps a host element to the identity a [`BehaviorRegistry`] keys it by.
pub trait Identified {
	type Identity: Eq + Hash + Clone + Debug;

	fn identity(&self) -> Self::Identity;
}
impl Identified for ElementId {
	type Identity = Self;

	fn identity(&self) -> Self {
		*self
	}
}

/// Undoes a behavior's side effects. Runs at most once, since running it consumes it.
pub struct CleanupAction(Box<dyn FnOnce()>);
impl CleanupAction {
	pub fn new(action: impl FnOnce() + 'static) -> Self {
		Self(Box::new(action))
	}

	/// A cleanup action for behaviors that leave nothing behind.
	#[must_use]
	pub fn noop() -> Self {
		Self::new(|| ())
	}

	pub fn run(self) {
		(self.0)();
	}
}
impl Debug for CleanupAction {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_tuple("CleanupAction").finish_non_exhaustive()
	}
}

/// Returned when attaching to an element that still has a behavior attached.
///
/// This is a caller error: the previous behavior must be detached first (or use [`BehaviorRegistry::reattach`]).
/// Overwriting silently would leak the previous behavior's listeners.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttachError<I> {
	#[error("a behavior is already attached to element {0:?}")]
	AlreadyAttached(I),
}

/// Associates at most one [`CleanupAction`] with each element identity.
///
/// All methods take `&self` and release the internal borrow before running caller code,
/// so attach and cleanup callbacks may call back into the same registry.
pub struct BehaviorRegistry<I = ElementId>
where
	I: Eq + Hash,
{
	entries: RefCell<HashMap<I, CleanupAction>>,
}
impl<I: Eq + Hash> Default for BehaviorRegistry<I> {
	fn default() -> Self {
		Self { entries: RefCell::new(HashMap::new()) }
	}
}
impl<I: Eq + Hash + Debug> Debug for BehaviorRegistry<I> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		let entries = self.entries.borrow();
		f.debug_struct("BehaviorRegistry").field("attached", &entries.keys().collect::<Vec<_>>()).finish()
	}
}
impl<I> BehaviorRegistry<I>
where
	I: Eq + Hash + Clone + Debug,
{
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Runs `on_attach` for `element` and stores the returned cleanup action under its identity.
	///
	/// # Errors
	///
	/// Iff `element` already has an action registered. `on_attach` is not called in that case.
	#[instrument(skip_all)]
	pub fn attach<E>(&self, element: &E, on_attach: impl FnOnce(&E) -> CleanupAction) -> Result<(), AttachError<I>>
	where
		E: Identified<Identity = I> + ?Sized,
	{
		let identity = element.identity();
		if self.entries.borrow().contains_key(&identity) {
			warn!(?identity, "Behavior already attached. Detach it first.");
			return Err(AttachError::AlreadyAttached(identity));
		}

		let cleanup = on_attach(element);

		// `on_attach` may have re-entered, so check again before inserting.
		let rejected = match self.entries.borrow_mut().entry(identity.clone()) {
			Entry::Vacant(vacant) => {
				vacant.insert(cleanup);
				None
			}
			Entry::Occupied(_) => Some(cleanup),
		};
		if let Some(cleanup) = rejected {
			warn!(?identity, "Behavior was attached re-entrantly. Discarding the newer one.");
			cleanup.run();
			return Err(AttachError::AlreadyAttached(identity));
		}

		trace!(?identity, "Attached behavior.");
		Ok(())
	}

	/// Runs and forgets the cleanup action for `element`, if there is one.
	///
	/// Returns whether an action ran. Detaching an element without a behavior is a no-op.
	pub fn detach<E>(&self, element: &E) -> bool
	where
		E: Identified<Identity = I> + ?Sized,
	{
		self.detach_identity(&element.identity())
	}

	#[instrument(skip(self))]
	pub fn detach_identity(&self, identity: &I) -> bool {
		let removed = self.entries.borrow_mut().remove(identity);
		match removed {
			Some(cleanup) => {
				cleanup.run();
				trace!("Detached behavior.");
				true
			}
			None => false,
		}
	}

	/// Explicitly replaces the behavior on `element`: detaches any current one, then attaches anew.
	///
	/// # Errors
	///
	/// Only if the old cleanup action attached a behavior to `element` again.
	pub fn reattach<E>(&self, element: &E, on_attach: impl FnOnce(&E) -> CleanupAction) -> Result<(), AttachError<I>>
	where
		E: Identified<Identity = I> + ?Sized,
	{
		self.detach(element);
		self.attach(element, on_attach)
	}

	pub fn is_attached<E>(&self, element: &E) -> bool
	where
		E: Identified<Identity = I> + ?Sized,
	{
		self.entries.borrow().contains_key(&element.identity())
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.entries.borrow().len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.entries.borrow().is_empty()
	}

	/// Runs every pending cleanup action, including any attached by those actions. Returns how many ran.
	pub fn detach_all(&self) -> usize {
		let mut count = 0;
		loop {
			// The borrow ends here, so cleanup actions may touch the registry.
			let entries = core::mem::take(&mut *self.entries.borrow_mut());
			if entries.is_empty() {
				break;
			}
			for (_, cleanup) in entries {
				cleanup.run();
				count += 1;
			}
		}
		trace!("Detached {} behavior(s).", count);
		count
	}
}
impl<I: Eq + Hash> Drop for BehaviorRegistry<I> {
	fn drop(&mut self) {
		let entries = core::mem::take(self.entries.get_mut());
		if !entries.is_empty() {
			warn!("{} behavior(s) were never detached. Running their cleanup now.", entries.len());
		}
		for (_, cleanup) in entries {
			cleanup.run();
		}
	}
}
