//! Multicast notification lists
//!
//! An [`Event`] owns an ordered list of [`Delegate`]s and dispatches to all
//! of them in registration order. The interesting part of the design is safe
//! removal while a dispatch is in flight: unregistration only *empties* the
//! matching entry in place and raises a pending-cleanup flag; the dispatch
//! loop compacts the list between invocations and re-derives its cursor
//! against the compacted sequence. A delegate can therefore unregister itself
//! or a sibling from inside its own invocation without any live delegate
//! being skipped or any removed one running again.
//!
//! All operations take `&self`: the list lives behind a `RefCell` so that a
//! delegate being dispatched can reach back into the same event. No borrow is
//! ever held across a delegate invocation. The design is strictly
//! single-threaded.

use std::cell::{Cell, RefCell};
use std::fmt;

use crate::delegate::Delegate;

/// Ordered multicast list of delegates sharing one call signature.
///
/// Created empty; delegates are value-copied in by [`Event::register`] and
/// invoked together by [`Event::emit`]. Registration order is significant and
/// preserved across unregistration and compaction.
pub struct Event<Args, Ret = ()> {
    delegates: RefCell<Vec<Delegate<Args, Ret>>>,
    /// Set when at least one entry has been emptied and the list needs
    /// compaction before the next cursor step.
    sweep_pending: Cell<bool>,
}

impl<Args, Ret> Event<Args, Ret> {
    /// Create an empty event.
    pub fn new() -> Self {
        Self {
            delegates: RefCell::new(Vec::new()),
            sweep_pending: Cell::new(false),
        }
    }

    /// Append a delegate to the end of the list.
    ///
    /// No deduplication: registering the same delegate twice makes it run
    /// twice per dispatch and requires two [`Event::unregister`] calls to
    /// fully remove.
    pub fn register(&self, delegate: Delegate<Args, Ret>) {
        let mut delegates = self.delegates.borrow_mut();
        delegates.push(delegate);
        log::trace!("registered delegate ({} entries)", delegates.len());
    }

    /// Empty the first entry equal to `delegate` and mark the list for
    /// compaction. Silent no-op when no entry matches; only one occurrence is
    /// removed per call.
    ///
    /// The emptied entry keeps its position until the next compaction, so an
    /// in-flight dispatch skips it rather than shifting its own cursor.
    pub fn unregister(&self, delegate: &Delegate<Args, Ret>) {
        let mut delegates = self.delegates.borrow_mut();
        match delegates.iter_mut().find(|entry| **entry == *delegate) {
            Some(entry) => {
                entry.reset();
                self.sweep_pending.set(true);
                log::trace!("unregistered delegate; compaction pending");
            }
            None => log::trace!("unregister matched no delegate"),
        }
    }

    /// Dispatch: invoke every live delegate in registration order with its
    /// own stored owner. Return values are discarded.
    ///
    /// Delegates registered from inside a running dispatch are invoked in the
    /// same pass (the cursor re-reads the live list). A panic from a target
    /// propagates to the caller; delegates later in the list do not run for
    /// that pass, but the list itself stays consistent.
    pub fn emit(&self, args: Args)
    where
        Args: Clone,
    {
        self.run(|entry| {
            entry.call(args.clone());
        });
    }

    /// Dispatch with one caller-supplied owner substituted for every
    /// delegate's own owner (free-function delegates ignore it).
    ///
    /// # Safety
    ///
    /// `owner` must be valid for every method delegate currently registered,
    /// of the exact type each was constructed over; see
    /// [`Delegate::call_on`].
    pub unsafe fn emit_on(&self, owner: *mut (), args: Args)
    where
        Args: Clone,
    {
        self.run(|entry| {
            // SAFETY: forwarded from this function's own contract.
            unsafe {
                entry.call_on(owner, args.clone());
            }
        });
    }

    /// Immediately discard all entries and clear the pending-cleanup flag.
    pub fn clear(&self) {
        self.delegates.borrow_mut().clear();
        self.sweep_pending.set(false);
        log::trace!("cleared all delegates");
    }

    /// Alias of [`Event::clear`].
    pub fn reset(&self) {
        self.clear();
    }

    /// Number of live (non-emptied) entries.
    pub fn len(&self) -> usize {
        self.delegates
            .borrow()
            .iter()
            .filter(|entry| !entry.is_empty())
            .count()
    }

    /// True iff no live entry remains.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Core dispatch loop shared by `emit` and `emit_on`.
    ///
    /// The current entry is copied out before invocation so no `RefCell`
    /// borrow is held while user code runs; the invoked delegate may freely
    /// register, unregister, or clear on this same event. After an invocation
    /// that raised the pending-cleanup flag, the list is compacted and the
    /// cursor re-derived against the compacted sequence; a raw index is never
    /// carried across a compaction.
    fn run(&self, mut invoke: impl FnMut(&Delegate<Args, Ret>)) {
        let mut cursor = 0;
        loop {
            let entry = {
                let delegates = self.delegates.borrow();
                match delegates.get(cursor) {
                    Some(entry) => *entry,
                    None => break,
                }
            };
            if !entry.is_empty() {
                invoke(&entry);
            }
            if self.sweep_pending.get() {
                cursor = self.sweep(cursor);
            } else {
                cursor += 1;
            }
        }
    }

    /// Remove every emptied entry, preserving the relative order of the
    /// survivors, and clear the flag.
    ///
    /// Returns the cursor of the next entry to dispatch: the number of live
    /// entries at positions up to and including the one just processed. The
    /// just-processed entry may itself have been emptied (self
    /// unregistration), in which case it simply does not count.
    fn sweep(&self, cursor: usize) -> usize {
        let mut delegates = self.delegates.borrow_mut();
        let mut next = 0;
        let mut position = 0;
        delegates.retain(|entry| {
            let keep = !entry.is_empty();
            if keep && position <= cursor {
                next += 1;
            }
            position += 1;
            keep
        });
        self.sweep_pending.set(false);
        log::trace!("swept emptied delegates; {} remain", delegates.len());
        next
    }
}

impl<Args, Ret> Default for Event<Args, Ret> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args, Ret> fmt::Debug for Event<Args, Ret> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("entries", &self.delegates.borrow().len())
            .field("sweep_pending", &self.sweep_pending.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::cell::RefCell;

    struct Tally {
        hits: Cell<u32>,
    }

    impl Tally {
        fn new() -> Self {
            Self { hits: Cell::new(0) }
        }

        fn bump(&self, _args: ()) {
            self.hits.set(self.hits.get() + 1);
        }
    }

    #[derive(Default)]
    struct Roster {
        seen: RefCell<Vec<&'static str>>,
    }

    impl Roster {
        fn alpha(&self, _args: ()) {
            self.seen.borrow_mut().push("alpha");
        }

        fn beta(&self, _args: ()) {
            self.seen.borrow_mut().push("beta");
        }

        fn gamma(&self, _args: ()) {
            self.seen.borrow_mut().push("gamma");
        }
    }

    #[test]
    fn dispatch_invokes_each_delegate_once_in_registration_order() {
        let roster = Roster::default();
        let event = Event::new();

        event.register(unsafe { Delegate::from_const_method(&roster, Roster::alpha) });
        event.register(unsafe { Delegate::from_const_method(&roster, Roster::beta) });
        event.register(unsafe { Delegate::from_const_method(&roster, Roster::gamma) });

        event.emit(());
        assert_eq!(*roster.seen.borrow(), vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn three_counter_scenario() {
        let (a, b, c) = (Tally::new(), Tally::new(), Tally::new());
        let event = Event::new();

        let on_b = unsafe { Delegate::from_const_method(&b, Tally::bump) };
        event.register(unsafe { Delegate::from_const_method(&a, Tally::bump) });
        event.register(on_b);
        event.register(unsafe { Delegate::from_const_method(&c, Tally::bump) });

        event.emit(());
        assert_eq!(
            (a.hits.get(), b.hits.get(), c.hits.get()),
            (1, 1, 1)
        );

        event.unregister(&on_b);
        event.emit(());
        assert_eq!(
            (a.hits.get(), b.hits.get(), c.hits.get()),
            (2, 1, 2)
        );
    }

    #[test]
    fn duplicate_registration_runs_twice_and_needs_two_unregisters() {
        let tally = Tally::new();
        let event = Event::new();
        let handle = unsafe { Delegate::from_const_method(&tally, Tally::bump) };

        event.register(handle);
        event.register(handle);

        event.emit(());
        assert_eq!(tally.hits.get(), 2);

        event.unregister(&handle);
        event.emit(());
        assert_eq!(tally.hits.get(), 3);

        event.unregister(&handle);
        event.emit(());
        assert_eq!(tally.hits.get(), 3);
    }

    #[test]
    fn unregistering_an_unknown_delegate_is_a_noop() {
        let (known, unknown) = (Tally::new(), Tally::new());
        let event = Event::new();

        event.register(unsafe { Delegate::from_const_method(&known, Tally::bump) });
        let stranger = unsafe { Delegate::from_const_method(&unknown, Tally::bump) };
        event.unregister(&stranger);

        event.emit(());
        assert_eq!(known.hits.get(), 1);
        assert_eq!(event.len(), 1);
    }

    #[test]
    fn clear_discards_everything() {
        let tally = Tally::new();
        let event = Event::new();

        event.register(unsafe { Delegate::from_const_method(&tally, Tally::bump) });
        event.register(unsafe { Delegate::from_const_method(&tally, Tally::bump) });
        event.clear();

        event.emit(());
        assert_eq!(tally.hits.get(), 0);
        assert!(event.is_empty());
    }

    #[test]
    fn reset_is_clear() {
        let tally = Tally::new();
        let event = Event::new();

        event.register(unsafe { Delegate::from_const_method(&tally, Tally::bump) });
        event.reset();

        event.emit(());
        assert_eq!(tally.hits.get(), 0);
    }

    #[test]
    fn len_counts_only_live_entries() {
        let (a, b) = (Tally::new(), Tally::new());
        let event = Event::new();

        let on_a = unsafe { Delegate::from_const_method(&a, Tally::bump) };
        event.register(on_a);
        event.register(unsafe { Delegate::from_const_method(&b, Tally::bump) });
        assert_eq!(event.len(), 2);

        // Before any compaction the emptied entry still occupies its slot,
        // but it no longer counts as live.
        event.unregister(&on_a);
        assert_eq!(event.len(), 1);
        assert!(!event.is_empty());
    }

    #[test]
    fn order_is_preserved_across_unregistration() {
        let roster = Roster::default();
        let event = Event::new();

        let beta = unsafe { Delegate::from_const_method(&roster, Roster::beta) };
        event.register(unsafe { Delegate::from_const_method(&roster, Roster::alpha) });
        event.register(beta);
        event.register(unsafe { Delegate::from_const_method(&roster, Roster::gamma) });

        event.unregister(&beta);
        event.emit(());
        assert_eq!(*roster.seen.borrow(), vec!["alpha", "gamma"]);

        // Compaction ran during the emit; re-registering appends at the end.
        event.register(beta);
        roster.seen.borrow_mut().clear();
        event.emit(());
        assert_eq!(*roster.seen.borrow(), vec!["alpha", "gamma", "beta"]);
    }

    #[test]
    fn emit_on_substitutes_one_owner_for_all() {
        let (bound, substitute) = (Tally::new(), Tally::new());
        let event = Event::new();

        event.register(unsafe { Delegate::from_const_method(&bound, Tally::bump) });
        event.register(unsafe { Delegate::from_const_method(&bound, Tally::bump) });

        unsafe { event.emit_on(&substitute as *const Tally as *mut (), ()) };

        assert_eq!(bound.hits.get(), 0);
        assert_eq!(substitute.hits.get(), 2);
    }
}
