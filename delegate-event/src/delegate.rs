//! Single-target callback handles
//!
//! A [`Delegate`] wraps "a function, optionally bound to an owning instance"
//! behind one fixed-signature call surface. Free functions, mutating methods,
//! and const methods all erase to the same two-pointer representation: an
//! opaque owner pointer and a trampoline that knows how to re-invoke the real
//! target. Because the representation is pure pointers, delegates have value
//! semantics (`Copy`) and compare by identity, which is what [`Event`]
//! unregistration keys on.
//!
//! The call signature `Ret(Args...)` is rendered as a single argument payload
//! type: use `()` for no arguments and a tuple such as `(i32, i32)` for
//! several.
//!
//! [`Event`]: crate::event::Event

use std::cmp::Ordering;
use std::fmt;
use std::mem;
use std::ptr;

/// Trampoline signature shared by every delegate of one call signature.
///
/// The first pointer is the erased real target (a `fn` pointer cast to a data
/// pointer), the second is the owner instance (null for free functions).
type Stub<Args, Ret> = fn(*const (), *mut (), Args) -> Ret;

/// A callable of a fixed signature, optionally bound to an owning instance.
///
/// `Args` is the argument payload (a tuple for multi-argument signatures) and
/// `Ret` the return type. A delegate is *empty* until constructed from a
/// target; invoking an empty delegate is a precondition violation and panics.
///
/// Delegates do not own or track the lifetime of their bound instance. The
/// caller of [`Delegate::from_method`] / [`Delegate::from_const_method`]
/// guarantees the instance outlives every invocation.
///
/// Raw owner pointers make this type `!Send`/`!Sync`; the whole design is
/// single-threaded.
pub struct Delegate<Args, Ret = ()> {
    /// Opaque owner instance; null for free functions and empty delegates.
    owner: *mut (),
    /// Erased pointer to the real target function or method.
    callee: *const (),
    /// Trampoline; `None` marks the empty state.
    stub: Option<Stub<Args, Ret>>,
}

impl<Args, Ret> Delegate<Args, Ret> {
    /// Create an empty delegate.
    pub fn new() -> Self {
        Self {
            owner: ptr::null_mut(),
            callee: ptr::null(),
            stub: None,
        }
    }

    /// Create a delegate from a free function.
    ///
    /// The resulting delegate has no owner; the stored function is invoked
    /// directly. Never fails.
    pub fn from_fn(function: fn(Args) -> Ret) -> Self {
        let stub: Stub<Args, Ret> = Self::function_stub;
        Self {
            owner: ptr::null_mut(),
            callee: function as *const (),
            stub: Some(stub),
        }
    }

    /// Create a delegate bound to a mutating method of `instance`.
    ///
    /// # Safety
    ///
    /// `instance` must be non-null, well aligned, and valid for exclusive
    /// access for the duration of every future invocation of the delegate
    /// (and of any [`Event`](crate::event::Event) dispatch that reaches it).
    /// The delegate stores the pointer without tracking the instance's
    /// lifetime; a dangling owner is undetectable here.
    pub unsafe fn from_method<T>(instance: *mut T, method: fn(&mut T, Args) -> Ret) -> Self {
        let stub: Stub<Args, Ret> = Self::method_stub::<T>;
        Self {
            owner: instance as *mut (),
            callee: method as *const (),
            stub: Some(stub),
        }
    }

    /// Create a delegate bound to a const method of `instance`.
    ///
    /// The trampoline only ever forms a shared reference to the instance.
    ///
    /// # Safety
    ///
    /// `instance` must be non-null, well aligned, and valid for shared access
    /// for the duration of every future invocation of the delegate.
    pub unsafe fn from_const_method<T>(instance: *const T, method: fn(&T, Args) -> Ret) -> Self {
        let stub: Stub<Args, Ret> = Self::const_method_stub::<T>;
        Self {
            owner: instance as *mut T as *mut (),
            callee: method as *const (),
            stub: Some(stub),
        }
    }

    /// Invoke the delegate with its stored owner.
    ///
    /// # Panics
    ///
    /// Panics if the delegate is empty. Callers that cannot rule this out
    /// (notably the dispatch loop) check [`Delegate::is_empty`] first.
    pub fn call(&self, args: Args) -> Ret {
        // SAFETY: the stored owner was supplied through a constructor whose
        // contract guarantees its validity at invocation time.
        unsafe { self.call_on(self.owner, args) }
    }

    /// Invoke the delegate with a caller-supplied owner instead of the stored
    /// one. Free-function delegates ignore the owner entirely.
    ///
    /// # Safety
    ///
    /// For method delegates, `owner` must point to a valid instance of the
    /// exact type the delegate was constructed over; the trampoline casts it
    /// back unchecked.
    ///
    /// # Panics
    ///
    /// Panics if the delegate is empty.
    pub unsafe fn call_on(&self, owner: *mut (), args: Args) -> Ret {
        match self.stub {
            Some(stub) => stub(self.callee, owner, args),
            None => panic!("attempted to invoke an empty delegate"),
        }
    }

    /// True iff no target is bound.
    pub fn is_empty(&self) -> bool {
        self.stub.is_none()
    }

    /// Clear the trampoline, transitioning to the empty state.
    ///
    /// The owner pointer becomes meaningless and is never read again.
    pub fn reset(&mut self) {
        self.stub = None;
    }

    /// Trampoline for free functions; the owner slot is ignored.
    fn function_stub(callee: *const (), _owner: *mut (), args: Args) -> Ret {
        // SAFETY: `callee` was produced by `from_fn` from exactly this fn type.
        let function: fn(Args) -> Ret = unsafe { mem::transmute(callee) };
        function(args)
    }

    /// Trampoline for mutating methods.
    fn method_stub<T>(callee: *const (), owner: *mut (), args: Args) -> Ret {
        // SAFETY: `callee` and `owner` were paired by `from_method::<T>`; the
        // constructor contract makes the owner valid for exclusive access.
        let method: fn(&mut T, Args) -> Ret = unsafe { mem::transmute(callee) };
        let instance = unsafe { &mut *(owner as *mut T) };
        method(instance, args)
    }

    /// Trampoline for const methods; only a shared reference is formed.
    fn const_method_stub<T>(callee: *const (), owner: *mut (), args: Args) -> Ret {
        // SAFETY: as for `method_stub`, but shared access suffices.
        let method: fn(&T, Args) -> Ret = unsafe { mem::transmute(callee) };
        let instance = unsafe { &*(owner as *const T) };
        method(instance, args)
    }
}

impl<Args, Ret> Default for Delegate<Args, Ret> {
    fn default() -> Self {
        Self::new()
    }
}

// Manual Clone/Copy/PartialEq impls: the derived ones would put bounds on
// `Args`/`Ret`, which only appear behind fn pointers here.
impl<Args, Ret> Clone for Delegate<Args, Ret> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Args, Ret> Copy for Delegate<Args, Ret> {}

/// Identity equality: owner pointer and trampoline must both match.
///
/// Two delegates built from the same free function (or the same method on the
/// same instance) compare equal even when constructed separately. Equality is
/// *not* behavioral: different functions with identical behavior are unequal.
impl<Args, Ret> PartialEq for Delegate<Args, Ret> {
    fn eq(&self, other: &Self) -> bool {
        self.owner == other.owner && self.callee == other.callee && self.stub == other.stub
    }
}

impl<Args, Ret> Eq for Delegate<Args, Ret> {}

/// Component-wise pointer ordering.
///
/// A delegate is `Less` only when *both* its owner and its trampoline compare
/// less (and likewise for `Greater`). This is deliberately not a total order:
/// for most delegate pairs `partial_cmp` returns `None`. It exists for parity
/// with equality, not for sorting; do not use delegates as ordered keys.
impl<Args, Ret> PartialOrd for Delegate<Args, Ret> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self == other {
            Some(Ordering::Equal)
        } else if self.owner < other.owner && (self.callee, self.stub) < (other.callee, other.stub)
        {
            Some(Ordering::Less)
        } else if self.owner > other.owner && (self.callee, self.stub) > (other.callee, other.stub)
        {
            Some(Ordering::Greater)
        } else {
            None
        }
    }
}

impl<Args, Ret> fmt::Debug for Delegate<Args, Ret> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delegate")
            .field("owner", &self.owner)
            .field("callee", &self.callee)
            .field("bound", &self.stub.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn sum(args: (i32, i32)) -> i32 {
        args.0 + args.1
    }

    fn product(args: (i32, i32)) -> i32 {
        args.0 * args.1
    }

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

    struct Accumulator {
        values: Vec<i32>,
    }

    impl Accumulator {
        fn push(&mut self, args: (i32,)) {
            self.values.push(args.0);
        }
    }

    #[test]
    fn from_fn_matches_direct_call() {
        let handle = Delegate::from_fn(sum);
        assert_eq!(handle.call((1, 2)), sum((1, 2)));
        assert_eq!(handle.call((40, 2)), 42);
    }

    #[test]
    fn from_method_has_same_side_effect_as_direct_call() {
        let mut via_delegate = Accumulator { values: Vec::new() };
        let handle = unsafe { Delegate::from_method(&mut via_delegate, Accumulator::push) };
        handle.call((7,));
        handle.call((8,));

        let mut direct = Accumulator { values: Vec::new() };
        direct.push((7,));
        direct.push((8,));

        assert_eq!(via_delegate.values, direct.values);
    }

    #[test]
    fn from_const_method_reads_through_shared_reference() {
        let tally = Tally::new();
        let handle = unsafe { Delegate::from_const_method(&tally, Tally::bump) };
        handle.call(());
        handle.call(());
        assert_eq!(tally.hits.get(), 2);
    }

    #[test]
    fn call_on_substitutes_the_owner() {
        let bound = Tally::new();
        let other = Tally::new();
        let handle = unsafe { Delegate::from_const_method(&bound, Tally::bump) };

        unsafe { handle.call_on(&other as *const Tally as *mut (), ()) };

        assert_eq!(bound.hits.get(), 0);
        assert_eq!(other.hits.get(), 1);
    }

    #[test]
    fn call_on_is_ignored_by_function_delegates() {
        let tally = Tally::new();
        let handle = Delegate::from_fn(sum);
        // A substituted owner is irrelevant for a free function.
        let result = unsafe { handle.call_on(&tally as *const Tally as *mut (), (2, 3)) };
        assert_eq!(result, 5);
        assert_eq!(tally.hits.get(), 0);
    }

    #[test]
    fn new_delegate_is_empty_and_reset_returns_to_empty() {
        let mut handle: Delegate<(i32, i32), i32> = Delegate::new();
        assert!(handle.is_empty());

        handle = Delegate::from_fn(sum);
        assert!(!handle.is_empty());

        handle.reset();
        assert!(handle.is_empty());
    }

    #[test]
    #[should_panic(expected = "empty delegate")]
    fn invoking_an_empty_delegate_panics() {
        let handle: Delegate<(), ()> = Delegate::new();
        handle.call(());
    }

    #[test]
    fn equality_is_identity_not_behavior() {
        let a = Delegate::from_fn(sum);
        let b = Delegate::from_fn(sum);
        let c = Delegate::from_fn(product);

        // Same target, separately constructed: equal.
        assert_eq!(a, b);
        // Different targets: unequal, whatever they compute.
        assert_ne!(a, c);
        // Copies are equal to their source.
        let copy = a;
        assert_eq!(copy, a);
    }

    #[test]
    fn method_delegate_equality_requires_same_instance() {
        let first = Tally::new();
        let second = Tally::new();

        let on_first = unsafe { Delegate::from_const_method(&first, Tally::bump) };
        let on_first_again = unsafe { Delegate::from_const_method(&first, Tally::bump) };
        let on_second = unsafe { Delegate::from_const_method(&second, Tally::bump) };

        assert_eq!(on_first, on_first_again);
        assert_ne!(on_first, on_second);
    }

    #[test]
    fn ordering_is_partial() {
        let a = Delegate::from_fn(sum);
        let b = Delegate::from_fn(product);

        assert_eq!(a.partial_cmp(&a), Some(Ordering::Equal));
        // Both owners are null, so neither component-wise comparison holds.
        assert_eq!(a.partial_cmp(&b), None);
        assert!(!(a < b));
        assert!(!(a > b));
    }
}
