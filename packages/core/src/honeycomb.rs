//! Observable state container.
//!
//! A [`Honeycomb<T>`] owns one value of `T` and a list of subscribers. The
//! value is only ever replaced as a whole through [`Honeycomb::dispatch`],
//! which is a no-op when the new value is structurally equal to the current
//! one.
//!
//! # Invariants
//!
//! 1. State is never mutated in place; readers get a copy
//!    ([`copy_state`](Honeycomb::copy_state)) or an immutable shared handle
//!    ([`get_state`](Honeycomb::get_state)).
//! 2. Dispatching an equal value notifies nobody.
//! 3. Subscribers are notified in registration order, over a snapshot of the
//!    list taken when the dispatch starts. A subscriber added or removed while
//!    notifications are running is picked up by the next dispatch.
//! 4. No internal borrow is held while a subscriber runs, so subscribers may
//!    dispatch to the same container.

use std::cell::{Cell, OnceCell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::hive::Hive;

/// Values a container can hold: structurally comparable and copyable.
pub trait State: Clone + PartialEq + 'static {}

impl<T: Clone + PartialEq + 'static> State for T {}

type Callback<T> = Rc<dyn Fn(&T, &T)>;

struct Subscribers<T> {
    next_id: u64,
    entries: Vec<(u64, Callback<T>)>,
}

struct Inner<T> {
    state: RefCell<Rc<T>>,
    subscribers: RefCell<Subscribers<T>>,
    hive: OnceCell<Weak<Hive>>,
}

/// An observable state container.
///
/// Cloning yields another handle to the same container.
pub struct Honeycomb<T> {
    inner: Rc<Inner<T>>,
}

impl<T> Clone for Honeycomb<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Honeycomb<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Honeycomb")
            .field("state", &self.inner.state.borrow())
            .field("subscribers", &self.inner.subscribers.borrow().entries.len())
            .finish()
    }
}

impl<T: State> Honeycomb<T> {
    /// Create a container holding `initial`, with no subscribers.
    pub fn new(initial: T) -> Self {
        Self {
            inner: Rc::new(Inner {
                state: RefCell::new(Rc::new(initial)),
                subscribers: RefCell::new(Subscribers {
                    next_id: 0,
                    entries: Vec::new(),
                }),
                hive: OnceCell::new(),
            }),
        }
    }

    /// Replace the state with `new_state` unless it equals the current one.
    ///
    /// On change every subscriber is called with `(current, previous)`, where
    /// `current` is read at the time of each call: if a subscriber dispatches
    /// again, later subscribers see the newer state. Returns the state current
    /// after notification.
    pub fn dispatch(&self, new_state: T) -> Rc<T> {
        let previous = self.get_state();
        if *previous == new_state {
            log::debug!("dispatch: state unchanged, skipping notification");
            return previous;
        }

        *self.inner.state.borrow_mut() = Rc::new(new_state);

        let snapshot: Vec<Callback<T>> = self
            .inner
            .subscribers
            .borrow()
            .entries
            .iter()
            .map(|(_, callback)| Rc::clone(callback))
            .collect();
        log::debug!("dispatch: state changed, notifying {} subscriber(s)", snapshot.len());

        for callback in snapshot {
            let current = self.get_state();
            callback(&current, &previous);
        }

        self.get_state()
    }

    /// Register `callback` for state changes.
    ///
    /// With `call_immediately` the callback runs once, synchronously, with
    /// `(current, current)` before this returns.
    pub fn subscribe(
        &self,
        callback: impl Fn(&T, &T) + 'static,
        call_immediately: bool,
    ) -> Unsubscribe {
        let callback: Callback<T> = Rc::new(callback);
        let id = {
            let mut subscribers = self.inner.subscribers.borrow_mut();
            let id = subscribers.next_id;
            subscribers.next_id += 1;
            subscribers.entries.push((id, Rc::clone(&callback)));
            id
        };
        log::trace!("subscriber {} added", id);

        if call_immediately {
            let current = self.get_state();
            callback(&current, &current);
        }

        let weak: Weak<Inner<T>> = Rc::downgrade(&self.inner);
        Unsubscribe::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner
                    .subscribers
                    .borrow_mut()
                    .entries
                    .retain(|(entry, _)| *entry != id);
                log::trace!("subscriber {} removed", id);
            }
        })
    }

    /// Shortcut for `subscribe(callback, true)`.
    pub fn subscribe_now(&self, callback: impl Fn(&T, &T) + 'static) -> Unsubscribe {
        self.subscribe(callback, true)
    }

    /// An independent copy of the current state.
    pub fn copy_state(&self) -> T {
        (*self.get_state()).clone()
    }

    /// The live state, without copying.
    ///
    /// The handle is immutable; it keeps pointing at this value even after a
    /// later dispatch replaces the container's state.
    pub fn get_state(&self) -> Rc<T> {
        Rc::clone(&self.inner.state.borrow())
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().entries.len()
    }
}

impl<T> Honeycomb<T> {
    /// Set the back-reference to the owning hive. Only the first call sticks.
    pub fn set_hive(&self, hive: Weak<Hive>) {
        if self.inner.hive.set(hive).is_err() {
            log::trace!("honeycomb already attached to a hive; ignoring");
        }
    }

    /// The hive this container is registered in, while it is alive.
    pub fn hive(&self) -> Option<Rc<Hive>> {
        self.inner.hive.get().and_then(Weak::upgrade)
    }
}

/// Removes one subscription when invoked. Later invocations do nothing.
///
/// Dropping the handle does *not* unsubscribe.
pub struct Unsubscribe {
    remove: Cell<Option<Box<dyn FnOnce()>>>,
}

impl Unsubscribe {
    fn new(remove: impl FnOnce() + 'static) -> Self {
        Self {
            remove: Cell::new(Some(Box::new(remove))),
        }
    }

    /// Remove the subscription; a no-op after the first call.
    pub fn unsubscribe(&self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }

    /// Whether `unsubscribe` has already run.
    pub fn is_done(&self) -> bool {
        let remove = self.remove.take();
        let done = remove.is_none();
        self.remove.set(remove);
        done
    }
}

impl fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unsubscribe")
            .field("done", &self.is_done())
            .finish()
    }
}

/// Containers that can be registered in a [`Hive`].
///
/// Implement this for your own types wrapping a `Honeycomb`, adding domain
/// operations on top of `dispatch`:
///
/// ```ignore
/// struct Counter {
///     inner: Honeycomb<u32>,
/// }
///
/// impl AsHoneycomb for Counter {
///     type State = u32;
///     fn honeycomb(&self) -> &Honeycomb<u32> {
///         &self.inner
///     }
/// }
///
/// impl Counter {
///     fn increment(&self) {
///         let n = *self.inner.get_state();
///         self.inner.dispatch(n + 1);
///     }
/// }
/// ```
pub trait AsHoneycomb: 'static {
    type State: State;

    fn honeycomb(&self) -> &Honeycomb<Self::State>;
}

impl<T: State> AsHoneycomb for Honeycomb<T> {
    type State = T;

    fn honeycomb(&self) -> &Honeycomb<T> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Store {
        tick: u32,
        tags: Vec<String>,
    }

    fn store() -> Honeycomb<Store> {
        Honeycomb::new(Store {
            tick: 0,
            tags: vec![],
        })
    }

    fn bump(comb: &Honeycomb<Store>) {
        let mut next = comb.copy_state();
        next.tick += 1;
        comb.dispatch(next);
    }

    #[test]
    fn dispatch_notifies_with_new_and_previous() {
        let comb = store();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        comb.subscribe(move |new, prev| sink.borrow_mut().push((new.tick, prev.tick)), false);

        bump(&comb);
        bump(&comb);
        bump(&comb);

        assert_eq!(comb.get_state().tick, 3);
        assert_eq!(*seen.borrow(), vec![(1, 0), (2, 1), (3, 2)]);
    }

    #[test]
    fn equal_dispatch_is_a_noop() {
        let comb = store();
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        comb.subscribe(move |_, _| counter.set(counter.get() + 1), false);

        let before = comb.get_state();
        let returned = comb.dispatch(comb.copy_state());

        assert_eq!(calls.get(), 0);
        assert!(Rc::ptr_eq(&before, &returned));
        assert!(Rc::ptr_eq(&before, &comb.get_state()));
    }

    #[test]
    fn call_immediately_fires_once_with_current_state() {
        let comb = store();
        bump(&comb);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        comb.subscribe_now(move |new, prev| sink.borrow_mut().push((new.tick, prev.tick)));
        assert_eq!(*seen.borrow(), vec![(1, 1)]);

        bump(&comb);
        assert_eq!(*seen.borrow(), vec![(1, 1), (2, 1)]);
    }

    #[test]
    fn unsubscribe_removes_only_its_registration() {
        let comb = store();
        let a = Rc::new(Cell::new(0));
        let b = Rc::new(Cell::new(0));

        let counter = Rc::clone(&a);
        let unsubscribe_a = comb.subscribe(move |_, _| counter.set(counter.get() + 1), false);
        let counter = Rc::clone(&b);
        let _keep_b = comb.subscribe(move |_, _| counter.set(counter.get() + 1), false);
        assert_eq!(comb.subscriber_count(), 2);

        unsubscribe_a.unsubscribe();
        assert!(unsubscribe_a.is_done());
        unsubscribe_a.unsubscribe();
        assert_eq!(comb.subscriber_count(), 1);

        bump(&comb);
        assert_eq!(a.get(), 0);
        assert_eq!(b.get(), 1);
    }

    #[test]
    fn identical_callbacks_are_distinct_registrations() {
        let comb = store();
        let calls = Rc::new(Cell::new(0));
        let make = |calls: &Rc<Cell<u32>>| {
            let calls = Rc::clone(calls);
            move |_: &Store, _: &Store| calls.set(calls.get() + 1)
        };
        let first = comb.subscribe(make(&calls), false);
        let _second = comb.subscribe(make(&calls), false);

        first.unsubscribe();
        bump(&comb);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn copies_are_independent() {
        let comb = store();
        let mut copy = comb.copy_state();
        copy.tags.push("mutated".to_string());
        copy.tick = 99;

        assert_eq!(
            comb.copy_state(),
            Store {
                tick: 0,
                tags: vec![]
            }
        );
    }

    #[test]
    fn live_handle_survives_dispatch() {
        let comb = store();
        let live = comb.get_state();
        bump(&comb);
        assert_eq!(live.tick, 0);
        assert_eq!(comb.get_state().tick, 1);
    }

    #[test]
    fn subscriber_may_dispatch_reentrantly() {
        let comb = Honeycomb::new(0u32);
        let handle = comb.clone();
        comb.subscribe(
            move |new, _| {
                if *new % 2 == 1 {
                    handle.dispatch(*new + 1);
                }
            },
            false,
        );

        let result = comb.dispatch(1);
        assert_eq!(*result, 2);
        assert_eq!(*comb.get_state(), 2);
    }

    #[test]
    fn later_subscribers_see_state_after_reentrant_dispatch() {
        let comb = Honeycomb::new(0u32);
        let handle = comb.clone();
        comb.subscribe(
            move |new, _| {
                if *new % 2 == 1 {
                    handle.dispatch(*new + 1);
                }
            },
            false,
        );
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        comb.subscribe(move |new, prev| sink.borrow_mut().push((*new, *prev)), false);

        comb.dispatch(1);
        // Nested dispatch delivers (2, 1); the outer loop then reads the live
        // state instead of replaying 1.
        assert_eq!(*seen.borrow(), vec![(2, 1), (2, 0)]);
    }

    #[test]
    fn removal_during_notification_applies_next_dispatch() {
        let comb = Honeycomb::new(0u32);
        let late_calls = Rc::new(Cell::new(0));
        let slot: Rc<RefCell<Option<Unsubscribe>>> = Rc::new(RefCell::new(None));

        let remover = Rc::clone(&slot);
        comb.subscribe(
            move |_, _| {
                if let Some(unsubscribe) = remover.borrow().as_ref() {
                    unsubscribe.unsubscribe();
                }
            },
            false,
        );
        let counter = Rc::clone(&late_calls);
        *slot.borrow_mut() = Some(comb.subscribe(move |_, _| counter.set(counter.get() + 1), false));

        // Snapshot taken before the first subscriber removes the second.
        comb.dispatch(1);
        assert_eq!(late_calls.get(), 1);

        comb.dispatch(2);
        assert_eq!(late_calls.get(), 1);
    }

    #[test]
    fn unsubscribe_after_container_dropped_is_harmless() {
        let comb = Honeycomb::new(0u32);
        let unsubscribe = comb.subscribe(|_, _| {}, false);
        drop(comb);
        unsubscribe.unsubscribe();
        assert!(unsubscribe.is_done());
    }

    #[test]
    fn detached_honeycomb_has_no_hive() {
        assert!(Honeycomb::new(1u8).hive().is_none());
    }
}
