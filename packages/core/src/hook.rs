//! Hooks: reading container state from a render pass.
//!
//! A [`Hook<T>`] is bound to one [`Honeycomb<T>`]. Calling it inside
//! [`RenderScope::render`](crate::render::RenderScope::render) stores the
//! (optionally projected) state in a hook slot, subscribes for changes and
//! flags the scope for a re-render when the stored value changes.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::HookError;
use crate::honeycomb::{Honeycomb, State, Unsubscribe};
use crate::render::RenderContext;

/// Per-call-site storage living in a render scope.
struct HookSlot<R> {
    data: Rc<RefCell<R>>,
    deps: Option<Box<dyn Any>>,
    subscription: Option<Unsubscribe>,
}

impl<R> HookSlot<R> {
    fn new(data: R) -> Self {
        Self {
            data: Rc::new(RefCell::new(data)),
            deps: None,
            subscription: None,
        }
    }
}

impl<R> Drop for HookSlot<R> {
    fn drop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }
}

/// Handle a render pass uses to read one container.
pub struct Hook<T> {
    honeycomb: Honeycomb<T>,
}

impl<T> fmt::Debug for Hook<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook")
            .field("state", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T: State> Hook<T> {
    /// Bind a hook to `honeycomb`.
    pub fn new(honeycomb: Honeycomb<T>) -> Self {
        Self { honeycomb }
    }

    /// The container this hook reads.
    pub fn honeycomb(&self) -> &Honeycomb<T> {
        &self.honeycomb
    }

    /// The whole state; re-renders whenever it changes.
    pub fn use_state(&self, cx: &mut RenderContext<'_>) -> Result<T, HookError> {
        self.use_projected(cx, T::clone, ())
    }

    /// A projection of the state; re-renders only when the projected value
    /// changes.
    ///
    /// `project` is captured when the subscription is made. It is replaced
    /// only when `deps` differs from the value passed on the previous pass.
    pub fn use_projected<R, D>(
        &self,
        cx: &mut RenderContext<'_>,
        project: impl Fn(&T) -> R + 'static,
        deps: D,
    ) -> Result<R, HookError>
    where
        R: State,
        D: PartialEq + 'static,
    {
        let trigger = cx.trigger();
        let honeycomb = &self.honeycomb;
        let slot = cx.slot(|| HookSlot::new(project(&honeycomb.get_state())))?;

        let stale = match slot.deps.as_ref().and_then(|prev| prev.downcast_ref::<D>()) {
            Some(prev) => *prev != deps,
            None => true,
        };

        if stale {
            if let Some(previous) = slot.subscription.take() {
                previous.unsubscribe();
            }
            *slot.data.borrow_mut() = project(&honeycomb.get_state());

            let data = Rc::clone(&slot.data);
            slot.subscription = Some(honeycomb.subscribe(
                move |new, _| {
                    let next = project(new);
                    let unchanged = *data.borrow() == next;
                    if unchanged {
                        return;
                    }
                    *data.borrow_mut() = next;
                    trigger.set(true);
                },
                true,
            ));
            slot.deps = Some(Box::new(deps));
        }

        let value = slot.data.borrow().clone();
        Ok(value)
    }
}
