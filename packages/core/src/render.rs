//! Minimal render host.
//!
//! A [`RenderScope`] stands in for one component instance of a UI
//! framework: it owns the hook slots that persist between render passes and a
//! flag that subscriptions raise to request another pass. A UI integration
//! drives `render` whenever `needs_render` reports true.

use std::any::Any;
use std::cell::Cell;
use std::rc::Rc;

use crate::error::HookError;

/// Per-component hook storage.
///
/// Dropping the scope drops every slot, which tears down their subscriptions.
#[derive(Default)]
pub struct RenderScope {
    slots: Vec<Box<dyn Any>>,
    dirty: Rc<Cell<bool>>,
    renders: usize,
}

impl RenderScope {
    /// An empty scope that has not rendered yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one render pass.
    pub fn render<R>(&mut self, f: impl FnOnce(&mut RenderContext<'_>) -> R) -> R {
        self.dirty.set(false);
        let mut cx = RenderContext {
            slots: &mut self.slots,
            position: 0,
            trigger: Rc::clone(&self.dirty),
        };
        let output = f(&mut cx);
        self.renders += 1;
        output
    }

    /// Whether a subscription asked for a re-render since the last pass began.
    pub fn needs_render(&self) -> bool {
        self.dirty.get()
    }

    /// Number of completed render passes.
    pub fn render_count(&self) -> usize {
        self.renders
    }

    /// Number of hook slots allocated so far.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }
}

impl std::fmt::Debug for RenderScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderScope")
            .field("slots", &self.slots.len())
            .field("dirty", &self.dirty.get())
            .field("renders", &self.renders)
            .finish()
    }
}

/// Access to the hook slots during one render pass.
pub struct RenderContext<'a> {
    slots: &'a mut Vec<Box<dyn Any>>,
    position: usize,
    trigger: Rc<Cell<bool>>,
}

impl RenderContext<'_> {
    /// The next slot in call order, created with `init` on the first pass.
    ///
    /// Fails when the slot at this position holds a different type, which
    /// means hooks were called in a different order than before.
    pub fn slot<S: 'static>(&mut self, init: impl FnOnce() -> S) -> Result<&mut S, HookError> {
        let position = self.position;
        self.position += 1;

        if position == self.slots.len() {
            self.slots.push(Box::new(init()));
        }
        self.slots[position]
            .downcast_mut::<S>()
            .ok_or(HookError::OrderMismatch { position })
    }

    /// Handle that requests a re-render when set.
    pub fn trigger(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.trigger)
    }
}
