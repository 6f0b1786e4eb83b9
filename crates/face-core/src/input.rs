// src/input.rs
//! Blocking of asynchronous input while display resources are acquired.
//!
//! Realization allocates colors, bitmaps and drawing contexts. A redraw
//! triggered by input arriving in the middle would see a half-built face,
//! so allocation happens inside a [`InputBlocker::block`] scope. Scopes
//! nest; input is delivered again once the outermost guard is dropped.

use std::cell::Cell;
use std::rc::Rc;

#[derive(Clone, Debug, Default)]
pub struct InputBlocker {
    depth: Rc<Cell<u32>>,
}

impl InputBlocker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suspend input until the returned guard is dropped.
    #[must_use = "input is unblocked as soon as the guard is dropped"]
    pub fn block(&self) -> InputGuard {
        self.depth.set(self.depth.get() + 1);
        InputGuard { depth: Rc::clone(&self.depth) }
    }

    pub fn is_blocked(&self) -> bool {
        self.depth.get() > 0
    }

    pub fn depth(&self) -> u32 {
        self.depth.get()
    }
}

#[derive(Debug)]
pub struct InputGuard {
    depth: Rc<Cell<u32>>,
}

impl Drop for InputGuard {
    fn drop(&mut self) {
        let depth = self.depth.get();
        debug_assert!(depth > 0, "unbalanced input unblock");
        self.depth.set(depth.saturating_sub(1));
        if depth == 1 {
            tracing::trace!("Input unblocked");
        }
    }
}
