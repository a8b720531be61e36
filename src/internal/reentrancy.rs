//! Thread-local tracking of in-flight resolutions per container.
//!
//! A container's public resolve path registers itself here for the duration
//! of the call. Re-entering the same container from the same thread (a
//! provider calling back into the container it is being resolved from) is
//! either rejected or bounded by a depth limit, depending on the container's
//! options.

use std::cell::RefCell;

use crate::error::{DiError, DiResult};

thread_local! {
    static ACTIVE: RefCell<Vec<Frame>> = const { RefCell::new(Vec::new()) };
}

struct Frame {
    container: u64,
    depth: usize,
}

/// Policy applied when a resolution re-enters its own container.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ReentryPolicy {
    pub(crate) allow_recursion: bool,
    pub(crate) max_depth: usize,
}

/// Marks the current thread as resolving on a container until dropped.
pub(crate) struct ReentrancyGuard {
    container: u64,
    nested: bool,
}

impl ReentrancyGuard {
    /// Enters a resolution on `container`.
    ///
    /// `describe` names the requested service for the error message and is
    /// only called on failure.
    pub(crate) fn enter(
        container: u64,
        policy: ReentryPolicy,
        describe: impl FnOnce() -> String,
    ) -> DiResult<Self> {
        ACTIVE.with(|active| {
            let mut active = active.borrow_mut();
            let depth = active
                .iter()
                .find(|frame| frame.container == container)
                .map_or(0, |frame| frame.depth);

            if depth > 0 && !policy.allow_recursion {
                let service = describe();
                tracing::warn!(%service, container, "reentrant resolution rejected");
                return Err(DiError::Reentrant(service));
            }
            if depth > 0 && depth >= policy.max_depth {
                tracing::warn!(container, depth, "resolution depth limit reached");
                return Err(DiError::DepthExceeded(policy.max_depth));
            }

            match active.iter_mut().find(|frame| frame.container == container) {
                Some(frame) => frame.depth += 1,
                None => active.push(Frame { container, depth: 1 }),
            }

            Ok(Self {
                container,
                nested: depth > 0,
            })
        })
    }

    /// Whether this thread was already resolving on the container.
    pub(crate) fn is_nested(&self) -> bool {
        self.nested
    }
}

impl Drop for ReentrancyGuard {
    fn drop(&mut self) {
        ACTIVE.with(|active| {
            let mut active = active.borrow_mut();
            if let Some(pos) = active.iter().position(|frame| frame.container == self.container) {
                active[pos].depth -= 1;
                if active[pos].depth == 0 {
                    active.swap_remove(pos);
                }
            }
        });
    }
}

/// Whether the current thread is inside a resolution on `container`.
pub(crate) fn is_resolving(container: u64) -> bool {
    ACTIVE.with(|active| {
        active
            .borrow()
            .iter()
            .any(|frame| frame.container == container && frame.depth > 0)
    })
}
