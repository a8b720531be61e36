//! Lazily initialised single-instance cells.
//!
//! A cell moves `Uninitialized -> Activating -> {Activated | Failed}` exactly
//! once. The thread that wins the compare-and-swap runs the provider; every
//! other caller spins with backoff until the outcome is published or the
//! configured timeout elapses.

use std::sync::atomic::{AtomicU8, Ordering};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

use crossbeam_utils::Backoff;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;

use crate::error::{DiError, DiResult};
use crate::key::{BindingKey, Instance};

const UNINITIALIZED: u8 = 0;
const ACTIVATING: u8 = 1;
const ACTIVATED: u8 = 2;
const FAILED: u8 = 3;

/// Lifecycle of a singleton binding's instance, as reported by
/// [`BindingDescriptor::singleton_state`](crate::BindingDescriptor::singleton_state).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SingletonState {
    Uninitialized,
    Activating,
    Activated,
    Failed,
}

pub(crate) struct SingletonCell {
    state: AtomicU8,
    owner: Mutex<Option<ThreadId>>,
    outcome: OnceCell<DiResult<Instance>>,
}

impl SingletonCell {
    pub(crate) fn new() -> Self {
        Self {
            state: AtomicU8::new(UNINITIALIZED),
            owner: Mutex::new(None),
            outcome: OnceCell::new(),
        }
    }

    pub(crate) fn state(&self) -> SingletonState {
        match self.state.load(Ordering::Acquire) {
            UNINITIALIZED => SingletonState::Uninitialized,
            ACTIVATING => SingletonState::Activating,
            ACTIVATED => SingletonState::Activated,
            _ => SingletonState::Failed,
        }
    }

    /// Returns the single instance, running `activate` if this caller wins
    /// the initialisation race.
    pub(crate) fn get_or_activate<F>(
        &self,
        binding: &BindingKey,
        timeout: Duration,
        activate: F,
    ) -> DiResult<Instance>
    where
        F: FnOnce() -> DiResult<Instance>,
    {
        if let Some(outcome) = self.outcome.get() {
            return outcome.clone();
        }

        match self
            .state
            .compare_exchange(UNINITIALIZED, ACTIVATING, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => {
                *self.owner.lock() = Some(thread::current().id());
                let outcome = activate();
                let terminal = if outcome.is_ok() { ACTIVATED } else { FAILED };
                // The cell is only ever set here, by the CAS winner.
                let _ = self.outcome.set(outcome.clone());
                self.state.store(terminal, Ordering::Release);
                *self.owner.lock() = None;
                if let Err(err) = &outcome {
                    tracing::error!(service = %binding, error = %err, "singleton activation failed permanently");
                }
                outcome
            }
            Err(_) => self.wait(binding, timeout),
        }
    }

    fn wait(&self, binding: &BindingKey, timeout: Duration) -> DiResult<Instance> {
        if *self.owner.lock() == Some(thread::current().id()) {
            // This thread is the one activating the cell; waiting would never end.
            let name = binding.to_string();
            tracing::warn!(service = %name, "singleton requested while it is being activated on the same thread");
            return Err(DiError::Circular(vec![name.clone(), name]));
        }

        let deadline = Instant::now() + timeout;
        let backoff = Backoff::new();
        loop {
            if let Some(outcome) = self.outcome.get() {
                return outcome.clone();
            }
            if Instant::now() >= deadline {
                tracing::warn!(service = %binding, ?timeout, "timed out waiting for singleton activation");
                return Err(DiError::SingletonTimeout {
                    service: binding.to_string(),
                    timeout,
                });
            }
            if backoff.is_completed() {
                thread::sleep(Duration::from_millis(1));
            } else {
                backoff.snooze();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{downcast, erase};
    use std::sync::atomic::AtomicUsize;
    use std::sync::{Arc, Barrier};

    fn key() -> BindingKey {
        BindingKey::of::<u32>(None)
    }

    #[test]
    fn test_activates_once() {
        let cell = SingletonCell::new();
        let calls = AtomicUsize::new(0);
        assert_eq!(cell.state(), SingletonState::Uninitialized);

        for _ in 0..3 {
            let value = cell
                .get_or_activate(&key(), Duration::from_secs(1), || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(erase(Arc::new(7u32)))
                })
                .unwrap();
            assert_eq!(*downcast::<u32>(&value).unwrap(), 7);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cell.state(), SingletonState::Activated);
    }

    #[test]
    fn test_failure_is_permanent() {
        let cell = SingletonCell::new();
        let first = cell.get_or_activate(&key(), Duration::from_secs(1), || {
            Err(DiError::NotResolvable("u32".into()))
        });
        assert!(first.is_err());
        assert_eq!(cell.state(), SingletonState::Failed);

        let second = cell.get_or_activate(&key(), Duration::from_secs(1), || Ok(erase(Arc::new(1u32))));
        assert!(matches!(second, Err(DiError::NotResolvable(_))));
    }

    #[test]
    fn test_same_thread_reentry_fails_fast() {
        let cell = SingletonCell::new();
        let result = cell.get_or_activate(&key(), Duration::from_secs(30), || {
            cell.get_or_activate(&key(), Duration::from_secs(30), || Ok(erase(Arc::new(1u32))))
        });
        assert!(matches!(result, Err(DiError::Circular(_))));
    }

    #[test]
    fn test_waiter_times_out() {
        let cell = Arc::new(SingletonCell::new());
        let barrier = Arc::new(Barrier::new(2));

        let slow = {
            let cell = cell.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                cell.get_or_activate(&key(), Duration::from_secs(5), || {
                    barrier.wait();
                    thread::sleep(Duration::from_millis(300));
                    Ok(erase(Arc::new(1u32)))
                })
            })
        };

        barrier.wait();
        let waited = cell.get_or_activate(&key(), Duration::from_millis(20), || unreachable!());
        assert!(matches!(waited, Err(DiError::SingletonTimeout { .. })));
        assert!(slow.join().unwrap().is_ok());
    }
}
