//! Scheduling of evaluations: debounce timers and async result tracking.

mod coordinator;
mod debounce;

pub use coordinator::{AsyncValidationCoordinator, Submission};
pub use debounce::DebounceScheduler;

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Locks a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
