use std::sync::{Mutex, MutexGuard};

/// Lock `lock`, recovering the guard if a previous holder panicked. Every critical section in
/// this crate leaves the data consistent, so poisoning carries no information.
pub(crate) fn mutex_lock<T>(lock: &Mutex<T>) -> MutexGuard<'_, T> {
    match lock.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
