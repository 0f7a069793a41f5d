//! Storage targeted by `#[in_memory_container]`.

use std::sync::Mutex;

use thiserror::Error;

use crate::sync::mutex_lock;

/// Capability of types that may be shared freely between threads.
///
/// Declared with `#[derive(Sendable)]`, or supplied by `#[in_memory_container]` when missing.
pub trait Sendable: Send + Sync + 'static {}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("no data found in the cache")]
    NoDataFound,

    #[error("cache storage failed: {0}")]
    Storage(String),
}

/// Operations of a cache holding at most one `Model`.
pub trait CacheContainer: Send + Sync {
    type Model;

    /// The cached value, or [`CacheError::NoDataFound`] when empty.
    fn get(&self) -> Result<Self::Model, CacheError>;

    /// Overwrite the cached value.
    fn save(&self, model: Self::Model) -> Result<(), CacheError>;

    /// Clear the cache.
    fn delete(&self) -> Result<(), CacheError>;
}

/// A value behind a lock. Each method holds the lock for its own duration only.
#[derive(Debug, Default)]
pub struct LockIsolated<T> {
    value: Mutex<T>,
}

impl<T> LockIsolated<T> {
    pub const fn new(value: T) -> Self {
        Self {
            value: Mutex::new(value),
        }
    }

    pub fn set_value(&self, value: T) {
        *mutex_lock(&self.value) = value;
    }

    /// Run `f` with exclusive access to the value.
    pub fn with_value<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut mutex_lock(&self.value))
    }

    pub fn into_inner(self) -> T {
        match self.value.into_inner() {
            Ok(value) => value,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<T: Clone> LockIsolated<T> {
    /// Copy of the current value.
    pub fn value(&self) -> T {
        mutex_lock(&self.value).clone()
    }
}
