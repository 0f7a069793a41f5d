//! Change tracking behind the accessors generated by `#[observable]`.

use std::{
    fmt::Debug,
    sync::{Arc, Mutex},
};

use crate::sync::mutex_lock;

/// Something that happened to an observed property, identified by its field name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObservationEvent {
    Access(&'static str),
    WillSet(&'static str),
    DidSet(&'static str),
}

impl ObservationEvent {
    pub fn key(&self) -> &'static str {
        match self {
            ObservationEvent::Access(key)
            | ObservationEvent::WillSet(key)
            | ObservationEvent::DidSet(key) => key,
        }
    }
}

type Observer = Arc<dyn Fn(ObservationEvent) + Send + Sync>;

/// Bookkeeping for one observable value. Records reads and writes of its properties and
/// forwards them to registered observers.
///
/// Cloning an observable value does not copy its observers: the clone starts with a fresh
/// registrar. Registrars are always equal to each other, so they never affect derived `PartialEq`.
#[derive(Default)]
pub struct ObservationRegistrar {
    observers: Arc<Mutex<Vec<Observer>>>,
}

impl ObservationRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `observer` for every future event.
    pub fn observe(&self, observer: impl Fn(ObservationEvent) + Send + Sync + 'static) {
        mutex_lock(&self.observers).push(Arc::new(observer));
    }

    /// Record a read of `key`.
    pub fn access(&self, key: &'static str) {
        tracing::trace!(key, "observed access");
        self.notify(ObservationEvent::Access(key));
    }

    /// Replace `storage` with `value`, notifying around the write unless `is_identical` says the
    /// two are the same value.
    pub fn mutate<T>(
        &self,
        key: &'static str,
        storage: &mut T,
        value: T,
        is_identical: fn(&T, &T) -> bool,
    ) {
        if is_identical(storage, &value) {
            *storage = value;
            return;
        }

        self.will_set(key);
        *storage = value;
        self.did_set(key);
    }

    /// Announce an in-place modification of `key`. The returned guard announces its end when
    /// dropped.
    #[must_use = "the modification ends when the guard is dropped"]
    pub fn will_modify(&self, key: &'static str) -> ModifyGuard<'_> {
        self.will_set(key);
        ModifyGuard {
            registrar: self,
            key,
        }
    }

    pub fn will_set(&self, key: &'static str) {
        tracing::trace!(key, "observed will set");
        self.notify(ObservationEvent::WillSet(key));
    }

    pub fn did_set(&self, key: &'static str) {
        tracing::trace!(key, "observed did set");
        self.notify(ObservationEvent::DidSet(key));
    }

    fn notify(&self, event: ObservationEvent) {
        // Observers run without the lock held, so they may register further observers.
        let observers = mutex_lock(&self.observers).clone();

        for observer in observers {
            observer(event);
        }
    }
}

impl Clone for ObservationRegistrar {
    fn clone(&self) -> Self {
        Self::default()
    }
}

impl PartialEq for ObservationRegistrar {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for ObservationRegistrar {}

impl Debug for ObservationRegistrar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservationRegistrar").finish_non_exhaustive()
    }
}

/// Ends an in-place modification started by [`ObservationRegistrar::will_modify`].
pub struct ModifyGuard<'a> {
    registrar: &'a ObservationRegistrar,
    key: &'static str,
}

impl Drop for ModifyGuard<'_> {
    fn drop(&mut self) {
        self.registrar.did_set(self.key);
    }
}

/// Identity comparison used by generated setters: only the same storage location is identical,
/// so every assignment through a setter is reported.
pub fn is_identity_equal<T>(lhs: &T, rhs: &T) -> bool {
    std::ptr::eq(lhs, rhs)
}
