//! Per-Thread Values
//!
//! [`ThreadValue`] holds one value per OS thread, keyed by the thread's
//! id behind a mutex. A thread only ever observes the value it set
//! itself.

use std::collections::HashMap;
use std::thread::{self, ThreadId};

use spin::Mutex;

/// One value per thread.
#[derive(Debug, Default)]
pub struct ThreadValue<T> {
    values: Mutex<HashMap<ThreadId, T>>,
}

impl<T> ThreadValue<T> {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            values: Mutex::new(HashMap::new()),
        }
    }

    /// Set the calling thread's value, replacing any previous one
    pub fn set(&self, value: T) {
        self.values.lock().insert(thread::current().id(), value);
    }

    /// Remove and return the calling thread's value
    pub fn take(&self) -> Option<T> {
        self.values.lock().remove(&thread::current().id())
    }

    /// True if the calling thread has a value
    pub fn is_set(&self) -> bool {
        self.values.lock().contains_key(&thread::current().id())
    }

    /// Number of threads currently holding a value
    pub fn len(&self) -> usize {
        self.values.lock().len()
    }

    /// True if no thread holds a value
    pub fn is_empty(&self) -> bool {
        self.values.lock().is_empty()
    }

    /// Drop every thread's value
    pub fn clear(&self) {
        self.values.lock().clear();
    }
}

impl<T: Clone> ThreadValue<T> {
    /// Copy of the calling thread's value
    pub fn get(&self) -> Option<T> {
        self.values.lock().get(&thread::current().id()).cloned()
    }
}
