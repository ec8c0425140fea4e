//! Self-describing metadata sources.

use uuid::Uuid;

use crate::metadata::{Metadata, Value};

/// Capability of contributing metadata to an event record.
///
/// Implemented by anything that can describe itself as key-value data:
/// plain [`Metadata`], the helpers below, or ad-hoc domain structs.
/// `to_metadata` must not fail; a provider that cannot produce its data
/// has a bug of its own.
pub trait Loggable {
    fn to_metadata(&self) -> Metadata;
}

impl Loggable for Metadata {
    fn to_metadata(&self) -> Metadata {
        self.clone()
    }
}

/// Single key-value loggable. See [`pair`].
pub struct Pair {
    key: String,
    value: Value,
}

/// Loggable contributing one key-value entry.
pub fn pair(key: impl Into<String>, value: impl Into<Value>) -> Pair {
    Pair {
        key: key.into(),
        value: value.into(),
    }
}

impl Loggable for Pair {
    fn to_metadata(&self) -> Metadata {
        Metadata::from_iter([(self.key.clone(), self.value.clone())])
    }
}

/// Key plus a closure evaluated when the metadata is assembled. See
/// [`deferred`].
pub struct Deferred<F> {
    key: String,
    produce: F,
}

/// Loggable whose value is computed lazily, at record-assembly time.
///
/// Useful when the value is expensive and the record may be skipped
/// entirely (inactive sink).
pub fn deferred<F>(key: impl Into<String>, produce: F) -> Deferred<F>
where
    F: Fn() -> String,
{
    Deferred {
        key: key.into(),
        produce,
    }
}

impl<F> Loggable for Deferred<F>
where
    F: Fn() -> String,
{
    fn to_metadata(&self) -> Metadata {
        Metadata::from_iter([(self.key.clone(), (self.produce)())])
    }
}

/// Loggable contributing a fresh v4 uuid under `key`.
pub fn uuid(key: impl Into<String>) -> Pair {
    pair(key, Uuid::new_v4().to_string())
}
