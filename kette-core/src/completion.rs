//! One-shot completion handle for callback-convention handlers.

use crate::error::BoxError;
use crate::payload::Payload;
use tokio::sync::oneshot;

/// Receiving half of a completion channel, awaited by the call adapter.
pub type CompletionReceiver<V> = oneshot::Receiver<Result<Vec<V>, BoxError>>;

/// The injected completion callback of the error-first convention.
///
/// A callback-convention handler receives its arguments plus one
/// `Completion` and must consume it exactly once: [`reject`] fails the
/// stage, the `resolve*` methods succeed it with an ordered value list.
///
/// Dropping the handle unsigned fails the stage (the adapter observes the
/// closed channel); merely storing it keeps the stage pending until it is
/// eventually consumed.
///
/// [`reject`]: Completion::reject
pub struct Completion<V: Payload> {
    tx: oneshot::Sender<Result<Vec<V>, BoxError>>,
}

impl<V: Payload> Completion<V> {
    /// Create a completion handle and the receiver the adapter awaits.
    pub fn channel() -> (Self, CompletionReceiver<V>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    /// Succeed the stage with an ordered value list.
    pub fn resolve(self, values: Vec<V>) {
        // The receiver is gone only if the call itself was dropped.
        let _ = self.tx.send(Ok(values));
    }

    /// Succeed the stage with a single value.
    pub fn resolve_one(self, value: V) {
        self.resolve(vec![value]);
    }

    /// Succeed the stage with no values.
    pub fn resolve_empty(self) {
        self.resolve(Vec::new());
    }

    /// Fail the stage with the given error.
    pub fn reject(self, error: impl Into<BoxError>) {
        let _ = self.tx.send(Err(error.into()));
    }
}
