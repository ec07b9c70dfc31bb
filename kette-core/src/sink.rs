//! Completion and error sinks for pipelines.

use crate::error::BoxError;
use crate::outcome::Outcome;
use crate::payload::Payload;
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;

/// The error sink of a pipeline.
///
/// Invoked with the failure that short-circuited the chain; its own result
/// becomes the settlement of the enclosing call. By convention a sink
/// re-signals the failure unless it explicitly recovers with an outcome.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an error sink for payload `{V}`",
    label = "missing `ErrorSink` implementation",
    note = "Use a closure `Fn(BoxError) -> impl Future<Output = Result<Outcome<{V}>, BoxError>>`."
)]
pub trait ErrorSink<V: Payload>: Send + Sync + 'static {
    /// Handle a stage failure, deciding the call's final settlement.
    fn handle(
        &self,
        error: BoxError,
    ) -> impl Future<Output = Result<Outcome<V>, BoxError>> + Send;
}

// Blanket impl for closures
impl<F, V, Fut> ErrorSink<V> for F
where
    V: Payload,
    F: Fn(BoxError) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Outcome<V>, BoxError>> + Send,
{
    fn handle(
        &self,
        error: BoxError,
    ) -> impl Future<Output = Result<Outcome<V>, BoxError>> + Send {
        (self)(error)
    }
}

/// Dynamic object-safe version of [`ErrorSink`].
pub trait DynErrorSink<V: Payload>: Send + Sync + 'static {
    /// Handle a stage failure (dynamic dispatch version).
    fn handle_dyn<'a>(&'a self, error: BoxError) -> BoxFuture<'a, Result<Outcome<V>, BoxError>>;
}

// Blanket implementation: any ErrorSink implements DynErrorSink.
impl<V: Payload, T: ErrorSink<V>> DynErrorSink<V> for T {
    fn handle_dyn<'a>(
        &'a self,
        error: BoxError,
    ) -> BoxFuture<'a, Result<Outcome<V>, BoxError>> {
        Box::pin(self.handle(error))
    }
}

/// The default error sink: re-raises the failure unchanged, so pipelines
/// without a registered sink still surface failures through the call.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rethrow;

impl<V: Payload> ErrorSink<V> for Rethrow {
    async fn handle(&self, error: BoxError) -> Result<Outcome<V>, BoxError> {
        Err(error)
    }
}

/// The completion sink: observes the final outcome, best-effort, and
/// cannot alter the value the call itself resolves to.
pub type DoneSink<V> = Arc<dyn Fn(Outcome<V>) + Send + Sync>;
