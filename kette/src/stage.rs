//! The call adapter: normalizes a registered handler into a stage with a
//! single settlement contract.

use futures::future::BoxFuture;
use kette_core::{BoxError, Completion, Handler, Payload, StageError};

/// The calling convention a pipeline adapts its stages with.
///
/// Selected once from the `only_promise` option when the chain is
/// composed; never chosen per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CallStyle {
    /// Accept both conventions: callback handlers get an injected
    /// [`Completion`], future handlers settle through their future.
    Callback,
    /// Promise-only: callback-convention handlers fail the stage.
    Promise,
}

impl CallStyle {
    pub(crate) fn from_only_promise(only_promise: bool) -> Self {
        if only_promise {
            CallStyle::Promise
        } else {
            CallStyle::Callback
        }
    }
}

/// A handler normalized for execution: given an input value list it
/// eventually yields an output value list or a failure.
pub(crate) struct Stage<V: Payload> {
    handler: Handler<V>,
    style: CallStyle,
}

impl<V: Payload> Clone for Stage<V> {
    fn clone(&self) -> Self {
        Self {
            handler: self.handler.clone(),
            style: self.style,
        }
    }
}

impl<V: Payload> Stage<V> {
    pub(crate) fn new(handler: Handler<V>, style: CallStyle) -> Self {
        Self { handler, style }
    }

    /// Run the stage with the given value list.
    ///
    /// The handler is not invoked until the returned future is polled.
    pub(crate) fn run<'a>(&'a self, args: Vec<V>) -> BoxFuture<'a, Result<Vec<V>, BoxError>> {
        match (&self.handler, self.style) {
            (Handler::Future(h), _) => h.handle_dyn(args),
            (Handler::Callback(h), CallStyle::Callback) => Box::pin(async move {
                let (done, rx) = Completion::channel();
                h.handle(args, done);
                match rx.await {
                    Ok(settlement) => settlement,
                    // Sender dropped unsigned; a stored handle keeps us pending instead.
                    Err(_) => Err(StageError::Abandoned.into()),
                }
            }),
            (Handler::Callback(_), CallStyle::Promise) => {
                Box::pin(async { Err(StageError::PromiseOnly.into()) })
            }
        }
    }
}
