//! Handler traits for the two asynchronous calling conventions.
//!
//! A stage function enters the engine in one of two shapes:
//!
//! - [`CallbackHandler`]: error-first convention, receives its arguments
//!   plus an injected [`Completion`] handle and signals through it.
//! - [`FutureHandler`]: promise convention, receives only its arguments
//!   and returns a future whose output converts via [`IntoStageOutput`].
//!
//! Both have blanket implementations for plain closures, so most users
//! never implement these traits by hand. [`Handler`] is the closed
//! two-variant type the pipeline stores; the variant is fixed when the
//! handler is registered and never mixed at call time.

use crate::completion::Completion;
use crate::error::BoxError;
use crate::output::IntoStageOutput;
use crate::payload::Payload;
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;

/// A stage function of the promise convention.
///
/// # Static vs Dynamic Dispatch
///
/// This trait uses native `async fn` for zero-cost static dispatch.
/// For dynamic dispatch (stored stage lists), use [`DynFutureHandler`].
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a future-convention handler for payload `{V}`",
    label = "missing `FutureHandler` implementation",
    note = "Use a closure `Fn(Vec<{V}>) -> impl Future` or implement `handle` directly."
)]
pub trait FutureHandler<V: Payload>: Send + Sync + 'static {
    /// The handler's output, converted into the stage settlement.
    type Output: IntoStageOutput<V>;

    /// Run the handler with the current value list.
    fn handle(&self, args: Vec<V>) -> impl Future<Output = Self::Output> + Send;
}

// Blanket impl for closures
impl<F, V, Fut, Out> FutureHandler<V> for F
where
    V: Payload,
    F: Fn(Vec<V>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Out> + Send,
    Out: IntoStageOutput<V>,
{
    type Output = Out;

    fn handle(&self, args: Vec<V>) -> impl Future<Output = Self::Output> + Send {
        (self)(args)
    }
}

/// Dynamic object-safe version of [`FutureHandler`].
pub trait DynFutureHandler<V: Payload>: Send + Sync + 'static {
    /// Run the handler, already normalized to the stage settlement.
    fn handle_dyn<'a>(&'a self, args: Vec<V>) -> BoxFuture<'a, Result<Vec<V>, BoxError>>;
}

// Blanket implementation: any FutureHandler implements DynFutureHandler.
impl<V: Payload, T: FutureHandler<V>> DynFutureHandler<V> for T {
    fn handle_dyn<'a>(&'a self, args: Vec<V>) -> BoxFuture<'a, Result<Vec<V>, BoxError>> {
        Box::pin(async move { self.handle(args).await.into_output() })
    }
}

/// A stage function of the error-first callback convention.
///
/// The handler must eventually consume the [`Completion`]; synchronous
/// failures are reported by calling [`Completion::reject`] before
/// returning.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a callback-convention handler for payload `{V}`",
    label = "missing `CallbackHandler` implementation",
    note = "Use a closure `Fn(Vec<{V}>, Completion<{V}>)` or implement `handle` directly."
)]
pub trait CallbackHandler<V: Payload>: Send + Sync + 'static {
    /// Run the handler with the current value list and a completion handle.
    fn handle(&self, args: Vec<V>, done: Completion<V>);
}

// Blanket impl for closures
impl<F, V> CallbackHandler<V> for F
where
    V: Payload,
    F: Fn(Vec<V>, Completion<V>) + Send + Sync + 'static,
{
    fn handle(&self, args: Vec<V>, done: Completion<V>) {
        (self)(args, done)
    }
}

/// A registered stage function, tagged with its calling convention.
///
/// Cloning is cheap; both variants share the underlying handler.
pub enum Handler<V: Payload> {
    /// Error-first convention, completed through a [`Completion`] handle.
    Callback(Arc<dyn CallbackHandler<V>>),
    /// Promise convention, completed by the returned future.
    Future(Arc<dyn DynFutureHandler<V>>),
}

impl<V: Payload> Handler<V> {
    /// Wrap a callback-convention handler.
    pub fn callback<H: CallbackHandler<V>>(handler: H) -> Self {
        Handler::Callback(Arc::new(handler))
    }

    /// Wrap a promise-convention handler.
    pub fn future<H: FutureHandler<V>>(handler: H) -> Self {
        Handler::Future(Arc::new(handler))
    }
}

impl<V: Payload> Clone for Handler<V> {
    fn clone(&self) -> Self {
        match self {
            Handler::Callback(h) => Handler::Callback(h.clone()),
            Handler::Future(h) => Handler::Future(h.clone()),
        }
    }
}

impl<V: Payload> std::fmt::Debug for Handler<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Handler::Callback(_) => f.write_str("Handler::Callback"),
            Handler::Future(_) => f.write_str("Handler::Future"),
        }
    }
}

/// Conversion for operations that accept one handler or an ordered list.
pub trait IntoHandlers<V: Payload> {
    /// Flatten into an ordered handler list.
    fn into_handlers(self) -> Vec<Handler<V>>;
}

impl<V: Payload> IntoHandlers<V> for Handler<V> {
    fn into_handlers(self) -> Vec<Handler<V>> {
        vec![self]
    }
}

impl<V: Payload> IntoHandlers<V> for Vec<Handler<V>> {
    fn into_handlers(self) -> Vec<Handler<V>> {
        self
    }
}

impl<V: Payload, const N: usize> IntoHandlers<V> for [Handler<V>; N] {
    fn into_handlers(self) -> Vec<Handler<V>> {
        self.into()
    }
}
