//! Error types for Kette.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`CatalogError`] - Synchronous registration/lookup failures
//! - [`StageError`] - Failures raised by the call adapter itself
//!
//! Failures produced by user handlers are not enumerated here; they travel
//! through pipelines as [`BoxError`] values and reach the error sink as-is.

use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Synchronous errors raised by a [`Catalog`] at the call site.
///
/// These are never funneled through a pipeline's error sink: a conflicting
/// or missing name is a local bug at the registration/lookup point, not an
/// asynchronous handler failure.
///
/// [`Catalog`]: https://docs.rs/kette
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The event name is already registered in this catalog's scope.
    #[error("event `{0}` is already registered")]
    AlreadyRegistered(String),

    /// No pipeline is registered under the given event name.
    #[error("no pipeline registered for event `{0}`")]
    NotFound(String),
}

/// Errors produced by the call adapter while running a stage.
///
/// These are delivered through the pipeline's error sink exactly like any
/// other handler failure.
#[derive(Error, Debug)]
pub enum StageError {
    /// A callback-convention handler dropped its completion handle without
    /// signaling success or failure.
    ///
    /// A handler that merely *stores* the handle keeps the stage pending;
    /// dropping it unsigned is distinguishable and fails the stage.
    #[error("stage completion handle dropped without signaling")]
    Abandoned,

    /// A callback-convention handler was executed in a promise-only
    /// pipeline (`only_promise` enabled).
    #[error("callback-convention handler in a promise-only pipeline")]
    PromiseOnly,
}
