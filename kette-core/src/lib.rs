//! # kette-core
//!
//! Core traits and primitives for the Kette event middleware engine.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! integrations that supply handlers without needing the full `kette`
//! engine.
//!
//! # Concepts
//!
//! ## Handlers
//!
//! User-supplied stage logic arrives in one of two asynchronous calling
//! conventions, reconciled by the engine into a single settlement model:
//!
//! - [`CallbackHandler`]: the error-first convention. The handler
//!   receives its arguments plus an injected [`Completion`] handle and
//!   reports through it: `reject` fails the stage, `resolve*` succeeds it
//!   with an ordered value list.
//! - [`FutureHandler`]: the promise convention. The handler receives only
//!   its arguments and returns a future; the future's output converts into
//!   the settlement via [`IntoStageOutput`].
//!
//! Both traits have blanket implementations for closures and object-safe
//! `Dyn*` twins for stored stage lists. [`Handler`] is the closed
//! two-variant type pipelines store.
//!
//! ## Configuration
//!
//! [`Options`] carries the four data-flow flags (`global_args`,
//! `multi_args`, `post_middleware`, `only_promise`); [`OptionsPatch`]
//! expresses partial updates with explicit-override-wins merging.
//!
//! ## Settlement
//!
//! A completed call collapses its final value list into an [`Outcome`];
//! failures travel as [`BoxError`] into an [`ErrorSink`] (default:
//! [`Rethrow`]).

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod completion;
mod error;
mod handler;
mod options;
mod outcome;
mod output;
mod payload;
mod sink;

// Re-exports
pub use completion::{Completion, CompletionReceiver};
pub use error::{BoxError, CatalogError, StageError};
pub use handler::{
    CallbackHandler, DynFutureHandler, FutureHandler, Handler, IntoHandlers,
};
pub use options::{Options, OptionsPatch};
pub use outcome::Outcome;
pub use output::IntoStageOutput;
pub use payload::Payload;
pub use sink::{DoneSink, DynErrorSink, ErrorSink, Rethrow};
