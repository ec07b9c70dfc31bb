//! # kette - Asynchronous Event Middleware Engine
//!
//! `kette` attaches an ordered chain of asynchronous handlers (pre-hooks,
//! one main handler, post-hooks) to a named event and invokes that chain
//! through a single uniform call, regardless of whether each handler
//! signals completion via an error-first [`Completion`] handle or by
//! returning a future.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use kette::{Catalog, Completion, Handler};
//!
//! let catalog = Catalog::new();
//! let pipeline = catalog.register(
//!     "user.created",
//!     Handler::callback(|args: Vec<i64>, done: Completion<i64>| {
//!         done.resolve_one(args[0] + 1);
//!     }),
//! )?;
//! pipeline.pre(Handler::future(|args: Vec<i64>| async move { vec![args[0] + 1] }));
//!
//! let outcome = pipeline.call(vec![1]).await?; // Outcome::One(3)
//! ```
//!
//! ## Architecture
//!
//! - **Call adapter**: normalizes a handler of either convention into a
//!   stage with one settlement contract (`Vec<V>` in, `Vec<V>` or failure
//!   out).
//! - **[`Pipeline`]**: the per-event chain. Composes
//!   `pres ++ [main] ++ posts?` per its [`Options`], runs it as a strictly
//!   sequential continuation over a snapshot taken at call time, and
//!   reports through its completion/error sinks.
//! - **[`Catalog`]**: owns pipelines by unique name, broadcasts group
//!   operations, and derives filtered views whose deletions write through
//!   to the root.

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod catalog;
mod pipeline;
mod stage;

pub use catalog::Catalog;
pub use pipeline::Pipeline;

pub use kette_core::{
    // Errors
    BoxError,
    // Handler conventions
    CallbackHandler,
    CatalogError,
    Completion,
    CompletionReceiver,
    DoneSink,
    DynErrorSink,
    DynFutureHandler,
    ErrorSink,
    FutureHandler,
    Handler,
    IntoHandlers,
    IntoStageOutput,
    // Configuration
    Options,
    OptionsPatch,
    // Settlement
    Outcome,
    Payload,
    Rethrow,
    StageError,
};

/// Prelude module - common imports for Kette.
///
/// # Usage
///
/// ```rust,ignore
/// use kette::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        BoxError, Catalog, CatalogError, Completion, ErrorSink, Handler, Options, OptionsPatch,
        Outcome, Payload, Pipeline, StageError,
    };
}
