//! The per-event middleware chain.
//!
//! A [`Pipeline`] owns an ordered set of pre-stages, exactly one main
//! stage, and an ordered set of post-stages. The composed chain
//! `pres ++ [main] ++ posts?` is rebuilt deterministically whenever a
//! stage is added or options change, never ad hoc per call.

use crate::stage::{CallStyle, Stage};
use kette_core::{
    BoxError, DoneSink, DynErrorSink, ErrorSink, Handler, IntoHandlers, Options, OptionsPatch,
    Outcome, Payload, Rethrow,
};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

struct Inner<V: Payload> {
    pres: Vec<Handler<V>>,
    main: Handler<V>,
    posts: Vec<Handler<V>>,
    composed: Vec<Stage<V>>,
    options: Options,
    on_error: Arc<dyn DynErrorSink<V>>,
    on_done: DoneSink<V>,
}

impl<V: Payload> Inner<V> {
    /// Rebuild (and re-adapt) the composed stage list from the current
    /// handler lists and options.
    fn recompose(&mut self) {
        let style = CallStyle::from_only_promise(self.options.only_promise);
        let mut composed = Vec::with_capacity(self.pres.len() + 1 + self.posts.len());
        composed.extend(self.pres.iter().map(|h| Stage::new(h.clone(), style)));
        composed.push(Stage::new(self.main.clone(), style));
        if self.options.post_middleware {
            composed.extend(self.posts.iter().map(|h| Stage::new(h.clone(), style)));
        }
        self.composed = composed;
    }
}

/// The middleware chain registered under one event name.
///
/// All methods take `&self`; a pipeline is shared as `Arc<Pipeline<V>>`
/// between its catalog and the event source that invokes it. Mutators
/// return `&Self` for chaining.
///
/// # Example
///
/// ```rust,ignore
/// let pipeline = Pipeline::new("order.placed", Handler::future(check_stock), Options::default());
/// pipeline
///     .pre(Handler::future(validate))
///     .post(Handler::future(notify))
///     .done(|outcome| println!("settled: {outcome:?}"));
/// let result = pipeline.call(vec![order]).await?;
/// ```
pub struct Pipeline<V: Payload> {
    name: String,
    inner: Mutex<Inner<V>>,
}

impl<V: Payload> std::fmt::Debug for Pipeline<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("stages", &self.stage_count())
            .finish()
    }
}

impl<V: Payload> Pipeline<V> {
    /// Create a pipeline with the given main handler and options.
    pub fn new(name: impl Into<String>, main: Handler<V>, options: Options) -> Self {
        let mut inner = Inner {
            pres: Vec::new(),
            main,
            posts: Vec::new(),
            composed: Vec::new(),
            options,
            on_error: Arc::new(Rethrow),
            on_done: Arc::new(|_| {}),
        };
        inner.recompose();
        Self {
            name: name.into(),
            inner: Mutex::new(inner),
        }
    }

    fn state(&self) -> MutexGuard<'_, Inner<V>> {
        self.inner.lock().expect("pipeline state poisoned")
    }

    /// The event name this pipeline is registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current resolved options.
    pub fn options(&self) -> Options {
        self.state().options
    }

    /// Length of the composed chain (pres + main + included posts).
    pub fn stage_count(&self) -> usize {
        self.state().composed.len()
    }

    /// Append one pre-stage handler or an ordered list of them.
    pub fn pre(&self, handlers: impl IntoHandlers<V>) -> &Self {
        let mut state = self.state();
        state.pres.extend(handlers.into_handlers());
        state.recompose();
        self
    }

    /// Append one post-stage handler or an ordered list of them.
    pub fn post(&self, handlers: impl IntoHandlers<V>) -> &Self {
        let mut state = self.state();
        state.posts.extend(handlers.into_handlers());
        state.recompose();
        self
    }

    /// Merge a partial configuration update and recompose the chain.
    ///
    /// Fields the patch leaves unset keep their current value.
    pub fn set_options(&self, patch: OptionsPatch) -> &Self {
        let mut state = self.state();
        state.options = state.options.apply(patch);
        state.recompose();
        self
    }

    /// Replace the error sink.
    pub fn catch(&self, sink: impl ErrorSink<V>) -> &Self {
        self.set_error_sink(Arc::new(sink));
        self
    }

    pub(crate) fn set_error_sink(&self, sink: Arc<dyn DynErrorSink<V>>) {
        self.state().on_error = sink;
    }

    /// Replace the completion sink.
    pub fn done(&self, sink: impl Fn(Outcome<V>) + Send + Sync + 'static) -> &Self {
        self.set_done_sink(Arc::new(sink));
        self
    }

    pub(crate) fn set_done_sink(&self, sink: DoneSink<V>) {
        self.state().on_done = sink;
    }

    /// Execute the composed chain with the given call arguments.
    ///
    /// The chain is strictly sequential: stage *i+1* never starts before
    /// stage *i* settles, and the first failure short-circuits the rest
    /// into the error sink. The composed stage list, options, and sinks
    /// are snapshotted when `call` is invoked; mutations made while the
    /// returned future runs affect later calls only.
    ///
    /// Data flow per stage: with `global_args` the value list is reset to
    /// the original arguments first; with `multi_args` disabled it is
    /// truncated to at most one value. The same transforms apply once more
    /// to the final list before it collapses into the [`Outcome`].
    pub fn call(
        &self,
        args: Vec<V>,
    ) -> impl Future<Output = Result<Outcome<V>, BoxError>> + Send + 'static + use<V> {
        let (stages, options, on_error, on_done) = {
            let state = self.state();
            (
                state.composed.clone(),
                state.options,
                state.on_error.clone(),
                state.on_done.clone(),
            )
        };
        #[cfg(feature = "tracing")]
        let name = self.name.clone();

        async move {
            #[cfg(feature = "tracing")]
            tracing::trace!(event = %name, stages = stages.len(), "pipeline call");

            let mut current = args.clone();
            for stage in &stages {
                if options.global_args {
                    current = args.clone();
                }
                if !options.multi_args {
                    current.truncate(1);
                }
                match stage.run(current).await {
                    Ok(values) => current = values,
                    Err(error) => {
                        #[cfg(feature = "tracing")]
                        tracing::debug!(event = %name, %error, "stage failed");
                        return on_error.handle_dyn(error).await;
                    }
                }
            }
            if options.global_args {
                current = args;
            }
            if !options.multi_args {
                current.truncate(1);
            }
            let outcome = Outcome::from_values(current);
            (on_done.as_ref())(outcome.clone());
            Ok(outcome)
        }
    }
}
