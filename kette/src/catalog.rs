//! The catalog: named pipelines, group operations, and derived views.
//!
//! A root catalog exclusively owns its pipelines by name, in registration
//! order. [`Catalog::select`] produces a derived view: non-owning name
//! references into the root plus a parent pointer, so deletion through any
//! view writes through to the root and the entry becomes unreachable from
//! every sibling view. Registration through a view stays local to that
//! view (it does not propagate to the root; see DESIGN.md).

use crate::pipeline::Pipeline;
use kette_core::{
    BoxError, CatalogError, DynErrorSink, ErrorSink, Handler, IntoHandlers, Options, OptionsPatch,
    Outcome, Payload,
};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, RwLock};

/// Insertion-ordered name → pipeline mapping.
struct Entries<V: Payload> {
    order: Vec<String>,
    map: HashMap<String, Arc<Pipeline<V>>>,
}

impl<V: Payload> Entries<V> {
    fn new() -> Self {
        Self {
            order: Vec::new(),
            map: HashMap::new(),
        }
    }

    fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    fn get(&self, name: &str) -> Option<Arc<Pipeline<V>>> {
        self.map.get(name).cloned()
    }

    fn insert(&mut self, name: String, pipeline: Arc<Pipeline<V>>) {
        if !self.map.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.map.insert(name, pipeline);
    }

    fn remove(&mut self, name: &str) -> Option<Arc<Pipeline<V>>> {
        let removed = self.map.remove(name);
        if removed.is_some() {
            self.order.retain(|n| n != name);
        }
        removed
    }

    fn clear(&mut self) {
        self.order.clear();
        self.map.clear();
    }

    fn iter(&self) -> impl Iterator<Item = (&String, &Arc<Pipeline<V>>)> {
        self.order.iter().filter_map(|n| self.map.get(n).map(|p| (n, p)))
    }
}

/// Root storage, shared by the root catalog and every derived view.
struct Store<V: Payload> {
    entries: RwLock<Entries<V>>,
}

/// The index a derived view carries: names resolved against the root at
/// read time, plus pipelines registered through the view itself.
struct View<V: Payload> {
    names: RwLock<Vec<String>>,
    local: RwLock<Entries<V>>,
}

/// An owning map of event names to pipelines, with derived filtered views.
///
/// All group operations act on the entries currently visible in this
/// catalog's scope and are total; only [`register`] (duplicate name) and
/// the name-targeted operations ([`pipeline`], [`call`], `*_on`) fail, and
/// they fail synchronously at the call site.
///
/// [`register`]: Catalog::register
/// [`pipeline`]: Catalog::pipeline
/// [`call`]: Catalog::call
pub struct Catalog<V: Payload> {
    store: Arc<Store<V>>,
    view: Option<View<V>>,
    defaults: RwLock<Options>,
}

impl<V: Payload> std::fmt::Debug for Catalog<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("events", &self.event_names())
            .field("view", &self.view.is_some())
            .finish()
    }
}

impl<V: Payload> Default for Catalog<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Payload> Catalog<V> {
    /// Create an empty root catalog with default pipeline options.
    pub fn new() -> Self {
        Self::with_defaults(Options::default())
    }

    /// Create an empty root catalog whose registered pipelines start from
    /// the given options.
    pub fn with_defaults(defaults: Options) -> Self {
        Self {
            store: Arc::new(Store {
                entries: RwLock::new(Entries::new()),
            }),
            view: None,
            defaults: RwLock::new(defaults),
        }
    }

    fn default_options(&self) -> Options {
        *self.defaults.read().expect("catalog defaults poisoned")
    }

    /// Entries currently visible in this catalog's scope, in order.
    fn visible(&self) -> Vec<(String, Arc<Pipeline<V>>)> {
        let entries = self.store.entries.read().expect("catalog store poisoned");
        match &self.view {
            None => entries.iter().map(|(n, p)| (n.clone(), p.clone())).collect(),
            Some(view) => {
                let names = view.names.read().expect("view names poisoned");
                let local = view.local.read().expect("view entries poisoned");
                names
                    .iter()
                    .filter_map(|n| entries.get(n).map(|p| (n.clone(), p)))
                    .chain(local.iter().map(|(n, p)| (n.clone(), p.clone())))
                    .collect()
            }
        }
    }

    /// Register a pipeline under a unique event name, using this catalog's
    /// default options.
    ///
    /// # Errors
    ///
    /// [`CatalogError::AlreadyRegistered`] if the name exists anywhere in
    /// the root mapping or among this view's local entries.
    pub fn register(
        &self,
        name: impl Into<String>,
        main: Handler<V>,
    ) -> Result<Arc<Pipeline<V>>, CatalogError> {
        self.register_with(name, main, OptionsPatch::new())
    }

    /// Register a pipeline with a partial options override on top of this
    /// catalog's defaults.
    pub fn register_with(
        &self,
        name: impl Into<String>,
        main: Handler<V>,
        patch: OptionsPatch,
    ) -> Result<Arc<Pipeline<V>>, CatalogError> {
        let name = name.into();
        let options = self.default_options().apply(patch);
        let mut entries = self.store.entries.write().expect("catalog store poisoned");
        let local_conflict = match &self.view {
            Some(view) => view
                .local
                .read()
                .expect("view entries poisoned")
                .contains(&name),
            None => false,
        };
        if entries.contains(&name) || local_conflict {
            return Err(CatalogError::AlreadyRegistered(name));
        }
        let pipeline = Arc::new(Pipeline::new(name.clone(), main, options));
        #[cfg(feature = "tracing")]
        tracing::debug!(event = %name, "pipeline registered");
        match &self.view {
            // Registration through a view stays local to the view.
            Some(view) => view
                .local
                .write()
                .expect("view entries poisoned")
                .insert(name, pipeline.clone()),
            None => entries.insert(name, pipeline.clone()),
        }
        Ok(pipeline)
    }

    /// Whether a pipeline under this name is visible in this scope.
    pub fn has(&self, name: &str) -> bool {
        let entries = self.store.entries.read().expect("catalog store poisoned");
        match &self.view {
            None => entries.contains(name),
            Some(view) => {
                let in_root = view
                    .names
                    .read()
                    .expect("view names poisoned")
                    .iter()
                    .any(|n| n == name)
                    && entries.contains(name);
                in_root
                    || view
                        .local
                        .read()
                        .expect("view entries poisoned")
                        .contains(name)
            }
        }
    }

    /// Event names visible in this scope, in registration order.
    pub fn event_names(&self) -> Vec<String> {
        self.visible().into_iter().map(|(n, _)| n).collect()
    }

    /// True when no pipeline is visible in this scope.
    pub fn is_empty(&self) -> bool {
        self.visible().is_empty()
    }

    /// Number of pipelines visible in this scope.
    pub fn len(&self) -> usize {
        self.visible().len()
    }

    /// The pipeline under this name, if visible.
    pub fn get(&self, name: &str) -> Option<Arc<Pipeline<V>>> {
        let entries = self.store.entries.read().expect("catalog store poisoned");
        match &self.view {
            None => entries.get(name),
            Some(view) => {
                let selected = view
                    .names
                    .read()
                    .expect("view names poisoned")
                    .iter()
                    .any(|n| n == name);
                if selected {
                    if let Some(p) = entries.get(name) {
                        return Some(p);
                    }
                }
                view.local.read().expect("view entries poisoned").get(name)
            }
        }
    }

    /// The pipeline under this name, failing when it is absent.
    ///
    /// # Errors
    ///
    /// [`CatalogError::NotFound`] if no such entry is visible.
    pub fn pipeline(&self, name: &str) -> Result<Arc<Pipeline<V>>, CatalogError> {
        self.get(name)
            .ok_or_else(|| CatalogError::NotFound(name.to_string()))
    }

    /// Look up a pipeline and invoke it: the event-source dispatch point.
    ///
    /// The lookup failure is synchronous; only the pipeline execution is
    /// asynchronous. The caller may discard the returned future's result
    /// per its own policy.
    ///
    /// # Errors
    ///
    /// [`CatalogError::NotFound`] if no such entry is visible.
    pub fn call(
        &self,
        name: &str,
        args: Vec<V>,
    ) -> Result<
        impl Future<Output = Result<Outcome<V>, BoxError>> + Send + 'static + use<V>,
        CatalogError,
    > {
        Ok(self.pipeline(name)?.call(args))
    }

    /// Derive a filtered view containing the given names that currently
    /// exist in this scope. Missing names are silently omitted; selecting
    /// only missing names yields an empty view.
    pub fn select<S: Into<String>>(&self, names: impl IntoIterator<Item = S>) -> Catalog<V> {
        let mut selected = Vec::new();
        let mut local = Entries::new();
        {
            let entries = self.store.entries.read().expect("catalog store poisoned");
            for name in names {
                let name = name.into();
                match &self.view {
                    None => {
                        if entries.contains(&name) && !selected.contains(&name) {
                            selected.push(name);
                        }
                    }
                    Some(view) => {
                        let in_scope = view
                            .names
                            .read()
                            .expect("view names poisoned")
                            .iter()
                            .any(|n| *n == name);
                        if in_scope && entries.contains(&name) {
                            if !selected.contains(&name) {
                                selected.push(name);
                            }
                        } else if let Some(p) =
                            view.local.read().expect("view entries poisoned").get(&name)
                        {
                            local.insert(name, p);
                        }
                    }
                }
            }
        }
        Catalog {
            store: self.store.clone(),
            view: Some(View {
                names: RwLock::new(selected),
                local: RwLock::new(local),
            }),
            defaults: RwLock::new(self.default_options()),
        }
    }

    /// Remove the named pipelines from this scope and from the root
    /// mapping, making them unreachable from every view of the same root.
    pub fn remove<S: AsRef<str>>(&self, names: impl IntoIterator<Item = S>) -> &Self {
        let mut entries = self.store.entries.write().expect("catalog store poisoned");
        for name in names {
            let name = name.as_ref();
            entries.remove(name);
            if let Some(view) = &self.view {
                view.names
                    .write()
                    .expect("view names poisoned")
                    .retain(|n| n != name);
                view.local
                    .write()
                    .expect("view entries poisoned")
                    .remove(name);
            }
            #[cfg(feature = "tracing")]
            tracing::debug!(event = %name, "pipeline removed");
        }
        self
    }

    /// Remove every pipeline visible in this scope (write-through).
    pub fn clear(&self) -> &Self {
        let names = self.event_names();
        self.remove(names)
    }

    /// Append pre-stage handlers to every pipeline visible in this scope.
    ///
    /// Pipelines registered in the root after this view was derived are
    /// not affected.
    pub fn pre(&self, handlers: impl IntoHandlers<V>) -> &Self {
        let handlers = handlers.into_handlers();
        for (_, pipeline) in self.visible() {
            pipeline.pre(handlers.clone());
        }
        self
    }

    /// Append post-stage handlers to every pipeline visible in this scope.
    pub fn post(&self, handlers: impl IntoHandlers<V>) -> &Self {
        let handlers = handlers.into_handlers();
        for (_, pipeline) in self.visible() {
            pipeline.post(handlers.clone());
        }
        self
    }

    /// Install the error sink on every pipeline visible in this scope.
    pub fn on_error(&self, sink: impl ErrorSink<V>) -> &Self {
        let sink: Arc<dyn DynErrorSink<V>> = Arc::new(sink);
        for (_, pipeline) in self.visible() {
            pipeline.set_error_sink(sink.clone());
        }
        self
    }

    /// Merge a partial options update into this catalog's defaults and
    /// into every pipeline visible in this scope.
    pub fn set_options(&self, patch: OptionsPatch) -> &Self {
        {
            let mut defaults = self.defaults.write().expect("catalog defaults poisoned");
            *defaults = defaults.apply(patch);
        }
        for (_, pipeline) in self.visible() {
            pipeline.set_options(patch);
        }
        self
    }

    /// Append pre-stage handlers to specific named pipelines.
    ///
    /// # Errors
    ///
    /// [`CatalogError::NotFound`] if any name is absent from this scope;
    /// no pipeline is modified in that case.
    pub fn pre_on<S: AsRef<str>>(
        &self,
        names: impl IntoIterator<Item = S>,
        handlers: impl IntoHandlers<V>,
    ) -> Result<&Self, CatalogError> {
        let targets = self.resolve(names)?;
        let handlers = handlers.into_handlers();
        for pipeline in targets {
            pipeline.pre(handlers.clone());
        }
        Ok(self)
    }

    /// Append post-stage handlers to specific named pipelines.
    ///
    /// # Errors
    ///
    /// [`CatalogError::NotFound`] if any name is absent from this scope;
    /// no pipeline is modified in that case.
    pub fn post_on<S: AsRef<str>>(
        &self,
        names: impl IntoIterator<Item = S>,
        handlers: impl IntoHandlers<V>,
    ) -> Result<&Self, CatalogError> {
        let targets = self.resolve(names)?;
        let handlers = handlers.into_handlers();
        for pipeline in targets {
            pipeline.post(handlers.clone());
        }
        Ok(self)
    }

    /// Install the error sink on specific named pipelines.
    ///
    /// # Errors
    ///
    /// [`CatalogError::NotFound`] if any name is absent from this scope;
    /// no pipeline is modified in that case.
    pub fn on_error_on<S: AsRef<str>>(
        &self,
        names: impl IntoIterator<Item = S>,
        sink: impl ErrorSink<V>,
    ) -> Result<&Self, CatalogError> {
        let targets = self.resolve(names)?;
        let sink: Arc<dyn DynErrorSink<V>> = Arc::new(sink);
        for pipeline in targets {
            pipeline.set_error_sink(sink.clone());
        }
        Ok(self)
    }

    /// Resolve every name or fail before touching anything.
    fn resolve<S: AsRef<str>>(
        &self,
        names: impl IntoIterator<Item = S>,
    ) -> Result<Vec<Arc<Pipeline<V>>>, CatalogError> {
        names
            .into_iter()
            .map(|name| self.pipeline(name.as_ref()))
            .collect()
    }
}
