//! Pipeline configuration and partial-update merging.

/// Resolved configuration of a pipeline.
///
/// | flag | default | effect |
/// |------|---------|--------|
/// | `global_args` | `false` | every stage sees the original call arguments instead of the previous stage's output |
/// | `multi_args` | `true` | more than one value may be forwarded between stages |
/// | `post_middleware` | `true` | post-stages are included in the composed chain |
/// | `only_promise` | `false` | stages are adapted promise-only; callback-convention handlers fail |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Reset the value list to the original call arguments before each stage.
    pub global_args: bool,
    /// Forward the full value list between stages; otherwise truncate to one.
    pub multi_args: bool,
    /// Include post-stages in the composed chain.
    pub post_middleware: bool,
    /// Adapt stages with the promise-only convention.
    pub only_promise: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            global_args: false,
            multi_args: true,
            post_middleware: true,
            only_promise: false,
        }
    }
}

impl Options {
    /// Apply a partial update. Fields the patch leaves unset keep their
    /// current value; an explicit setting always wins.
    pub fn apply(self, patch: OptionsPatch) -> Self {
        Self {
            global_args: patch.global_args.unwrap_or(self.global_args),
            multi_args: patch.multi_args.unwrap_or(self.multi_args),
            post_middleware: patch.post_middleware.unwrap_or(self.post_middleware),
            only_promise: patch.only_promise.unwrap_or(self.only_promise),
        }
    }
}

/// A partial configuration update.
///
/// Built with the setter methods; unset fields inherit the previous value
/// when applied via [`Options::apply`].
///
/// # Example
///
/// ```rust,ignore
/// let opts = Options::default().apply(OptionsPatch::new().multi_args(false));
/// assert!(!opts.multi_args);
/// assert!(opts.post_middleware); // inherited
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptionsPatch {
    global_args: Option<bool>,
    multi_args: Option<bool>,
    post_middleware: Option<bool>,
    only_promise: Option<bool>,
}

impl OptionsPatch {
    /// Create an empty patch that inherits everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `global_args`.
    pub fn global_args(mut self, value: bool) -> Self {
        self.global_args = Some(value);
        self
    }

    /// Set `multi_args`.
    pub fn multi_args(mut self, value: bool) -> Self {
        self.multi_args = Some(value);
        self
    }

    /// Set `post_middleware`.
    pub fn post_middleware(mut self, value: bool) -> Self {
        self.post_middleware = Some(value);
        self
    }

    /// Set `only_promise`.
    pub fn only_promise(mut self, value: bool) -> Self {
        self.only_promise = Some(value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let opts = Options::default();
        assert!(!opts.global_args);
        assert!(opts.multi_args);
        assert!(opts.post_middleware);
        assert!(!opts.only_promise);
    }

    #[test]
    fn unset_fields_inherit_previous_value() {
        let opts = Options::default()
            .apply(OptionsPatch::new().multi_args(false).global_args(true));
        assert!(opts.global_args);
        assert!(!opts.multi_args);
        assert!(opts.post_middleware, "untouched field must be inherited");

        // A second partial update must not disturb the first one.
        let opts = opts.apply(OptionsPatch::new().only_promise(true));
        assert!(opts.global_args);
        assert!(!opts.multi_args);
        assert!(opts.only_promise);
    }

    #[test]
    fn explicit_setting_always_wins() {
        let opts = Options::default().apply(OptionsPatch::new().multi_args(true));
        assert!(opts.multi_args);
        let opts = opts.apply(OptionsPatch::new().multi_args(false));
        assert!(!opts.multi_args);
    }
}
