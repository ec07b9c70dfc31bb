//! Payload trait for stage argument values.

/// A marker trait for the values that flow between pipeline stages.
///
/// Payloads must be `Clone` because the `global_args` option re-presents
/// the original call arguments to every stage, and `Send + Sync + 'static`
/// to be safe for async use. Shared mutable state is expressed by choosing
/// a shared payload such as `Arc<Mutex<T>>`.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Clone)]
/// struct Order { id: u64 }
/// // `Order` is a Payload automatically.
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a valid Payload",
    label = "must be `Clone + Send + Sync + 'static`",
    note = "Values forwarded between stages must be cloneable and thread-safe."
)]
pub trait Payload: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> Payload for T {}
