//! Stage output conversion traits.

use crate::error::BoxError;
use crate::payload::Payload;

/// Trait for converting a future-convention handler's output into the
/// uniform stage settlement `Result<Vec<V>, BoxError>`.
///
/// # Default Implementations
///
/// - `()` → success with an empty value list
/// - `Vec<V>` → success with that list
/// - `Result<T, E>` → delegates to inner `T` or fails the stage with `E`
///
/// A handler producing a single value returns `vec![value]`; an empty
/// vector is the normalized "resolved with nothing" case.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a stage output for payload `{V}`",
    label = "missing `IntoStageOutput` implementation",
    note = "Future-convention handlers must return `()`, `Vec<{V}>`, or a `Result` of either."
)]
pub trait IntoStageOutput<V: Payload>: Send {
    /// Convert the handler output into the stage settlement.
    fn into_output(self) -> Result<Vec<V>, BoxError>;
}

impl<V: Payload> IntoStageOutput<V> for () {
    fn into_output(self) -> Result<Vec<V>, BoxError> {
        Ok(Vec::new())
    }
}

impl<V: Payload> IntoStageOutput<V> for Vec<V> {
    fn into_output(self) -> Result<Vec<V>, BoxError> {
        Ok(self)
    }
}

impl<V, T, E> IntoStageOutput<V> for Result<T, E>
where
    V: Payload,
    T: IntoStageOutput<V>,
    E: Into<BoxError> + Send,
{
    fn into_output(self) -> Result<Vec<V>, BoxError> {
        match self {
            Ok(t) => t.into_output(),
            Err(e) => Err(e.into()),
        }
    }
}
