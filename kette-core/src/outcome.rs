//! Final result of a pipeline call.

use crate::payload::Payload;

/// The collapsed result of a completed pipeline call.
///
/// The last stage's value list collapses per the original convention:
/// fewer than two values become [`Outcome::Empty`] or [`Outcome::One`],
/// anything longer stays a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<V: Payload> {
    /// The final value list was empty.
    Empty,
    /// Exactly one value remained.
    One(V),
    /// Two or more values remained, in stage order.
    Many(Vec<V>),
}

impl<V: Payload> Outcome<V> {
    /// Collapse a value list into an outcome.
    pub fn from_values(mut values: Vec<V>) -> Self {
        match values.len() {
            0 => Outcome::Empty,
            1 => Outcome::One(values.remove(0)),
            _ => Outcome::Many(values),
        }
    }

    /// The single value, if exactly one remained.
    pub fn one(self) -> Option<V> {
        match self {
            Outcome::One(v) => Some(v),
            _ => None,
        }
    }

    /// Expand back into a value list.
    pub fn into_values(self) -> Vec<V> {
        match self {
            Outcome::Empty => Vec::new(),
            Outcome::One(v) => vec![v],
            Outcome::Many(vs) => vs,
        }
    }

    /// True when no value remained.
    pub fn is_empty(&self) -> bool {
        matches!(self, Outcome::Empty)
    }
}
