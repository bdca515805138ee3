//! Build errors for the rule builder.

use thiserror::Error;

/// Builder protocol violations.
///
/// A violation is recorded on the rule store at the offending call and
/// returned by `build()`. Only the first violation is kept.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("Call 'for_field' before using '{operation}'")]
    FieldNotSelected { operation: &'static str },

    #[error("No validator to attach a condition to. Call .add_rule(..) before '{operation}'")]
    NoValidator { operation: &'static str },

    #[error("Ambiguous builder state in '{operation}' for field '{field}': {reason}")]
    AmbiguousState {
        operation: &'static str,
        field: String,
        reason: String,
    },
}
