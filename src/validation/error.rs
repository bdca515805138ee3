//! Errors raised while evaluating rules.
//!
//! A model failing its rules is not an error; it is reported through the
//! outcome. These errors signal misuse or a validator that could not decide.

use crate::core::ValidatorError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    /// An asynchronous validator was reached by the synchronous evaluator.
    #[error("Asynchronous validator on field '{field}' in a synchronous validation. Use validate_async")]
    UnexpectedAsync { field: String },

    /// `validate` was called on a rule set containing asynchronous rules.
    #[error("Rule set contains asynchronous rules. Use validate_async")]
    UnsupportedOperation,

    /// A validator returned an error instead of a verdict.
    #[error("Validator for field '{field}' failed: {source}")]
    Validator {
        field: String,
        #[source]
        source: ValidatorError,
    },
}
