//! Rule evaluators.
//!
//! `build()` produces a [`Validation`]: the synchronous evaluator when every
//! rule is synchronous, the asynchronous one otherwise. Both are immutable
//! and can be shared across threads and reused for any number of models.

mod async_validation;
mod error;
mod sync_validation;

pub use async_validation::AsyncValidation;
pub use error::ValidationError;
pub use sync_validation::SyncValidation;

use crate::core::{Model, ValidationOutcome};
use tokio_util::sync::CancellationToken;

/// Evaluator produced by `build()`.
pub enum Validation<M> {
    Sync(SyncValidation<M>),
    Async(AsyncValidation<M>),
}

impl<M: Model> Validation<M> {
    pub fn is_async(&self) -> bool {
        matches!(self, Validation::Async(_))
    }

    pub fn rule_count(&self) -> usize {
        match self {
            Validation::Sync(validation) => validation.rule_count(),
            Validation::Async(validation) => validation.rule_count(),
        }
    }

    /// Validate synchronously.
    ///
    /// Fails with [`ValidationError::UnsupportedOperation`] when the rule set
    /// contains asynchronous rules.
    pub fn validate(&self, model: &M) -> Result<ValidationOutcome, ValidationError> {
        match self {
            Validation::Sync(validation) => validation.validate(model),
            Validation::Async(_) => Err(ValidationError::UnsupportedOperation),
        }
    }

    /// Validate, awaiting asynchronous rules if there are any.
    pub async fn validate_async(&self, model: &M) -> Result<ValidationOutcome, ValidationError> {
        self.validate_async_with(model, CancellationToken::new())
            .await
    }

    /// Like [`validate_async`](Self::validate_async), with a caller-owned
    /// cancellation signal.
    pub async fn validate_async_with(
        &self,
        model: &M,
        cancel: CancellationToken,
    ) -> Result<ValidationOutcome, ValidationError> {
        match self {
            Validation::Sync(validation) => validation.validate(model),
            Validation::Async(validation) => validation.validate_async_with(model, cancel).await,
        }
    }

    pub fn as_sync(&self) -> Option<&SyncValidation<M>> {
        match self {
            Validation::Sync(validation) => Some(validation),
            Validation::Async(_) => None,
        }
    }

    pub fn as_async(&self) -> Option<&AsyncValidation<M>> {
        match self {
            Validation::Sync(_) => None,
            Validation::Async(validation) => Some(validation),
        }
    }
}

impl<M> Clone for Validation<M> {
    fn clone(&self) -> Self {
        match self {
            Validation::Sync(validation) => Validation::Sync(validation.clone()),
            Validation::Async(validation) => Validation::Async(validation.clone()),
        }
    }
}

impl<M> std::fmt::Debug for Validation<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Validation::Sync(validation) => f.debug_tuple("Sync").field(validation).finish(),
            Validation::Async(validation) => f.debug_tuple("Async").field(validation).finish(),
        }
    }
}
