//! Validation outcomes.
//!
//! An outcome is either `Valid` or `Invalid` with one error entry per failing
//! field. Outcomes serialize to the `{"isValid", "result"}` shape consumers
//! of form validators expect.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

/// Error reported for a single field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    /// Display name of the field (the alias, if one was set)
    pub property_name: String,
    /// Resolved error message
    pub message: String,
}

impl FieldError {
    pub fn new(property_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            property_name: property_name.into(),
            message: message.into(),
        }
    }
}

/// Per-field errors keyed by field name.
pub type FieldErrors = BTreeMap<String, FieldError>;

static NO_ERRORS: FieldErrors = BTreeMap::new();

/// A single field failure, as accumulated by [`ValidationOutcome::to_validation`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{property_name}: {message}")]
pub struct FieldViolation {
    pub field: String,
    pub property_name: String,
    pub message: String,
}

/// Result of validating one model instance.
///
/// `Valid` never carries errors; `Invalid` carries exactly the map that was
/// collected.
///
/// # Example
///
/// ```rust
/// use rulecraft::core::{FieldError, FieldErrors, ValidationOutcome};
///
/// let valid = ValidationOutcome::new(true, FieldErrors::new());
/// assert!(valid.is_valid());
/// assert!(valid.result().is_empty());
///
/// let mut errors = FieldErrors::new();
/// errors.insert("age".to_string(), FieldError::new("age", "Must be 18 or older"));
/// let invalid = ValidationOutcome::new(false, errors);
/// assert_eq!(invalid.get("age").map(|e| e.message.as_str()), Some("Must be 18 or older"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "OutcomeRepr", from = "OutcomeRepr")]
pub enum ValidationOutcome {
    Valid,
    Invalid(FieldErrors),
}

impl ValidationOutcome {
    /// Normalize a validity flag and a result map into an outcome.
    ///
    /// A valid flag always yields `Valid` and drops the map.
    pub fn new(is_valid: bool, result: FieldErrors) -> Self {
        if is_valid {
            Self::Valid
        } else {
            Self::Invalid(result)
        }
    }

    /// Outcome with a single failing field.
    pub fn failure(field: impl Into<String>, error: FieldError) -> Self {
        let mut result = FieldErrors::new();
        result.insert(field.into(), error);
        Self::Invalid(result)
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Per-field errors; empty for `Valid`.
    pub fn result(&self) -> &FieldErrors {
        match self {
            Self::Valid => &NO_ERRORS,
            Self::Invalid(result) => result,
        }
    }

    /// Error recorded for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&FieldError> {
        self.result().get(field)
    }

    pub fn into_result(self) -> FieldErrors {
        match self {
            Self::Valid => FieldErrors::new(),
            Self::Invalid(result) => result,
        }
    }

    /// Combine two outcomes.
    ///
    /// Validity is the logical AND of both. When both carry an error for the
    /// same field, the entry from `other` wins.
    pub fn merge(self, other: ValidationOutcome) -> Self {
        let is_valid = self.is_valid() && other.is_valid();
        let mut result = self.into_result();
        result.extend(other.into_result());
        Self::new(is_valid, result)
    }

    /// Convert into an accumulating stillwater `Validation` with one
    /// violation per failing field.
    pub fn to_validation(&self) -> Validation<(), NonEmptyVec<FieldViolation>> {
        let checks: Vec<Validation<(), NonEmptyVec<FieldViolation>>> = self
            .result()
            .iter()
            .map(|(field, error)| {
                Validation::fail(FieldViolation {
                    field: field.clone(),
                    property_name: error.property_name.clone(),
                    message: error.message.clone(),
                })
            })
            .collect();

        Validation::all_vec(checks).map(|_| ())
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OutcomeRepr {
    is_valid: bool,
    #[serde(default)]
    result: FieldErrors,
}

impl From<ValidationOutcome> for OutcomeRepr {
    fn from(outcome: ValidationOutcome) -> Self {
        OutcomeRepr {
            is_valid: outcome.is_valid(),
            result: outcome.into_result(),
        }
    }
}

impl From<OutcomeRepr> for ValidationOutcome {
    fn from(repr: OutcomeRepr) -> Self {
        ValidationOutcome::new(repr.is_valid, repr.result)
    }
}
