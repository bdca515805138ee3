//! Core rule types.
//!
//! This module contains the data the builder produces and the evaluators
//! consume:
//! - Conditions gating rules and validators
//! - Field rules and their validator entries
//! - The copy-on-write rule store
//! - Validation outcomes
//!
//! Nothing here performs I/O. Rules only run caller-supplied predicates.

mod condition;
mod outcome;
mod rule;
mod store;

pub use condition::Condition;
pub use outcome::{FieldError, FieldErrors, FieldViolation, ValidationOutcome};
pub use rule::{
    AsyncCheck, Check, CheckResult, FieldRule, FieldValue, Getter, IntoCheckResult, Message, Model,
    Rule, SyncCheck, ValidatorArgs, ValidatorEntry, ValidatorError, DEFAULT_MESSAGE,
};
pub use store::RuleStore;
