//! Synchronous evaluator.

use crate::core::{Model, Rule, ValidationOutcome};
use crate::validation::ValidationError;
use std::fmt;
use std::sync::Arc;

/// Runs every rule in order on the calling thread.
///
/// Rules can also be added directly, without the builder:
///
/// ```rust
/// use rulecraft::core::{Check, FieldRule};
/// use rulecraft::validation::SyncValidation;
///
/// struct Point {
///     x: i32,
/// }
///
/// let validation = SyncValidation::new(true).with_rule(
///     FieldRule::new("x", |p: &Point| p.x)
///         .with_validator(Check::sync(|args| *args.value >= 0))
///         .with_message("x must not be negative"),
/// );
///
/// let outcome = validation.validate(&Point { x: -1 }).unwrap();
/// assert_eq!(outcome.get("x").unwrap().message, "x must not be negative");
/// ```
pub struct SyncValidation<M> {
    rules: Vec<Arc<dyn Rule<M>>>,
    fail_fast: bool,
}

impl<M: Model> SyncValidation<M> {
    /// Evaluator with no rules.
    pub fn new(fail_fast: bool) -> Self {
        Self::from_rules(Vec::new(), fail_fast)
    }

    pub fn from_rules(rules: Vec<Arc<dyn Rule<M>>>, fail_fast: bool) -> Self {
        Self { rules, fail_fast }
    }

    /// Append a rule.
    pub fn with_rule(mut self, rule: impl Rule<M> + 'static) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    pub fn rules(&self) -> &[Arc<dyn Rule<M>>] {
        &self.rules
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn fail_fast(&self) -> bool {
        self.fail_fast
    }

    /// Run every rule against `model`.
    ///
    /// In fail-fast mode the first failing rule ends the evaluation and the
    /// outcome holds only its error. Otherwise every failing field is
    /// reported; when two rules fail on the same field the later one wins.
    ///
    /// An asynchronous validator fails the call with
    /// [`ValidationError::UnexpectedAsync`]; a validator returning an error
    /// fails it with [`ValidationError::Validator`].
    pub fn validate(&self, model: &M) -> Result<ValidationOutcome, ValidationError> {
        tracing::debug!(
            rules = self.rules.len(),
            fail_fast = self.fail_fast,
            "validation started"
        );

        let mut outcome = ValidationOutcome::Valid;
        for rule in &self.rules {
            let rule_outcome = rule.run_sync(model, self.fail_fast)?;
            if rule_outcome.is_valid() {
                continue;
            }
            if self.fail_fast {
                tracing::debug!(field = rule.name(), "validation stopped at first failure");
                return Ok(rule_outcome);
            }
            outcome = outcome.merge(rule_outcome);
        }

        Ok(outcome)
    }
}

impl<M> Clone for SyncValidation<M> {
    fn clone(&self) -> Self {
        Self {
            rules: self.rules.clone(),
            fail_fast: self.fail_fast,
        }
    }
}

impl<M> fmt::Debug for SyncValidation<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.rules.iter().map(|rule| rule.name()).collect();
        f.debug_struct("SyncValidation")
            .field("rules", &fields)
            .field("fail_fast", &self.fail_fast)
            .finish()
    }
}
