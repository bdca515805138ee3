//! Asynchronous evaluator.
//!
//! Synchronous rules run first, in order. Asynchronous rules met along the
//! way are queued as futures and only start once the synchronous pass is
//! done:
//!
//! - fail-fast: a failing synchronous rule ends the evaluation before any
//!   asynchronous rule runs. The queued rules then run concurrently and are
//!   consumed in order; the first failure ends the evaluation and cancels
//!   the rest.
//! - collect-all: the queued rules are joined and their outcomes merged with
//!   the synchronous one. A rule whose validator returned an error is left
//!   out of the outcome and logged.

use crate::core::{Model, Rule, ValidationOutcome};
use crate::validation::ValidationError;
use futures::future::{join_all, BoxFuture};
use futures::stream::{FuturesOrdered, StreamExt};
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

type PendingRule<'a> = BoxFuture<'a, Result<ValidationOutcome, ValidationError>>;

/// Evaluator for rule sets with asynchronous validators.
///
/// # Example
///
/// ```rust
/// use futures::FutureExt;
/// use rulecraft::core::FieldRule;
/// use rulecraft::validation::AsyncValidation;
///
/// struct Signup {
///     username: String,
/// }
///
/// let validation = AsyncValidation::new(false).with_rule(
///     FieldRule::new("username", |s: &Signup| s.username.clone())
///         .with_async_validator(|args| {
///             let taken = args.value == "root";
///             async move { !taken }.boxed()
///         })
///         .with_message("Username is taken"),
/// );
///
/// let runtime = tokio::runtime::Runtime::new().unwrap();
/// let outcome = runtime
///     .block_on(validation.validate_async(&Signup { username: "root".to_string() }))
///     .unwrap();
/// assert!(!outcome.is_valid());
/// ```
pub struct AsyncValidation<M> {
    rules: Vec<Arc<dyn Rule<M>>>,
    fail_fast: bool,
}

impl<M: Model> AsyncValidation<M> {
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

    pub async fn validate_async(&self, model: &M) -> Result<ValidationOutcome, ValidationError> {
        self.validate_async_with(model, CancellationToken::new())
            .await
    }

    /// Validate with a caller-owned cancellation signal.
    ///
    /// Rules check `cancel` before each validator and report the rule as
    /// valid once it fires. The evaluator cancels it itself after a
    /// fail-fast failure.
    pub async fn validate_async_with(
        &self,
        model: &M,
        cancel: CancellationToken,
    ) -> Result<ValidationOutcome, ValidationError> {
        tracing::debug!(
            rules = self.rules.len(),
            fail_fast = self.fail_fast,
            "async validation started"
        );

        let mut outcome = ValidationOutcome::Valid;
        let mut pending: Vec<(&str, PendingRule<'_>)> = Vec::new();

        for rule in &self.rules {
            if rule.is_async() {
                pending.push((rule.name(), rule.run_async(model, self.fail_fast, &cancel)));
                continue;
            }

            let rule_outcome = rule.run_sync(model, self.fail_fast)?;
            if rule_outcome.is_valid() {
                continue;
            }
            if self.fail_fast {
                tracing::debug!(
                    field = rule.name(),
                    pending = pending.len(),
                    "validation stopped before asynchronous rules"
                );
                cancel.cancel();
                return Ok(rule_outcome);
            }
            outcome = outcome.merge(rule_outcome);
        }

        if self.fail_fast {
            first_async_failure(pending, &cancel).await
        } else {
            Ok(merge_settled(outcome, pending).await)
        }
    }
}

async fn first_async_failure(
    pending: Vec<(&str, PendingRule<'_>)>,
    cancel: &CancellationToken,
) -> Result<ValidationOutcome, ValidationError> {
    let (fields, futures): (Vec<&str>, Vec<PendingRule<'_>>) = pending.into_iter().unzip();
    let mut ordered: FuturesOrdered<PendingRule<'_>> = futures.into_iter().collect();

    let mut index = 0;
    while let Some(result) = ordered.next().await {
        let rule_outcome = result?;
        if !rule_outcome.is_valid() {
            tracing::debug!(
                field = fields.get(index).copied().unwrap_or_default(),
                remaining = ordered.len(),
                "validation stopped at first asynchronous failure"
            );
            cancel.cancel();
            return Ok(rule_outcome);
        }
        index += 1;
    }

    Ok(ValidationOutcome::Valid)
}

async fn merge_settled(
    outcome: ValidationOutcome,
    pending: Vec<(&str, PendingRule<'_>)>,
) -> ValidationOutcome {
    let (fields, futures): (Vec<&str>, Vec<PendingRule<'_>>) = pending.into_iter().unzip();

    join_all(futures)
        .await
        .into_iter()
        .zip(fields)
        .fold(outcome, |merged, (result, field)| match result {
            Ok(rule_outcome) => merged.merge(rule_outcome),
            Err(error) => {
                tracing::warn!(field, %error, "asynchronous rule errored; left out of the outcome");
                merged
            }
        })
}

impl<M> Clone for AsyncValidation<M> {
    fn clone(&self) -> Self {
        Self {
            rules: self.rules.clone(),
            fail_fast: self.fail_fast,
        }
    }
}

impl<M> fmt::Debug for AsyncValidation<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.rules.iter().map(|rule| rule.name()).collect();
        f.debug_struct("AsyncValidation")
            .field("rules", &fields)
            .field("fail_fast", &self.fail_fast)
            .finish()
    }
}
