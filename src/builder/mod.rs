//! Fluent builder for rule sets.
//!
//! Building a rule set walks a fixed protocol of immutable stages:
//!
//! ```text
//! InitialBuilder --for_field--> FieldAddedBuilder --add_rule--> RuleAddedBuilder
//!                                                                     |
//!                       CommonBuilder <-------------with_message------+
//! ```
//!
//! Every stage wraps a [`RuleStore`] and returns a new stage from each call,
//! so a stage can be cloned and extended along two branches. Protocol
//! violations are recorded on the store and surface from `build()`.

#[macro_use]
mod macros;

pub mod common;
pub mod error;
pub mod field_added;
pub mod initial;
pub mod rule_added;
pub mod rules;

pub use common::CommonBuilder;
pub use error::BuildError;
pub use field_added::FieldAddedBuilder;
pub use initial::InitialBuilder;
pub use rule_added::RuleAddedBuilder;
pub use rules::{
    BoolRules, CollectionRules, ComparisonRules, DateRules, Number, NumberRules, OptionRules,
    RuleTarget, StringRules,
};

use crate::config::ValidatorConfig;
use crate::core::{
    Check, Condition, FieldValue, IntoCheckResult, Model, RuleStore, ValidatorArgs, ValidatorEntry,
};
use crate::validation::{AsyncValidation, SyncValidation, Validation};
use futures::future::BoxFuture;

/// Entry point of the builder.
///
/// # Example
///
/// ```rust
/// use rulecraft::ValidationBuilder;
///
/// struct User {
///     username: String,
///     age: u32,
/// }
///
/// let validation = ValidationBuilder::create::<User>()
///     .for_field("username", |u: &User| u.username.clone())
///     .add_rule(|args| !args.value.is_empty())
///     .with_message("Username cannot be empty")
///     .for_field("age", |u: &User| u.age)
///     .add_rule(|args| *args.value >= 18)
///     .with_message("Must be 18 or older")
///     .build()
///     .unwrap();
///
/// let outcome = validation
///     .validate(&User { username: String::new(), age: 30 })
///     .unwrap();
/// assert!(!outcome.is_valid());
/// assert_eq!(outcome.get("username").unwrap().message, "Username cannot be empty");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationBuilder;

impl ValidationBuilder {
    /// Start a fail-fast rule set.
    pub fn create<M: Model>() -> InitialBuilder<M> {
        Self::with_fail_fast(true)
    }

    /// Start a rule set; with `fail_fast` off every failing field is reported.
    pub fn with_fail_fast<M: Model>(fail_fast: bool) -> InitialBuilder<M> {
        InitialBuilder::from_store(RuleStore::new(fail_fast))
    }

    /// Start a rule set from configuration.
    pub fn from_config<M: Model>(config: &ValidatorConfig) -> InitialBuilder<M> {
        InitialBuilder::from_store(RuleStore::with_default_message(
            config.fail_fast,
            &config.default_message,
        ))
    }
}

/// Freeze a store into an evaluator.
///
/// A store holding any asynchronous rule yields the asynchronous evaluator.
pub(crate) fn finish<M: Model>(store: RuleStore<M>) -> Result<Validation<M>, BuildError> {
    if let Some(error) = store.error() {
        return Err(error.clone());
    }

    let is_async = store.has_async_rule();
    tracing::debug!(
        rules = store.len(),
        is_async,
        fail_fast = store.fail_fast(),
        "rule set built"
    );

    let rules = store.rules().to_vec();
    Ok(if is_async {
        Validation::Async(AsyncValidation::from_rules(rules, store.fail_fast()))
    } else {
        Validation::Sync(SyncValidation::from_rules(rules, store.fail_fast()))
    })
}

pub(crate) fn sync_entry<M, V, D, F, R>(
    predicate: F,
    condition: Option<Condition<M>>,
) -> ValidatorEntry<M, V, D>
where
    M: Model,
    V: FieldValue,
    D: FieldValue,
    F: Fn(ValidatorArgs<'_, M, V, D>) -> R + Send + Sync + 'static,
    R: IntoCheckResult,
{
    ValidatorEntry {
        check: Check::sync(predicate),
        condition,
    }
}

pub(crate) fn async_entry<M, V, D, F, R>(
    predicate: F,
    condition: Option<Condition<M>>,
) -> ValidatorEntry<M, V, D>
where
    M: Model,
    V: FieldValue,
    D: FieldValue,
    F: for<'a> Fn(ValidatorArgs<'a, M, V, D>) -> BoxFuture<'a, R> + Send + Sync + 'static,
    R: IntoCheckResult + Send + 'static,
{
    ValidatorEntry {
        check: Check::asynchronous(predicate),
        condition,
    }
}

/// Build the rules of a conditional group on a fresh store and append them
/// to `store`, each gated by `condition`.
pub(crate) fn append_group<M, V, D, F>(
    store: &RuleStore<M>,
    condition: Condition<M>,
    group: F,
) -> RuleStore<M>
where
    M: Model,
    V: FieldValue,
    D: FieldValue,
    F: FnOnce(InitialBuilder<M>) -> CommonBuilder<M, V, D>,
{
    if store.error().is_some() {
        return store.clone();
    }
    let built = group(InitialBuilder::from_store(store.fresh()));
    store.append_conditional(built.store(), &condition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;

    struct Account {
        email: String,
        age: u32,
    }

    #[test]
    fn create_is_fail_fast() {
        let builder = ValidationBuilder::create::<Account>();

        assert!(builder.store().fail_fast());
        assert!(builder.store().is_empty());
    }

    #[test]
    fn with_fail_fast_is_respected() {
        let builder = ValidationBuilder::with_fail_fast::<Account>(false);
        assert!(!builder.store().fail_fast());
    }

    #[test]
    fn from_config_carries_default_message() {
        let config = ValidatorConfig {
            fail_fast: false,
            default_message: "Invalid".to_string(),
        };

        let validation = ValidationBuilder::from_config::<Account>(&config)
            .for_field("age", |a: &Account| a.age)
            .add_rule(|args| *args.value >= 18)
            .with_message_fn(|a: &Account| format!("{} is too young", a.age))
            .for_field("email", |a: &Account| a.email.clone())
            .add_rule(|args| args.value.contains('@'))
            .when(|_| true)
            .build()
            .unwrap();

        let outcome = validation
            .validate(&Account {
                email: "nobody".to_string(),
                age: 9,
            })
            .unwrap();

        assert_eq!(outcome.get("age").unwrap().message, "9 is too young");
        assert_eq!(outcome.get("email").unwrap().message, "Invalid");
    }

    #[test]
    fn build_picks_evaluator_by_rules() {
        let sync = ValidationBuilder::create::<Account>()
            .for_field("age", |a: &Account| a.age)
            .add_rule(|args| *args.value > 0)
            .with_message("positive")
            .build()
            .unwrap();
        assert!(!sync.is_async());

        let asynchronous = ValidationBuilder::create::<Account>()
            .for_field("age", |a: &Account| a.age)
            .add_async_rule(|args| {
                let age = *args.value;
                async move { age > 0 }.boxed()
            })
            .with_message("positive")
            .build()
            .unwrap();
        assert!(asynchronous.is_async());
    }

    #[test]
    fn build_surfaces_recorded_violation() {
        let result = InitialBuilder::<Account>::from_store(RuleStore::new(true))
            .for_field("age", |a: &Account| a.age)
            .when(|_| true)
            .build();

        assert_eq!(
            result.err(),
            Some(BuildError::NoValidator { operation: "when" })
        );
    }
}
