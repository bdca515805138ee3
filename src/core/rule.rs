//! Field validation rules.
//!
//! A [`FieldRule`] binds one model field to an ordered list of validator
//! entries. Rules are never mutated in place: every `with_*` method returns a
//! new rule sharing the unchanged parts.
//!
//! The rule store holds rules of different value types side by side, so it
//! stores them behind the object-safe [`Rule`] trait. The per-rule execution
//! shared by both evaluators lives here.

use crate::core::condition::Condition;
use crate::core::outcome::{FieldError, ValidationOutcome};
use crate::validation::ValidationError;
use futures::future::{join_all, BoxFuture};
use futures::FutureExt;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Bound for model types.
pub trait Model: Send + Sync + 'static {}

impl<T: Send + Sync + 'static> Model for T {}

/// Bound for field and dependent-field values.
pub trait FieldValue: Send + Sync + 'static {}

impl<T: Send + Sync + 'static> FieldValue for T {}

/// Error a validator may return when it cannot decide.
///
/// This signals a bug or an unavailable dependency, not invalid data: it is
/// propagated to the caller instead of being recorded in the outcome.
pub type ValidatorError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result of running one validator: `Ok(true)` passes, `Ok(false)` fails.
pub type CheckResult = Result<bool, ValidatorError>;

/// Conversion from a validator's return value into a [`CheckResult`].
pub trait IntoCheckResult {
    fn into_check_result(self) -> CheckResult;
}

impl IntoCheckResult for bool {
    fn into_check_result(self) -> CheckResult {
        Ok(self)
    }
}

impl<E> IntoCheckResult for Result<bool, E>
where
    E: Into<ValidatorError>,
{
    fn into_check_result(self) -> CheckResult {
        self.map_err(Into::into)
    }
}

/// Values handed to a validator.
///
/// `dependent_value` is `None` unless the rule declared a dependency with
/// `depends_on`.
pub struct ValidatorArgs<'a, M, V, D> {
    pub model: &'a M,
    pub value: &'a V,
    pub dependent_value: Option<&'a D>,
}

impl<'a, M, V, D> ValidatorArgs<'a, M, V, D> {
    pub fn new(model: &'a M, value: &'a V, dependent_value: Option<&'a D>) -> Self {
        Self {
            model,
            value,
            dependent_value,
        }
    }
}

impl<M, V, D> Clone for ValidatorArgs<'_, M, V, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M, V, D> Copy for ValidatorArgs<'_, M, V, D> {}

/// Extracts a value from the model.
pub type Getter<M, V> = Arc<dyn Fn(&M) -> V + Send + Sync>;

/// Synchronous validator.
pub type SyncCheck<M, V, D> = Arc<dyn Fn(ValidatorArgs<'_, M, V, D>) -> CheckResult + Send + Sync>;

/// Asynchronous validator.
pub type AsyncCheck<M, V, D> =
    Arc<dyn for<'a> Fn(ValidatorArgs<'a, M, V, D>) -> BoxFuture<'a, CheckResult> + Send + Sync>;

/// A validator, declared synchronous or asynchronous at registration.
pub enum Check<M, V, D> {
    Sync(SyncCheck<M, V, D>),
    Async(AsyncCheck<M, V, D>),
}

impl<M: Model, V: FieldValue, D: FieldValue> Check<M, V, D> {
    /// Wrap a synchronous predicate.
    pub fn sync<F, R>(predicate: F) -> Self
    where
        F: Fn(ValidatorArgs<'_, M, V, D>) -> R + Send + Sync + 'static,
        R: IntoCheckResult,
    {
        Check::Sync(Arc::new(move |args: ValidatorArgs<'_, M, V, D>| {
            predicate(args).into_check_result()
        }))
    }

    /// Wrap an asynchronous predicate.
    pub fn asynchronous<F, R>(predicate: F) -> Self
    where
        F: for<'a> Fn(ValidatorArgs<'a, M, V, D>) -> BoxFuture<'a, R> + Send + Sync + 'static,
        R: IntoCheckResult + Send + 'static,
    {
        Check::Async(async_check(move |args| {
            let pending = predicate(args);
            async move { pending.await.into_check_result() }.boxed()
        }))
    }

    pub fn is_async(&self) -> bool {
        matches!(self, Check::Async(_))
    }
}

fn async_check<M, V, D, F>(check: F) -> AsyncCheck<M, V, D>
where
    F: for<'a> Fn(ValidatorArgs<'a, M, V, D>) -> BoxFuture<'a, CheckResult> + Send + Sync + 'static,
{
    Arc::new(check)
}

impl<M, V, D> Clone for Check<M, V, D> {
    fn clone(&self) -> Self {
        match self {
            Check::Sync(check) => Check::Sync(Arc::clone(check)),
            Check::Async(check) => Check::Async(Arc::clone(check)),
        }
    }
}

/// A validator plus its optional per-validator condition.
pub struct ValidatorEntry<M, V, D> {
    pub check: Check<M, V, D>,
    pub condition: Option<Condition<M>>,
}

impl<M, V, D> ValidatorEntry<M, V, D> {
    pub fn new(check: Check<M, V, D>) -> Self {
        Self {
            check,
            condition: None,
        }
    }

    fn applies(&self, model: &M) -> bool {
        self.condition.as_ref().is_none_or(|c| c.check(model))
    }
}

impl<M, V, D> Clone for ValidatorEntry<M, V, D> {
    fn clone(&self) -> Self {
        Self {
            check: self.check.clone(),
            condition: self.condition.clone(),
        }
    }
}

/// Error message of a rule, resolved lazily when the rule fails.
pub enum Message<M> {
    Text(String),
    Template(Arc<dyn Fn(&M) -> String + Send + Sync>),
}

impl<M> Message<M> {
    pub fn template<F>(template: F) -> Self
    where
        F: Fn(&M) -> String + Send + Sync + 'static,
    {
        Message::Template(Arc::new(template))
    }

    pub fn resolve(&self, model: &M) -> String {
        match self {
            Message::Text(text) => text.clone(),
            Message::Template(template) => template(model),
        }
    }
}

impl<M> Clone for Message<M> {
    fn clone(&self) -> Self {
        match self {
            Message::Text(text) => Message::Text(text.clone()),
            Message::Template(template) => Message::Template(Arc::clone(template)),
        }
    }
}

impl<M> fmt::Debug for Message<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Message::Template(_) => f.debug_tuple("Template").field(&"<function>").finish(),
        }
    }
}

impl<M> From<&str> for Message<M> {
    fn from(text: &str) -> Self {
        Message::Text(text.to_string())
    }
}

impl<M> From<String> for Message<M> {
    fn from(text: String) -> Self {
        Message::Text(text)
    }
}

/// Object-safe view of a rule, as stored in a `RuleStore`.
pub trait Rule<M>: Send + Sync {
    /// Field key used in the outcome map.
    fn name(&self) -> &str;

    /// Display name reported in errors.
    fn property_name(&self) -> &str;

    /// Whether any validator of this rule is asynchronous.
    fn is_async(&self) -> bool;

    fn validator_count(&self) -> usize;

    fn has_dependency(&self) -> bool;

    fn has_property_condition(&self) -> bool;

    /// False when the rule's property condition rejects `model`.
    fn is_applicable(&self, model: &M) -> bool;

    fn with_property_name(&self, property_name: &str) -> Arc<dyn Rule<M>>;

    /// Gate the whole rule; an existing property condition is kept and
    /// combined with the new one.
    fn with_property_condition(&self, condition: Condition<M>) -> Arc<dyn Rule<M>>;

    /// Attach `condition` to the last validator. `None` when the rule has no
    /// validators.
    fn with_validator_condition(&self, condition: Condition<M>) -> Option<Arc<dyn Rule<M>>>;

    fn with_message(&self, message: Message<M>) -> Arc<dyn Rule<M>>;

    /// Run every validator synchronously.
    fn run_sync(&self, model: &M, fail_fast: bool) -> Result<ValidationOutcome, ValidationError>;

    /// Run the validators, awaiting asynchronous ones. `cancel` is checked
    /// before each validator entry.
    fn run_async<'a>(
        &'a self,
        model: &'a M,
        fail_fast: bool,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<ValidationOutcome, ValidationError>>;

    fn as_any(&self) -> &dyn Any;
}

/// A rule bound to one field of `M` with value type `V` and dependent value
/// type `D`.
///
/// # Example
///
/// ```rust
/// use rulecraft::core::{Check, FieldRule, Rule};
///
/// struct Signup {
///     password: String,
///     confirmation: String,
/// }
///
/// let rule = FieldRule::new("password", |s: &Signup| s.password.clone())
///     .with_dependency(|s: &Signup| s.confirmation.clone())
///     .with_validator(Check::sync(|args| Some(args.value) == args.dependent_value))
///     .with_message("Passwords must match");
///
/// let model = Signup {
///     password: "hunter2".to_string(),
///     confirmation: "hunter3".to_string(),
/// };
/// let outcome = rule.run_sync(&model, true).unwrap();
/// assert_eq!(outcome.get("password").unwrap().message, "Passwords must match");
/// ```
pub struct FieldRule<M, V, D = ()> {
    name: String,
    property_name: String,
    getter: Getter<M, V>,
    dependent_getter: Option<Getter<M, D>>,
    validators: Vec<ValidatorEntry<M, V, D>>,
    property_condition: Option<Condition<M>>,
    message: Message<M>,
    is_async: bool,
}

/// Message used for rules without `with_message`.
pub const DEFAULT_MESSAGE: &str = "No error message set for this rule";

impl<M: Model, V: FieldValue> FieldRule<M, V, ()> {
    /// Create a rule with no validators. The display name defaults to `name`.
    pub fn new<F>(name: impl Into<String>, getter: F) -> Self
    where
        F: Fn(&M) -> V + Send + Sync + 'static,
    {
        let name = name.into();
        Self {
            property_name: name.clone(),
            name,
            getter: Arc::new(getter),
            dependent_getter: None,
            validators: Vec::new(),
            property_condition: None,
            message: Message::Text(DEFAULT_MESSAGE.to_string()),
            is_async: false,
        }
    }
}

impl<M: Model, V: FieldValue, D: FieldValue> FieldRule<M, V, D> {
    pub fn validators(&self) -> &[ValidatorEntry<M, V, D>] {
        &self.validators
    }

    pub fn message(&self) -> &Message<M> {
        &self.message
    }

    /// Declare a dependent field. Existing validators are dropped because
    /// they were written against the previous dependent type.
    pub fn with_dependency<D2, F>(&self, getter: F) -> FieldRule<M, V, D2>
    where
        D2: FieldValue,
        F: Fn(&M) -> D2 + Send + Sync + 'static,
    {
        FieldRule {
            name: self.name.clone(),
            property_name: self.property_name.clone(),
            getter: Arc::clone(&self.getter),
            dependent_getter: Some(Arc::new(getter)),
            validators: Vec::new(),
            property_condition: self.property_condition.clone(),
            message: self.message.clone(),
            is_async: false,
        }
    }

    /// Append a validator. The async flag only ever turns on.
    pub fn with_entry(&self, entry: ValidatorEntry<M, V, D>) -> Self {
        let mut rule = self.clone();
        rule.is_async = rule.is_async || entry.check.is_async();
        rule.validators.push(entry);
        rule
    }

    pub fn with_validator(&self, check: Check<M, V, D>) -> Self {
        self.with_entry(ValidatorEntry::new(check))
    }

    pub fn with_async_validator<F, R>(&self, predicate: F) -> Self
    where
        F: for<'a> Fn(ValidatorArgs<'a, M, V, D>) -> BoxFuture<'a, R> + Send + Sync + 'static,
        R: IntoCheckResult + Send + 'static,
    {
        self.with_validator(Check::asynchronous(predicate))
    }

    pub fn with_message(&self, message: impl Into<Message<M>>) -> Self {
        let mut rule = self.clone();
        rule.message = message.into();
        rule
    }

    pub fn with_property_name(&self, property_name: impl Into<String>) -> Self {
        let mut rule = self.clone();
        rule.property_name = property_name.into();
        rule
    }

    pub fn when(&self, condition: Condition<M>) -> Self {
        let mut rule = self.clone();
        rule.property_condition = Some(match &self.property_condition {
            Some(existing) => existing.and(&condition),
            None => condition,
        });
        rule
    }

    fn failure(&self, model: &M) -> ValidationOutcome {
        ValidationOutcome::failure(
            self.name.clone(),
            FieldError::new(self.property_name.clone(), self.message.resolve(model)),
        )
    }

    fn checked(&self, result: CheckResult) -> Result<bool, ValidationError> {
        result.map_err(|source| ValidationError::Validator {
            field: self.name.clone(),
            source,
        })
    }
}

impl<M, V, D> Clone for FieldRule<M, V, D> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            property_name: self.property_name.clone(),
            getter: Arc::clone(&self.getter),
            dependent_getter: self.dependent_getter.clone(),
            validators: self.validators.clone(),
            property_condition: self.property_condition.clone(),
            message: self.message.clone(),
            is_async: self.is_async,
        }
    }
}

impl<M, V, D> fmt::Debug for FieldRule<M, V, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRule")
            .field("name", &self.name)
            .field("property_name", &self.property_name)
            .field("validators", &self.validators.len())
            .field("has_dependency", &self.dependent_getter.is_some())
            .field("has_property_condition", &self.property_condition.is_some())
            .field("message", &self.message)
            .field("is_async", &self.is_async)
            .finish()
    }
}

impl<M: Model, V: FieldValue, D: FieldValue> Rule<M> for FieldRule<M, V, D> {
    fn name(&self) -> &str {
        &self.name
    }

    fn property_name(&self) -> &str {
        &self.property_name
    }

    fn is_async(&self) -> bool {
        self.is_async
    }

    fn validator_count(&self) -> usize {
        self.validators.len()
    }

    fn has_dependency(&self) -> bool {
        self.dependent_getter.is_some()
    }

    fn has_property_condition(&self) -> bool {
        self.property_condition.is_some()
    }

    fn is_applicable(&self, model: &M) -> bool {
        self.property_condition
            .as_ref()
            .is_none_or(|c| c.check(model))
    }

    fn with_property_name(&self, property_name: &str) -> Arc<dyn Rule<M>> {
        Arc::new(FieldRule::with_property_name(self, property_name))
    }

    fn with_property_condition(&self, condition: Condition<M>) -> Arc<dyn Rule<M>> {
        Arc::new(self.when(condition))
    }

    fn with_validator_condition(&self, condition: Condition<M>) -> Option<Arc<dyn Rule<M>>> {
        let mut rule = self.clone();
        let last = rule.validators.last_mut()?;
        last.condition = Some(condition);
        Some(Arc::new(rule))
    }

    fn with_message(&self, message: Message<M>) -> Arc<dyn Rule<M>> {
        Arc::new(FieldRule::with_message(self, message))
    }

    fn run_sync(&self, model: &M, fail_fast: bool) -> Result<ValidationOutcome, ValidationError> {
        if !self.is_applicable(model) {
            tracing::trace!(field = %self.name, "rule skipped by condition");
            return Ok(ValidationOutcome::Valid);
        }

        let value = (self.getter)(model);
        let dependent = self.dependent_getter.as_ref().map(|getter| getter(model));
        let args = ValidatorArgs::new(model, &value, dependent.as_ref());

        let mut outcome = ValidationOutcome::Valid;
        for entry in &self.validators {
            if !entry.applies(model) {
                continue;
            }

            let passed = match &entry.check {
                Check::Sync(check) => self.checked(check(args))?,
                Check::Async(_) => {
                    return Err(ValidationError::UnexpectedAsync {
                        field: self.name.clone(),
                    })
                }
            };

            if !passed && outcome.is_valid() {
                outcome = self.failure(model);
                if fail_fast {
                    break;
                }
            }
        }

        Ok(outcome)
    }

    fn run_async<'a>(
        &'a self,
        model: &'a M,
        fail_fast: bool,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<ValidationOutcome, ValidationError>> {
        async move {
            if !self.is_applicable(model) {
                tracing::trace!(field = %self.name, "rule skipped by condition");
                return Ok(ValidationOutcome::Valid);
            }

            let value = (self.getter)(model);
            let dependent = self.dependent_getter.as_ref().map(|getter| getter(model));
            let args = ValidatorArgs::new(model, &value, dependent.as_ref());

            let mut failed = false;
            let mut pending = Vec::new();
            for entry in &self.validators {
                if cancel.is_cancelled() {
                    tracing::trace!(field = %self.name, "rule cancelled");
                    return Ok(ValidationOutcome::Valid);
                }
                if !entry.applies(model) {
                    continue;
                }

                match &entry.check {
                    Check::Sync(check) => {
                        if !self.checked(check(args))? {
                            failed = true;
                            if fail_fast {
                                return Ok(self.failure(model));
                            }
                        }
                    }
                    Check::Async(check) if fail_fast => {
                        if !self.checked(check(args).await)? {
                            return Ok(self.failure(model));
                        }
                    }
                    Check::Async(check) => pending.push(check(args)),
                }
            }

            for result in join_all(pending).await {
                if !self.checked(result)? {
                    failed = true;
                }
            }

            Ok(if failed {
                self.failure(model)
            } else {
                ValidationOutcome::Valid
            })
        }
        .boxed()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct User {
        username: String,
        age: u32,
        active: bool,
    }

    fn user(username: &str, age: u32) -> User {
        User {
            username: username.to_string(),
            age,
            active: true,
        }
    }

    fn username_rule() -> FieldRule<User, String> {
        FieldRule::new("username", |u: &User| u.username.clone())
            .with_validator(Check::<_, String, ()>::sync(|args| !args.value.is_empty()))
            .with_message("Username cannot be empty")
    }

    #[test]
    fn new_rule_defaults() {
        let rule: FieldRule<User, u32> = FieldRule::new("age", |u: &User| u.age);

        assert_eq!(Rule::name(&rule), "age");
        assert_eq!(Rule::property_name(&rule), "age");
        assert_eq!(rule.validator_count(), 0);
        assert!(!Rule::is_async(&rule));
        assert!(!rule.has_dependency());
        assert_eq!(rule.message().resolve(&user("a", 1)), DEFAULT_MESSAGE);
    }

    #[test]
    fn failing_rule_reports_field_and_message() {
        let outcome = username_rule().run_sync(&user("", 30), true).unwrap();

        assert_eq!(
            outcome.get("username"),
            Some(&FieldError::new("username", "Username cannot be empty"))
        );
    }

    #[test]
    fn passing_rule_is_valid() {
        let outcome = username_rule().run_sync(&user("john", 30), true).unwrap();
        assert_eq!(outcome, ValidationOutcome::Valid);
    }

    #[test]
    fn with_methods_leave_receiver_unchanged() {
        let base: FieldRule<User, u32> = FieldRule::new("age", |u: &User| u.age);
        let extended = base
            .with_validator(Check::sync(|args| *args.value >= 18))
            .with_property_name("Age");

        assert_eq!(base.validator_count(), 0);
        assert_eq!(Rule::property_name(&base), "age");
        assert_eq!(extended.validator_count(), 1);
        assert_eq!(Rule::property_name(&extended), "Age");
    }

    #[test]
    fn async_flag_is_monotonic() {
        let rule: FieldRule<User, u32> = FieldRule::new("age", |u: &User| u.age)
            .with_async_validator(|args| {
                let age = *args.value;
                async move { age >= 18 }.boxed()
            })
            .with_validator(Check::sync(|args| *args.value < 150));

        assert!(Rule::is_async(&rule));
        assert_eq!(rule.validator_count(), 2);
    }

    #[test]
    fn property_condition_skips_whole_rule() {
        let rule = username_rule().when(Condition::new(|u: &User| u.active));
        let mut model = user("", 30);
        model.active = false;

        assert!(!rule.is_applicable(&model));
        assert!(rule.run_sync(&model, false).unwrap().is_valid());
    }

    #[test]
    fn property_conditions_combine() {
        let rule = username_rule()
            .when(Condition::new(|u: &User| u.active))
            .when(Condition::new(|u: &User| u.age > 20));

        assert!(rule.is_applicable(&user("", 30)));
        assert!(!rule.is_applicable(&user("", 10)));
    }

    #[test]
    fn validator_condition_skips_single_validator() {
        let rule = FieldRule::new("age", |u: &User| u.age)
            .with_validator(Check::sync(|args| *args.value >= 18))
            .with_validator_condition(Condition::new(|u: &User| u.active))
            .expect("rule has a validator");

        let mut model = user("a", 10);
        model.active = false;
        assert!(rule.run_sync(&model, true).unwrap().is_valid());

        model.active = true;
        assert!(!rule.run_sync(&model, true).unwrap().is_valid());
    }

    #[test]
    fn validator_condition_needs_a_validator() {
        let rule: FieldRule<User, u32> = FieldRule::new("age", |u: &User| u.age);
        assert!(rule
            .with_validator_condition(Condition::new(|_: &User| true))
            .is_none());
    }

    #[test]
    fn dependent_value_is_passed() {
        let rule = FieldRule::new("username", |u: &User| u.username.clone())
            .with_dependency(|u: &User| u.age)
            .with_validator(Check::sync(|args| {
                args.dependent_value == Some(&42) && args.value == "deep"
            }));

        assert!(rule.run_sync(&user("deep", 42), true).unwrap().is_valid());
        assert!(!rule.run_sync(&user("deep", 41), true).unwrap().is_valid());
    }

    #[test]
    fn undeclared_dependency_is_none() {
        let rule = FieldRule::new("age", |u: &User| u.age)
            .with_validator(Check::sync(|args| args.dependent_value.is_none()));

        assert!(rule.run_sync(&user("a", 1), true).unwrap().is_valid());
    }

    #[test]
    fn message_template_sees_model() {
        let rule = FieldRule::new("age", |u: &User| u.age)
            .with_validator(Check::sync(|args| *args.value >= 18))
            .with_message(Message::template(|u: &User| {
                format!("{} is too young", u.username)
            }));

        let outcome = rule.run_sync(&user("tim", 9), true).unwrap();
        assert_eq!(outcome.get("age").unwrap().message, "tim is too young");
    }

    #[test]
    fn fail_fast_stops_validator_loop() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let rule = FieldRule::new("age", |u: &User| u.age)
            .with_validator(Check::sync(|_| false))
            .with_validator(Check::sync(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                true
            }));

        rule.run_sync(&user("a", 1), true).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        rule.run_sync(&user("a", 1), false).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn validator_error_propagates() {
        let rule = FieldRule::new("age", |u: &User| u.age).with_validator(Check::sync(
            |_| -> Result<bool, std::io::Error> {
                Err(std::io::Error::other("lookup table missing"))
            },
        ));

        let err = rule.run_sync(&user("a", 1), false).unwrap_err();
        assert!(matches!(err, ValidationError::Validator { ref field, .. } if field == "age"));
    }

    #[test]
    fn sync_run_rejects_async_validator() {
        let rule = FieldRule::new("age", |u: &User| u.age)
            .with_async_validator(|_| async { true }.boxed());

        let err = rule.run_sync(&user("a", 1), true).unwrap_err();
        assert!(matches!(err, ValidationError::UnexpectedAsync { ref field } if field == "age"));
    }

    #[tokio::test]
    async fn async_run_mixes_sync_and_async_validators() {
        let rule = FieldRule::new("age", |u: &User| u.age)
            .with_validator(Check::sync(|args| *args.value > 0))
            .with_async_validator(|args| {
                let age = *args.value;
                async move {
                    tokio::task::yield_now().await;
                    age < 50
                }
                .boxed()
            })
            .with_message("Age out of range");
        let cancel = CancellationToken::new();

        assert!(rule
            .run_async(&user("a", 30), true, &cancel)
            .await
            .unwrap()
            .is_valid());

        let outcome = rule.run_async(&user("a", 60), false, &cancel).await.unwrap();
        assert_eq!(outcome.get("age").unwrap().message, "Age out of range");
    }

    #[tokio::test]
    async fn async_run_honors_property_condition() {
        let rule = FieldRule::new("username", |u: &User| u.username.clone())
            .with_async_validator(|args| {
                let empty = args.value.is_empty();
                async move { !empty }.boxed()
            })
            .when(Condition::new(|u: &User| u.active));
        let mut model = user("", 30);
        model.active = false;

        let outcome = rule
            .run_async(&model, true, &CancellationToken::new())
            .await
            .unwrap();
        assert!(outcome.is_valid());
    }

    #[tokio::test]
    async fn cancelled_rule_stops_before_validators() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let rule = FieldRule::new("age", |u: &User| u.age).with_async_validator(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { false }.boxed()
        });
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = rule.run_async(&user("a", 1), true, &cancel).await.unwrap();

        assert!(outcome.is_valid());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn async_validator_error_propagates() {
        let rule = FieldRule::new("age", |u: &User| u.age).with_async_validator(|_| {
            async { Err::<bool, _>(std::io::Error::other("service unavailable")) }.boxed()
        });

        let result = rule
            .run_async(&user("a", 1), false, &CancellationToken::new())
            .await;
        assert!(matches!(result, Err(ValidationError::Validator { .. })));
    }
}
