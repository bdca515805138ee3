//! Copy-on-write rule store.
//!
//! The store is the state behind every builder stage: the ordered rules plus
//! the bookkeeping needed by `alias_as`. Like a persistent list, every
//! operation returns a new store and leaves the receiver untouched, so a
//! builder stage can be cloned and extended along two branches.

use crate::builder::BuildError;
use crate::core::condition::Condition;
use crate::core::rule::{FieldRule, FieldValue, Message, Model, Rule, ValidatorEntry, DEFAULT_MESSAGE};
use std::fmt;
use std::sync::Arc;

/// Ordered rules plus builder bookkeeping.
///
/// # Example
///
/// ```rust
/// use rulecraft::core::{FieldRule, RuleStore};
/// use std::sync::Arc;
///
/// struct Order {
///     quantity: u32,
/// }
///
/// let store: RuleStore<Order> = RuleStore::new(true);
/// let extended = store.begin_field(Arc::new(FieldRule::new("quantity", |o: &Order| o.quantity)));
///
/// assert_eq!(store.len(), 0); // receiver unchanged
/// assert_eq!(extended.len(), 1);
/// assert_eq!(extended.current_field_start_index(), Some(0));
/// ```
pub struct RuleStore<M> {
    rules: Vec<Arc<dyn Rule<M>>>,
    fail_fast: bool,
    default_message: Arc<str>,
    current_field_start_index: Option<usize>,
    current_alias: Option<String>,
    error: Option<BuildError>,
}

impl<M: Model> RuleStore<M> {
    /// Create an empty store.
    pub fn new(fail_fast: bool) -> Self {
        Self::with_default_message(fail_fast, DEFAULT_MESSAGE)
    }

    /// Create an empty store whose rules default to `default_message`.
    pub fn with_default_message(fail_fast: bool, default_message: &str) -> Self {
        Self {
            rules: Vec::new(),
            fail_fast,
            default_message: Arc::from(default_message),
            current_field_start_index: None,
            current_alias: None,
            error: None,
        }
    }

    /// Empty store sharing this store's settings.
    pub fn fresh(&self) -> Self {
        Self {
            rules: Vec::new(),
            fail_fast: self.fail_fast,
            default_message: Arc::clone(&self.default_message),
            current_field_start_index: None,
            current_alias: None,
            error: None,
        }
    }

    pub fn rules(&self) -> &[Arc<dyn Rule<M>>] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn fail_fast(&self) -> bool {
        self.fail_fast
    }

    pub fn default_message(&self) -> &str {
        &self.default_message
    }

    /// Index where the most recent field's rule block begins.
    pub fn current_field_start_index(&self) -> Option<usize> {
        self.current_field_start_index
    }

    /// Pending display-name override for the current field.
    pub fn current_alias(&self) -> Option<&str> {
        self.current_alias.as_deref()
    }

    /// First protocol violation recorded on this store.
    pub fn error(&self) -> Option<&BuildError> {
        self.error.as_ref()
    }

    /// Whether any rule has an asynchronous validator.
    pub fn has_async_rule(&self) -> bool {
        self.rules.iter().any(|rule| rule.is_async())
    }

    /// Record a protocol violation. The first violation wins.
    pub fn fail(&self, error: BuildError) -> Self {
        let mut store = self.clone();
        if store.error.is_none() {
            tracing::warn!(%error, "rule builder precondition violated");
            store.error = Some(error);
        }
        store
    }

    /// Append a rule for a newly selected field.
    pub fn begin_field(&self, rule: Arc<dyn Rule<M>>) -> Self {
        let mut store = self.clone();
        store.current_field_start_index = Some(store.rules.len());
        store.current_alias = None;
        store.rules.push(rule);
        store
    }

    /// Create a rule for `name`, seeded with this store's default message,
    /// and append it as the current field.
    pub fn select_field<V, F>(&self, name: impl Into<String>, getter: F) -> Self
    where
        V: FieldValue,
        F: Fn(&M) -> V + Send + Sync + 'static,
    {
        if self.error.is_some() {
            return self.clone();
        }
        let rule = FieldRule::new(name, getter).with_message(self.default_message.to_string());
        self.begin_field(Arc::new(rule))
    }

    /// Append a validator entry to the last rule, which must be typed
    /// `FieldRule<M, V, D>`.
    pub fn add_validator<V, D>(&self, operation: &'static str, entry: ValidatorEntry<M, V, D>) -> Self
    where
        V: FieldValue,
        D: FieldValue,
    {
        if self.error.is_some() {
            return self.clone();
        }
        let rule = match self.last_typed::<V, D>(operation) {
            Ok(rule) => rule,
            Err(error) => return self.fail(error),
        };

        let mut rule = rule.with_entry(entry);
        if let Some(alias) = &self.current_alias {
            rule = rule.with_property_name(alias.clone());
        }
        self.replace_last(Arc::new(rule))
    }

    /// Rename every rule of the current field block.
    pub fn alias_current_field(&self, alias: &str) -> Self {
        if self.error.is_some() {
            return self.clone();
        }
        if self.rules.is_empty() {
            return self.fail(BuildError::FieldNotSelected {
                operation: "alias_as",
            });
        }

        let start = self.current_field_start_index.unwrap_or(0);
        let mut store = self.clone();
        for rule in store.rules.iter_mut().skip(start) {
            *rule = rule.with_property_name(alias);
        }
        store.current_alias = Some(alias.to_string());
        store
    }

    /// Declare a dependent field on the last rule.
    pub fn attach_dependency<V, D, D2, F>(&self, getter: F) -> Self
    where
        V: FieldValue,
        D: FieldValue,
        D2: FieldValue,
        F: Fn(&M) -> D2 + Send + Sync + 'static,
    {
        const OPERATION: &str = "depends_on";
        if self.error.is_some() {
            return self.clone();
        }
        let rule = match self.last_typed::<V, D>(OPERATION) {
            Ok(rule) => rule,
            Err(error) => return self.fail(error),
        };
        if rule.validators().is_empty() {
            self.replace_last(Arc::new(rule.with_dependency(getter)))
        } else {
            self.fail(BuildError::AmbiguousState {
                operation: OPERATION,
                field: rule.name().to_string(),
                reason: "rule already has validators".to_string(),
            })
        }
    }

    /// Attach a condition to the most recently added validator.
    pub fn condition_last_validator(&self, condition: Condition<M>) -> Self {
        const OPERATION: &str = "when";
        if self.error.is_some() {
            return self.clone();
        }
        let Some(last) = self.rules.last() else {
            return self.fail(BuildError::FieldNotSelected {
                operation: OPERATION,
            });
        };
        match last.with_validator_condition(condition) {
            Some(rule) => self.replace_last(rule),
            None => self.fail(BuildError::NoValidator {
                operation: OPERATION,
            }),
        }
    }

    /// Set the error message of the last rule.
    pub fn set_last_message(&self, message: Message<M>) -> Self {
        if self.error.is_some() {
            return self.clone();
        }
        match self.rules.last() {
            Some(last) => self.replace_last(last.with_message(message)),
            None => self.fail(BuildError::FieldNotSelected {
                operation: "with_message",
            }),
        }
    }

    /// Append every rule of `group`, each gated by `condition`.
    ///
    /// A violation recorded on `group` is carried over. The group's last
    /// field becomes the current field, along with its alias.
    pub fn append_conditional(&self, group: &RuleStore<M>, condition: &Condition<M>) -> Self {
        if self.error.is_some() {
            return self.clone();
        }
        if let Some(error) = &group.error {
            return self.fail(error.clone());
        }

        let mut store = self.clone();
        store.current_field_start_index = group
            .current_field_start_index
            .map(|start| self.rules.len() + start);
        store.current_alias = group.current_alias.clone();
        store.rules.extend(
            group
                .rules
                .iter()
                .map(|rule| rule.with_property_condition(condition.clone())),
        );
        store
    }

    fn replace_last(&self, rule: Arc<dyn Rule<M>>) -> Self {
        let mut store = self.clone();
        store.rules.pop();
        store.rules.push(rule);
        store
    }

    fn last_typed<V, D>(&self, operation: &'static str) -> Result<FieldRule<M, V, D>, BuildError>
    where
        V: FieldValue,
        D: FieldValue,
    {
        let last = self
            .rules
            .last()
            .ok_or(BuildError::FieldNotSelected { operation })?;

        last.as_any()
            .downcast_ref::<FieldRule<M, V, D>>()
            .cloned()
            .ok_or_else(|| BuildError::AmbiguousState {
                operation,
                field: last.name().to_string(),
                reason: format!(
                    "last rule is not a rule over `{}` with dependent value `{}`",
                    std::any::type_name::<V>(),
                    std::any::type_name::<D>()
                ),
            })
    }
}

impl<M> Clone for RuleStore<M> {
    fn clone(&self) -> Self {
        Self {
            rules: self.rules.clone(),
            fail_fast: self.fail_fast,
            default_message: Arc::clone(&self.default_message),
            current_field_start_index: self.current_field_start_index,
            current_alias: self.current_alias.clone(),
            error: self.error.clone(),
        }
    }
}

impl<M> fmt::Debug for RuleStore<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.rules.iter().map(|rule| rule.name()).collect();
        f.debug_struct("RuleStore")
            .field("rules", &fields)
            .field("fail_fast", &self.fail_fast)
            .field("current_field_start_index", &self.current_field_start_index)
            .field("current_alias", &self.current_alias)
            .field("error", &self.error)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rule::Check;

    struct Form {
        email: String,
        age: u32,
        subscribed: bool,
    }

    fn form() -> Form {
        Form {
            email: String::new(),
            age: 10,
            subscribed: true,
        }
    }

    fn not_empty() -> ValidatorEntry<Form, String, ()> {
        ValidatorEntry::new(Check::<_, String, ()>::sync(|args| !args.value.is_empty()))
    }

    #[test]
    fn new_store_is_empty() {
        let store: RuleStore<Form> = RuleStore::new(true);

        assert!(store.is_empty());
        assert!(store.fail_fast());
        assert!(store.current_field_start_index().is_none());
        assert!(store.current_alias().is_none());
        assert!(store.error().is_none());
        assert!(!store.has_async_rule());
        assert_eq!(store.default_message(), DEFAULT_MESSAGE);
    }

    #[test]
    fn select_field_records_start_index() {
        let store = RuleStore::new(false)
            .select_field("email", |f: &Form| f.email.clone())
            .select_field("age", |f: &Form| f.age);

        assert_eq!(store.len(), 2);
        assert_eq!(store.current_field_start_index(), Some(1));
        assert_eq!(store.rules()[0].name(), "email");
        assert_eq!(store.rules()[1].name(), "age");
    }

    #[test]
    fn operations_leave_receiver_untouched() {
        let base = RuleStore::new(true).select_field("email", |f: &Form| f.email.clone());
        let extended = base.add_validator("add_rule", not_empty());

        assert_eq!(base.rules()[0].validator_count(), 0);
        assert_eq!(extended.rules()[0].validator_count(), 1);
    }

    #[test]
    fn add_validator_requires_field() {
        let store: RuleStore<Form> = RuleStore::new(true).add_validator("add_rule", not_empty());

        assert_eq!(
            store.error(),
            Some(&BuildError::FieldNotSelected {
                operation: "add_rule"
            })
        );
    }

    #[test]
    fn add_validator_rejects_mismatched_type() {
        let store = RuleStore::new(true)
            .select_field("age", |f: &Form| f.age)
            .add_validator("add_rule", not_empty());

        assert!(matches!(
            store.error(),
            Some(BuildError::AmbiguousState { field, .. }) if field == "age"
        ));
    }

    #[test]
    fn first_violation_wins() {
        let store: RuleStore<Form> = RuleStore::new(true)
            .alias_current_field("Email")
            .set_last_message(Message::from("ignored"));

        assert_eq!(
            store.error(),
            Some(&BuildError::FieldNotSelected {
                operation: "alias_as"
            })
        );
    }

    #[test]
    fn alias_renames_current_block_only() {
        let store = RuleStore::new(true)
            .select_field("email", |f: &Form| f.email.clone())
            .select_field("age", |f: &Form| f.age)
            .alias_current_field("Your age");

        assert_eq!(store.rules()[0].property_name(), "email");
        assert_eq!(store.rules()[1].property_name(), "Your age");
        assert_eq!(store.current_alias(), Some("Your age"));
    }

    #[test]
    fn alias_is_reset_by_next_field() {
        let store = RuleStore::new(true)
            .select_field("email", |f: &Form| f.email.clone())
            .alias_current_field("E-mail")
            .select_field("age", |f: &Form| f.age);

        assert!(store.current_alias().is_none());
        assert_eq!(store.rules()[1].property_name(), "age");
    }

    #[test]
    fn dependency_only_before_validators() {
        let store = RuleStore::new(true)
            .select_field("email", |f: &Form| f.email.clone())
            .attach_dependency::<String, (), bool, _>(|f: &Form| f.subscribed);

        assert!(store.error().is_none());
        assert!(store.rules()[0].has_dependency());

        let store = RuleStore::new(true)
            .select_field("email", |f: &Form| f.email.clone())
            .add_validator("add_rule", not_empty())
            .attach_dependency::<String, (), bool, _>(|f: &Form| f.subscribed);

        assert!(matches!(store.error(), Some(BuildError::AmbiguousState { .. })));
    }

    #[test]
    fn condition_needs_validator() {
        let store = RuleStore::new(true)
            .select_field("email", |f: &Form| f.email.clone())
            .condition_last_validator(Condition::new(|f: &Form| f.subscribed));

        assert_eq!(
            store.error(),
            Some(&BuildError::NoValidator { operation: "when" })
        );
    }

    #[test]
    fn conditional_group_tags_every_rule() {
        let group = RuleStore::new(true)
            .select_field("email", |f: &Form| f.email.clone())
            .add_validator("add_rule", not_empty())
            .select_field("age", |f: &Form| f.age);
        let base = RuleStore::new(false).select_field("age", |f: &Form| f.age);

        let store = base.append_conditional(&group, &Condition::new(|f: &Form| f.subscribed));

        assert_eq!(store.len(), 3);
        assert!(!store.rules()[0].has_property_condition());
        assert!(store.rules()[1].has_property_condition());
        assert!(store.rules()[2].has_property_condition());

        let mut model = form();
        model.subscribed = false;
        assert!(!store.rules()[1].is_applicable(&model));
        assert!(store.rules()[1].is_applicable(&form()));
    }

    #[test]
    fn conditional_group_moves_current_field() {
        let outer = RuleStore::new(true)
            .select_field("email", |f: &Form| f.email.clone())
            .alias_current_field("E-mail");
        let group = RuleStore::new(true)
            .select_field("age", |f: &Form| f.age)
            .select_field("email", |f: &Form| f.email.clone());

        let store = outer.append_conditional(&group, &Condition::new(|f: &Form| f.subscribed));

        assert_eq!(store.current_field_start_index(), Some(2));
        assert!(store.current_alias().is_none());

        let aliased_group = group.alias_current_field("Mail");
        let store = outer.append_conditional(&aliased_group, &Condition::new(|_| true));
        assert_eq!(store.current_alias(), Some("Mail"));
    }

    #[test]
    fn conditional_group_carries_violation() {
        let group: RuleStore<Form> = RuleStore::new(true).alias_current_field("oops");
        let store = RuleStore::new(true).append_conditional(&group, &Condition::new(|_| true));

        assert!(store.error().is_some());
    }

    #[test]
    fn default_message_seeds_new_rules() {
        let store = RuleStore::with_default_message(true, "Invalid value")
            .select_field("email", |f: &Form| f.email.clone())
            .add_validator("add_rule", not_empty());

        let outcome = store.rules()[0].run_sync(&form(), true).unwrap();
        assert_eq!(outcome.get("email").unwrap().message, "Invalid value");
        assert_eq!(store.fresh().default_message(), "Invalid value");
    }
}
