//! Stage reached right after `for_field`.

use crate::core::{FieldValue, Model, RuleStore};
use std::marker::PhantomData;

/// A field is selected; validators, an alias or a dependency can be added.
///
/// `V` is the field's value type, `D` the dependent value type declared by
/// `depends_on` (`()` until then).
pub struct FieldAddedBuilder<M, V, D = ()> {
    store: RuleStore<M>,
    _marker: PhantomData<fn() -> (V, D)>,
}

impl<M: Model, V: FieldValue, D: FieldValue> FieldAddedBuilder<M, V, D> {
    pub fn from_store(store: RuleStore<M>) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    pub fn store(&self) -> &RuleStore<M> {
        &self.store
    }

    pub fn into_store(self) -> RuleStore<M> {
        self.store
    }

    /// Report every rule of the current field under `alias`.
    ///
    /// The outcome is still keyed by the field name; only `property_name`
    /// changes. Validators added later to this field keep the alias.
    pub fn alias_as(self, alias: &str) -> Self {
        Self::from_store(self.store.alias_current_field(alias))
    }

    /// Declare a second model value handed to this rule's validators as
    /// `dependent_value`. Must precede the rule's validators.
    pub fn depends_on<D2, F>(self, getter: F) -> FieldAddedBuilder<M, V, D2>
    where
        D2: FieldValue,
        F: Fn(&M) -> D2 + Send + Sync + 'static,
    {
        FieldAddedBuilder::from_store(self.store.attach_dependency::<V, D, D2, F>(getter))
    }
}

stage_methods!(FieldAddedBuilder);

#[cfg(test)]
mod tests {
    use crate::builder::{BuildError, ValidationBuilder};
    use crate::core::ValidationOutcome;

    #[derive(Debug)]
    struct Signup {
        password: String,
        confirmation: String,
        age: u32,
    }

    fn signup(password: &str, confirmation: &str) -> Signup {
        Signup {
            password: password.to_string(),
            confirmation: confirmation.to_string(),
            age: 30,
        }
    }

    #[test]
    fn add_rule_appends_to_current_field() {
        let field = ValidationBuilder::create::<Signup>()
            .for_field("password", |s: &Signup| s.password.clone());
        let added = field.clone().add_rule(|args| args.value.len() >= 8);

        assert_eq!(field.store().rules()[0].validator_count(), 0);
        assert_eq!(added.store().rules()[0].validator_count(), 1);
    }

    #[test]
    fn alias_is_reported_as_property_name() {
        let validation = ValidationBuilder::create::<Signup>()
            .for_field("password", |s: &Signup| s.password.clone())
            .alias_as("Password")
            .add_rule(|args| args.value.len() >= 8)
            .with_message("Too short")
            .build()
            .unwrap();

        let outcome = validation.validate(&signup("short", "short")).unwrap();
        let error = outcome.get("password").unwrap();
        assert_eq!(error.property_name, "Password");
        assert_eq!(error.message, "Too short");
    }

    #[test]
    fn depends_on_passes_both_values() {
        let validation = ValidationBuilder::create::<Signup>()
            .for_field("confirmation", |s: &Signup| s.confirmation.clone())
            .depends_on(|s: &Signup| s.password.clone())
            .add_rule(|args| Some(args.value) == args.dependent_value)
            .with_message("Passwords must match")
            .build()
            .unwrap();

        assert_eq!(
            validation.validate(&signup("secret", "secret")).unwrap(),
            ValidationOutcome::Valid
        );
        assert!(!validation
            .validate(&signup("secret", "secrets"))
            .unwrap()
            .is_valid());
    }

    #[test]
    fn conditional_validator_is_skipped() {
        let validation = ValidationBuilder::create::<Signup>()
            .for_field("age", |s: &Signup| s.age)
            .add_rule_when(|args| *args.value >= 40, |s: &Signup| s.password == "admin")
            .with_message("Admins must be 40 or older")
            .build()
            .unwrap();

        assert!(validation.validate(&signup("user", "user")).unwrap().is_valid());
        assert!(!validation
            .validate(&signup("admin", "admin"))
            .unwrap()
            .is_valid());
    }

    #[test]
    fn when_without_validator_is_recorded() {
        let result = ValidationBuilder::create::<Signup>()
            .for_field("age", |s: &Signup| s.age)
            .when(|s: &Signup| s.age > 0)
            .build();

        assert_eq!(
            result.err(),
            Some(BuildError::NoValidator { operation: "when" })
        );
    }
}
