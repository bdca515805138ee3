//! First builder stage: nothing selected yet.

use crate::builder::FieldAddedBuilder;
use crate::core::{FieldValue, Model, RuleStore};
use std::fmt;

/// Stage whose only operation is selecting a field.
pub struct InitialBuilder<M> {
    store: RuleStore<M>,
}

impl<M: Model> InitialBuilder<M> {
    /// Continue building on an existing store.
    pub fn from_store(store: RuleStore<M>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &RuleStore<M> {
        &self.store
    }

    pub fn into_store(self) -> RuleStore<M> {
        self.store
    }

    /// Start a new rule for the field `name`, read from the model by `getter`.
    ///
    /// `name` is the key used in the outcome map and the default display name.
    pub fn for_field<V, F>(self, name: impl Into<String>, getter: F) -> FieldAddedBuilder<M, V>
    where
        V: FieldValue,
        F: Fn(&M) -> V + Send + Sync + 'static,
    {
        FieldAddedBuilder::from_store(self.store.select_field(name, getter))
    }
}

impl<M> Clone for InitialBuilder<M> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<M> fmt::Debug for InitialBuilder<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InitialBuilder")
            .field("store", &self.store)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Profile {
        nickname: String,
    }

    #[test]
    fn for_field_appends_empty_rule() {
        let initial = InitialBuilder::<Profile>::from_store(RuleStore::new(true));
        let added = initial.clone().for_field("nickname", |p: &Profile| p.nickname.clone());

        assert!(initial.store().is_empty());
        assert_eq!(added.store().len(), 1);
        assert_eq!(added.store().rules()[0].validator_count(), 0);
        assert_eq!(added.store().current_field_start_index(), Some(0));
    }

    #[test]
    fn for_field_keeps_existing_rules() {
        let store = InitialBuilder::<Profile>::from_store(RuleStore::new(true))
            .for_field("nickname", |p: &Profile| p.nickname.clone())
            .into_store();

        let added = InitialBuilder::from_store(store).for_field("nickname_len", |p: &Profile| {
            p.nickname.len()
        });

        assert_eq!(added.store().len(), 2);
        assert_eq!(added.store().current_field_start_index(), Some(1));
    }
}
