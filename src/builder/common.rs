//! Stage reached after `with_message`, `when` or `when_group`.

use crate::builder::{finish, BuildError, FieldAddedBuilder};
use crate::core::{FieldValue, Model, RuleStore};
use crate::validation::Validation;
use std::marker::PhantomData;

/// General stage: select another field, add validators to the current one,
/// attach conditions or build.
///
/// `V` and `D` are the value and dependent types of the last rule in the
/// store, which is the rule `add_rule` appends to.
pub struct CommonBuilder<M, V, D = ()> {
    store: RuleStore<M>,
    _marker: PhantomData<fn() -> (V, D)>,
}

impl<M: Model, V: FieldValue, D: FieldValue> CommonBuilder<M, V, D> {
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

    pub fn for_field<V2, F>(self, name: impl Into<String>, getter: F) -> FieldAddedBuilder<M, V2>
    where
        V2: FieldValue,
        F: Fn(&M) -> V2 + Send + Sync + 'static,
    {
        FieldAddedBuilder::from_store(self.store.select_field(name, getter))
    }

    /// Freeze the rules into an evaluator.
    ///
    /// Returns the first builder protocol violation, if one was recorded.
    /// The evaluator is asynchronous when any rule has an asynchronous
    /// validator.
    pub fn build(self) -> Result<Validation<M>, BuildError> {
        finish(self.store)
    }
}

stage_methods!(CommonBuilder);
