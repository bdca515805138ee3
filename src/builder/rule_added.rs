//! Stage reached right after a validator was added.

use crate::builder::{finish, BuildError, CommonBuilder, FieldAddedBuilder};
use crate::core::{FieldValue, Message, Model, RuleStore};
use crate::validation::Validation;
use std::marker::PhantomData;

/// A validator was just added; its rule can now get an error message.
pub struct RuleAddedBuilder<M, V, D = ()> {
    store: RuleStore<M>,
    _marker: PhantomData<fn() -> (V, D)>,
}

impl<M: Model, V: FieldValue, D: FieldValue> RuleAddedBuilder<M, V, D> {
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

    /// Set the error message reported when the current rule fails.
    pub fn with_message(self, message: impl Into<Message<M>>) -> CommonBuilder<M, V, D> {
        CommonBuilder::from_store(self.store.set_last_message(message.into()))
    }

    /// Set an error message computed from the failing model.
    pub fn with_message_fn<F>(self, message: F) -> CommonBuilder<M, V, D>
    where
        F: Fn(&M) -> String + Send + Sync + 'static,
    {
        self.with_message(Message::template(message))
    }

    pub fn for_field<V2, F>(self, name: impl Into<String>, getter: F) -> FieldAddedBuilder<M, V2>
    where
        V2: FieldValue,
        F: Fn(&M) -> V2 + Send + Sync + 'static,
    {
        FieldAddedBuilder::from_store(self.store.select_field(name, getter))
    }

    pub fn build(self) -> Result<Validation<M>, BuildError> {
        finish(self.store)
    }
}

stage_methods!(RuleAddedBuilder);
