//! Macros shared by the builder stages.

/// Generate the validator-adding and condition methods of a builder stage.
///
/// The stage must be a `$stage<M, V, D>` struct with a `store: RuleStore<M>`
/// field. Every method consumes the stage and returns the next one.
macro_rules! stage_methods {
    ($stage:ident) => {
        impl<M, V, D> $stage<M, V, D>
        where
            M: $crate::core::Model,
            V: $crate::core::FieldValue,
            D: $crate::core::FieldValue,
        {
            /// Append a synchronous validator to the current rule.
            pub fn add_rule<F, R>(self, predicate: F) -> $crate::builder::RuleAddedBuilder<M, V, D>
            where
                F: Fn($crate::core::ValidatorArgs<'_, M, V, D>) -> R + Send + Sync + 'static,
                R: $crate::core::IntoCheckResult,
            {
                self.push_entry("add_rule", $crate::builder::sync_entry(predicate, None))
            }

            /// Append a synchronous validator that only runs when `condition`
            /// holds for the model.
            pub fn add_rule_when<F, R, C>(
                self,
                predicate: F,
                condition: C,
            ) -> $crate::builder::RuleAddedBuilder<M, V, D>
            where
                F: Fn($crate::core::ValidatorArgs<'_, M, V, D>) -> R + Send + Sync + 'static,
                R: $crate::core::IntoCheckResult,
                C: Fn(&M) -> bool + Send + Sync + 'static,
            {
                let condition = $crate::core::Condition::new(condition);
                self.push_entry(
                    "add_rule_when",
                    $crate::builder::sync_entry(predicate, Some(condition)),
                )
            }

            /// Append an asynchronous validator. The rule, and the rule set
            /// built from it, become asynchronous.
            pub fn add_async_rule<F, R>(
                self,
                predicate: F,
            ) -> $crate::builder::RuleAddedBuilder<M, V, D>
            where
                F: for<'a> Fn(
                        $crate::core::ValidatorArgs<'a, M, V, D>,
                    ) -> futures::future::BoxFuture<'a, R>
                    + Send
                    + Sync
                    + 'static,
                R: $crate::core::IntoCheckResult + Send + 'static,
            {
                self.push_entry(
                    "add_async_rule",
                    $crate::builder::async_entry(predicate, None),
                )
            }

            /// Append an asynchronous validator gated by `condition`.
            pub fn add_async_rule_when<F, R, C>(
                self,
                predicate: F,
                condition: C,
            ) -> $crate::builder::RuleAddedBuilder<M, V, D>
            where
                F: for<'a> Fn(
                        $crate::core::ValidatorArgs<'a, M, V, D>,
                    ) -> futures::future::BoxFuture<'a, R>
                    + Send
                    + Sync
                    + 'static,
                R: $crate::core::IntoCheckResult + Send + 'static,
                C: Fn(&M) -> bool + Send + Sync + 'static,
            {
                let condition = $crate::core::Condition::new(condition);
                self.push_entry(
                    "add_async_rule_when",
                    $crate::builder::async_entry(predicate, Some(condition)),
                )
            }

            /// Attach `condition` to the most recently added validator.
            pub fn when<C>(self, condition: C) -> $crate::builder::CommonBuilder<M, V, D>
            where
                C: Fn(&M) -> bool + Send + Sync + 'static,
            {
                $crate::builder::CommonBuilder::from_store(
                    self.store
                        .condition_last_validator($crate::core::Condition::new(condition)),
                )
            }

            /// Build a block of rules on a fresh builder and append them, each
            /// applying only when `condition` holds.
            ///
            /// The returned stage is typed by the block's last rule.
            pub fn when_group<V2, D2, C, G>(
                self,
                condition: C,
                group: G,
            ) -> $crate::builder::CommonBuilder<M, V2, D2>
            where
                V2: $crate::core::FieldValue,
                D2: $crate::core::FieldValue,
                C: Fn(&M) -> bool + Send + Sync + 'static,
                G: FnOnce(
                    $crate::builder::InitialBuilder<M>,
                ) -> $crate::builder::CommonBuilder<M, V2, D2>,
            {
                $crate::builder::CommonBuilder::from_store($crate::builder::append_group(
                    &self.store,
                    $crate::core::Condition::new(condition),
                    group,
                ))
            }

            fn push_entry(
                self,
                operation: &'static str,
                entry: $crate::core::ValidatorEntry<M, V, D>,
            ) -> $crate::builder::RuleAddedBuilder<M, V, D> {
                $crate::builder::RuleAddedBuilder::from_store(
                    self.store.add_validator(operation, entry),
                )
            }
        }

        impl<M, V, D> $crate::builder::RuleTarget<M, V, D> for $stage<M, V, D>
        where
            M: $crate::core::Model,
            V: $crate::core::FieldValue,
            D: $crate::core::FieldValue,
        {
            fn add_check(
                self,
                check: $crate::core::Check<M, V, D>,
            ) -> $crate::builder::RuleAddedBuilder<M, V, D> {
                self.push_entry("add_rule", $crate::core::ValidatorEntry::new(check))
            }
        }

        impl<M, V, D> Clone for $stage<M, V, D> {
            fn clone(&self) -> Self {
                Self {
                    store: self.store.clone(),
                    _marker: std::marker::PhantomData,
                }
            }
        }

        impl<M, V, D> std::fmt::Debug for $stage<M, V, D> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(stringify!($stage))
                    .field("store", &self.store)
                    .finish()
            }
        }
    };
}

/// Implement [`Number`](crate::builder::Number) for primitive numeric types.
macro_rules! impl_number {
    (int: $($int:ty),* ; float: $($float:ty),* $(;)?) => {
        $(
            impl $crate::builder::Number for $int {
                const ZERO: Self = 0;

                fn is_whole(self) -> bool {
                    true
                }

                fn is_even(self) -> bool {
                    self % 2 == 0
                }
            }
        )*
        $(
            impl $crate::builder::Number for $float {
                const ZERO: Self = 0.0;

                fn is_whole(self) -> bool {
                    self.is_finite() && self.fract() == 0.0
                }

                fn is_even(self) -> bool {
                    self % 2.0 == 0.0
                }
            }
        )*
    };
}
