//! Common imports.
//!
//! ```rust
//! use rulecraft::prelude::*;
//! ```

pub use crate::builder::{
    BoolRules, BuildError, CollectionRules, CommonBuilder, ComparisonRules, DateRules,
    FieldAddedBuilder, InitialBuilder, NumberRules, OptionRules, RuleAddedBuilder, StringRules,
    ValidationBuilder,
};
pub use crate::config::ValidatorConfig;
pub use crate::core::{FieldError, ValidationOutcome, ValidatorArgs};
pub use crate::validation::{Validation, ValidationError};
pub use futures::future::{BoxFuture, FutureExt};
