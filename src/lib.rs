//! Rulecraft: fluent, immutable validation rules for typed models
//!
//! Rules are declared per field through a chain of builder stages, frozen
//! into an evaluator with `build()`, and run against any number of model
//! instances. Every builder call returns a new value, so partially built
//! rule sets can be shared and extended independently.
//!
//! # Core Concepts
//!
//! - **Rule**: validators bound to one model field, with an error message
//! - **Conditions**: gate a single validator (`when`) or a block of rules
//!   (`when_group`)
//! - **Evaluators**: synchronous, or asynchronous when any validator is
//! - **Outcome**: `Valid`, or `Invalid` with one error per failing field
//!
//! # Example
//!
//! ```rust
//! use rulecraft::prelude::*;
//!
//! struct Signup {
//!     username: String,
//!     password: String,
//!     confirmation: String,
//! }
//!
//! let validation = ValidationBuilder::with_fail_fast::<Signup>(false)
//!     .for_field("username", |s: &Signup| s.username.clone())
//!     .add_rule(|args| !args.value.is_empty())
//!     .with_message("Username cannot be empty")
//!     .for_field("password", |s: &Signup| s.password.clone())
//!     .alias_as("Password")
//!     .min_length(8)
//!     .with_message("Password must be at least 8 characters")
//!     .for_field("confirmation", |s: &Signup| s.confirmation.clone())
//!     .depends_on(|s: &Signup| s.password.clone())
//!     .add_rule(|args| Some(args.value) == args.dependent_value)
//!     .with_message("Passwords must match")
//!     .build()
//!     .unwrap();
//!
//! let outcome = validation
//!     .validate(&Signup {
//!         username: "ada".to_string(),
//!         password: "short".to_string(),
//!         confirmation: "shorter".to_string(),
//!     })
//!     .unwrap();
//!
//! assert!(!outcome.is_valid());
//! assert_eq!(outcome.get("password").unwrap().property_name, "Password");
//! assert!(outcome.get("confirmation").is_some());
//! assert!(outcome.get("username").is_none());
//! ```

pub mod builder;
pub mod config;
pub mod core;
pub mod prelude;
pub mod validation;

// Re-export commonly used types
pub use builder::{BuildError, ValidationBuilder};
pub use config::ValidatorConfig;
pub use core::{FieldError, ValidationOutcome};
pub use validation::{AsyncValidation, SyncValidation, Validation, ValidationError};
