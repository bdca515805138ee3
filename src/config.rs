//! Builder configuration.

use crate::core::DEFAULT_MESSAGE;
use serde::{Deserialize, Serialize};

/// Settings for [`ValidationBuilder::from_config`](crate::ValidationBuilder::from_config).
///
/// Missing fields take their defaults when deserialized.
///
/// # Example
///
/// ```rust
/// use rulecraft::ValidatorConfig;
///
/// let config = ValidatorConfig::default().with_fail_fast(false);
/// assert!(!config.fail_fast);
/// assert_eq!(config.default_message, "No error message set for this rule");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Stop at the first failing rule
    pub fail_fast: bool,

    /// Message for rules built without `with_message`
    pub default_message: String,
}

impl ValidatorConfig {
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    pub fn with_default_message(mut self, message: impl Into<String>) -> Self {
        self.default_message = message.into();
        self
    }
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            fail_fast: true,
            default_message: DEFAULT_MESSAGE.to_string(),
        }
    }
}
