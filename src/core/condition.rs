//! Model-level conditions that gate rules and validators.
//!
//! A condition is a pure predicate over the whole model. Attached to a rule
//! it decides whether the rule applies at all; attached to a single validator
//! it decides whether that validator runs.

use std::fmt;
use std::sync::Arc;

/// Pure predicate over a model instance.
///
/// Conditions are cheap to clone (the predicate is shared), which lets the
/// builder copy rules freely without re-wrapping closures.
///
/// # Example
///
/// ```rust
/// use rulecraft::core::Condition;
///
/// struct Account {
///     active: bool,
/// }
///
/// let only_active = Condition::new(|a: &Account| a.active);
///
/// assert!(only_active.check(&Account { active: true }));
/// assert!(!only_active.check(&Account { active: false }));
/// ```
pub struct Condition<M> {
    predicate: Arc<dyn Fn(&M) -> bool + Send + Sync>,
}

impl<M> Condition<M> {
    /// Create a condition from a pure predicate function.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&M) -> bool + Send + Sync + 'static,
    {
        Condition {
            predicate: Arc::new(predicate),
        }
    }

    /// Evaluate the condition against a model.
    pub fn check(&self, model: &M) -> bool {
        (self.predicate)(model)
    }

    /// Combine two conditions; the result holds only when both hold.
    ///
    /// `other` is not evaluated when `self` is false.
    pub fn and(&self, other: &Condition<M>) -> Condition<M>
    where
        M: 'static,
    {
        let first = Arc::clone(&self.predicate);
        let second = Arc::clone(&other.predicate);
        Condition {
            predicate: Arc::new(move |model: &M| first(model) && second(model)),
        }
    }
}

impl<M> Clone for Condition<M> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<M> fmt::Debug for Condition<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Condition")
            .field("predicate", &"<function>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Profile {
        age: u32,
        verified: bool,
    }

    #[test]
    fn condition_checks_model() {
        let adult = Condition::new(|p: &Profile| p.age >= 18);

        assert!(adult.check(&Profile {
            age: 30,
            verified: false
        }));
        assert!(!adult.check(&Profile {
            age: 12,
            verified: false
        }));
    }

    #[test]
    fn condition_is_deterministic() {
        let profile = Profile {
            age: 18,
            verified: true,
        };
        let condition = Condition::new(|p: &Profile| p.verified);

        assert_eq!(condition.check(&profile), condition.check(&profile));
    }

    #[test]
    fn and_requires_both() {
        let adult = Condition::new(|p: &Profile| p.age >= 18);
        let verified = Condition::new(|p: &Profile| p.verified);
        let both = adult.and(&verified);

        assert!(both.check(&Profile {
            age: 20,
            verified: true
        }));
        assert!(!both.check(&Profile {
            age: 20,
            verified: false
        }));
        assert!(!both.check(&Profile {
            age: 10,
            verified: true
        }));
    }

    #[test]
    fn and_short_circuits() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let never = Condition::new(|_: &Profile| false);
        let counted = Condition::new(move |_: &Profile| {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        });

        let combined = never.and(&counted);
        assert!(!combined.check(&Profile {
            age: 1,
            verified: true
        }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn clones_share_predicate() {
        let condition = Condition::new(|p: &Profile| p.age > 65);
        let cloned = condition.clone();

        let senior = Profile {
            age: 70,
            verified: false,
        };
        assert_eq!(condition.check(&senior), cloned.check(&senior));
    }
}
