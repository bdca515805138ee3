//! Ready-made validators for common field types.
//!
//! Each trait is implemented for every builder stage that can add a
//! validator to a field of the matching type, so the methods show up as soon
//! as the field's type is known:
//!
//! ```rust
//! use rulecraft::prelude::*;
//!
//! struct Account {
//!     email: String,
//!     age: u32,
//! }
//!
//! let validation = ValidationBuilder::with_fail_fast::<Account>(false)
//!     .for_field("email", |a: &Account| a.email.clone())
//!     .is_email()
//!     .with_message("Invalid email")
//!     .for_field("age", |a: &Account| a.age)
//!     .between(18, 130)
//!     .with_message("Age out of range")
//!     .build()
//!     .unwrap();
//!
//! let outcome = validation
//!     .validate(&Account { email: "nope".to_string(), age: 12 })
//!     .unwrap();
//! assert_eq!(outcome.result().len(), 2);
//! ```

use crate::builder::RuleAddedBuilder;
use crate::core::{Check, FieldValue, Model, ValidatorArgs};
use chrono::{DateTime, Datelike, Utc, Weekday};
use regex::Regex;
use std::sync::OnceLock;
use uuid::{Uuid, Variant, Version};

/// A builder stage that can append a validator to a field of type `V`.
pub trait RuleTarget<M: Model, V: FieldValue, D: FieldValue>: Sized {
    fn add_check(self, check: Check<M, V, D>) -> RuleAddedBuilder<M, V, D>;
}

fn value_check<M, V, D, F>(predicate: F) -> Check<M, V, D>
where
    M: Model,
    V: FieldValue,
    D: FieldValue,
    F: Fn(&V) -> bool + Send + Sync + 'static,
{
    Check::sync(move |args: ValidatorArgs<'_, M, V, D>| predicate(args.value))
}

static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
static NUMERIC_REGEX: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_REGEX.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex."))
}

fn numeric_regex() -> &'static Regex {
    NUMERIC_REGEX.get_or_init(|| Regex::new(r"^[0-9]+$").expect("Invalid regex."))
}

/// Validators for `String` fields.
pub trait StringRules<M: Model, D: FieldValue>: RuleTarget<M, String, D> {
    /// At least `len` characters.
    fn min_length(self, len: usize) -> RuleAddedBuilder<M, String, D> {
        self.add_check(value_check(move |value: &String| {
            value.chars().count() >= len
        }))
    }

    /// At most `len` characters.
    fn max_length(self, len: usize) -> RuleAddedBuilder<M, String, D> {
        self.add_check(value_check(move |value: &String| {
            value.chars().count() <= len
        }))
    }

    fn is_email(self) -> RuleAddedBuilder<M, String, D> {
        self.add_check(value_check(|value: &String| email_regex().is_match(value)))
    }

    /// Only ASCII digits, at least one.
    fn is_numeric(self) -> RuleAddedBuilder<M, String, D> {
        self.add_check(value_check(|value: &String| numeric_regex().is_match(value)))
    }

    /// `pattern` matches somewhere in the value. Anchor it to match the
    /// whole value.
    fn matches(self, pattern: Regex) -> RuleAddedBuilder<M, String, D> {
        self.add_check(value_check(move |value: &String| pattern.is_match(value)))
    }

    fn has_capital_letter(self) -> RuleAddedBuilder<M, String, D> {
        self.add_check(value_check(|value: &String| {
            value.chars().any(|c| c.is_ascii_uppercase())
        }))
    }

    fn has_lowercase_letter(self) -> RuleAddedBuilder<M, String, D> {
        self.add_check(value_check(|value: &String| {
            value.chars().any(|c| c.is_ascii_lowercase())
        }))
    }

    fn has_number(self) -> RuleAddedBuilder<M, String, D> {
        self.add_check(value_check(|value: &String| {
            value.chars().any(|c| c.is_ascii_digit())
        }))
    }

    /// Contains a character that is neither an ASCII letter nor a digit.
    fn has_special_character(self) -> RuleAddedBuilder<M, String, D> {
        self.add_check(value_check(|value: &String| {
            value.chars().any(|c| !c.is_ascii_alphanumeric())
        }))
    }

    /// The value equals one of `values`.
    fn is_in<I, S>(self, values: I) -> RuleAddedBuilder<M, String, D>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowed: Vec<String> = values.into_iter().map(Into::into).collect();
        self.add_check(value_check(move |value: &String| allowed.contains(value)))
    }

    /// Absolute URL.
    fn is_url(self) -> RuleAddedBuilder<M, String, D> {
        self.add_check(value_check(|value: &String| url::Url::parse(value).is_ok()))
    }

    /// Hyphenated version 4 UUID.
    fn is_uuid(self) -> RuleAddedBuilder<M, String, D> {
        self.add_check(value_check(|value: &String| {
            value.len() == 36
                && Uuid::try_parse(value).is_ok_and(|id| {
                    id.get_version() == Some(Version::Random)
                        && id.get_variant() == Variant::RFC4122
                })
        }))
    }
}

impl<M, D, T> StringRules<M, D> for T
where
    M: Model,
    D: FieldValue,
    T: RuleTarget<M, String, D>,
{
}

/// Primitive numeric types usable with [`NumberRules`].
pub trait Number: FieldValue + Copy + PartialOrd {
    const ZERO: Self;

    /// Has no fractional part.
    fn is_whole(self) -> bool;

    fn is_even(self) -> bool;

    fn is_odd(self) -> bool {
        !self.is_even()
    }
}

impl_number!(
    int: i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize;
    float: f32, f64
);

/// Validators for numeric fields.
pub trait NumberRules<M: Model, N: Number, D: FieldValue>: RuleTarget<M, N, D> {
    /// `min <= value <= max`.
    fn range(self, min: N, max: N) -> RuleAddedBuilder<M, N, D> {
        self.add_check(value_check(move |value: &N| *value >= min && *value <= max))
    }

    /// Same as [`range`](Self::range).
    fn between(self, min: N, max: N) -> RuleAddedBuilder<M, N, D> {
        self.range(min, max)
    }

    fn greater_than(self, bound: N) -> RuleAddedBuilder<M, N, D> {
        self.add_check(value_check(move |value: &N| *value > bound))
    }

    fn less_than(self, bound: N) -> RuleAddedBuilder<M, N, D> {
        self.add_check(value_check(move |value: &N| *value < bound))
    }

    fn is_positive(self) -> RuleAddedBuilder<M, N, D> {
        self.add_check(value_check(|value: &N| *value > N::ZERO))
    }

    fn is_negative(self) -> RuleAddedBuilder<M, N, D> {
        self.add_check(value_check(|value: &N| *value < N::ZERO))
    }

    fn is_zero(self) -> RuleAddedBuilder<M, N, D> {
        self.add_check(value_check(|value: &N| *value == N::ZERO))
    }

    fn not_zero(self) -> RuleAddedBuilder<M, N, D> {
        self.add_check(value_check(|value: &N| *value != N::ZERO))
    }

    fn is_even(self) -> RuleAddedBuilder<M, N, D> {
        self.add_check(value_check(|value: &N| value.is_even()))
    }

    fn is_odd(self) -> RuleAddedBuilder<M, N, D> {
        self.add_check(value_check(|value: &N| value.is_odd()))
    }

    fn is_integer(self) -> RuleAddedBuilder<M, N, D> {
        self.add_check(value_check(|value: &N| value.is_whole()))
    }

    /// Has a fractional part. Never true for integer types.
    fn is_decimal(self) -> RuleAddedBuilder<M, N, D> {
        self.add_check(value_check(|value: &N| !value.is_whole()))
    }
}

impl<M, N, D, T> NumberRules<M, N, D> for T
where
    M: Model,
    N: Number,
    D: FieldValue,
    T: RuleTarget<M, N, D>,
{
}

/// Validators for `bool` fields.
pub trait BoolRules<M: Model, D: FieldValue>: RuleTarget<M, bool, D> {
    fn is_true(self) -> RuleAddedBuilder<M, bool, D> {
        self.add_check(value_check(|value: &bool| *value))
    }

    fn is_false(self) -> RuleAddedBuilder<M, bool, D> {
        self.add_check(value_check(|value: &bool| !*value))
    }
}

impl<M, D, T> BoolRules<M, D> for T
where
    M: Model,
    D: FieldValue,
    T: RuleTarget<M, bool, D>,
{
}

fn same_day(a: &DateTime<Utc>, b: &DateTime<Utc>) -> bool {
    a.date_naive() == b.date_naive()
}

/// Validators for `DateTime<Utc>` fields. Calendar checks use UTC days.
///
/// `is_today`, `is_past` and `is_future` read the clock when the rule runs,
/// not when it is built.
pub trait DateRules<M: Model, D: FieldValue>: RuleTarget<M, DateTime<Utc>, D> {
    fn is_before(self, date: DateTime<Utc>) -> RuleAddedBuilder<M, DateTime<Utc>, D> {
        self.add_check(value_check(move |value: &DateTime<Utc>| *value < date))
    }

    fn is_after(self, date: DateTime<Utc>) -> RuleAddedBuilder<M, DateTime<Utc>, D> {
        self.add_check(value_check(move |value: &DateTime<Utc>| *value > date))
    }

    /// `start <= value <= end`.
    fn is_between(
        self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RuleAddedBuilder<M, DateTime<Utc>, D> {
        self.add_check(value_check(move |value: &DateTime<Utc>| {
            *value >= start && *value <= end
        }))
    }

    fn is_same_day(self, date: DateTime<Utc>) -> RuleAddedBuilder<M, DateTime<Utc>, D> {
        self.add_check(value_check(move |value: &DateTime<Utc>| same_day(value, &date)))
    }

    fn is_same_month(self, date: DateTime<Utc>) -> RuleAddedBuilder<M, DateTime<Utc>, D> {
        self.add_check(value_check(move |value: &DateTime<Utc>| {
            value.year() == date.year() && value.month() == date.month()
        }))
    }

    fn is_weekend(self) -> RuleAddedBuilder<M, DateTime<Utc>, D> {
        self.add_check(value_check(|value: &DateTime<Utc>| {
            matches!(value.weekday(), Weekday::Sat | Weekday::Sun)
        }))
    }

    fn is_weekday(self) -> RuleAddedBuilder<M, DateTime<Utc>, D> {
        self.add_check(value_check(|value: &DateTime<Utc>| {
            !matches!(value.weekday(), Weekday::Sat | Weekday::Sun)
        }))
    }

    fn is_today(self) -> RuleAddedBuilder<M, DateTime<Utc>, D> {
        self.add_check(value_check(|value: &DateTime<Utc>| {
            same_day(value, &Utc::now())
        }))
    }

    fn is_past(self) -> RuleAddedBuilder<M, DateTime<Utc>, D> {
        self.add_check(value_check(|value: &DateTime<Utc>| *value < Utc::now()))
    }

    fn is_future(self) -> RuleAddedBuilder<M, DateTime<Utc>, D> {
        self.add_check(value_check(|value: &DateTime<Utc>| *value > Utc::now()))
    }

    fn is_leap_year(self) -> RuleAddedBuilder<M, DateTime<Utc>, D> {
        self.add_check(value_check(|value: &DateTime<Utc>| {
            value.date_naive().leap_year()
        }))
    }
}

impl<M, D, T> DateRules<M, D> for T
where
    M: Model,
    D: FieldValue,
    T: RuleTarget<M, DateTime<Utc>, D>,
{
}

/// Validators for `Option` fields.
pub trait OptionRules<M: Model, V: FieldValue, D: FieldValue>: RuleTarget<M, Option<V>, D> {
    fn is_some(self) -> RuleAddedBuilder<M, Option<V>, D> {
        self.add_check(value_check(|value: &Option<V>| value.is_some()))
    }

    fn is_none(self) -> RuleAddedBuilder<M, Option<V>, D> {
        self.add_check(value_check(|value: &Option<V>| value.is_none()))
    }
}

impl<M, V, D, T> OptionRules<M, V, D> for T
where
    M: Model,
    V: FieldValue,
    D: FieldValue,
    T: RuleTarget<M, Option<V>, D>,
{
}

/// Validators for `Vec` fields.
pub trait CollectionRules<M: Model, V: FieldValue, D: FieldValue>: RuleTarget<M, Vec<V>, D> {
    fn is_empty(self) -> RuleAddedBuilder<M, Vec<V>, D> {
        self.add_check(value_check(|value: &Vec<V>| value.is_empty()))
    }

    fn is_not_empty(self) -> RuleAddedBuilder<M, Vec<V>, D> {
        self.add_check(value_check(|value: &Vec<V>| !value.is_empty()))
    }
}

impl<M, V, D, T> CollectionRules<M, V, D> for T
where
    M: Model,
    V: FieldValue,
    D: FieldValue,
    T: RuleTarget<M, Vec<V>, D>,
{
}

/// Comparisons against a fixed value, for any field type.
pub trait ComparisonRules<M: Model, V: FieldValue, D: FieldValue>: RuleTarget<M, V, D> {
    fn is_equal_to(self, expected: V) -> RuleAddedBuilder<M, V, D>
    where
        V: PartialEq,
    {
        self.add_check(value_check(move |value: &V| *value == expected))
    }

    fn is_not_equal_to(self, unexpected: V) -> RuleAddedBuilder<M, V, D>
    where
        V: PartialEq,
    {
        self.add_check(value_check(move |value: &V| *value != unexpected))
    }

    fn is_greater_than(self, bound: V) -> RuleAddedBuilder<M, V, D>
    where
        V: PartialOrd,
    {
        self.add_check(value_check(move |value: &V| *value > bound))
    }

    fn is_less_than(self, bound: V) -> RuleAddedBuilder<M, V, D>
    where
        V: PartialOrd,
    {
        self.add_check(value_check(move |value: &V| *value < bound))
    }
}

impl<M, V, D, T> ComparisonRules<M, V, D> for T
where
    M: Model,
    V: FieldValue,
    D: FieldValue,
    T: RuleTarget<M, V, D>,
{
}
