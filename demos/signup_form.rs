//! Signup Form
//!
//! This example validates a signup form with synchronous rules.
//!
//! Key concepts:
//! - Field selection, aliases and custom messages
//! - Built-in string and number rules
//! - Cross-field checks with depends_on
//! - Fail-fast versus collect-all evaluation
//!
//! Run with: cargo run --example signup_form

use rulecraft::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
struct Signup {
    username: String,
    email: String,
    password: String,
    confirmation: String,
    age: u32,
}

fn signup_rules(fail_fast: bool) -> Result<Validation<Signup>, BuildError> {
    ValidationBuilder::with_fail_fast::<Signup>(fail_fast)
        .for_field("username", |s: &Signup| s.username.clone())
        .add_rule(|args| !args.value.is_empty())
        .with_message("Username cannot be empty")
        .for_field("email", |s: &Signup| s.email.clone())
        .alias_as("E-mail")
        .is_email()
        .with_message_fn(|s: &Signup| format!("'{}' is not an e-mail address", s.email))
        .for_field("password", |s: &Signup| s.password.clone())
        .min_length(8)
        .has_capital_letter()
        .has_number()
        .with_message("Password needs 8 characters, a capital letter and a digit")
        .for_field("confirmation", |s: &Signup| s.confirmation.clone())
        .depends_on(|s: &Signup| s.password.clone())
        .add_rule(|args| Some(args.value) == args.dependent_value)
        .with_message("Passwords must match")
        .for_field("age", |s: &Signup| s.age)
        .range(18, 120)
        .with_message("Must be 18 or older")
        .build()
}

fn report(label: &str, outcome: &ValidationOutcome) {
    println!("  {label}: valid = {}", outcome.is_valid());
    for (field, error) in outcome.result() {
        println!("    {field} ({}): {}", error.property_name, error.message);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Signup Form Example ===\n");

    let good = Signup {
        username: "ada".to_string(),
        email: "ada@example.com".to_string(),
        password: "Analytical1".to_string(),
        confirmation: "Analytical1".to_string(),
        age: 36,
    };
    let bad = Signup {
        username: String::new(),
        email: "ada-at-example".to_string(),
        password: "engine".to_string(),
        confirmation: "engines".to_string(),
        age: 12,
    };

    println!("Example 1: Collect every failing field");
    let collect_all = signup_rules(false)?;
    report("good signup", &collect_all.validate(&good)?);
    report("bad signup", &collect_all.validate(&bad)?);

    println!("\nExample 2: Stop at the first failing field");
    let fail_fast = signup_rules(true)?;
    report("bad signup", &fail_fast.validate(&bad)?);

    println!("\nExample 3: Wire format");
    let outcome = collect_all.validate(&bad)?;
    println!("  {}", serde_json::to_string_pretty(&outcome)?);

    println!("\nExample 4: Builder misuse is reported by build()");
    let misuse = ValidationBuilder::create::<Signup>()
        .for_field("username", |s: &Signup| s.username.clone())
        .when(|s: &Signup| s.age > 0)
        .build();
    if let Err(error) = misuse {
        println!("  {error}");
    }

    println!("\n=== Example Complete ===");
    Ok(())
}
