//! Async Lookup
//!
//! This example mixes synchronous rules with asynchronous lookups.
//!
//! Key concepts:
//! - Async validators returning boxed futures
//! - Sync failures merged with async failures
//! - Cancelling pending lookups with a CancellationToken
//!
//! Run with: cargo run --example async_lookup

use rulecraft::prelude::*;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
struct Registration {
    username: String,
    invite_code: String,
    age: u32,
}

const TAKEN: &[&str] = &["admin", "root", "ada"];

async fn username_available(username: String) -> bool {
    tokio::time::sleep(Duration::from_millis(20)).await;
    !TAKEN.contains(&username.as_str())
}

async fn invite_exists(code: String) -> bool {
    tokio::time::sleep(Duration::from_millis(50)).await;
    code.starts_with("INV-")
}

fn registration_rules(fail_fast: bool) -> Result<Validation<Registration>, BuildError> {
    ValidationBuilder::with_fail_fast::<Registration>(fail_fast)
        .for_field("age", |r: &Registration| r.age)
        .greater_than(17)
        .with_message("Must be 18 or older")
        .for_field("username", |r: &Registration| r.username.clone())
        .min_length(3)
        .add_async_rule(|args| username_available(args.value.clone()).boxed())
        .with_message("Username is not available")
        .for_field("invite_code", |r: &Registration| r.invite_code.clone())
        .alias_as("Invite code")
        .add_async_rule(|args| invite_exists(args.value.clone()).boxed())
        .with_message("Unknown invite code")
        .build()
}

fn report(label: &str, outcome: &ValidationOutcome) {
    println!("  {label}: valid = {}", outcome.is_valid());
    for (field, error) in outcome.result() {
        println!("    {field} ({}): {}", error.property_name, error.message);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Async Lookup Example ===\n");

    let validation = registration_rules(false)?;
    println!("Rule set is async: {}\n", validation.is_async());

    let fresh = Registration {
        username: "grace".to_string(),
        invite_code: "INV-1906".to_string(),
        age: 30,
    };
    let clash = Registration {
        username: "ada".to_string(),
        invite_code: "nope".to_string(),
        age: 15,
    };

    println!("Example 1: Sync and async failures merged");
    report("fresh", &validation.validate_async(&fresh).await?);
    report("clash", &validation.validate_async(&clash).await?);

    println!("\nExample 2: Synchronous entry point refuses async rules");
    match validation.validate(&fresh) {
        Ok(_) => println!("  unexpected success"),
        Err(error) => println!("  {error}"),
    }

    println!("\nExample 3: Fail-fast stops at the first failure");
    let fail_fast = registration_rules(true)?;
    report("clash", &fail_fast.validate_async(&clash).await?);

    println!("\nExample 4: Cancelled lookups");
    let token = CancellationToken::new();
    token.cancel();
    let adult_clash = Registration { age: 40, ..clash };
    report(
        "cancelled",
        &validation.validate_async_with(&adult_clash, token).await?,
    );

    println!("\n=== Example Complete ===");
    Ok(())
}
