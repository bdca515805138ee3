//! Conditional Groups
//!
//! This example gates rules on properties of the model.
//!
//! Key concepts:
//! - when: condition the most recent validator
//! - when_group: condition a whole block of rules
//! - Nested groups combine their conditions
//! - Rule sets loaded from a ValidatorConfig, with its default message
//!
//! Run with: cargo run --example conditional_groups

use rulecraft::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
struct Shipment {
    express: bool,
    international: bool,
    weight_kg: f64,
    customs_code: Option<String>,
    tracking: Vec<String>,
    reference: String,
}

fn shipment_rules(config: &ValidatorConfig) -> Result<Validation<Shipment>, BuildError> {
    ValidationBuilder::from_config::<Shipment>(config)
        .for_field("weight_kg", |s: &Shipment| s.weight_kg)
        .is_positive()
        .less_than(30.0)
        .with_message("Weight must be positive, and at most 30 kg for express parcels")
        .when(|s: &Shipment| s.express)
        .when_group(
            |s: &Shipment| s.international,
            |group| {
                group
                    .for_field("customs_code", |s: &Shipment| s.customs_code.clone())
                    .is_some()
                    .with_message("International shipments need a customs code")
                    .when_group(
                        |s: &Shipment| s.express,
                        |inner| {
                            inner
                                .for_field("tracking", |s: &Shipment| s.tracking.clone())
                                .is_not_empty()
                                .with_message("Express international parcels need tracking")
                        },
                    )
            },
        )
        .for_field("reference", |s: &Shipment| s.reference.clone())
        .max_length(12)
        .build()
}

fn report(label: &str, outcome: &ValidationOutcome) {
    println!("  {label}: valid = {}", outcome.is_valid());
    for (field, error) in outcome.result() {
        println!("    {field}: {}", error.message);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Conditional Groups Example ===\n");

    let config: ValidatorConfig = serde_json::from_str(
        r#"{ "fail_fast": false, "default_message": "Invalid shipment" }"#,
    )?;
    let validation = shipment_rules(&config)?;

    let domestic = Shipment {
        express: false,
        international: false,
        weight_kg: 45.0,
        customs_code: None,
        tracking: Vec::new(),
        reference: "SHIP-0001".to_string(),
    };
    let international = Shipment {
        international: true,
        ..domestic.clone()
    };
    let express_international = Shipment {
        express: true,
        international: true,
        weight_kg: 45.0,
        customs_code: Some("HS-8471".to_string()),
        tracking: Vec::new(),
        reference: "SHIP-0002-OVERSIZE".to_string(),
    };

    println!("Example 1: Domestic standard parcel skips every conditional rule");
    report("domestic", &validation.validate(&domestic)?);

    println!("\nExample 2: International parcel enters the outer group");
    report("international", &validation.validate(&international)?);

    println!("\nExample 3: Express international parcel enters both groups");
    report("express", &validation.validate(&express_international)?);

    println!("\n=== Example Complete ===");
    Ok(())
}
