use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;
use wego_agent_rs::{action_schema, schemas::ActionSchema, Guardrail, GuardrailVerdict};

#[derive(Debug, Deserialize, JsonSchema)]
struct Stop {
    name: String,
    /// 1 to 5 stars
    #[schemars(range(min = 1, max = 5))]
    rating: u8,
}

/// Rate the stops the group visited today.
#[action_schema(action = "rate_stops", collection = "stops")]
#[derive(Debug, Deserialize, JsonSchema)]
#[allow(dead_code)]
struct RateStops {
    stops: Vec<Stop>,
}

/// Mark the trip as finished.
#[action_schema(action = "close_trip")]
#[derive(Debug, Deserialize, JsonSchema)]
#[allow(dead_code)]
struct CloseTrip {
    reason: String,
}

#[test]
fn test_macro_generated_metadata() {
    assert_eq!(RateStops::ACTION, "rate_stops");
    assert_eq!(RateStops::COLLECTION, Some("stops"));
    assert_eq!(CloseTrip::COLLECTION, None);

    let handle = RateStops::schema();
    assert_eq!(handle.action(), "rate_stops");
    assert!(handle.type_name().ends_with("RateStops"));
    assert!(std::ptr::eq(handle, RateStops::schema()));

    let schema = handle.schema_json();
    assert_eq!(schema["title"], "rate_stops");
    assert_eq!(
        schema["description"],
        "Rate the stops the group visited today."
    );
    assert_eq!(schema["properties"]["action"]["const"], "rate_stops");
    let required = schema["required"].as_array().unwrap();
    assert!(required.contains(&json!("action")));
    assert!(required.contains(&json!("stops")));
}

#[test]
fn test_guardrail_over_custom_action() {
    let guardrail = Guardrail::for_schema::<RateStops>(&["name", "rating"]);

    let accepted = guardrail.check(
        r#"Done! {"action": "rate_stops", "stops": [{"name": "Ramen Alley", "rating": 5}]}"#,
    );
    assert!(accepted.is_accepted());

    let out_of_range =
        guardrail.check(r#"{"action": "rate_stops", "stops": [{"name": "Pier", "rating": 9}]}"#);
    match out_of_range {
        GuardrailVerdict::Rejected(feedback) => {
            assert!(feedback.contains("rate_stops"));
            assert!(feedback.contains("Do not add any other text."));
        }
        GuardrailVerdict::Accepted(_) => panic!("rating 9 should be rejected"),
    }

    let missing_field = guardrail.check(r#"{"action": "rate_stops", "stops": [{"name": "Pier"}]}"#);
    assert!(!missing_field.is_accepted());
}

#[test]
fn test_guardrail_checks_top_level_fields_without_collection() {
    let guardrail = Guardrail::for_schema::<CloseTrip>(&["reason"]);

    assert!(guardrail
        .check(r#"{"action": "close_trip", "reason": "flight home"}"#)
        .is_accepted());
    assert!(!guardrail
        .check(r#"{"action": "close_trip", "reason": null}"#)
        .is_accepted());
    assert!(!guardrail
        .check(r#"{"action": "close_trip"}"#)
        .is_accepted());
}
