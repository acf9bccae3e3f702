mod common;

use common::{
    add_items_text, planner, remove_items_text, smart_schedule_text, text_reply, ScriptedBackend,
    ACCURATE_MODEL, FAST_MODEL,
};
use wego_agent_rs::{
    routing::classify_by_keywords,
    services::prompts,
    types::{ChatMessage, TripSettings},
    Intent, SuggestRequest, TripContext,
};

fn trip(days: u32) -> TripContext {
    TripContext {
        settings: TripSettings {
            destination: Some("Andaman Islands".to_string()),
            days_count: Some(days),
            nights_count: Some(days.saturating_sub(1)),
            group_size: Some(4),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn first_user_message(body: &serde_json::Value) -> String {
    body["messages"]
        .as_array()
        .unwrap()
        .iter()
        .find(|message| message["role"] == "user")
        .and_then(|message| message["content"].as_str())
        .unwrap_or_default()
        .to_string()
}

#[tokio::test]
async fn test_unparseable_classifier_reply_falls_back_to_keywords() {
    let backend = ScriptedBackend::new([
        text_reply("I think the user wants a plan"),
        text_reply(&add_items_text()),
    ]);

    let reply = planner(backend.clone())
        .suggest("plan a 3 day trip", &trip(3), &[])
        .await
        .unwrap();

    assert_eq!(reply, add_items_text());
    assert_eq!(backend.models_called(), vec![FAST_MODEL, ACCURATE_MODEL]);
}

#[tokio::test]
async fn test_remove_route_uses_fast_model_without_tools() {
    let backend = ScriptedBackend::new([text_reply("REMOVE"), text_reply(&remove_items_text())]);

    let reply = planner(backend.clone())
        .suggest("get rid of breakfast on day 2", &trip(3), &[])
        .await
        .unwrap();

    assert_eq!(reply, remove_items_text());
    let requests = backend.requests();
    assert_eq!(backend.models_called(), vec![FAST_MODEL, FAST_MODEL]);
    assert!(requests[1].get("tools").is_none());
    assert!(first_user_message(&requests[1]).contains("get rid of breakfast on day 2"));
}

#[tokio::test]
async fn test_suggest_route_advertises_web_search() {
    let backend = ScriptedBackend::new([
        text_reply("SUGGEST"),
        text_reply(&smart_schedule_text()),
    ]);
    let history = vec![ChatMessage::new("Asha", "we love sushi")];

    let reply = planner(backend.clone())
        .suggest("sushi dinner on day 2", &trip(3), &history)
        .await
        .unwrap();

    assert_eq!(reply, smart_schedule_text());
    let requests = backend.requests();
    assert_eq!(requests[1]["model"], FAST_MODEL);
    assert_eq!(requests[1]["tools"][0]["function"]["name"], "web_search");
    assert!(first_user_message(&requests[1]).contains("we love sushi"));
}

#[tokio::test]
async fn test_modify_route_retries_until_valid() {
    let update = serde_json::json!({
        "action": "update_items",
        "updates": [{"originalTitle": "Dinner", "day": 1, "newStartTime": "20:00"}]
    })
    .to_string();
    let backend = ScriptedBackend::new([
        text_reply("MODIFY"),
        text_reply("Moved dinner to 8pm!"),
        text_reply(&update),
    ]);

    let reply = planner(backend.clone())
        .suggest("move dinner to 8pm", &trip(3), &[])
        .await
        .unwrap();

    assert_eq!(reply, update);
    assert_eq!(backend.call_count(), 3);
}

#[tokio::test]
async fn test_out_of_range_day_skips_the_model() {
    let backend = ScriptedBackend::new(Vec::<serde_json::Value>::new());

    let reply = planner(backend.clone())
        .dispatch(Intent::Plan, "plan day 5 for us", &trip(3), &[])
        .await
        .unwrap();

    assert_eq!(reply, prompts::invalid_day_reply(5, 3));
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn test_day_check_does_not_apply_to_removals() {
    let backend = ScriptedBackend::new([text_reply(&remove_items_text())]);

    planner(backend.clone())
        .dispatch(Intent::Remove, "remove lunch on day 9", &trip(3), &[])
        .await
        .unwrap();

    assert_eq!(backend.call_count(), 1);
}

#[tokio::test]
async fn test_general_runs_research_crew_and_appends_preferences() {
    let preferences = "The group loves seafood.\n```json\n{\"action\": \"update_preferences\", \"preferences\": {\"dietary\": [\"pescatarian\"], \"interests\": [\"seafood\"], \"constraints\": []}}\n```";
    let backend = ScriptedBackend::new([
        text_reply("GENERAL"),
        text_reply("1. Fish market\n2. Beach shack"),
        text_reply(preferences),
        text_reply(&add_items_text()),
    ]);

    let reply = planner(backend.clone())
        .suggest("what's good around here?", &trip(3), &[])
        .await
        .unwrap();

    assert!(reply.starts_with(&add_items_text()));
    assert!(reply.contains("\"action\": \"update_preferences\""));
    assert!(reply.ends_with("```"));

    let requests = backend.requests();
    assert_eq!(
        backend.models_called(),
        vec![FAST_MODEL, ACCURATE_MODEL, ACCURATE_MODEL, ACCURATE_MODEL]
    );
    assert_eq!(requests[1]["tools"][0]["function"]["name"], "web_search");
    let planning = first_user_message(&requests[3]);
    assert!(planning.contains("Fish market"));
    assert!(planning.contains("The group loves seafood."));
}

#[tokio::test]
async fn test_full_plan_request_is_not_guardrailed() {
    let backend = ScriptedBackend::new([text_reply("Day 1\n09:00 Breakfast at the hotel")]);
    let request = SuggestRequest::new("", trip(2)).as_full_plan("day 1");

    let reply = planner(backend.clone()).handle(&request).await.unwrap();

    assert_eq!(reply, "Day 1\n09:00 Breakfast at the hotel");
    assert_eq!(backend.models_called(), vec![ACCURATE_MODEL]);
}

#[tokio::test]
async fn test_classifier_falls_back_when_backend_fails() {
    let backend = ScriptedBackend::new(Vec::<serde_json::Value>::new());
    let planner = planner(backend.clone());

    let intent = planner.classifier().classify("Please delete the museum").await;

    assert_eq!(intent, Intent::Remove);
    assert_eq!(intent, classify_by_keywords("Please delete the museum"));
    assert_eq!(backend.call_count(), 1);
}

#[tokio::test]
async fn test_plan_route_pins_the_requested_day() {
    let backend = ScriptedBackend::new([text_reply("PLAN"), text_reply(&add_items_text())]);

    planner(backend.clone())
        .suggest("plan day 2 for us", &trip(3), &[])
        .await
        .unwrap();

    let requests = backend.requests();
    assert_eq!(requests[1]["model"], ACCURATE_MODEL);
    let prompt = first_user_message(&requests[1]);
    assert!(prompt.contains("plan ONLY day 2"));
    assert!(prompt.contains("\"day\": 2"));
}

#[tokio::test]
async fn test_adding_previous_suggestions_skips_classification() {
    let options = serde_json::json!({
        "action": "add_items",
        "replacementStrategy": "append",
        "isOptions": true,
        "items": [
            {"title": "Fish Market", "description": "Fresh catch", "day": 2, "duration": 60, "location": "Port Blair"},
            {"title": "Beach Shack", "description": "Grilled seafood", "day": 2, "duration": 60, "location": "Havelock"}
        ]
    })
    .to_string();
    let backend = ScriptedBackend::new([text_reply(&options)]);
    let history = vec![ChatMessage::new("AI", "1. Fish Market\n2. Beach Shack")];

    let reply = planner(backend.clone())
        .suggest("add them to the itinerary", &trip(3), &history)
        .await
        .unwrap();

    assert_eq!(reply, options);
    let requests = backend.requests();
    assert_eq!(backend.models_called(), vec![ACCURATE_MODEL]);
    assert!(requests[0].get("tools").is_none());
    let prompt = first_user_message(&requests[0]);
    assert!(prompt.contains("Fish Market"));
    assert!(prompt.contains("isOptions"));
}

#[tokio::test]
async fn test_add_request_without_history_is_classified() {
    let backend = ScriptedBackend::new([text_reply("PLAN"), text_reply(&add_items_text())]);

    planner(backend.clone())
        .suggest("add a snorkelling trip to the itinerary", &trip(3), &[])
        .await
        .unwrap();

    assert_eq!(backend.models_called(), vec![FAST_MODEL, ACCURATE_MODEL]);
}
