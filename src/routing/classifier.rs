use serde_json::json;
use tracing::{info, warn};

use crate::{
    config::ModelTier,
    services::{prompts, Executor},
    types::Intent,
};

const REMOVE_KEYWORDS: &[&str] = &["delete", "remove", "cancel", "clear", "empty", "reset"];
const MODIFY_KEYWORDS: &[&str] = &[
    "move",
    "change",
    "update",
    "shift",
    "reschedule",
    "rename",
    "swap",
];
const SUGGEST_KEYWORDS: &[&str] = &[
    "suggest",
    "recommend",
    "options",
    "places",
    "spots",
    "ideas",
    "add",
    "include",
    "want",
    "need",
];
const PLAN_ACTIONS: &[&str] = &["create", "make", "plan", "generate", "build"];
const PLAN_OBJECTS: &[&str] = &["itinerary", "itenary", "plan", "trip", "schedule"];

/// Maps a free-text request to an [`Intent`].
///
/// Asks the fast model first and falls back to keyword matching when the
/// call fails or the reply is not one of the five intent names.
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    executor: Executor,
}

impl IntentClassifier {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }

    pub async fn classify(&self, query: &str) -> Intent {
        let messages = vec![
            json!({"role": "system", "content": prompts::CLASSIFIER_SYSTEM}),
            json!({"role": "user", "content": prompts::classifier_prompt(query)}),
        ];

        match self.executor.complete(ModelTier::Fast, messages).await {
            Ok(reply) => match parse_intent_token(&reply) {
                Some(intent) => {
                    info!(target: "wego::routing", %intent, "classified by model");
                    intent
                }
                None => {
                    let intent = classify_by_keywords(query);
                    warn!(
                        target: "wego::routing",
                        reply = %reply.trim(),
                        fallback = %intent,
                        "classifier reply is not an intent, using keywords"
                    );
                    intent
                }
            },
            Err(err) => {
                let intent = classify_by_keywords(query);
                warn!(
                    target: "wego::routing",
                    error = %err,
                    fallback = %intent,
                    "classifier call failed, using keywords"
                );
                intent
            }
        }
    }
}

/// First whitespace-delimited token of the reply, upper-cased, if it names an intent.
pub fn parse_intent_token(reply: &str) -> Option<Intent> {
    reply
        .split_whitespace()
        .next()?
        .to_uppercase()
        .parse()
        .ok()
}

/// Ordered keyword fallback: REMOVE, MODIFY, SUGGEST, PLAN, otherwise SUGGEST.
pub fn classify_by_keywords(query: &str) -> Intent {
    let lowered = query.to_lowercase();
    let mentions = |words: &[&str]| words.iter().any(|word| lowered.contains(word));

    if mentions(REMOVE_KEYWORDS) {
        Intent::Remove
    } else if mentions(MODIFY_KEYWORDS) {
        Intent::Modify
    } else if mentions(SUGGEST_KEYWORDS) {
        Intent::Suggest
    } else if mentions(PLAN_ACTIONS) && mentions(PLAN_OBJECTS) {
        Intent::Plan
    } else {
        Intent::Suggest
    }
}
