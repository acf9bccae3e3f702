use serde::{Deserialize, Serialize};

use super::trip::{ChatMessage, TripContext};

/// Body of `POST /api/ai/suggest`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SuggestRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub trip_context: TripContext,
    #[serde(default)]
    pub chat_history: Vec<ChatMessage>,
    /// `"suggest"` (default) or `"plan"`
    #[serde(default = "default_action")]
    pub action: String,
    /// Planning scope such as `"everything"` or `"day 2"`
    #[serde(default = "default_scope")]
    pub scope: String,
}

fn default_action() -> String {
    "suggest".to_string()
}

fn default_scope() -> String {
    "everything".to_string()
}

impl SuggestRequest {
    pub fn new(query: impl Into<String>, trip_context: TripContext) -> Self {
        Self {
            query: query.into(),
            trip_context,
            chat_history: Vec::new(),
            action: default_action(),
            scope: default_scope(),
        }
    }

    pub fn with_history(mut self, chat_history: Vec<ChatMessage>) -> Self {
        self.chat_history = chat_history;
        self
    }

    pub fn as_full_plan(mut self, scope: impl Into<String>) -> Self {
        self.action = "plan".to_string();
        self.scope = scope.into();
        self
    }

    pub fn is_full_plan(&self) -> bool {
        self.action.eq_ignore_ascii_case("plan")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum SuggestResponse {
    Success { success: bool, result: String },
    Failure { success: bool, error: String },
}

impl SuggestResponse {
    pub fn ok(result: impl Into<String>) -> Self {
        SuggestResponse::Success {
            success: true,
            result: result.into(),
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        SuggestResponse::Failure {
            success: false,
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request: SuggestRequest = serde_json::from_str(r#"{"query": "add dinner"}"#).unwrap();
        assert_eq!(request.action, "suggest");
        assert_eq!(request.scope, "everything");
        assert!(!request.is_full_plan());
        assert!(request.chat_history.is_empty());
    }

    #[test]
    fn test_response_shapes() {
        let ok = serde_json::to_value(SuggestResponse::ok("done")).unwrap();
        assert_eq!(ok, serde_json::json!({"success": true, "result": "done"}));

        let failed = serde_json::to_value(SuggestResponse::failed("boom")).unwrap();
        assert_eq!(failed, serde_json::json!({"success": false, "error": "boom"}));
    }
}
