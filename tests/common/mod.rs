#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use serde_json::{json, Value};
use wego_agent_rs::{
    AgentError, CompletionBackend, Executor, ModelProfile, ModelRoster, Result, TripPlanner,
    WebSearchTool,
};

pub const FAST_MODEL: &str = "fast-model";
pub const ACCURATE_MODEL: &str = "accurate-model";

/// Completion backend that replays canned responses and records every request body.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Value>>,
    requests: Mutex<Vec<Value>>,
}

impl ScriptedBackend {
    pub fn new(replies: impl IntoIterator<Item = Value>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn models_called(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|body| body["model"].as_str().unwrap_or_default().to_string())
            .collect()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn chat_completion(&self, body: &Value) -> Result<Value> {
        self.requests.lock().unwrap().push(body.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AgentError::Llm("script exhausted".to_string()))
    }
}

pub fn roster() -> ModelRoster {
    ModelRoster {
        fast: ModelProfile {
            model: FAST_MODEL.to_string(),
            max_tokens: 256,
        },
        accurate: ModelProfile {
            model: ACCURATE_MODEL.to_string(),
            max_tokens: 512,
        },
    }
}

pub fn executor(backend: Arc<ScriptedBackend>) -> Executor {
    Executor::new(backend, roster())
}

/// Planner whose search tool has no key, so it never touches the network.
pub fn planner(backend: Arc<ScriptedBackend>) -> TripPlanner {
    TripPlanner::new(executor(backend), WebSearchTool::new(None))
}

pub fn text_reply(content: &str) -> Value {
    json!({
        "choices": [{
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
    })
}

pub fn tool_call_reply(id: &str, name: &str, arguments: Value) -> Value {
    json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": id,
                    "type": "function",
                    "function": {"name": name, "arguments": arguments.to_string()}
                }]
            },
            "finish_reason": "tool_calls"
        }]
    })
}

pub fn add_items_text() -> String {
    format!(
        "Here is your themed day!\n```json\n{}\n```",
        json!({
            "action": "add_items",
            "replacementStrategy": "replace",
            "items": [{
                "title": "Sunset Kayak",
                "description": "Paddle through the mangroves",
                "day": 1,
                "duration": 90,
                "location": "Havelock Island",
                "startTime": "17:00",
                "endTime": "18:30"
            }]
        })
    )
}

pub fn smart_schedule_text() -> String {
    json!({
        "action": "smart_schedule",
        "isOptions": true,
        "newItems": [{
            "title": "Sushi Zen",
            "description": "Omakase counter",
            "day": 2,
            "duration": 75,
            "location": "Old Town",
            "startTime": "19:00",
            "endTime": "20:15"
        }],
        "itemsToRemove": ["Dinner"],
        "reschedule": []
    })
    .to_string()
}

pub fn remove_items_text() -> String {
    json!({"action": "remove_items", "items": [{"title": "Breakfast", "day": 2}]}).to_string()
}
