//! JSON instruction blocks the model appends to its reply.
//!
//! Each payload struct is the body of one `action` variant. The `action`
//! tag itself is added to the derived schema by `#[action_schema]`, so the
//! structs only describe the remaining fields.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use wego_macros::action_schema;

use crate::{
    error::{AgentError, Result},
    schemas::{extract_json_block, json_blocks, ActionSchema},
    types::trip::Preferences,
};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReplacementStrategy {
    #[default]
    Replace,
    Append,
}

/// A new itinerary entry proposed by the model.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlannedItem {
    pub title: String,
    pub description: String,
    /// 1-based trip day
    #[schemars(range(min = 1))]
    pub day: u32,
    /// Length in minutes
    pub duration: u32,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
}

/// Add items to the itinerary, replacing or appending to existing suggestions.
#[action_schema(action = "add_items", collection = "items")]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AddItems {
    #[serde(default)]
    pub replacement_strategy: ReplacementStrategy,
    /// Items are mutually exclusive options the group votes on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_options: Option<bool>,
    pub items: Vec<PlannedItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItemRef {
    /// Exact title as it appears on the itinerary
    pub title: String,
    #[schemars(range(min = 1))]
    pub day: u32,
}

/// Remove existing itinerary items.
#[action_schema(action = "remove_items", collection = "items")]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RemoveItems {
    pub items: Vec<ItemRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItemUpdate {
    /// Exact or partial title of the item to change
    pub original_title: String,
    #[schemars(range(min = 1))]
    pub day: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_title: Option<String>,
    /// 24-hour HH:MM
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_start_time: Option<String>,
    /// 24-hour HH:MM
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(range(min = 1))]
    pub new_day: Option<u32>,
}

/// Move, reschedule or rename existing itinerary items.
#[action_schema(action = "update_items", collection = "updates")]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItems {
    pub updates: Vec<ItemUpdate>,
}

/// Existing item shifted to make room for new ones.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleEntry {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_duration: Option<u32>,
}

/// Slot new items into the schedule, optionally dropping or shifting existing ones.
#[action_schema(action = "smart_schedule", collection = "newItems")]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SmartSchedule {
    #[serde(default)]
    pub is_options: bool,
    pub new_items: Vec<PlannedItem>,
    /// Titles of generic items the new ones replace
    #[serde(default)]
    pub items_to_remove: Vec<String>,
    #[serde(default)]
    pub reschedule: Vec<RescheduleEntry>,
}

/// Merge newly discovered group preferences.
#[action_schema(action = "update_preferences")]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePreferences {
    pub preferences: Preferences,
}

/// Any instruction block, discriminated by its `action` field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ActionPayload {
    AddItems(AddItems),
    RemoveItems(RemoveItems),
    UpdateItems(UpdateItems),
    SmartSchedule(SmartSchedule),
    UpdatePreferences(UpdatePreferences),
}

impl ActionPayload {
    pub fn action(&self) -> &'static str {
        match self {
            ActionPayload::AddItems(_) => "add_items",
            ActionPayload::RemoveItems(_) => "remove_items",
            ActionPayload::UpdateItems(_) => "update_items",
            ActionPayload::SmartSchedule(_) => "smart_schedule",
            ActionPayload::UpdatePreferences(_) => "update_preferences",
        }
    }

    /// Decode a JSON value, reporting the failing field path.
    pub fn from_value(value: Value) -> Result<Self> {
        let action = value
            .get("action")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                AgentError::Validation("action payload is missing the `action` tag".to_string())
            })?
            .to_string();

        match action.as_str() {
            "add_items" => decode(value).map(ActionPayload::AddItems),
            "remove_items" => decode(value).map(ActionPayload::RemoveItems),
            "update_items" => decode(value).map(ActionPayload::UpdateItems),
            "smart_schedule" => decode(value).map(ActionPayload::SmartSchedule),
            "update_preferences" => decode(value).map(ActionPayload::UpdatePreferences),
            other => Err(AgentError::Validation(format!(
                "unknown action `{other}`"
            ))),
        }
    }

    /// Decode the first JSON block embedded in model output.
    pub fn extract(text: &str) -> Result<Self> {
        let block = extract_json_block(text).ok_or_else(|| {
            AgentError::Validation("no JSON object found in model output".to_string())
        })?;
        let value: Value = serde_json::from_str(block)?;
        Self::from_value(value)
    }

    /// Decode every JSON block that parses as a known action, in order.
    pub fn extract_all(text: &str) -> Vec<Self> {
        json_blocks(text)
            .into_iter()
            .filter_map(|block| serde_json::from_str::<Value>(block).ok())
            .filter_map(|value| Self::from_value(value).ok())
            .collect()
    }
}

fn decode<T: ActionSchema>(value: Value) -> Result<T> {
    serde_path_to_error::deserialize(value).map_err(|err| {
        let path = err.path().to_string();
        let location = if path.is_empty() || path == "." {
            "<root>".to_string()
        } else {
            path
        };
        AgentError::Validation(format!(
            "failed to deserialize `{}` at {}: {}",
            T::ACTION,
            location,
            err.inner()
        ))
    })
}
