use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Everything the caller knows about a trip. Read-only for the planner.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TripContext {
    pub settings: TripSettings,
    pub preferences: Preferences,
    pub itinerary: Vec<ItineraryItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TripSettings {
    pub destination: Option<String>,
    pub days_count: Option<u32>,
    pub nights_count: Option<u32>,
    pub group_size: Option<u32>,
    pub age_group: Option<String>,
    pub landing_time: Option<String>,
    pub departure_time: Option<String>,
    pub hotel: Option<String>,
    pub airport: Option<String>,
}

/// Persistent group preferences, also the body of an `update_preferences` action.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    /// Dietary needs, e.g. "Vegan"
    pub dietary: Vec<String>,
    /// Activity interests, e.g. "Hiking"
    pub interests: Vec<String>,
    /// Hard constraints, e.g. "No stairs"
    pub constraints: Vec<String>,
    /// Budget level, e.g. "Medium"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
}

/// An item already on the trip's itinerary.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ItineraryItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub day: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// One line of the group chat.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    #[serde(default = "default_sender")]
    pub sender_name: String,
    #[serde(default)]
    pub content: String,
}

fn default_sender() -> String {
    "User".to_string()
}

impl ChatMessage {
    pub fn new(sender_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            sender_name: sender_name.into(),
            content: content.into(),
        }
    }
}
