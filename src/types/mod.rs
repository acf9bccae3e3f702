pub mod actions;
pub mod intent;
pub mod request;
pub mod result;
pub mod trip;

pub use actions::{
    ActionPayload, AddItems, ItemRef, ItemUpdate, PlannedItem, RemoveItems, ReplacementStrategy,
    RescheduleEntry, SmartSchedule, UpdateItems, UpdatePreferences,
};
pub use intent::Intent;
pub use request::{SuggestRequest, SuggestResponse};
pub use result::{TaskOutput, TokenUsage};
pub use trip::{ChatMessage, ItineraryItem, Preferences, TripContext, TripSettings};
