pub mod classifier;
pub mod dispatcher;

pub use classifier::{classify_by_keywords, parse_intent_token, IntentClassifier};
pub use dispatcher::TripPlanner;
