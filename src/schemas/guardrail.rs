//! Output checks for tasks that must end in a JSON instruction block.
//!
//! A [`Guardrail`] looks for the first brace-delimited object in the model's
//! text, checks its `action` tag and the required fields of every entry, then
//! validates the whole object against the action's derived schema. A failed
//! check yields a corrective message that is fed back to the model.

use serde_json::{Map, Value};
use tracing::debug;

use super::{validation::validate_against_schema, ActionSchema, SchemaHandle};
use crate::types::actions::{AddItems, RemoveItems, SmartSchedule, UpdateItems, UpdatePreferences};

/// Upper bound on model invocations for one guarded task.
pub const MAX_GUARDRAIL_ATTEMPTS: usize = 3;

const PLANNED_ITEM_FIELDS: &[&str] = &["title", "description", "day", "duration", "location"];
const ITEM_REF_FIELDS: &[&str] = &["title", "day"];
const ITEM_UPDATE_FIELDS: &[&str] = &["originalTitle", "day"];
const PREFERENCES_FIELDS: &[&str] = &["preferences"];

#[derive(Debug, Clone, PartialEq)]
pub enum GuardrailVerdict {
    Accepted(Value),
    Rejected(String),
}

impl GuardrailVerdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, GuardrailVerdict::Accepted(_))
    }
}

#[derive(Debug, Clone)]
pub struct Guardrail {
    action: &'static str,
    collection: Option<&'static str>,
    required: &'static [&'static str],
    schema: SchemaHandle,
}

impl Guardrail {
    /// Build a guardrail for a payload type. `required` names the fields each
    /// collection entry must carry, or the top-level fields when the action
    /// has no collection.
    pub fn for_schema<T: ActionSchema>(required: &'static [&'static str]) -> Self {
        Self {
            action: T::ACTION,
            collection: T::COLLECTION,
            required,
            schema: T::schema().clone(),
        }
    }

    pub fn add_items() -> Self {
        Self::for_schema::<AddItems>(PLANNED_ITEM_FIELDS)
    }

    pub fn remove_items() -> Self {
        Self::for_schema::<RemoveItems>(ITEM_REF_FIELDS)
    }

    pub fn update_items() -> Self {
        Self::for_schema::<UpdateItems>(ITEM_UPDATE_FIELDS)
    }

    pub fn smart_schedule() -> Self {
        Self::for_schema::<SmartSchedule>(PLANNED_ITEM_FIELDS)
    }

    pub fn update_preferences() -> Self {
        Self::for_schema::<UpdatePreferences>(PREFERENCES_FIELDS)
    }

    pub fn action(&self) -> &'static str {
        self.action
    }

    pub fn collection(&self) -> Option<&'static str> {
        self.collection
    }

    pub fn required_fields(&self) -> &'static [&'static str] {
        self.required
    }

    pub fn schema(&self) -> &SchemaHandle {
        &self.schema
    }

    /// Check raw model output.
    pub fn check(&self, raw: &str) -> GuardrailVerdict {
        let verdict = self.evaluate(raw);
        if let GuardrailVerdict::Rejected(reason) = &verdict {
            debug!(target: "wego::guardrail", action = self.action, "rejected: {}", reason);
        }
        verdict
    }

    fn evaluate(&self, raw: &str) -> GuardrailVerdict {
        let Some(block) = extract_json_block(raw) else {
            return self.reject("Your response did not contain a JSON object.");
        };

        let value: Value = match serde_json::from_str(block) {
            Ok(value) => value,
            Err(err) => {
                return self.reject(&format!("The JSON block could not be parsed ({err})."));
            }
        };

        let Some(object) = value.as_object() else {
            return self.reject("The JSON block must be an object.");
        };

        match object.get("action") {
            Some(Value::String(found)) if found == self.action => {}
            Some(found) => {
                return self.reject(&format!(
                    "Expected \"action\": \"{}\" but found {}.",
                    self.action, found
                ));
            }
            None => return self.reject("The JSON object is missing the \"action\" field."),
        }

        if let Err(problem) = self.check_required(object) {
            return self.reject(&problem);
        }

        if let Err(err) = validate_against_schema(&self.schema, &value) {
            return self.reject(&err.to_string());
        }

        GuardrailVerdict::Accepted(value)
    }

    fn check_required(&self, object: &Map<String, Value>) -> Result<(), String> {
        let Some(collection) = self.collection else {
            let missing = missing_fields(object, self.required);
            if missing.is_empty() {
                return Ok(());
            }
            return Err(format!(
                "The JSON object is missing required field(s): {}.",
                missing.join(", ")
            ));
        };

        let entries = match object.get(collection) {
            Some(Value::Array(entries)) if !entries.is_empty() => entries,
            Some(Value::Array(_)) => {
                return Err(format!("\"{collection}\" must contain at least one entry."));
            }
            Some(_) => return Err(format!("\"{collection}\" must be an array.")),
            None => return Err(format!("The JSON object is missing \"{collection}\".")),
        };

        for (idx, entry) in entries.iter().enumerate() {
            let Some(entry) = entry.as_object() else {
                return Err(format!("Entry {idx} in \"{collection}\" must be an object."));
            };
            let missing = missing_fields(entry, self.required);
            if !missing.is_empty() {
                return Err(format!(
                    "Entry {idx} in \"{collection}\" is missing required field(s): {}. Every entry needs: {}.",
                    missing.join(", "),
                    self.required.join(", ")
                ));
            }
        }

        Ok(())
    }

    fn reject(&self, problem: &str) -> GuardrailVerdict {
        GuardrailVerdict::Rejected(format!(
            "{problem} Respond again with exactly one JSON object whose \"action\" is \"{}\"{}. Do not add any other text.",
            self.action,
            self.required_hint()
        ))
    }

    fn required_hint(&self) -> String {
        match self.collection {
            Some(collection) => format!(
                " and whose \"{collection}\" array has entries with: {}",
                self.required.join(", ")
            ),
            None => format!(" and that includes: {}", self.required.join(", ")),
        }
    }
}

fn missing_fields<'a>(object: &Map<String, Value>, required: &[&'a str]) -> Vec<&'a str> {
    required
        .iter()
        .copied()
        .filter(|field| object.get(*field).map_or(true, Value::is_null))
        .collect()
}

/// Return the first brace-delimited object in `text`.
///
/// Braces inside JSON strings are ignored. When the braces never balance the
/// span from the first `{` to the last `}` is returned instead.
pub fn extract_json_block(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    if let Some(len) = balanced_len(&text[start..]) {
        return Some(&text[start..start + len]);
    }
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Every balanced top-level object in `text`, in order.
pub fn json_blocks(text: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut cursor = 0;

    while let Some(offset) = text[cursor..].find('{') {
        let start = cursor + offset;
        match balanced_len(&text[start..]) {
            Some(len) => {
                blocks.push(&text[start..start + len]);
                cursor = start + len;
            }
            None => break,
        }
    }

    blocks
}

fn balanced_len(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(idx + 1);
                }
            }
            _ => {}
        }
    }

    None
}
