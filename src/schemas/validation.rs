use crate::{error::AgentError, schemas::SchemaHandle};
use jsonschema::{Draft, JSONSchema};
use serde_json::Value;

const MAX_SCHEMA_ERRORS: usize = 3;

/// Validate an extracted action block against its derived schema
pub(crate) fn validate_against_schema(
    schema: &SchemaHandle,
    payload: &Value,
) -> std::result::Result<(), AgentError> {
    let validator = JSONSchema::options()
        .with_draft(Draft::Draft7)
        .compile(schema.schema_json())
        .map_err(|err| {
            AgentError::Validation(format!(
                "Failed to prepare `{}` schema for validation: {}",
                schema.action(),
                err
            ))
        })?;

    if let Err(errors) = validator.validate(payload) {
        let mut details = Vec::new();
        let mut truncated = false;

        for (idx, error) in errors.enumerate() {
            if idx < MAX_SCHEMA_ERRORS {
                let mut path = error.instance_path.to_string();
                if path.is_empty() {
                    path = "<root>".to_string();
                }
                details.push(format!("{}: {}", path, error));
            } else {
                truncated = true;
                break;
            }
        }

        let mut detail_str = if details.is_empty() {
            "payload failed schema validation".to_string()
        } else {
            details.join("; ")
        };

        if truncated {
            detail_str.push_str("; additional errors truncated");
        }

        return Err(AgentError::Validation(format!(
            "JSON does not match the `{}` schema: {}",
            schema.action(),
            detail_str
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{schemas::ActionSchema, types::actions::UpdateItems};
    use serde_json::json;

    #[test]
    fn test_valid_payload_passes() {
        let payload = json!({
            "action": "update_items",
            "updates": [{"originalTitle": "Dinner", "day": 2, "newStartTime": "20:00"}]
        });
        assert!(validate_against_schema(UpdateItems::schema(), &payload).is_ok());
    }

    #[test]
    fn test_errors_are_capped() {
        let payload = json!({
            "action": "update_items",
            "updates": [
                {"originalTitle": 1, "day": 0},
                {"originalTitle": 2, "day": "x"},
                {"originalTitle": 3, "day": -1}
            ]
        });
        let err = validate_against_schema(UpdateItems::schema(), &payload).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("update_items"));
        assert!(message.contains("additional errors truncated"));
    }
}
