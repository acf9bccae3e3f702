use schemars::schema::{InstanceType, RootSchema, Schema, SchemaObject};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::{
    any::{type_name, TypeId},
    sync::Arc,
};

/// Cached JSON schema handle associated with an action payload type.
#[derive(Clone, Debug)]
pub struct SchemaHandle {
    action: &'static str,
    type_name: &'static str,
    type_id: TypeId,
    schema_json: Arc<Value>,
}

impl SchemaHandle {
    pub fn from_root_schema<T: 'static>(
        action: &'static str,
        type_name: &'static str,
        root: RootSchema,
    ) -> Self {
        let schema_json = serde_json::to_value(root)
            .unwrap_or_else(|err| panic!("failed to serialize schema for {}: {}", type_name, err));

        Self {
            action,
            type_name,
            type_id: TypeId::of::<T>(),
            schema_json: Arc::new(schema_json),
        }
    }

    /// Value of the `action` tag this schema describes.
    pub fn action(&self) -> &'static str {
        self.action
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn schema_json(&self) -> &Value {
        self.schema_json.as_ref()
    }
}

/// Implemented by `#[action_schema]` for every instruction block the model can emit.
pub trait ActionSchema: DeserializeOwned + Send + Sync + 'static {
    /// Expected value of the `action` field.
    const ACTION: &'static str;
    /// Array field holding the per-entry objects, if the action has one.
    const COLLECTION: Option<&'static str>;

    fn schema() -> &'static SchemaHandle;
}

/// Add the `action` tag and doc metadata to a derived payload schema.
///
/// The payload structs omit the tag (serde consumes it when decoding
/// `ActionPayload`), so it is injected here as a required constant.
pub fn apply_action_metadata(
    root: &mut RootSchema,
    action: &'static str,
    description: Option<&'static str>,
) {
    let schema_object = &mut root.schema;

    let metadata = schema_object.metadata();
    metadata.title = Some(action.to_string());
    if let Some(description) = description {
        if metadata.description.is_none() {
            metadata.description = Some(description.to_string());
        }
    }

    let tag = SchemaObject {
        instance_type: Some(InstanceType::String.into()),
        const_value: Some(Value::String(action.to_string())),
        ..Default::default()
    };

    let object_validation = schema_object.object();
    object_validation
        .properties
        .insert("action".to_string(), Schema::Object(tag));
    object_validation.required.insert("action".to_string());
}

/// Helper so callers can retrieve the Rust type name of a schema provider.
pub fn schema_type_name<T>() -> &'static str {
    type_name::<T>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::actions::{RemoveItems, UpdatePreferences};

    #[test]
    fn test_handle_is_cached() {
        let first = RemoveItems::schema() as *const SchemaHandle;
        let second = RemoveItems::schema() as *const SchemaHandle;
        assert_eq!(first, second);
        assert_eq!(RemoveItems::schema().type_id(), TypeId::of::<RemoveItems>());
        assert_eq!(RemoveItems::schema().type_name(), "RemoveItems");
    }

    #[test]
    fn test_metadata_applied() {
        let schema = UpdatePreferences::schema().schema_json();
        assert_eq!(schema["title"], "update_preferences");
        assert_eq!(schema["description"], "Merge newly discovered group preferences.");
        assert_eq!(UpdatePreferences::COLLECTION, None);
    }

    #[test]
    fn test_schema_type_name() {
        assert!(schema_type_name::<RemoveItems>().ends_with("RemoveItems"));
    }
}
