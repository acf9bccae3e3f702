pub mod guardrail;
pub mod schema;
pub(crate) mod validation;

pub use guardrail::{
    extract_json_block, json_blocks, Guardrail, GuardrailVerdict, MAX_GUARDRAIL_ATTEMPTS,
};
pub use schema::{apply_action_metadata, schema_type_name, ActionSchema, SchemaHandle};
