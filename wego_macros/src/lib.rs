mod action_schema;
mod schema_extraction;

use proc_macro::TokenStream;

/// Marks a payload struct as the body of one `action` variant.
///
/// Generates an `ActionSchema` impl that carries the action name, the name
/// of the per-entry collection (if any) and a cached JSON Schema derived with
/// `schemars`. The struct must also derive `schemars::JsonSchema`.
///
/// ```ignore
/// #[action_schema(action = "remove_items", collection = "items")]
/// #[derive(Deserialize, JsonSchema)]
/// pub struct RemoveItems { pub items: Vec<ItemRef> }
/// ```
#[proc_macro_attribute]
pub fn action_schema(attr: TokenStream, item: TokenStream) -> TokenStream {
    action_schema::action_schema(attr, item)
}
