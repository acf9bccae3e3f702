use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{parse_macro_input, spanned::Spanned, ItemStruct, LitStr};

use crate::schema_extraction::{collect_doc_comments, ensure_named_struct, parse_action_schema_args};

pub fn action_schema(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = match parse_action_schema_args(attr) {
        Ok(args) => args,
        Err(err) => return err.to_compile_error().into(),
    };

    let item_struct = parse_macro_input!(item as ItemStruct);

    if let Err(err) = ensure_named_struct(&item_struct) {
        return err.to_compile_error().into();
    }

    if !item_struct.generics.params.is_empty() {
        return syn::Error::new(
            item_struct.generics.span(),
            "`#[action_schema]` does not support generic structs",
        )
        .to_compile_error()
        .into();
    }

    let Some(action) = args.action else {
        return syn::Error::new(
            Span::call_site(),
            "`#[action_schema]` requires an `action = \"...\"` argument",
        )
        .to_compile_error()
        .into();
    };

    let collection_tokens = args
        .collection
        .as_ref()
        .map(|lit| quote! { Some(#lit) })
        .unwrap_or_else(|| quote! { None });

    let description_tokens = collect_doc_comments(&item_struct.attrs)
        .map(|text| {
            let lit = LitStr::new(&text, Span::call_site());
            quote! { Some(#lit) }
        })
        .unwrap_or_else(|| quote! { None });

    let type_name = LitStr::new(&item_struct.ident.to_string(), Span::call_site());
    let ident = &item_struct.ident;

    let expanded = quote! {
        #item_struct

        impl wego_agent_rs::schemas::ActionSchema for #ident {
            const ACTION: &'static str = #action;
            const COLLECTION: Option<&'static str> = #collection_tokens;

            fn schema() -> &'static wego_agent_rs::schemas::SchemaHandle {
                static HANDLE: std::sync::OnceLock<wego_agent_rs::schemas::SchemaHandle> =
                    std::sync::OnceLock::new();
                HANDLE.get_or_init(|| {
                    let mut root = schemars::schema_for!(Self);
                    wego_agent_rs::schemas::apply_action_metadata(
                        &mut root,
                        #action,
                        #description_tokens,
                    );
                    wego_agent_rs::schemas::SchemaHandle::from_root_schema::<Self>(
                        #action,
                        #type_name,
                        root,
                    )
                })
            }
        }
    };

    expanded.into()
}
