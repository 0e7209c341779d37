extern crate proc_macro;

use proc_macro::TokenStream;
use quote::quote;
use syn::{
    parse::Parse, parse::ParseStream, parse_macro_input, Data, DeriveInput, Ident, LitStr, Result,
    Token,
};

const DEFAULT_RENAME_ALL: &str = "camelCase";
const RENAME_RULES: &[&str] = &[
    "lowercase",
    "UPPERCASE",
    "PascalCase",
    "camelCase",
    "snake_case",
    "SCREAMING_SNAKE_CASE",
    "kebab-case",
    "SCREAMING-KEBAB-CASE",
];

/// Arguments of `#[service_dto]`: nothing, or `rename_all = "<rule>"`.
struct DtoArgs {
    rename_all: Option<LitStr>,
}

impl Parse for DtoArgs {
    fn parse(input: ParseStream) -> Result<Self> {
        if input.is_empty() {
            return Ok(DtoArgs { rename_all: None });
        }
        let key: Ident = input.parse()?;
        if key != "rename_all" {
            return Err(syn::Error::new(key.span(), "expected `rename_all = \"...\"`"));
        }
        input.parse::<Token![=]>()?;
        let rule: LitStr = input.parse()?;
        if !RENAME_RULES.contains(&rule.value().as_str()) {
            return Err(syn::Error::new(
                rule.span(),
                format!("unknown rename rule, expected one of {}", RENAME_RULES.join(", ")),
            ));
        }
        Ok(DtoArgs {
            rename_all: Some(rule),
        })
    }
}

/// Turns a struct or enum into a service DTO.
///
/// Derives `Debug`, `Clone`, `serde::Serialize`, `serde::Deserialize` and
/// `utoipa::ToSchema`, and applies `#[serde(rename_all = "camelCase")]` unless
/// another rule is given:
///
/// ```ignore
/// #[service_dto]
/// pub struct Message { pub user_id: u64 }            // {"userId": ..}
///
/// #[service_dto(rename_all = "snake_case")]
/// pub struct LegacyRecord { pub user_id: u64 }       // {"user_id": ..}
/// ```
#[proc_macro_attribute]
pub fn service_dto(args: TokenStream, input: TokenStream) -> TokenStream {
    let args = parse_macro_input!(args as DtoArgs);
    let item = parse_macro_input!(input as DeriveInput);

    if let Data::Union(union) = &item.data {
        return syn::Error::new(union.union_token.span, "#[service_dto] does not support unions")
            .to_compile_error()
            .into();
    }

    let rename_all = args
        .rename_all
        .map(|rule| rule.value())
        .unwrap_or_else(|| DEFAULT_RENAME_ALL.to_string());

    let output = quote! {
        #[derive(Debug, Clone, ::serde::Serialize, ::serde::Deserialize, ::utoipa::ToSchema)]
        #[serde(rename_all = #rename_all)]
        #item
    };
    output.into()
}
