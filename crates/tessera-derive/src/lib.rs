//! Derive macros for tessera
//!
//! Provides `#[derive(Record)]` and `#[derive(Insertable)]`.

use proc_macro::TokenStream;
use syn::punctuated::Punctuated;
use syn::{Data, DeriveInput, Field, Fields, Token, parse_macro_input};

mod attrs;
mod column_name;
mod insertable;
mod record;

/// Derive `Record` so a struct can receive selected rows.
///
/// Fields are scanned in declaration order. A field marked `nested` is itself
/// a `Record` and is expanded into its own fields in place.
///
/// # Example
///
/// ```ignore
/// use tessera::Record;
///
/// #[derive(Default, Record)]
/// struct Post {
///     id: i64,
///     title: String,
///     #[tessera(nested)]
///     author: Author,
/// }
/// ```
///
/// # Attributes
///
/// - `#[tessera(nested)]` - Expand the field as a nested record
/// - `#[tessera(column = "name")]` - Accepted so one struct can derive both
///   `Record` and `Insertable`; scanning is positional
#[proc_macro_derive(Record, attributes(tessera))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Derive `Insertable` so a struct can be written as one row.
///
/// # Example
///
/// ```ignore
/// use tessera::Insertable;
///
/// #[derive(Insertable)]
/// #[tessera(rename_all = "snake_case")]
/// struct NewUser {
///     user_name: String,
///     #[tessera(column = "email_address")]
///     email: Option<String>,
/// }
/// ```
///
/// # Attributes
///
/// - `#[tessera(rename_all = "...")]` - Rename every column: `snake_case`,
///   `camelCase`, `PascalCase` or `SCREAMING_SNAKE_CASE`
/// - `#[tessera(column = "name")]` - Map field to a different column name
///   (takes precedence over `rename_all`)
#[proc_macro_derive(Insertable, attributes(tessera))]
pub fn derive_insertable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    insertable::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn named_fields<'a>(
    input: &'a DeriveInput,
    derive: &str,
) -> syn::Result<&'a Punctuated<Field, Token![,]>> {
    match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => Ok(&fields.named),
            _ => Err(syn::Error::new_spanned(
                input,
                format!("{derive} can only be derived for structs with named fields"),
            )),
        },
        _ => Err(syn::Error::new_spanned(
            input,
            format!("{derive} can only be derived for structs"),
        )),
    }
}
