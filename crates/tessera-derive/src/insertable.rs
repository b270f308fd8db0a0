//! Insertable derive macro implementation

use proc_macro2::TokenStream;
use quote::quote;
use std::collections::HashSet;
use syn::{DeriveInput, Error, Result};

use crate::attrs::{FieldAttrs, StructAttrs};
use crate::named_fields;

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let struct_attrs = StructAttrs::parse(&input.attrs)?;
    let fields = named_fields(&input, "Insertable")?;

    let mut columns = Vec::with_capacity(fields.len());
    let mut values = Vec::with_capacity(fields.len());
    let mut seen = HashSet::new();

    for field in fields {
        let attrs = FieldAttrs::parse(field)?;
        if let Some(span) = attrs.nested {
            return Err(Error::new(
                span,
                "Insertable writes one flat row; nested fields are not supported",
            ));
        }

        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let column = attrs.column_name(ident, struct_attrs.rename_all);
        if !seen.insert(column.clone()) {
            return Err(Error::new_spanned(
                field,
                format!("duplicate column '{column}'"),
            ));
        }

        columns.push(column);
        values.push(quote! { tessera::ToValue::to_value(&self.#ident) });
    }

    Ok(quote! {
        impl #impl_generics tessera::Insertable for #name #ty_generics #where_clause {
            const COLUMNS: &'static [&'static str] = &[#(#columns),*];

            fn values(&self) -> ::std::vec::Vec<tessera::Value> {
                ::std::vec![#(#values),*]
            }
        }
    })
}
