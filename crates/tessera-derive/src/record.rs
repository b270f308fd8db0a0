//! Record derive macro implementation

use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Result};

use crate::attrs::FieldAttrs;
use crate::named_fields;

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let fields = named_fields(&input, "Record")?;

    let mut dests = Vec::with_capacity(fields.len());
    for field in fields {
        let attrs = FieldAttrs::parse(field)?;
        let ident = &field.ident;
        dests.push(if attrs.nested.is_some() {
            quote! { tessera::Dest::record(&mut self.#ident) }
        } else {
            quote! { tessera::Dest::scalar(&mut self.#ident) }
        });
    }

    Ok(quote! {
        impl #impl_generics tessera::Record for #name #ty_generics #where_clause {
            fn fields(&mut self) -> ::std::vec::Vec<tessera::Dest<'_>> {
                ::std::vec![#(#dests),*]
            }
        }
    })
}
