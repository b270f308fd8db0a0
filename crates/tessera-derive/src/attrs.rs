//! `#[tessera(...)]` attribute parsing shared by both derives.

use heck::{ToLowerCamelCase, ToShoutySnakeCase, ToSnakeCase, ToUpperCamelCase};
use syn::ext::IdentExt;
use syn::parse::{Parse, ParseStream};
use syn::{Attribute, Error, Field, LitStr, Result, Token};

use crate::column_name::parse_column_name;

#[derive(Clone, Copy)]
pub(crate) enum RenameRule {
    Snake,
    LowerCamel,
    UpperCamel,
    ScreamingSnake,
}

impl RenameRule {
    fn parse(lit: &LitStr) -> Result<Self> {
        match lit.value().as_str() {
            "snake_case" => Ok(Self::Snake),
            "camelCase" => Ok(Self::LowerCamel),
            "PascalCase" => Ok(Self::UpperCamel),
            "SCREAMING_SNAKE_CASE" => Ok(Self::ScreamingSnake),
            other => Err(Error::new(
                lit.span(),
                format!(
                    "unknown rename_all rule '{other}' (expected snake_case, camelCase, \
                     PascalCase or SCREAMING_SNAKE_CASE)"
                ),
            )),
        }
    }

    pub(crate) fn apply(self, name: &str) -> String {
        match self {
            Self::Snake => name.to_snake_case(),
            Self::LowerCamel => name.to_lower_camel_case(),
            Self::UpperCamel => name.to_upper_camel_case(),
            Self::ScreamingSnake => name.to_shouty_snake_case(),
        }
    }
}

/// One `key` or `key = "value"` entry.
struct Entry {
    key: syn::Ident,
    value: Option<LitStr>,
}

struct EntryList(Vec<Entry>);

impl Parse for EntryList {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut entries = Vec::new();
        loop {
            if input.is_empty() {
                break;
            }

            let key: syn::Ident = input.parse()?;
            if input.peek(syn::token::Paren) {
                return Err(Error::new(key.span(), "unexpected function-style attribute"));
            }

            let value = if input.peek(Token![=]) {
                let _: Token![=] = input.parse()?;
                Some(input.parse::<LitStr>()?)
            } else {
                None
            };
            entries.push(Entry { key, value });

            if input.is_empty() {
                break;
            }
            let _: Token![,] = input.parse()?;
        }
        Ok(Self(entries))
    }
}

fn entries(attrs: &[Attribute]) -> Result<Vec<Entry>> {
    let mut out = Vec::new();
    for attr in attrs {
        if attr.path().is_ident("tessera") {
            out.extend(attr.parse_args::<EntryList>()?.0);
        }
    }
    Ok(out)
}

fn require_value<'a>(entry: &'a Entry) -> Result<&'a LitStr> {
    entry.value.as_ref().ok_or_else(|| {
        Error::new(
            entry.key.span(),
            format!("`{}` expects a string value", entry.key),
        )
    })
}

fn reject_value(entry: &Entry) -> Result<()> {
    match &entry.value {
        Some(lit) => Err(Error::new(
            lit.span(),
            format!("`{}` does not take a value", entry.key),
        )),
        None => Ok(()),
    }
}

#[derive(Default)]
pub(crate) struct StructAttrs {
    pub(crate) rename_all: Option<RenameRule>,
}

impl StructAttrs {
    pub(crate) fn parse(attrs: &[Attribute]) -> Result<Self> {
        let mut out = Self::default();
        for entry in entries(attrs)? {
            match entry.key.to_string().as_str() {
                "rename_all" => out.rename_all = Some(RenameRule::parse(require_value(&entry)?)?),
                other => {
                    return Err(Error::new(
                        entry.key.span(),
                        format!("unknown struct attribute `{other}`"),
                    ));
                }
            }
        }
        Ok(out)
    }
}

#[derive(Default)]
pub(crate) struct FieldAttrs {
    pub(crate) column: Option<String>,
    pub(crate) nested: Option<proc_macro2::Span>,
}

impl FieldAttrs {
    pub(crate) fn parse(field: &Field) -> Result<Self> {
        let mut out = Self::default();
        for entry in entries(&field.attrs)? {
            match entry.key.to_string().as_str() {
                "column" => out.column = Some(parse_column_name(require_value(&entry)?)?),
                "nested" => {
                    reject_value(&entry)?;
                    out.nested = Some(entry.key.span());
                }
                other => {
                    return Err(Error::new(
                        entry.key.span(),
                        format!("unknown field attribute `{other}`"),
                    ));
                }
            }
        }
        Ok(out)
    }

    /// Column name: the explicit override, else the renamed field name.
    pub(crate) fn column_name(&self, field: &syn::Ident, rule: Option<RenameRule>) -> String {
        if let Some(column) = &self.column {
            return column.clone();
        }
        let name = field.unraw().to_string();
        match rule {
            Some(rule) => rule.apply(&name),
            None => name,
        }
    }
}
