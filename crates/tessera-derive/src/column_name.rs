use syn::{Error, LitStr, Result};

/// Read a column override like `#[tessera(column = "email_address")]`.
///
/// The name is used verbatim in the generated column list; only an empty
/// name is rejected.
pub(crate) fn parse_column_name(lit: &LitStr) -> Result<String> {
    let name = lit.value();
    if name.trim().is_empty() {
        return Err(Error::new(lit.span(), "column must not be empty"));
    }
    Ok(name)
}
