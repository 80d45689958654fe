//! Identifier validation, identifier quoting, and literal escaping for generated DDL.
//!
//! # Security
//!
//! Every value that ends up inside a `'...'` literal goes through
//! [`quote_literal`], which doubles single quotes. That is the only literal
//! escaping the engine needs. Identifiers (table, column, source and sink
//! names) are emitted bare when they are simple lowercase words and
//! double-quoted otherwise, so user-supplied names can never break out of
//! their position in a statement.

use crate::error::{ConnectError, Result};

/// Maximum identifier length (conservative limit across databases).
/// - PostgreSQL / RisingWave: 63 bytes
/// - SQL Server: 128 characters
/// - MySQL: 64 characters
const MAX_IDENTIFIER_LENGTH: usize = 128;

/// Keywords that must be quoted when used as identifiers.
const RESERVED_WORDS: &[&str] = &[
    "all", "and", "as", "by", "case", "create", "default", "delete", "desc", "distinct", "drop",
    "else", "end", "from", "group", "having", "in", "insert", "into", "is", "join", "key",
    "limit", "not", "null", "offset", "on", "or", "order", "primary", "select", "sink", "source",
    "table", "then", "to", "union", "update", "user", "using", "values", "when", "where", "with",
];

/// Validate an identifier for security issues.
///
/// Rejects:
/// - Empty identifiers
/// - Identifiers containing null bytes (injection vector)
/// - Identifiers exceeding maximum length
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ConnectError::Config(
            "Identifier cannot be empty".to_string(),
        ));
    }

    if name.contains('\0') {
        return Err(ConnectError::Config(format!(
            "SECURITY: Identifier contains null byte (possible injection attempt): {:?}",
            name
        )));
    }

    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(ConnectError::Config(format!(
            "SECURITY: Identifier exceeds maximum length of {} bytes (got {} bytes): {:?}",
            MAX_IDENTIFIER_LENGTH,
            name.len(),
            name
        )));
    }

    Ok(())
}

/// Escape a string literal by doubling single quotes and wrap it in single quotes.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// True when `name` can be emitted without quotes and keeps its case.
fn is_bare_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_ok = matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c == '_');
    starts_ok
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        && !RESERVED_WORDS.contains(&name)
}

/// Quote a RisingWave identifier only when required.
///
/// ```ignore
/// assert_eq!(quote_ident("users")?, "users");
/// assert_eq!(quote_ident("OrderDate")?, "\"OrderDate\"");
/// assert_eq!(quote_ident("a\"b")?, "\"a\"\"b\"");
/// ```
pub fn quote_ident(name: &str) -> Result<String> {
    validate_identifier(name)?;
    if is_bare_identifier(name) {
        Ok(name.to_string())
    } else {
        Ok(format!("\"{}\"", name.replace('"', "\"\"")))
    }
}

/// Quote an optionally schema-qualified object name (`schema.name`), part by part.
pub fn quote_object_name(name: &str) -> Result<String> {
    match name.split_once('.') {
        Some((schema, object)) => Ok(format!("{}.{}", quote_ident(schema)?, quote_ident(object)?)),
        None => quote_ident(name),
    }
}

/// Quote `name` as one identifier, prefixed by `schema` unless the schema is
/// empty or `public`. Dots inside `name` stay part of the identifier.
pub fn quote_qualified(schema: Option<&str>, name: &str) -> Result<String> {
    match schema {
        Some(s) if !s.is_empty() && s != "public" => {
            Ok(format!("{}.{}", quote_ident(s)?, quote_ident(name)?))
        }
        _ => quote_ident(name),
    }
}

/// Qualify `name` with `schema` unless the schema is empty or `public`.
pub fn qualify(schema: Option<&str>, name: &str) -> String {
    match schema {
        Some(s) if !s.is_empty() && s != "public" => format!("{}.{}", s, name),
        _ => name.to_string(),
    }
}

/// Replace characters that cannot appear in generated object names with `_`.
pub fn sanitize_name(raw: &str) -> String {
    raw.chars()
        .map(|c| match c {
            '-' | '.' | ' ' => '_',
            other => other,
        })
        .collect()
}
