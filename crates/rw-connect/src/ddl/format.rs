//! `FORMAT ... ENCODE ...` clauses.

use std::fmt::Display;

use crate::core::identifier::quote_literal;

use super::with_options::INDENT;

/// `FORMAT <fmt> ENCODE <enc> (<params>) KEY ENCODE <key>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatClause {
    format: String,
    encode: String,
    params: Vec<(String, String)>,
    key_encode: Option<String>,
}

impl FormatClause {
    pub fn new(format: &str, encode: &str) -> Self {
        Self {
            format: format.to_uppercase(),
            encode: encode.to_uppercase(),
            params: Vec::new(),
            key_encode: None,
        }
    }

    /// Add an encode parameter when a non-empty value is present.
    pub fn param<V: Display>(mut self, key: &str, value: Option<V>) -> Self {
        if let Some(value) = value {
            let value = value.to_string();
            if !value.is_empty() {
                self.params.push((key.to_string(), value));
            }
        }
        self
    }

    pub fn key_encode(mut self, key_encode: Option<&str>) -> Self {
        self.key_encode = key_encode
            .filter(|k| !k.is_empty())
            .map(str::to_uppercase);
        self
    }

    pub fn render(&self) -> String {
        let mut out = format!("FORMAT {} ENCODE {}", self.format, self.encode);
        if !self.params.is_empty() {
            let body = self
                .params
                .iter()
                .map(|(k, v)| format!("{}{} = {}", INDENT, k, quote_literal(v)))
                .collect::<Vec<_>>()
                .join(",\n");
            out.push_str(&format!(" (\n{}\n)", body));
        }
        if let Some(key) = &self.key_encode {
            out.push_str(&format!(" KEY ENCODE {}", key));
        }
        out
    }
}
