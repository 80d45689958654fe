//! Parsing of native type names as reported by source catalogs.
//!
//! Type names arrive in many shapes: `int4`, `varchar(255)`,
//! `numeric(10, 2)`, `int(11) unsigned zerofill`, `timestamp(3) with time zone`,
//! `text[]`. [`NativeType::parse`] splits them into a lowercase base name, the
//! original parameter text, the unsigned flag, and the array depth.

/// A native type name split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeType {
    /// Lowercase base name with single spaces (`timestamp with time zone`).
    pub base: String,
    /// Parameter text between the parentheses, as written.
    pub params: Option<String>,
    /// `UNSIGNED` modifier present.
    pub unsigned: bool,
    /// Number of trailing `[]`.
    pub array_dims: usize,
}

impl NativeType {
    pub fn parse(raw: &str) -> Self {
        let mut text = raw.trim();

        let mut array_dims = 0;
        while let Some(stripped) = text.strip_suffix("[]") {
            text = stripped.trim_end();
            array_dims += 1;
        }

        let (before, params, after) = match (text.find('('), text.rfind(')')) {
            (Some(open), Some(close)) if close > open => (
                &text[..open],
                Some(text[open + 1..close].trim().to_string()),
                &text[close + 1..],
            ),
            _ => (text, None, ""),
        };

        let mut unsigned = false;
        let words: Vec<String> = before
            .split_whitespace()
            .chain(after.split_whitespace())
            .map(str::to_lowercase)
            .filter(|w| match w.as_str() {
                "unsigned" => {
                    unsigned = true;
                    false
                }
                "signed" | "zerofill" => false,
                _ => true,
            })
            .collect();

        Self {
            base: words.join(" "),
            params: params.filter(|p| !p.is_empty()),
            unsigned,
            array_dims,
        }
    }

    /// `target(params)` when parameters are present, `target(length)` when only a
    /// separate length is known, plain `target` otherwise.
    pub fn with_params(&self, target: &str, length_param: Option<u32>) -> String {
        match (&self.params, length_param) {
            (Some(p), _) if p.eq_ignore_ascii_case("max") => target.to_string(),
            (Some(p), _) => format!("{}({})", target, p),
            (None, Some(n)) if n > 0 => format!("{}({})", target, n),
            _ => target.to_string(),
        }
    }

    /// Append `[]` once per array dimension.
    pub fn wrap_array(&self, element: String) -> String {
        let mut out = element;
        for _ in 0..self.array_dims {
            out.push_str("[]");
        }
        out
    }
}
