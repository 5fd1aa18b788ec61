//! MySQL identifier normalization.
//!
//! [`Normalizer`] decides whether a raw token is already safe to embed
//! (a number, a quoted string, a backtick-quoted identifier or `*`) or is a bare
//! column/table reference that must be quoted.
//!
//! - Safe tokens are returned untouched.
//! - Otherwise the token is split on `.` and only the last segment is quoted:
//!   `u.name` becomes ``u.`name` ``.
//! - A token whose last segment is empty (`""`, `"u."`) is malformed and is
//!   returned unchanged.
//!
//! Normalization is idempotent: `normalize(normalize(x)) == normalize(x)`.
//!
//! # Example
//! ```ignore
//! use myqb::ident::normalize;
//!
//! assert_eq!(normalize("name"), "`name`");
//! assert_eq!(normalize("u.name"), "u.`name`");
//! assert_eq!(normalize("*"), "*");
//! ```

use crate::error::{QbError, QbResult};
use regex::Regex;
use std::sync::OnceLock;

/// Tokens matching this pattern are left untouched by the MySQL normalizer.
///
/// Optional dotted prefix, then one of: number, `'string'`, `"string"`,
/// backtick identifier (optionally dotted), or `*`.
pub const MYSQL_SAFE_PATTERN: &str =
    r#"^([^.,`]+\.)*(-?\d+(\.\d+)?|'[\s\S]*'|"[\s\S]*"|`(?:[^`]|``)+`(\.`(?:[^`]|``)+`)*|\*)$"#;

/// Identifier normalizer: a "leave untouched" pattern plus a quote character.
#[derive(Debug, Clone)]
pub struct Normalizer {
    safe: Regex,
    quote: char,
}

impl Normalizer {
    /// Create a normalizer from a custom "already safe" pattern.
    pub fn new(safe_pattern: &str) -> QbResult<Self> {
        let safe =
            Regex::new(safe_pattern).map_err(|e| QbError::InvalidPattern(e.to_string()))?;
        Ok(Self { safe, quote: '`' })
    }

    /// The process-wide MySQL normalizer (compiled once).
    pub fn mysql() -> &'static Normalizer {
        static MYSQL: OnceLock<Normalizer> = OnceLock::new();
        MYSQL.get_or_init(|| {
            Normalizer::new(MYSQL_SAFE_PATTERN).expect("invalid built-in identifier pattern")
        })
    }

    /// Use a different quote character (e.g. `"` for ANSI-style identifiers).
    pub fn with_quote(mut self, quote: char) -> Self {
        self.quote = quote;
        self
    }

    /// Whether the token is left untouched.
    pub fn is_safe(&self, token: &str) -> bool {
        self.safe.is_match(token)
    }

    /// Normalize a raw field/column token.
    pub fn normalize(&self, token: &str) -> String {
        if self.is_safe(token) {
            return token.to_string();
        }
        let (prefix, last) = match token.rfind('.') {
            Some(pos) => (&token[..=pos], &token[pos + 1..]),
            None => ("", token),
        };
        if last.is_empty() {
            return token.to_string();
        }
        let mut out = String::with_capacity(token.len() + 2);
        out.push_str(prefix);
        self.write_quoted(last, &mut out);
        out
    }

    /// Quote a single name unconditionally, doubling embedded quote characters.
    pub fn quote(&self, name: &str) -> String {
        let mut out = String::with_capacity(name.len() + 2);
        self.write_quoted(name, &mut out);
        out
    }

    fn write_quoted(&self, name: &str, out: &mut String) {
        out.push(self.quote);
        for ch in name.chars() {
            if ch == self.quote {
                out.push(ch);
            }
            out.push(ch);
        }
        out.push(self.quote);
    }
}

/// Normalize a token with the MySQL defaults.
pub fn normalize(token: &str) -> String {
    Normalizer::mysql().normalize(token)
}

/// Turn a column reference into a valid placeholder name (`[A-Za-z0-9_]+`).
///
/// `` u.`user name` `` becomes `u_user_name`.
pub(crate) fn param_name(column: &str) -> String {
    let mut out = String::with_capacity(column.len());
    for ch in column.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            out.push(ch);
        } else if ch != '`' && !out.ends_with('_') && !out.is_empty() {
            out.push('_');
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}

/// Placeholder names for a column list, one per column and all distinct.
///
/// A column whose cleaned name is empty (e.g. `名字`) or already taken falls
/// back to its position: `p{index}`.
pub(crate) fn param_names<S: AsRef<str>>(columns: &[S]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(columns.len());
    for (idx, column) in columns.iter().enumerate() {
        let cleaned = param_name(column.as_ref());
        let name = if cleaned.is_empty() || names.contains(&cleaned) {
            let mut fallback = format!("p{idx}");
            while names.contains(&fallback) {
                fallback.push('_');
            }
            fallback
        } else {
            cleaned
        };
        names.push(name);
    }
    names
}
