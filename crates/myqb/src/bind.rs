//! Named → positional rebind.
//!
//! Rendered statements use `:name` placeholders. Drivers that only accept `?`
//! need the statement rewritten and the arguments laid out in order; a list
//! bound to `IN (:ids)` expands to one `?` per element.
//!
//! Text inside `'...'` and `"..."` literals and `` `...` `` identifiers is
//! never read as a placeholder. A doubled colon `::` is an escaped literal
//! colon and collapses to `:`, outside identifiers.

use serde::Serialize;

use crate::builder::BuiltQuery;
use crate::error::{QbError, QbResult};
use crate::value::Value;

/// Statement with `?` placeholders and its ordered arguments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionalQuery {
    pub sql: String,
    pub args: Vec<Value>,
}

impl BuiltQuery {
    /// Rewrite `:name` placeholders as `?` and collect arguments in order.
    ///
    /// Fails with [`QbError::MissingParam`] for an unbound name and
    /// [`QbError::EmptyList`] for an empty list.
    pub fn to_positional(&self) -> QbResult<PositionalQuery> {
        let mut args = Vec::new();
        let sql = rewrite(&self.sql, |name, out| {
            let value = self
                .params
                .get(name)
                .ok_or_else(|| QbError::MissingParam(name.to_string()))?;
            match value {
                Value::List(items) if items.is_empty() => {
                    return Err(QbError::EmptyList(name.to_string()));
                }
                Value::List(items) => {
                    for (i, item) in items.iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        out.push('?');
                        args.push(item.clone());
                    }
                }
                other => {
                    out.push('?');
                    args.push(other.clone());
                }
            }
            Ok(())
        })?;
        Ok(PositionalQuery { sql, args })
    }
}

/// Distinct placeholder names in order of first appearance.
pub fn placeholders(sql: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    // The callback never fails.
    let _ = rewrite(sql, |name, _| {
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
        Ok(())
    });
    names
}

fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Copy `sql`, collapsing `::` and handing each `:name` outside quoted
/// regions to `on_placeholder`.
fn rewrite<F>(sql: &str, mut on_placeholder: F) -> QbResult<String>
where
    F: FnMut(&str, &mut String) -> QbResult<()>,
{
    let mut out = String::with_capacity(sql.len());
    let mut chars = sql.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(ch) = chars.next() {
        if let Some(q) = quote {
            out.push(ch);
            if ch == q {
                // A doubled quote is an escaped quote.
                if chars.peek() == Some(&q) {
                    out.extend(chars.next());
                } else {
                    quote = None;
                }
            } else if q != '`' && ch == '\\' {
                out.extend(chars.next());
            } else if q != '`' && ch == ':' && chars.peek() == Some(&':') {
                chars.next();
            }
            continue;
        }
        match ch {
            '\'' | '"' | '`' => {
                quote = Some(ch);
                out.push(ch);
            }
            ':' if chars.peek() == Some(&':') => {
                chars.next();
                out.push(':');
            }
            ':' => {
                let mut name = String::new();
                while let Some(&next) = chars.peek() {
                    if !is_name_char(next) {
                        break;
                    }
                    name.push(next);
                    chars.next();
                }
                if name.is_empty() {
                    out.push(':');
                } else {
                    on_placeholder(&name, &mut out)?;
                }
            }
            _ => out.push(ch),
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Params;

    fn built(sql: &str, params: Params) -> BuiltQuery {
        BuiltQuery {
            sql: sql.to_string(),
            params,
        }
    }

    #[test]
    fn rewrites_in_order() {
        let q = built(
            "SELECT * FROM t WHERE a = :a AND b = :b AND c = :a",
            [("a", 1), ("b", 2)].into_iter().collect(),
        );
        let p = q.to_positional().unwrap();
        assert_eq!(p.sql, "SELECT * FROM t WHERE a = ? AND b = ? AND c = ?");
        assert_eq!(p.args, vec![Value::Int(1), Value::Int(2), Value::Int(1)]);
    }

    #[test]
    fn expands_lists() {
        let q = built(
            "SELECT * FROM t WHERE id IN (:ids)",
            Params::single("ids", vec![3, 4, 5]),
        );
        let p = q.to_positional().unwrap();
        assert_eq!(p.sql, "SELECT * FROM t WHERE id IN (?, ?, ?)");
        assert_eq!(p.args.len(), 3);
    }

    #[test]
    fn collapses_escaped_colons() {
        let q = built("SELECT '10::30' AS t, :x", Params::single("x", 1));
        let p = q.to_positional().unwrap();
        assert_eq!(p.sql, "SELECT '10:30' AS t, ?");
    }

    #[test]
    fn lone_colon_is_kept() {
        let p = built("SET @a := 1", Params::new()).to_positional().unwrap();
        assert_eq!(p.sql, "SET @a := 1");
    }

    #[test]
    fn missing_and_empty() {
        let err = built("a = :a", Params::new()).to_positional().unwrap_err();
        assert_eq!(err, QbError::MissingParam("a".into()));
        assert!(err.is_bind_error());

        let err = built("a IN (:a)", Params::single("a", Vec::<i32>::new()))
            .to_positional()
            .unwrap_err();
        assert_eq!(err, QbError::EmptyList("a".into()));
    }

    #[test]
    fn quoted_regions_are_not_placeholders() {
        assert_eq!(placeholders("WHERE `a:b` = :v"), vec!["v".to_string()]);
        assert_eq!(placeholders("SELECT 'x:y', \"k:z\", :v"), vec!["v".to_string()]);
        assert_eq!(placeholders("SELECT 'it''s :x', :v"), vec!["v".to_string()]);
        assert_eq!(placeholders(r"SELECT 'a\' :x', :v"), vec!["v".to_string()]);

        let q = built("SELECT `a::b`, 'x::y' FROM t WHERE c = :c", Params::single("c", 1));
        let p = q.to_positional().unwrap();
        assert_eq!(p.sql, "SELECT `a::b`, 'x:y' FROM t WHERE c = ?");
        assert_eq!(p.args, vec![Value::Int(1)]);
    }

    #[test]
    fn placeholder_names() {
        assert_eq!(
            placeholders("x = :a AND y = :b_1 OR z = :a AND t = '1::2'"),
            vec!["a".to_string(), "b_1".to_string()]
        );
        assert!(placeholders("SELECT 1").is_empty());
    }
}
