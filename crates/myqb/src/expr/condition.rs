use super::field::{Field, IntoField};
use super::{Acc, SqlFragment};
use crate::builder::QueryBuilder;
use crate::error::QbError;
use crate::params::Params;
use crate::value::{Value, numeric_in_list, string_in_list};

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `!=`
    NotEq,
    /// `<>`
    Neq,
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `<`
    Lt,
    /// `<=`
    Lte,
    /// `LIKE`
    Like,
    /// `IN (...)`
    In,
    /// `NOT IN (...)`
    NotIn,
}

impl CompareOp {
    pub fn as_str(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::NotEq => "!=",
            CompareOp::Neq => "<>",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
            CompareOp::Like => "LIKE",
            CompareOp::In => "IN",
            CompareOp::NotIn => "NOT IN",
        }
    }

    /// Whether the right-hand side is a parenthesized list.
    pub fn is_list(self) -> bool {
        matches!(self, CompareOp::In | CompareOp::NotIn)
    }
}

/// Right-hand side of a comparison or a function argument.
///
/// - [`Operand::Bind`]: named placeholder `:key` bound to a value. Use this for
///   anything that is not a trusted constant.
/// - [`Operand::Literal`]: value embedded as an escaped SQL literal.
/// - [`Operand::List`]: literal list for `IN` / `NOT IN`.
/// - [`Operand::Expr`]: nested field/expression; its parameters are merged.
/// - [`Operand::Raw`]: verbatim SQL (e.g. a pre-built subquery).
/// - [`Operand::Subquery`]: nested builder rendered as `(SELECT ...)`.
///
/// Plain Rust values convert into `Literal`, vectors and arrays into `List`:
///
/// ```ignore
/// use myqb::expr::{bind, Field};
///
/// Field::new("id").eq(bind("id", 7));        // `id` = :id
/// Field::new("status").eq("on");             // `status` = 'on'
/// Field::new("id").in_(vec![1, 2, 3]);       // `id` IN (1,2,3)
/// ```
#[derive(Debug, Clone)]
pub enum Operand {
    Bind { key: String, value: Value },
    Literal(Value),
    List(Vec<Value>),
    Expr(Field),
    Raw(String),
    Subquery(Box<QueryBuilder>),
}

/// Named placeholder operand: renders `:key` and binds `{key: value}`.
pub fn bind(key: impl Into<String>, value: impl Into<Value>) -> Operand {
    Operand::Bind {
        key: key.into(),
        value: value.into(),
    }
}

/// Verbatim SQL operand.
pub fn raw(sql: impl Into<String>) -> Operand {
    Operand::Raw(sql.into())
}

impl Operand {
    /// Render in value position (function argument, SET right-hand side).
    ///
    /// Text literals are quoted, lists are comma-joined, subqueries are
    /// parenthesized.
    pub(crate) fn render_value(self, acc: &mut Acc) -> String {
        match self {
            Operand::Bind { key, value } => {
                let sql = format!(":{key}");
                acc.absorb_params(&Params::single(key, value));
                sql
            }
            Operand::Literal(value) => literal(&value),
            Operand::List(items) => Value::List(items).to_literal(),
            Operand::Expr(field) => {
                acc.absorb(&field);
                field.sql().to_string()
            }
            Operand::Raw(sql) => sql,
            Operand::Subquery(qb) => match qb.render_nested() {
                Ok((sql, params)) => {
                    acc.absorb_params(&params);
                    format!("({sql})")
                }
                Err(e) => {
                    acc.fail(e);
                    String::new()
                }
            },
        }
    }
}

fn literal(value: &Value) -> String {
    #[cfg(feature = "tracing")]
    if let Value::Text(_) = value {
        tracing::trace!(target: "myqb", "embedding unparameterized string literal");
    }
    value.to_literal()
}

macro_rules! operand_from_scalar {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for Operand {
                fn from(v: $t) -> Self {
                    Operand::Literal(v.into())
                }
            }
        )*
    };
}

operand_from_scalar!(
    bool, &str, String, &String, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64,
    chrono::NaiveDate, chrono::NaiveDateTime, uuid::Uuid, serde_json::Value,
);

#[cfg(feature = "rust_decimal")]
operand_from_scalar!(rust_decimal::Decimal);

impl From<Value> for Operand {
    fn from(v: Value) -> Self {
        match v {
            Value::List(items) => Operand::List(items),
            other => Operand::Literal(other),
        }
    }
}

impl<T: Into<Value>> From<Option<T>> for Operand {
    fn from(v: Option<T>) -> Self {
        Operand::Literal(v.into())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Operand {
    fn from(v: Vec<T>) -> Self {
        Operand::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value> + Clone> From<&[T]> for Operand {
    fn from(v: &[T]) -> Self {
        Operand::List(v.iter().cloned().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Operand {
    fn from(v: [T; N]) -> Self {
        Operand::List(v.into_iter().map(Into::into).collect())
    }
}

impl From<Field> for Operand {
    fn from(f: Field) -> Self {
        Operand::Expr(f)
    }
}

impl From<&Field> for Operand {
    fn from(f: &Field) -> Self {
        Operand::Expr(f.clone())
    }
}

impl From<QueryBuilder> for Operand {
    fn from(qb: QueryBuilder) -> Self {
        Operand::Subquery(Box::new(qb))
    }
}

impl From<&QueryBuilder> for Operand {
    fn from(qb: &QueryBuilder) -> Self {
        Operand::Subquery(Box::new(qb.clone()))
    }
}

/// A rendered boolean expression with its parameters.
///
/// An empty condition (e.g. `and([])`) renders as nothing and is skipped by
/// the WHERE list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Condition {
    /// Column of a leaf comparison; empty for combined conditions.
    column: String,
    sql: String,
    params: Params,
    error: Option<QbError>,
    conflicts: Vec<String>,
}

impl Condition {
    /// Verbatim boolean SQL.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            ..Self::default()
        }
    }

    /// Attach a parameter to a raw condition.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name, value);
        self
    }

    /// Column of a leaf comparison.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// `NOT (cond)`; an empty condition stays empty.
    pub fn not(mut self) -> Self {
        if !self.sql.is_empty() {
            self.sql = format!("NOT ({})", self.sql);
            self.column.clear();
        }
        self
    }

    pub fn and(self, other: Condition) -> Self {
        and([self, other])
    }

    pub fn or(self, other: Condition) -> Self {
        or([self, other])
    }

    fn leaf(column: String, sql: String, acc: Acc) -> Self {
        Self {
            column,
            sql,
            params: acc.params,
            error: acc.error,
            conflicts: acc.conflicts,
        }
    }
}

impl SqlFragment for Condition {
    fn sql(&self) -> &str {
        &self.sql
    }

    fn params(&self) -> &Params {
        &self.params
    }

    fn error(&self) -> Option<&QbError> {
        self.error.as_ref()
    }

    fn conflicts(&self) -> &[String] {
        &self.conflicts
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.sql)
    }
}

pub(crate) fn compare(column: Field, op: CompareOp, operand: Operand) -> Condition {
    // Column params join only when the column text is rendered.
    let mut acc = Acc::new();
    if let Some(e) = column.error() {
        acc.fail(e.clone());
    }
    let col = column.sql().to_string();
    let sym = op.as_str();

    let rhs = match operand {
        Operand::Bind { key, value } => {
            acc.absorb_params(&Params::single(key.clone(), value));
            if op.is_list() {
                format!("(:{key})")
            } else {
                format!(":{key}")
            }
        }
        Operand::Literal(Value::Null) if matches!(op, CompareOp::Eq) => {
            return null_check(column, "IS NULL");
        }
        Operand::Literal(Value::Null) if matches!(op, CompareOp::NotEq | CompareOp::Neq) => {
            return null_check(column, "IS NOT NULL");
        }
        Operand::Literal(Value::List(items)) | Operand::List(items) => {
            if !op.is_list() {
                acc.fail(QbError::condition(
                    &col,
                    format!("list operand requires IN / NOT IN, got {sym}"),
                ));
                return Condition::leaf(col, String::new(), acc);
            }
            if items.is_empty() {
                // IN () is invalid SQL; an empty set matches nothing.
                let sql = if op == CompareOp::In { "1=0" } else { "1=1" };
                return Condition::leaf(col, sql.to_string(), acc);
            }
            match in_list(&items) {
                Ok(list) => format!("({list})"),
                Err(e) => {
                    acc.fail(QbError::condition(&col, e.to_string()));
                    return Condition::leaf(col, String::new(), acc);
                }
            }
        }
        // A string for IN / NOT IN is a pre-built subquery fragment.
        Operand::Literal(Value::Text(sql)) if op.is_list() => format!("({sql})"),
        Operand::Literal(value) => {
            let lit = literal(&value);
            if op.is_list() { format!("({lit})") } else { lit }
        }
        Operand::Raw(sql) => {
            if op.is_list() { format!("({sql})") } else { sql }
        }
        Operand::Expr(field) => {
            acc.absorb(&field);
            if op.is_list() {
                format!("({})", field.sql())
            } else {
                field.sql().to_string()
            }
        }
        Operand::Subquery(qb) => match qb.render_nested() {
            Ok((sql, params)) => {
                acc.absorb_params(&params);
                format!("({sql})")
            }
            Err(e) => {
                acc.fail(e);
                return Condition::leaf(col, String::new(), acc);
            }
        },
    };

    acc.absorb(&column);
    let sql = format!("{col} {sym} {rhs}");
    Condition::leaf(col, sql, acc)
}

/// All-text lists are quoted, anything else must be numeric.
fn in_list(items: &[Value]) -> Result<String, QbError> {
    if items.iter().all(|v| matches!(v, Value::Text(_))) {
        let texts: Vec<&str> = items
            .iter()
            .filter_map(|v| match v {
                Value::Text(s) => Some(s.as_str()),
                _ => None,
            })
            .collect();
        return Ok(string_in_list(&texts));
    }
    numeric_in_list(&Value::List(items.to_vec()))
}

pub(crate) fn null_check(column: Field, keyword: &str) -> Condition {
    let mut acc = Acc::new();
    acc.absorb(&column);
    let col = column.sql().to_string();
    let sql = format!("{col} {keyword}");
    Condition::leaf(col, sql, acc)
}

// ==================== Free constructors ====================

/// `col = value`
pub fn eq(column: impl IntoField, value: impl Into<Operand>) -> Condition {
    compare(column.into_field(), CompareOp::Eq, value.into())
}

/// `col != value`
pub fn not_eq(column: impl IntoField, value: impl Into<Operand>) -> Condition {
    compare(column.into_field(), CompareOp::NotEq, value.into())
}

/// `col <> value`
pub fn neq(column: impl IntoField, value: impl Into<Operand>) -> Condition {
    compare(column.into_field(), CompareOp::Neq, value.into())
}

/// `col > value`
pub fn gt(column: impl IntoField, value: impl Into<Operand>) -> Condition {
    compare(column.into_field(), CompareOp::Gt, value.into())
}

/// `col >= value`
pub fn gte(column: impl IntoField, value: impl Into<Operand>) -> Condition {
    compare(column.into_field(), CompareOp::Gte, value.into())
}

/// `col < value`
pub fn lt(column: impl IntoField, value: impl Into<Operand>) -> Condition {
    compare(column.into_field(), CompareOp::Lt, value.into())
}

/// `col <= value`
pub fn lte(column: impl IntoField, value: impl Into<Operand>) -> Condition {
    compare(column.into_field(), CompareOp::Lte, value.into())
}

/// `col LIKE value`
pub fn like(column: impl IntoField, value: impl Into<Operand>) -> Condition {
    compare(column.into_field(), CompareOp::Like, value.into())
}

/// `col IN (...)`
///
/// A bound list renders `col IN (:key)` and is expanded at bind time; a literal
/// list is inlined; a string is taken as a raw subquery.
pub fn in_(column: impl IntoField, value: impl Into<Operand>) -> Condition {
    compare(column.into_field(), CompareOp::In, value.into())
}

/// `col NOT IN (...)`
pub fn not_in(column: impl IntoField, value: impl Into<Operand>) -> Condition {
    compare(column.into_field(), CompareOp::NotIn, value.into())
}

/// `col IS NULL`
pub fn is_null(column: impl IntoField) -> Condition {
    null_check(column.into_field(), "IS NULL")
}

/// `col IS NOT NULL`
pub fn is_not_null(column: impl IntoField) -> Condition {
    null_check(column.into_field(), "IS NOT NULL")
}

// ==================== Combinators ====================

/// `(a AND b AND ...)`.
///
/// Empty children are dropped; with nothing left the result is an empty
/// condition. Parameters are merged, last write wins; a name rebound to a
/// different value is recorded and rejected by a strict build.
pub fn and(conds: impl IntoIterator<Item = Condition>) -> Condition {
    join_group(conds, " AND ")
}

/// `(a OR b OR ...)`. Same rules as [`and`].
pub fn or(conds: impl IntoIterator<Item = Condition>) -> Condition {
    join_group(conds, " OR ")
}

fn join_group(conds: impl IntoIterator<Item = Condition>, sep: &str) -> Condition {
    let mut acc = Acc::new();
    let mut parts = Vec::new();
    for cond in conds {
        acc.absorb(&cond);
        if !cond.sql.is_empty() {
            parts.push(cond.sql);
        }
    }
    let sql = if parts.is_empty() {
        String::new()
    } else {
        format!("({})", parts.join(sep))
    };
    Condition::leaf(String::new(), sql, acc)
}

/// `EXISTS (SELECT ...)`
pub fn exists(qb: &QueryBuilder) -> Condition {
    subquery_check("EXISTS", qb)
}

/// `NOT EXISTS (SELECT ...)`
pub fn not_exists(qb: &QueryBuilder) -> Condition {
    subquery_check("NOT EXISTS", qb)
}

/// `NOT EXISTS (<sql>)` with a pre-built subquery.
pub fn not_exists_raw(sql: &str) -> Condition {
    Condition::raw(format!("NOT EXISTS ({sql})"))
}

fn subquery_check(keyword: &str, qb: &QueryBuilder) -> Condition {
    let mut acc = Acc::new();
    match qb.render_nested() {
        Ok((sql, params)) => {
            acc.absorb_params(&params);
            Condition::leaf(String::new(), format!("{keyword} ({sql})"), acc)
        }
        Err(e) => {
            acc.fail(e);
            Condition::leaf(String::new(), String::new(), acc)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bound_comparison() {
        let c = eq("id", bind("id", 1));
        assert_eq!(c.sql(), "`id` = :id");
        assert_eq!(c.params()["id"], Value::Int(1));
        assert_eq!(c.column(), "`id`");
    }

    #[test]
    fn operators() {
        assert_eq!(not_eq("a", bind("a", 1)).sql(), "`a` != :a");
        assert_eq!(neq("a", bind("a", 1)).sql(), "`a` <> :a");
        assert_eq!(gt("a", 1).sql(), "`a` > 1");
        assert_eq!(gte("a", 1).sql(), "`a` >= 1");
        assert_eq!(lt("a", 1).sql(), "`a` < 1");
        assert_eq!(lte("a", 1).sql(), "`a` <= 1");
        assert_eq!(like("name", bind("kw", "%ab%")).sql(), "`name` LIKE :kw");
    }

    #[test]
    fn literal_string_is_escaped() {
        let c = eq("name", "o'neil");
        assert_eq!(c.sql(), "`name` = 'o''neil'");
        assert!(c.params().is_empty());
    }

    #[test]
    fn null_literal_becomes_is_null() {
        assert_eq!(eq("a", None::<i32>).sql(), "`a` IS NULL");
        assert_eq!(not_eq("a", Value::Null).sql(), "`a` IS NOT NULL");
        assert_eq!(is_null("a").sql(), "`a` IS NULL");
        assert_eq!(is_not_null("a").sql(), "`a` IS NOT NULL");
    }

    #[test]
    fn in_lists() {
        assert_eq!(in_("id", vec![1, 2, 3]).sql(), "`id` IN (1,2,3)");
        assert_eq!(in_("code", ["a", "b"]).sql(), "`code` IN ('a','b')");
        assert_eq!(not_in("id", vec![4]).sql(), "`id` NOT IN (4)");
    }

    #[test]
    fn in_with_bound_list() {
        let c = in_("id", bind("ids", vec![1, 2]));
        assert_eq!(c.sql(), "`id` IN (:ids)");
        assert_eq!(c.params()["ids"], Value::from(vec![1, 2]));
    }

    #[test]
    fn in_with_string_is_raw_subquery() {
        let c = in_("id", "SELECT uid FROM t_vip");
        assert_eq!(c.sql(), "`id` IN (SELECT uid FROM t_vip)");
    }

    #[test]
    fn empty_in_list() {
        assert_eq!(in_("id", Vec::<i32>::new()).sql(), "1=0");
        assert_eq!(not_in("id", Vec::<i32>::new()).sql(), "1=1");
    }

    #[test]
    fn mixed_list_is_deferred_error() {
        let c = in_("id", vec![Value::from(1), Value::from("x")]);
        assert!(matches!(c.error(), Some(QbError::InvalidCondition { .. })));
    }

    #[test]
    fn list_with_scalar_operator_is_error() {
        let c = eq("id", vec![1, 2]);
        assert!(c.error().is_some());
        assert!(c.is_empty());
    }

    #[test]
    fn nested_expression_merges_params() {
        let rhs = Field::new("b").add_col(Field::raw(":delta").with_param("delta", 2));
        let c = gt("a", rhs);
        assert_eq!(c.sql(), "`a` > `b` + :delta");
        assert_eq!(c.params()["delta"], Value::Int(2));
    }

    #[test]
    fn and_or_grouping() {
        let c = and([eq("a", bind("a", 1)), or([eq("b", bind("b", 2)), eq("c", bind("c", 3))])]);
        assert_eq!(c.sql(), "(`a` = :a AND (`b` = :b OR `c` = :c))");
        assert_eq!(c.params().len(), 3);
    }

    #[test]
    fn zero_arg_combinators_are_empty() {
        assert!(and([]).is_empty());
        assert!(or([]).is_empty());
        assert!(and([]).params().is_empty());
        assert_eq!(and([Condition::default(), eq("a", 1)]).sql(), "(`a` = 1)");
    }

    #[test]
    fn combinator_last_write_wins_and_records_conflict() {
        let c = or([eq("a", bind("x", 1)), eq("b", bind("x", 2))]);
        assert_eq!(c.params()["x"], Value::Int(2));
        assert_eq!(c.conflicts(), ["x".to_string()]);

        let same = and([eq("a", bind("y", 1)), eq("b", bind("y", 1))]);
        assert!(same.conflicts().is_empty());
        assert!(and([c, same]).conflicts().contains(&"x".to_string()));
    }

    #[test]
    fn not_wraps() {
        assert_eq!(eq("a", 1).not().sql(), "NOT (`a` = 1)");
        assert!(Condition::default().not().is_empty());
    }

    #[test]
    fn not_exists_raw_sql() {
        assert_eq!(
            not_exists_raw("SELECT 1 FROM t").sql(),
            "NOT EXISTS (SELECT 1 FROM t)"
        );
    }
}
