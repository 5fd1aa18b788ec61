use super::condition::{CompareOp, Condition, Operand, compare};
use super::func;
use super::{Acc, SqlFragment};
use crate::error::QbError;
use crate::ident;
use crate::params::Params;
use crate::value::Numeric;

/// A column reference or computed expression usable in a select list,
/// ORDER BY, GROUP BY or as a comparison operand.
///
/// The rendered text is final: identifier quoting happens at construction and
/// every combinator wraps or extends the text of its input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Field {
    /// Quoted column reference; empty for computed expressions.
    name: String,
    sql: String,
    params: Params,
    error: Option<QbError>,
    conflicts: Vec<String>,
}

impl Field {
    /// Column reference, quoted with the MySQL normalizer.
    ///
    /// `Field::new("u.name")` renders as ``u.`name` ``.
    pub fn new(column: &str) -> Self {
        let sql = ident::normalize(column);
        Self {
            name: sql.clone(),
            sql,
            params: Params::new(),
            error: None,
            conflicts: Vec::new(),
        }
    }

    /// Verbatim SQL, e.g. `COUNT(*)` or a pre-rendered fragment.
    ///
    /// The text is not inspected; never feed it user input.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            ..Self::default()
        }
    }

    pub(crate) fn computed(sql: String, acc: Acc) -> Self {
        Self {
            name: String::new(),
            sql,
            params: acc.params,
            error: acc.error,
            conflicts: acc.conflicts,
        }
    }

    pub(crate) fn failed(error: QbError) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }

    /// Quoted column reference (empty for computed expressions).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attach a parameter to a raw fragment.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<crate::Value>) -> Self {
        self.params.insert(name, value);
        self
    }

    /// `expr AS label`
    pub fn alias(mut self, label: &str) -> Self {
        self.sql = format!("{} AS {}", self.sql, label);
        self.name.clear();
        self
    }

    /// `expr ASC`
    pub fn asc(mut self) -> Self {
        self.sql.push_str(" ASC");
        self
    }

    /// `expr DESC`
    pub fn desc(mut self) -> Self {
        self.sql.push_str(" DESC");
        self
    }

    // ==================== Comparisons ====================

    pub fn eq(self, value: impl Into<Operand>) -> Condition {
        compare(self, CompareOp::Eq, value.into())
    }

    /// `!=`
    pub fn not_eq(self, value: impl Into<Operand>) -> Condition {
        compare(self, CompareOp::NotEq, value.into())
    }

    /// `<>`
    pub fn neq(self, value: impl Into<Operand>) -> Condition {
        compare(self, CompareOp::Neq, value.into())
    }

    pub fn gt(self, value: impl Into<Operand>) -> Condition {
        compare(self, CompareOp::Gt, value.into())
    }

    pub fn gte(self, value: impl Into<Operand>) -> Condition {
        compare(self, CompareOp::Gte, value.into())
    }

    pub fn lt(self, value: impl Into<Operand>) -> Condition {
        compare(self, CompareOp::Lt, value.into())
    }

    pub fn lte(self, value: impl Into<Operand>) -> Condition {
        compare(self, CompareOp::Lte, value.into())
    }

    pub fn like(self, value: impl Into<Operand>) -> Condition {
        compare(self, CompareOp::Like, value.into())
    }

    pub fn in_(self, value: impl Into<Operand>) -> Condition {
        compare(self, CompareOp::In, value.into())
    }

    pub fn not_in(self, value: impl Into<Operand>) -> Condition {
        compare(self, CompareOp::NotIn, value.into())
    }

    pub fn is_null(self) -> Condition {
        super::condition::null_check(self, "IS NULL")
    }

    pub fn is_not_null(self) -> Condition {
        super::condition::null_check(self, "IS NOT NULL")
    }

    // ==================== Arithmetic ====================

    /// `expr + n`
    pub fn add<N: Numeric>(self, n: N) -> Self {
        self.binary_literal("+", n)
    }

    /// `expr - n`
    pub fn sub<N: Numeric>(self, n: N) -> Self {
        self.binary_literal("-", n)
    }

    /// `n - expr`
    pub fn be_sub<N: Numeric>(self, n: N) -> Self {
        let lit = n.into().to_literal();
        let sql = format!("{lit} - {}", self.sql);
        self.rewrap(sql)
    }

    /// `expr * n`
    pub fn mul<N: Numeric>(self, n: N) -> Self {
        self.binary_literal("*", n)
    }

    /// `expr / n`
    pub fn div<N: Numeric>(self, n: N) -> Self {
        self.binary_literal("/", n)
    }

    /// `expr + other`
    pub fn add_col(self, other: impl IntoField) -> Self {
        self.binary_field("+", other.into_field())
    }

    /// `expr - other`
    pub fn sub_col(self, other: impl IntoField) -> Self {
        self.binary_field("-", other.into_field())
    }

    /// `expr / other`
    pub fn div_col(self, other: impl IntoField) -> Self {
        self.binary_field("/", other.into_field())
    }

    // ==================== Aggregates ====================

    /// `DISTINCT(expr)`
    pub fn distinct(self) -> Self {
        let sql = format!("DISTINCT({})", self.sql);
        self.rewrap(sql)
    }

    pub fn count(self) -> Self {
        func::count(self)
    }

    pub fn sum(self) -> Self {
        func::sum(self)
    }

    pub fn min(self) -> Self {
        func::min(self)
    }

    pub fn max(self) -> Self {
        func::max(self)
    }

    fn binary_literal<N: Numeric>(self, op: &str, n: N) -> Self {
        let sql = format!("{} {op} {}", self.sql, n.into().to_literal());
        self.rewrap(sql)
    }

    fn binary_field(self, op: &str, other: Field) -> Self {
        let sql = format!("{} {op} {}", self.sql, other.sql);
        let mut acc = Acc::new();
        acc.absorb(&self);
        acc.absorb(&other);
        Field::computed(sql, acc)
    }

    /// Replace the rendered text, keeping parameters and error.
    fn rewrap(self, sql: String) -> Self {
        Self {
            name: String::new(),
            sql,
            params: self.params,
            error: self.error,
            conflicts: self.conflicts,
        }
    }
}

impl SqlFragment for Field {
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

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Anything usable where a column expression is expected.
///
/// A `&str` is a bare column name and is re-quoted; a [`Field`] is used as-is.
pub trait IntoField {
    fn into_field(self) -> Field;
}

impl IntoField for Field {
    fn into_field(self) -> Field {
        self
    }
}

impl IntoField for &Field {
    fn into_field(self) -> Field {
        self.clone()
    }
}

impl IntoField for &str {
    fn into_field(self) -> Field {
        Field::new(self)
    }
}

impl IntoField for String {
    fn into_field(self) -> Field {
        Field::new(&self)
    }
}

impl IntoField for &String {
    fn into_field(self) -> Field {
        Field::new(self)
    }
}
