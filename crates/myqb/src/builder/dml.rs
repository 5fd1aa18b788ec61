//! INSERT / UPDATE / DELETE intents attached to a [`QueryBuilder`].
//!
//! A DML setter only records the intent; the statement is produced by the
//! terminal `build()` call. Calling another DML setter replaces the previous
//! intent.

use std::collections::BTreeMap;

use super::query::QueryBuilder;
use crate::expr::Field;
use crate::params::Params;
use crate::value::Value;

/// Raw right-hand side of an assignment with its own parameters.
///
/// ```ignore
/// use myqb::prelude::*;
///
/// let inc = set_expr("COALESCE(`score`, 0) + :score_inc", [("score_inc", 5)]);
/// table("t_user").update_map([("score", inc)]);
/// // UPDATE t_user SET `score` = COALESCE(`score`, 0) + :score_inc
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SetExpr {
    pub(crate) expr: String,
    pub(crate) params: Params,
}

/// Create a [`SetExpr`].
pub fn set_expr<K, V>(expr: impl Into<String>, params: impl IntoIterator<Item = (K, V)>) -> SetExpr
where
    K: Into<String>,
    V: Into<Value>,
{
    SetExpr {
        expr: expr.into(),
        params: params.into_iter().collect(),
    }
}

impl SetExpr {
    /// Expression without parameters, e.g. `` `amount` - 2 ``.
    pub fn new(expr: impl Into<String>) -> Self {
        Self {
            expr: expr.into(),
            params: Params::new(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name, value);
        self
    }

    pub fn expr(&self) -> &str {
        &self.expr
    }

    pub fn params(&self) -> &Params {
        &self.params
    }
}

/// Right-hand side of a SET / ON DUPLICATE KEY UPDATE assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum Assignment {
    /// Bound as `:col` (or `:col_upd` in an upsert)
    Value(Value),
    /// Field expression, e.g. `` `score` + 1 ``
    Expr(Field),
    /// Raw expression with parameters
    Set(SetExpr),
}

macro_rules! assignment_from_value {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for Assignment {
                fn from(v: $t) -> Self {
                    Assignment::Value(v.into())
                }
            }
        )*
    };
}

assignment_from_value!(
    Value, bool, &str, String, &String, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32,
    f64, chrono::NaiveDate, chrono::NaiveDateTime, uuid::Uuid, serde_json::Value,
);

#[cfg(feature = "rust_decimal")]
assignment_from_value!(rust_decimal::Decimal);

impl<T: Into<Value>> From<Option<T>> for Assignment {
    fn from(v: Option<T>) -> Self {
        Assignment::Value(v.into())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Assignment {
    fn from(v: Vec<T>) -> Self {
        Assignment::Value(v.into())
    }
}

impl From<Field> for Assignment {
    fn from(f: Field) -> Self {
        Assignment::Expr(f)
    }
}

impl From<SetExpr> for Assignment {
    fn from(s: SetExpr) -> Self {
        Assignment::Set(s)
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Upsert {
    /// `col=VALUES(col)`
    Columns(Vec<String>),
    /// `col = :col_upd` / expression
    Assign(Vec<(String, Assignment)>),
}

#[derive(Debug, Clone)]
pub(crate) enum Dml {
    Insert {
        ignore: bool,
        /// Single-row form: placeholders without a row suffix.
        single: bool,
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
        upsert: Option<Upsert>,
    },
    Update {
        sets: Vec<(String, Assignment)>,
    },
    Delete {
        target: Option<Box<QueryBuilder>>,
    },
}

impl Dml {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Dml::Insert { .. } => "insert",
            Dml::Update { .. } => "update",
            Dml::Delete { .. } => "delete",
        }
    }
}

fn collect_row<K, V>(row: impl IntoIterator<Item = (K, V)>) -> Vec<(String, Value)>
where
    K: Into<String>,
    V: Into<Value>,
{
    row.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}

/// Column order fixed from the first row, sorted; missing keys bind NULL.
/// Keys absent from the first row are dropped with a warning.
fn collect_rows<R, K, V>(rows: impl IntoIterator<Item = R>) -> (Vec<String>, Vec<Vec<Value>>)
where
    R: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    let maps: Vec<BTreeMap<String, Value>> = rows
        .into_iter()
        .map(|row| collect_row(row).into_iter().collect())
        .collect();
    let Some(first) = maps.first() else {
        return (Vec::new(), Vec::new());
    };
    let columns: Vec<String> = first.keys().cloned().collect();
    for (row, map) in maps.iter().enumerate().skip(1) {
        for key in map.keys().filter(|k| !first.contains_key(*k)) {
            #[cfg(feature = "tracing")]
            tracing::warn!(target: "myqb", row, column = %key, "column not in the first row, value dropped");
            #[cfg(not(feature = "tracing"))]
            let _ = (row, key);
        }
    }
    let values = maps
        .iter()
        .map(|m| {
            columns
                .iter()
                .map(|c| m.get(c).cloned().unwrap_or(Value::Null))
                .collect()
        })
        .collect();
    (columns, values)
}

fn collect_assignments<K, A>(sets: impl IntoIterator<Item = (K, A)>) -> Vec<(String, Assignment)>
where
    K: Into<String>,
    A: Into<Assignment>,
{
    sets.into_iter().map(|(k, a)| (k.into(), a.into())).collect()
}

impl QueryBuilder {
    /// `INSERT INTO t (cols) VALUES (:col, ...)` for one row, columns in
    /// input order.
    pub fn insert_map<K, V>(self, row: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.insert_single(row, false)
    }

    /// `INSERT IGNORE INTO ...` for one row.
    pub fn insert_ignore_map<K, V>(self, row: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.insert_single(row, true)
    }

    /// Multi-row insert; placeholders are suffixed with the row index
    /// (`:name_0`, `:name_1`, ...).
    pub fn insert_many<R, K, V>(self, rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.insert_rows(rows, false, None)
    }

    pub fn insert_ignore_many<R, K, V>(self, rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.insert_rows(rows, true, None)
    }

    /// Multi-row insert with `ON DUPLICATE KEY UPDATE col=VALUES(col), ...`.
    pub fn insert_on_duplicate_cols_many<R, K, V, C>(
        self,
        rows: impl IntoIterator<Item = R>,
        update_columns: impl IntoIterator<Item = C>,
    ) -> Self
    where
        R: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
        C: Into<String>,
    {
        let cols = update_columns.into_iter().map(Into::into).collect();
        self.insert_rows(rows, false, Some(Upsert::Columns(cols)))
    }

    /// Multi-row insert with `ON DUPLICATE KEY UPDATE col = :col_upd, ...`.
    ///
    /// Plain values bind a fresh `_upd` placeholder; fields and [`SetExpr`]s
    /// are embedded as expressions. Assignments are rendered in column order.
    pub fn insert_on_duplicate_map_many<R, K, V, UK, A>(
        self,
        rows: impl IntoIterator<Item = R>,
        updates: impl IntoIterator<Item = (UK, A)>,
    ) -> Self
    where
        R: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
        UK: Into<String>,
        A: Into<Assignment>,
    {
        let mut sets = collect_assignments(updates);
        sets.sort_by(|a, b| a.0.cmp(&b.0));
        self.insert_rows(rows, false, Some(Upsert::Assign(sets)))
    }

    /// `UPDATE t SET col = :col, ...` with columns sorted by name.
    pub fn update_map<K, A>(self, sets: impl IntoIterator<Item = (K, A)>) -> Self
    where
        K: Into<String>,
        A: Into<Assignment>,
    {
        let mut sets = collect_assignments(sets);
        sets.sort_by(|a, b| a.0.cmp(&b.0));
        self.set_dml(Dml::Update { sets })
    }

    /// `UPDATE t SET ...` keeping the given order.
    ///
    /// MySQL evaluates single-table SET assignments left to right, so a later
    /// assignment sees the updated value of an earlier column.
    pub fn update_ordered<K, A>(self, sets: impl IntoIterator<Item = (K, A)>) -> Self
    where
        K: Into<String>,
        A: Into<Assignment>,
    {
        let sets = collect_assignments(sets);
        self.set_dml(Dml::Update { sets })
    }

    /// `DELETE FROM t WHERE ...`
    pub fn delete(self) -> Self {
        self.set_dml(Dml::Delete { target: None })
    }

    /// `DELETE <target> FROM t [joins] WHERE ...`; `target` names the joined
    /// table whose rows are deleted.
    pub fn delete_target(self, target: &QueryBuilder) -> Self {
        self.set_dml(Dml::Delete {
            target: Some(Box::new(target.clone())),
        })
    }

    fn insert_single<K, V>(self, row: impl IntoIterator<Item = (K, V)>, ignore: bool) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let (columns, values): (Vec<String>, Vec<Value>) = collect_row(row).into_iter().unzip();
        let rows = if columns.is_empty() { Vec::new() } else { vec![values] };
        self.set_dml(Dml::Insert {
            ignore,
            single: true,
            columns,
            rows,
            upsert: None,
        })
    }

    fn insert_rows<R, K, V>(
        self,
        rows: impl IntoIterator<Item = R>,
        ignore: bool,
        upsert: Option<Upsert>,
    ) -> Self
    where
        R: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let (columns, rows) = collect_rows(rows);
        self.set_dml(Dml::Insert {
            ignore,
            single: false,
            columns,
            rows,
            upsert,
        })
    }

    fn set_dml(mut self, dml: Dml) -> Self {
        self.dml = Some(dml);
        self
    }
}
