//! Clause renderer: walks a builder graph once and produces SQL text plus the
//! merged parameter map.
//!
//! SELECT clause order is fixed: SELECT list, FROM (with joins or a union
//! group), WHERE, GROUP BY / HAVING, ORDER BY, LIMIT.

use serde::Serialize;

use super::dml::{Assignment, Dml, Upsert};
use super::query::QueryBuilder;
use crate::error::{QbError, QbResult};
use crate::expr::{Field, SqlFragment};
use crate::ident;
use crate::params::Params;
use crate::value::Value;

/// Options for the terminal `build_with` call.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Maximum SQL length (bytes) in the `myqb.sql` debug event. `None`
    /// disables truncation.
    pub max_logged_sql: Option<usize>,
    /// Reject a statement in which one placeholder is bound to two different
    /// values. When disabled the last binding wins and a warning is logged.
    pub strict_params: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            max_logged_sql: Some(1024),
            strict_params: true,
        }
    }
}

impl BuildOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the SQL truncation length for log events.
    pub fn with_max_logged_sql(mut self, max: usize) -> Self {
        self.max_logged_sql = Some(max);
        self
    }

    /// Log the full SQL.
    pub fn no_truncate(mut self) -> Self {
        self.max_logged_sql = None;
        self
    }

    /// Let conflicting placeholder bindings resolve last-write-wins.
    pub fn lenient_params(mut self) -> Self {
        self.strict_params = false;
        self
    }

    #[cfg_attr(not(feature = "tracing"), allow(dead_code))]
    pub(crate) fn truncate<'s>(&self, sql: &'s str) -> std::borrow::Cow<'s, str> {
        match self.max_logged_sql {
            Some(max) if sql.len() > max => {
                let mut end = max;
                while end > 0 && !sql.is_char_boundary(end) {
                    end -= 1;
                }
                format!("{}...", &sql[..end]).into()
            }
            _ => sql.into(),
        }
    }
}

/// Result of rendering: SQL with `:name` placeholders and their values.
///
/// An empty `sql` means there was nothing to build (no table, no rows);
/// check [`is_empty`](Self::is_empty) before executing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Params,
}

impl BuiltQuery {
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }
}

pub(crate) struct Renderer<'o> {
    opts: &'o BuildOptions,
    pub(crate) params: Params,
}

impl<'o> Renderer<'o> {
    pub(crate) fn new(opts: &'o BuildOptions) -> Self {
        Self {
            opts,
            params: Params::new(),
        }
    }

    pub(crate) fn into_params(self) -> Params {
        self.params
    }

    fn merge(&mut self, params: &Params) -> QbResult<()> {
        for name in self.params.merge(params) {
            if self.opts.strict_params {
                return Err(QbError::ParamConflict(name));
            }
            #[cfg(feature = "tracing")]
            tracing::warn!(target: "myqb", param = %name, "conflicting placeholder value, last write wins");
        }
        Ok(())
    }

    fn absorb(&mut self, frag: &impl SqlFragment) -> QbResult<()> {
        if let Some(e) = frag.error() {
            return Err(e.clone());
        }
        if self.opts.strict_params {
            if let Some(name) = frag.conflicts().first() {
                return Err(QbError::ParamConflict(name.clone()));
            }
        }
        self.merge(frag.params())
    }

    fn bind(&mut self, name: String, value: Value) -> QbResult<()> {
        self.merge(&Params::single(name, value))
    }

    /// Top-level statement: the DML intent if any, otherwise a SELECT.
    pub(crate) fn statement(&mut self, qb: &QueryBuilder) -> QbResult<String> {
        if let Some(e) = &qb.build_error {
            return Err(e.clone());
        }
        match &qb.dml {
            None if !qb.has_source() => Ok(String::new()),
            None => self.select(qb),
            Some(Dml::Insert {
                ignore,
                single,
                columns,
                rows,
                upsert,
            }) => self.insert(qb, *ignore, *single, columns, rows, upsert.as_ref()),
            Some(Dml::Update { sets }) => self.update(qb, sets),
            Some(Dml::Delete { target }) => self.delete(qb, target.as_deref()),
        }
    }

    // ==================== SELECT ====================

    pub(crate) fn select(&mut self, qb: &QueryBuilder) -> QbResult<String> {
        if let Some(e) = &qb.build_error {
            return Err(e.clone());
        }
        let mut sql = String::from("SELECT ");
        sql.push_str(&self.select_list(qb)?);
        sql.push_str(" FROM ");
        sql.push_str(&self.source(qb)?);
        sql.push_str(&self.joins(qb)?);
        sql.push_str(&self.where_clause(qb)?);
        sql.push_str(&self.group_clause(qb)?);
        sql.push_str(&self.order_clause(qb)?);
        sql.push_str(&limit_clause(qb.limit, qb.offset));
        Ok(sql)
    }

    fn select_list(&mut self, qb: &QueryBuilder) -> QbResult<String> {
        if qb.select.is_empty() {
            return Ok("*".to_string());
        }
        self.field_list(&qb.select)
    }

    fn field_list(&mut self, fields: &[Field]) -> QbResult<String> {
        let mut parts = Vec::with_capacity(fields.len());
        for f in fields {
            self.absorb(f)?;
            parts.push(f.sql());
        }
        Ok(parts.join(", "))
    }

    /// Base table, FROM subquery or union group.
    fn source(&mut self, qb: &QueryBuilder) -> QbResult<String> {
        if !qb.unions.is_empty() {
            return self.union_group(qb);
        }
        if let Some(sub) = &qb.from_sub {
            let label = sub
                .label
                .clone()
                .ok_or_else(|| QbError::DerivedTableAlias(sub.describe()))?;
            let inner = self.select(sub)?;
            return Ok(format!("({inner}) {label}"));
        }
        Ok(qb.table.reference())
    }

    fn union_group(&mut self, qb: &QueryBuilder) -> QbResult<String> {
        if !qb.table.is_empty() {
            return Err(QbError::Other(format!(
                "union root must not name a table, got '{}'",
                qb.table.qualified_name()
            )));
        }
        let label = qb
            .label
            .clone()
            .ok_or_else(|| QbError::DerivedTableAlias("<union>".to_string()))?;
        let mut out = String::from("(");
        for (i, arm) in qb.unions.iter().enumerate() {
            if i > 0 {
                out.push(' ');
                out.push_str(arm.kind.as_str());
                out.push(' ');
            }
            let arm_sql = self.select(&arm.query)?;
            out.push('(');
            out.push_str(&arm_sql);
            out.push(')');
        }
        out.push_str(") ");
        out.push_str(&label);
        Ok(out)
    }

    fn joins(&mut self, qb: &QueryBuilder) -> QbResult<String> {
        let mut out = String::new();
        for join in &qb.joins {
            let target = self.join_target(&join.target)?;
            out.push(' ');
            out.push_str(join.kind.as_str());
            out.push(' ');
            out.push_str(&target);
            self.absorb(&join.on)?;
            if !join.on.is_empty() {
                out.push_str(" ON ");
                out.push_str(join.on.sql());
            }
        }
        Ok(out)
    }

    /// Labeled targets become `(SELECT ...) label`; anything else must be a
    /// plain table.
    fn join_target(&mut self, target: &QueryBuilder) -> QbResult<String> {
        if let Some(label) = &target.label {
            let inner = self.select(target)?;
            return Ok(format!("({inner}) {label}"));
        }
        if target.is_derived() {
            return Err(QbError::DerivedTableAlias(target.describe()));
        }
        Ok(target.table.reference())
    }

    fn where_clause(&mut self, qb: &QueryBuilder) -> QbResult<String> {
        let mut parts = Vec::new();
        for cond in &qb.wheres {
            self.absorb(cond)?;
            if !cond.is_empty() {
                parts.push(cond.sql());
            }
        }
        if parts.is_empty() {
            return Ok(String::new());
        }
        Ok(format!(" WHERE {}", parts.join(" AND ")))
    }

    fn group_clause(&mut self, qb: &QueryBuilder) -> QbResult<String> {
        if qb.group.is_empty() {
            return Ok(String::new());
        }
        let mut out = format!(" GROUP BY {}", self.field_list(&qb.group)?);
        if let Some(having) = &qb.having {
            self.absorb(having)?;
            if !having.is_empty() {
                out.push_str(" HAVING ");
                out.push_str(having.sql());
            }
        }
        Ok(out)
    }

    fn order_clause(&mut self, qb: &QueryBuilder) -> QbResult<String> {
        if qb.order.is_empty() {
            return Ok(String::new());
        }
        Ok(format!(" ORDER BY {}", self.field_list(&qb.order)?))
    }

    // ==================== DML ====================

    fn insert(
        &mut self,
        qb: &QueryBuilder,
        ignore: bool,
        single: bool,
        columns: &[String],
        rows: &[Vec<Value>],
        upsert: Option<&Upsert>,
    ) -> QbResult<String> {
        if qb.table.is_empty() || columns.is_empty() || rows.is_empty() {
            return Ok(String::new());
        }
        let quoted: Vec<String> = columns.iter().map(|c| ident::normalize(c)).collect();
        let names = ident::param_names(columns);

        let mut sql = format!(
            "INSERT {}INTO {} ({}) VALUES ",
            if ignore { "IGNORE " } else { "" },
            qb.table.qualified_name(),
            quoted.join(", ")
        );
        let mut tuples = Vec::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            let mut slots = Vec::with_capacity(columns.len());
            for (name, value) in names.iter().zip(row) {
                let placeholder = if single {
                    name.clone()
                } else {
                    format!("{name}_{i}")
                };
                slots.push(format!(":{placeholder}"));
                self.bind(placeholder, value.clone())?;
            }
            tuples.push(format!("({})", slots.join(", ")));
        }
        sql.push_str(&tuples.join(", "));

        match upsert {
            Some(Upsert::Columns(cols)) if !cols.is_empty() => {
                let parts: Vec<String> = cols
                    .iter()
                    .map(|c| {
                        let q = ident::normalize(c);
                        format!("{q}=VALUES({q})")
                    })
                    .collect();
                sql.push_str(" ON DUPLICATE KEY UPDATE ");
                sql.push_str(&parts.join(", "));
            }
            Some(Upsert::Assign(sets)) if !sets.is_empty() => {
                let parts = self.assignments(sets, "_upd")?;
                sql.push_str(" ON DUPLICATE KEY UPDATE ");
                sql.push_str(&parts);
            }
            _ => {}
        }
        Ok(sql)
    }

    fn update(&mut self, qb: &QueryBuilder, sets: &[(String, Assignment)]) -> QbResult<String> {
        if qb.table.is_empty() || sets.is_empty() {
            return Ok(String::new());
        }
        let mut sql = format!("UPDATE {}", qb.table.reference());
        sql.push_str(&self.joins(qb)?);
        sql.push_str(" SET ");
        sql.push_str(&self.assignments(sets, "")?);
        sql.push_str(&self.where_clause(qb)?);
        if qb.joins.is_empty() {
            sql.push_str(&self.order_clause(qb)?);
            sql.push_str(&limit_clause(qb.limit, 0));
        }
        Ok(sql)
    }

    fn delete(&mut self, qb: &QueryBuilder, target: Option<&QueryBuilder>) -> QbResult<String> {
        if qb.table.is_empty() {
            return Ok(String::new());
        }
        let mut sql = String::from("DELETE ");
        match target {
            Some(t) => {
                sql.push_str(&delete_target_name(t));
                sql.push(' ');
            }
            // Multi-table DELETE needs an explicit target.
            None if !qb.joins.is_empty() => {
                sql.push_str(&qb.table.qualifier());
                sql.push(' ');
            }
            None => {}
        }
        sql.push_str("FROM ");
        sql.push_str(&qb.table.reference());
        sql.push_str(&self.joins(qb)?);
        sql.push_str(&self.where_clause(qb)?);
        if qb.joins.is_empty() && target.is_none() {
            sql.push_str(&self.order_clause(qb)?);
            sql.push_str(&limit_clause(qb.limit, 0));
        }
        Ok(sql)
    }

    fn assignments(&mut self, sets: &[(String, Assignment)], suffix: &str) -> QbResult<String> {
        let columns: Vec<&str> = sets.iter().map(|(c, _)| c.as_str()).collect();
        let names = ident::param_names(&columns);
        let mut parts = Vec::with_capacity(sets.len());
        for ((column, value), name) in sets.iter().zip(names) {
            let col = ident::normalize(column);
            let rhs = match value {
                Assignment::Value(v) => {
                    let name = format!("{name}{suffix}");
                    self.bind(name.clone(), v.clone())?;
                    format!(":{name}")
                }
                Assignment::Expr(f) => {
                    self.absorb(f)?;
                    f.sql().to_string()
                }
                Assignment::Set(s) => {
                    self.merge(&s.params)?;
                    s.expr.clone()
                }
            };
            parts.push(format!("{col} = {rhs}"));
        }
        Ok(parts.join(", "))
    }
}

fn delete_target_name(t: &QueryBuilder) -> String {
    match &t.label {
        Some(label) => label.clone(),
        None => t.table.qualifier(),
    }
}

/// `LIMIT n`, or MySQL's `LIMIT offset, n` when an offset is set.
fn limit_clause(limit: u64, offset: u64) -> String {
    if offset > 0 {
        format!(" LIMIT {offset}, {limit}")
    } else if limit > 0 {
        format!(" LIMIT {limit}")
    } else {
        String::new()
    }
}

impl QueryBuilder {
    pub(crate) fn has_source(&self) -> bool {
        !self.table.is_empty() || self.from_sub.is_some() || !self.unions.is_empty()
    }

    /// Render as a nested SELECT for `IN (...)`, `EXISTS (...)` or a value
    /// position.
    pub(crate) fn render_nested(&self) -> QbResult<(String, Params)> {
        if !self.has_source() {
            return Err(QbError::Other("subquery has no FROM source".to_string()));
        }
        let opts = BuildOptions::default();
        let mut r = Renderer::new(&opts);
        let sql = r.select(self)?;
        Ok((sql, r.into_params()))
    }
}
