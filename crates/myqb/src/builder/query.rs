//! SELECT builder graph: base table, joins, unions and clause lists.

use super::dml::Dml;
use super::table::Table;
use crate::error::QbError;
use crate::expr::{Condition, Field};

/// Join type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Left,
    Right,
    Inner,
}

impl JoinKind {
    pub fn as_str(self) -> &'static str {
        match self {
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::Inner => "INNER JOIN",
        }
    }
}

/// Set operator placed between union arms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnionKind {
    #[default]
    Union,
    UnionAll,
}

impl UnionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            UnionKind::Union => "UNION",
            UnionKind::UnionAll => "UNION ALL",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Join {
    pub(crate) kind: JoinKind,
    pub(crate) target: QueryBuilder,
    pub(crate) on: Condition,
}

#[derive(Debug, Clone)]
pub(crate) struct UnionArm {
    pub(crate) kind: UnionKind,
    pub(crate) query: QueryBuilder,
}

/// An item of a SELECT / GROUP BY / ORDER BY list.
///
/// Strings are taken verbatim (`"id"`, `"COUNT(*) AS n"`, `"id DESC"`);
/// fields keep their rendered text and parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection(pub(crate) Field);

impl From<&str> for Selection {
    fn from(s: &str) -> Self {
        Selection(Field::raw(s))
    }
}

impl From<String> for Selection {
    fn from(s: String) -> Self {
        Selection(Field::raw(s))
    }
}

impl From<Field> for Selection {
    fn from(f: Field) -> Self {
        Selection(f)
    }
}

impl From<&Field> for Selection {
    fn from(f: &Field) -> Self {
        Selection(f.clone())
    }
}

/// The builder aggregate: one FROM source plus clause state, optionally
/// carrying a DML intent.
///
/// Builders are consumed and returned by every setter. Joined, unioned and
/// FROM sub-builders are taken by reference and cloned; later changes to
/// the source builder do not affect the parent.
///
/// # Example
/// ```ignore
/// use myqb::prelude::*;
///
/// let tu = table("t_user").alias("u");
/// let age = tu.field("age");
/// let q = tu
///     .select(["u.id", "u.name"])
///     .and_where(age.gte(bind("age", 18)))
///     .limit(10)
///     .build()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    pub(crate) table: Table,
    pub(crate) from_sub: Option<Box<QueryBuilder>>,
    /// Alias given to this builder when it is embedded as a derived table.
    pub(crate) label: Option<String>,
    pub(crate) joins: Vec<Join>,
    pub(crate) unions: Vec<UnionArm>,
    pub(crate) select: Vec<Field>,
    pub(crate) wheres: Vec<Condition>,
    pub(crate) group: Vec<Field>,
    pub(crate) having: Option<Condition>,
    pub(crate) order: Vec<Field>,
    pub(crate) limit: u64,
    pub(crate) offset: u64,
    pub(crate) dml: Option<Dml>,
    pub(crate) build_error: Option<QbError>,
}

impl QueryBuilder {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            ..Self::default()
        }
    }

    /// Builder without a base table (root of a union).
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn label_name(&self) -> Option<&str> {
        self.label.as_deref()
    }

    // ==================== Source ====================

    /// Table alias: `FROM t_user AS u`.
    pub fn alias(mut self, alias: &str) -> Self {
        self.table.set_alias(alias);
        self
    }

    /// Derived-table label used when this builder is joined or used as a FROM
    /// subquery: `(SELECT ...) label`.
    pub fn label(mut self, label: &str) -> Self {
        self.label = (!label.is_empty()).then(|| label.to_string());
        self
    }

    /// `FORCE INDEX (`index`)`
    pub fn force_index(mut self, index: &str) -> Self {
        self.table.set_force_index(index);
        self
    }

    /// Replace the FROM source with a labeled subquery.
    ///
    /// The subquery must carry a label; it becomes the qualifier used by
    /// [`field`](Self::field).
    pub fn from_sub(mut self, sub: &QueryBuilder) -> Self {
        if sub.label.is_none() {
            self.record_error(QbError::DerivedTableAlias(sub.describe()));
        }
        self.from_sub = Some(Box::new(sub.clone()));
        self
    }

    /// Column reference qualified for this builder.
    ///
    /// Qualifier: label, then FROM-subquery label, then table alias, then the
    /// qualified table name. A builder with no name yields the bare column.
    pub fn field(&self, column: &str) -> Field {
        let qualifier = self
            .label
            .clone()
            .or_else(|| self.from_sub.as_ref().and_then(|s| s.label.clone()))
            .unwrap_or_else(|| self.table.qualifier());
        if qualifier.is_empty() {
            Field::new(column)
        } else {
            Field::new(&format!("{qualifier}.{column}"))
        }
    }

    // ==================== Joins / unions ====================

    pub fn left_join(self, target: &QueryBuilder, on: Condition) -> Self {
        self.join(JoinKind::Left, target, on)
    }

    pub fn right_join(self, target: &QueryBuilder, on: Condition) -> Self {
        self.join(JoinKind::Right, target, on)
    }

    pub fn inner_join(self, target: &QueryBuilder, on: Condition) -> Self {
        self.join(JoinKind::Inner, target, on)
    }

    pub fn join(mut self, kind: JoinKind, target: &QueryBuilder, on: Condition) -> Self {
        self.joins.push(Join {
            kind,
            target: target.clone(),
            on,
        });
        self
    }

    /// Append a union arm (`UNION`).
    pub fn union(self, arm: &QueryBuilder) -> Self {
        self.union_with(UnionKind::Union, arm)
    }

    /// Append a union arm (`UNION ALL`).
    pub fn union_all(self, arm: &QueryBuilder) -> Self {
        self.union_with(UnionKind::UnionAll, arm)
    }

    /// Append a union arm; `kind` is placed before this arm. The kind of the
    /// first arm is not rendered.
    pub fn union_with(mut self, kind: UnionKind, arm: &QueryBuilder) -> Self {
        self.unions.push(UnionArm {
            kind,
            query: arm.clone(),
        });
        self
    }

    // ==================== Clauses ====================

    /// Append items to the SELECT list. Empty list renders `*`.
    pub fn select<S: Into<Selection>>(mut self, items: impl IntoIterator<Item = S>) -> Self {
        self.select
            .extend(items.into_iter().map(|s| s.into().0));
        self
    }

    /// Append a WHERE condition (conditions are joined with AND).
    pub fn and_where(mut self, cond: Condition) -> Self {
        self.wheres.push(cond);
        self
    }

    /// Append several WHERE conditions.
    pub fn where_all(mut self, conds: impl IntoIterator<Item = Condition>) -> Self {
        self.wheres.extend(conds);
        self
    }

    pub fn group<S: Into<Selection>>(mut self, items: impl IntoIterator<Item = S>) -> Self {
        self.group.extend(items.into_iter().map(|s| s.into().0));
        self
    }

    /// HAVING condition; rendered only together with GROUP BY.
    pub fn having(mut self, cond: Condition) -> Self {
        self.having = Some(cond);
        self
    }

    pub fn order<S: Into<Selection>>(mut self, items: impl IntoIterator<Item = S>) -> Self {
        self.order.extend(items.into_iter().map(|s| s.into().0));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    /// Row offset. Any non-zero offset renders `LIMIT offset, limit`.
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    /// `LIMIT 1`
    pub fn first(self) -> Self {
        self.limit(1)
    }

    // ==================== Internals ====================

    pub(crate) fn record_error(&mut self, error: QbError) {
        if self.build_error.is_none() {
            self.build_error = Some(error);
        }
    }

    /// Whether rendering this builder needs a full SELECT (not a bare table).
    pub(crate) fn is_derived(&self) -> bool {
        self.from_sub.is_some()
            || !self.unions.is_empty()
            || !self.joins.is_empty()
            || !self.select.is_empty()
            || !self.wheres.is_empty()
            || !self.group.is_empty()
            || self.having.is_some()
            || !self.order.is_empty()
            || self.limit > 0
            || self.offset > 0
    }

    /// Name used in error messages.
    pub(crate) fn describe(&self) -> String {
        if self.table.is_empty() {
            "<subquery>".to_string()
        } else {
            self.table.qualified_name()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::SqlFragment;

    #[test]
    fn field_qualifier_resolution() {
        let t = QueryBuilder::new(Table::new("t_user"));
        assert_eq!(t.field("id").sql(), "t_user.`id`");

        let t = t.alias("u");
        assert_eq!(t.field("id").sql(), "u.`id`");

        let t = t.label("info");
        assert_eq!(t.field("id").sql(), "info.`id`");

        let db = QueryBuilder::new(Table::in_database("app", "t_user"));
        assert_eq!(db.field("id").sql(), "app.t_user.`id`");

        assert_eq!(QueryBuilder::empty().field("id").sql(), "`id`");
    }

    #[test]
    fn from_sub_adopts_label() {
        let sub = QueryBuilder::new(Table::new("t_order")).label("o");
        let outer = QueryBuilder::empty().from_sub(&sub);
        assert_eq!(outer.field("amount").sql(), "o.`amount`");
        assert!(outer.build_error.is_none());
    }

    #[test]
    fn from_sub_without_label_records_error() {
        let sub = QueryBuilder::new(Table::new("t_order"));
        let outer = QueryBuilder::empty().from_sub(&sub);
        assert_eq!(
            outer.build_error,
            Some(QbError::DerivedTableAlias("t_order".into()))
        );
    }

    #[test]
    fn join_captures_copy() {
        let info = QueryBuilder::new(Table::new("t_info")).alias("i");
        let on = Field::new("u.id").eq(info.field("uid"));
        let parent = QueryBuilder::new(Table::new("t_user")).left_join(&info, on);
        let _changed = info.alias("x");
        assert_eq!(parent.joins[0].target.table.alias(), Some("i"));
    }

    #[test]
    fn first_is_limit_one() {
        assert_eq!(QueryBuilder::new(Table::new("t")).first().limit, 1);
    }
}
