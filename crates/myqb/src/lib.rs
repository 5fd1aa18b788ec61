//! # myqb
//!
//! A composable MySQL query builder that renders statements to SQL with named
//! placeholders (`:name`) plus a parameter map.
//!
//! ## Features
//!
//! - **Named placeholders**: every bound value appears once in the map under
//!   the name used in the SQL text
//! - **Identifier quoting**: bare column names are backtick-quoted; numbers,
//!   quoted strings, quoted identifiers and `*` pass through
//! - **Composable**: fields, conditions, joins, unions and subqueries nest and
//!   carry their own parameters
//! - **MySQL DML**: `INSERT IGNORE`, multi-row insert, `ON DUPLICATE KEY
//!   UPDATE`, ordered `UPDATE`, multi-table `DELETE`
//! - **No panics while building**: construction errors are deferred and
//!   returned by [`BuildSql::build`]
//!
//! ## Example
//!
//! ```ignore
//! use myqb::prelude::*;
//!
//! let u = table("t_user").alias("u");
//! let i = table("t_user_info").alias("i");
//! let (uid, info_uid, city) = (u.field("id"), i.field("user_id"), i.field("city"));
//!
//! let q = u
//!     .select(["u.id", "u.name", "i.city"])
//!     .left_join(&i, uid.eq(info_uid))
//!     .and_where(city.eq(bind("city", "hangzhou")))
//!     .order([Field::new("u.id").desc()])
//!     .limit(20)
//!     .build()?;
//!
//! // SELECT u.id, u.name, i.city FROM t_user AS u
//! //   LEFT JOIN t_user_info AS i ON u.`id` = i.`user_id`
//! //   WHERE i.`city` = :city ORDER BY u.`id` DESC LIMIT 20
//! let positional = q.to_positional()?;
//! ```

pub mod bind;
pub mod builder;
pub mod error;
pub mod expr;
pub mod ident;
mod macros;
pub mod params;
pub mod prelude;
pub mod value;

pub use builder::{
    Assignment, BuildOptions, BuildSql, BuiltQuery, JoinKind, QueryBuilder, Selection, SetExpr,
    Table, UnionKind, set_expr,
};
pub use bind::PositionalQuery;
pub use error::{QbError, QbResult};
pub use expr::{Condition, Field, IntoField, Operand, SqlFragment};
pub use params::Params;
pub use value::Value;

/// Start a builder on a table.
pub fn table(name: &str) -> QueryBuilder {
    QueryBuilder::new(Table::new(name))
}

/// Start a builder on a database-qualified table (`db.name`).
pub fn table_in(database: &str, name: &str) -> QueryBuilder {
    QueryBuilder::new(Table::in_database(database, name))
}
