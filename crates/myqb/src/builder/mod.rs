//! Statement builders.
//!
//! A [`QueryBuilder`] holds one FROM source (table, labeled subquery or union
//! group), joins, clause lists and an optional DML intent. The terminal
//! [`BuildSql::build`] call renders it to a [`BuiltQuery`].
//!
//! # Usage
//!
//! ```ignore
//! use myqb::prelude::*;
//!
//! // SELECT
//! let q = table("t_user")
//!     .select(["id", "name"])
//!     .and_where(eq("id", bind("id", 1)))
//!     .limit(10)
//!     .build()?;
//! // SELECT id, name FROM t_user WHERE `id` = :id LIMIT 10
//!
//! // INSERT
//! let q = table("t_user").insert_map(row! { "name" => "nick", "age" => 23 }).build()?;
//! // INSERT INTO t_user (`name`, `age`) VALUES (:name, :age)
//!
//! // UPDATE
//! let q = table("t_user")
//!     .and_where(eq("id", bind("id", 1)))
//!     .update_map([("status", 0)])
//!     .build()?;
//! // UPDATE t_user SET `status` = :status WHERE `id` = :id
//!
//! // DELETE
//! let q = table("t_user").and_where(eq("id", bind("id", 1))).delete().build()?;
//! // DELETE FROM t_user WHERE `id` = :id
//! ```

mod dml;
mod query;
mod render;
mod table;


pub use dml::{Assignment, SetExpr, set_expr};
pub use query::{JoinKind, QueryBuilder, Selection, UnionKind};
pub use render::{BuildOptions, BuiltQuery};
pub use table::Table;

use crate::error::QbResult;
use render::Renderer;

/// Terminal rendering for statement builders.
pub trait BuildSql {
    /// Render with explicit options.
    fn build_with(&self, opts: &BuildOptions) -> QbResult<BuiltQuery>;

    /// Render with default options.
    fn build(&self) -> QbResult<BuiltQuery> {
        self.build_with(&BuildOptions::default())
    }

    /// Rendered SQL, or an empty string if the builder is invalid.
    fn to_sql(&self) -> String {
        self.build().map(|q| q.sql).unwrap_or_default()
    }

    /// Check that the builder renders without error.
    fn validate(&self) -> QbResult<()> {
        self.build().map(|_| ())
    }
}

impl BuildSql for QueryBuilder {
    fn build_with(&self, opts: &BuildOptions) -> QbResult<BuiltQuery> {
        let mut renderer = Renderer::new(opts);
        let sql = renderer.statement(self)?;
        let built = BuiltQuery {
            sql,
            params: renderer.into_params(),
        };

        #[cfg(feature = "tracing")]
        {
            let kind = self.dml.as_ref().map_or("select", |d| d.kind());
            if built.is_empty() {
                tracing::debug!(target: "myqb", kind, table = %self.describe(), "nothing to build");
            } else {
                tracing::debug!(
                    target: "myqb.sql",
                    kind,
                    param_count = built.params.len(),
                    sql = %opts.truncate(&built.sql),
                    "built statement"
                );
            }
        }

        Ok(built)
    }
}
