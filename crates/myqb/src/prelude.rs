//! Convenient imports for typical `myqb` usage.
//!
//! ```ignore
//! use myqb::prelude::*;
//! ```

pub use crate::expr::func;
pub use crate::expr::{
    and, bind, eq, exists, gt, gte, in_, is_not_null, is_null, like, lt, lte, neq, not_eq,
    not_exists, not_in, or,
};
pub use crate::{
    BuildOptions, BuildSql, BuiltQuery, Condition, Field, QbError, QbResult, QueryBuilder,
    SqlFragment, Value, row, set_expr, table, table_in,
};
