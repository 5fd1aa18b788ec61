//! Expression layer: fields, conditions and SQL functions.
//!
//! Every fragment carries three things:
//! - its rendered SQL text (identifiers already quoted),
//! - the named parameters its placeholders refer to,
//! - an optional construction error, surfaced when the statement is built.
//!
//! Fragments compose by value: combining two fragments concatenates their SQL
//! and merges their parameter bags.
//!
//! # Example
//! ```ignore
//! use myqb::expr::{and, bind, or, Field};
//!
//! let age = Field::new("u.age");
//! let cond = and([
//!     age.gte(bind("min_age", 18)),
//!     or([Field::new("u.role").eq(bind("role", "admin")), Field::new("u.vip").eq(1)]),
//! ]);
//! // (u.`age` >= :min_age AND (u.`role` = :role OR u.`vip` = 1))
//! ```

mod condition;
mod field;
pub mod func;

pub use condition::{
    and, bind, eq, exists, gt, gte, in_, is_not_null, is_null, like, lt, lte, neq, not_eq,
    not_exists, not_exists_raw, not_in, or, raw, CompareOp, Condition, Operand,
};
pub use field::{Field, IntoField};

use crate::error::QbError;
use crate::params::Params;

/// Common view of a rendered fragment.
pub trait SqlFragment {
    /// Rendered SQL text.
    fn sql(&self) -> &str;

    /// Parameters referenced by the SQL text.
    fn params(&self) -> &Params;

    /// Construction error, if any.
    fn error(&self) -> Option<&QbError>;

    /// Placeholder names that were bound to two different values while this
    /// fragment was composed. The renderer rejects them in strict mode.
    fn conflicts(&self) -> &[String] {
        &[]
    }

    fn is_empty(&self) -> bool {
        self.sql().is_empty()
    }
}

/// Parameter/error accumulator used while composing fragments.
#[derive(Debug, Default)]
pub(crate) struct Acc {
    pub(crate) params: Params,
    pub(crate) error: Option<QbError>,
    pub(crate) conflicts: Vec<String>,
}

impl Acc {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Merge a fragment's bag (last write wins) and keep its error and
    /// recorded conflicts.
    pub(crate) fn absorb(&mut self, frag: &impl SqlFragment) {
        self.absorb_params(frag.params());
        for name in frag.conflicts() {
            self.record_conflict(name.clone());
        }
        if let Some(e) = frag.error() {
            self.fail(e.clone());
        }
    }

    pub(crate) fn absorb_params(&mut self, params: &Params) {
        for name in self.params.merge(params) {
            #[cfg(feature = "tracing")]
            tracing::warn!(target: "myqb", param = %name, "placeholder rebound to a different value, last write wins");
            self.record_conflict(name);
        }
    }

    fn record_conflict(&mut self, name: String) {
        if !self.conflicts.contains(&name) {
            self.conflicts.push(name);
        }
    }

    /// Record an error; the first one wins.
    pub(crate) fn fail(&mut self, error: QbError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }
}
