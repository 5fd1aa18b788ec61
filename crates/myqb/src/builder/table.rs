use crate::ident;

/// Base table of a statement: `db.name AS alias FORCE INDEX (`idx`)`.
///
/// Table names are emitted as given (no quoting); only the index name of a
/// FORCE INDEX hint is quoted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    database: Option<String>,
    name: String,
    alias: Option<String>,
    force_index: Option<String>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Table qualified by database: `db.name`.
    pub fn in_database(database: impl Into<String>, name: impl Into<String>) -> Self {
        let database = database.into();
        Self {
            database: (!database.is_empty()).then_some(database),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }

    pub(crate) fn set_alias(&mut self, alias: impl Into<String>) {
        let alias = alias.into();
        self.alias = (!alias.is_empty()).then_some(alias);
    }

    pub(crate) fn set_force_index(&mut self, index: impl Into<String>) {
        let index = index.into();
        self.force_index = (!index.is_empty()).then_some(index);
    }

    /// `db.name`, or `name` without a database.
    pub fn qualified_name(&self) -> String {
        match &self.database {
            Some(db) => format!("{db}.{}", self.name),
            None => self.name.clone(),
        }
    }

    /// Qualifier used for column references: alias if set, else the
    /// qualified name. Empty for an unnamed table.
    pub fn qualifier(&self) -> String {
        match &self.alias {
            Some(alias) => alias.clone(),
            None => self.qualified_name(),
        }
    }

    /// Reference as it appears after FROM / JOIN / UPDATE.
    pub fn reference(&self) -> String {
        let mut out = self.qualified_name();
        if let Some(alias) = &self.alias {
            out.push_str(" AS ");
            out.push_str(alias);
        }
        if let Some(index) = &self.force_index {
            out.push_str(" FORCE INDEX (");
            out.push_str(&ident::Normalizer::mysql().quote(index));
            out.push(')');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_forms() {
        assert_eq!(Table::new("t_user").reference(), "t_user");
        assert_eq!(Table::in_database("app", "t_user").reference(), "app.t_user");

        let mut t = Table::in_database("app", "t_user");
        t.set_alias("u");
        t.set_force_index("idx_name");
        assert_eq!(t.reference(), "app.t_user AS u FORCE INDEX (`idx_name`)");
        assert_eq!(t.qualifier(), "u");
    }

    #[test]
    fn qualifier_falls_back_to_name() {
        assert_eq!(Table::in_database("app", "t").qualifier(), "app.t");
        assert_eq!(Table::new("").qualifier(), "");
        assert_eq!(Table::in_database("", "t").database(), None);
    }
}
