//! Foreign-key descriptors.

use serde::{Deserialize, Serialize};

use crate::error::{ReconcileError, Result};
use crate::identifier::validate_identifier;

/// A reference from a local column to a column of another table.
///
/// Constraints are always created with `ON DELETE CASCADE ON UPDATE
/// CASCADE`. The referenced table must exist before the constraint is
/// added; ordering models is the caller's job (or [`ModelSet`]'s).
///
/// [`ModelSet`]: crate::ordering::ModelSet
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForeignKey {
    table: String,
    column: String,
    referenced_table: String,
    referenced_column: String,
}

impl ForeignKey {
    /// Creates a foreign key from `table.column` to
    /// `referenced_table.referenced_column`.
    #[must_use]
    pub fn new(
        table: impl Into<String>,
        column: impl Into<String>,
        referenced_table: impl Into<String>,
        referenced_column: impl Into<String>,
    ) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            referenced_table: referenced_table.into(),
            referenced_column: referenced_column.into(),
        }
    }

    /// Table carrying the constraint.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Local column.
    #[must_use]
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Referenced table.
    #[must_use]
    pub fn referenced_table(&self) -> &str {
        &self.referenced_table
    }

    /// Referenced column.
    #[must_use]
    pub fn referenced_column(&self) -> &str {
        &self.referenced_column
    }

    /// Deterministic constraint name, `fk_<table>_<column>`.
    #[must_use]
    pub fn constraint_name(&self) -> String {
        format!("fk_{}_{}", self.table, self.column)
    }

    /// Returns whether the key points back at its own table.
    #[must_use]
    pub fn is_self_reference(&self) -> bool {
        self.table == self.referenced_table
    }

    /// Checks that every identifier is usable.
    pub fn validate(&self) -> Result<()> {
        for (what, name) in [
            ("table", &self.table),
            ("column", &self.column),
            ("referenced table", &self.referenced_table),
            ("referenced column", &self.referenced_column),
        ] {
            validate_identifier(name).map_err(|message| ReconcileError::InvalidDescriptor {
                table: self.table.clone(),
                message: format!("foreign key {what}: {message}"),
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_name_is_deterministic() {
        let fk = ForeignKey::new("post", "user_id", "user", "id");
        assert_eq!(fk.constraint_name(), "fk_post_user_id");
        assert_eq!(fk.constraint_name(), fk.clone().constraint_name());
        assert!(!fk.is_self_reference());
    }

    #[test]
    fn test_self_reference() {
        let fk = ForeignKey::new("category", "parent_id", "category", "id");
        assert!(fk.is_self_reference());
    }

    #[test]
    fn test_validate_rejects_empty_reference() {
        let fk = ForeignKey::new("post", "user_id", "", "id");
        assert!(fk.validate().is_err());
        assert!(ForeignKey::new("post", "user_id", "user", "id").validate().is_ok());
    }
}
