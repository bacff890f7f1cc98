//! Column descriptors.
//!
//! A [`Column`] names one database column: its owning table, its name,
//! its base type and its modifiers. Table and name are fixed when the
//! descriptor is constructed; rendering to SQL is the job of a
//! [`DdlDialect`](crate::dialect::DdlDialect).

use serde::{Deserialize, Serialize};

use crate::error::{ReconcileError, Result};
use crate::identifier::validate_identifier;

/// Base column types understood by every dialect.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    /// Signed 32-bit integer.
    Integer,
    /// Unsigned 32-bit integer.
    UnsignedInteger,
    /// Signed 64-bit integer.
    BigInt,
    /// Unsigned 64-bit integer.
    UnsignedBigInt,
    /// Variable-length string with a maximum length.
    Varchar(u32),
    /// Unbounded text.
    Text,
    /// Boolean.
    Boolean,
    /// Timestamp.
    Timestamp,
    /// Date and time.
    DateTime,
    /// Date only.
    Date,
    /// Double-precision float.
    Double,
    /// Fixed-point decimal with precision and scale.
    Decimal(u8, u8),
    /// Binary large object.
    Blob,
    /// JSON document.
    Json,
    /// Engine-specific type spelled verbatim.
    Custom(String),
}

/// Default value of a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DefaultValue {
    /// `DEFAULT NULL`.
    Null,
    /// Boolean literal (rendered as 0/1).
    Bool(bool),
    /// Integer literal.
    Integer(i64),
    /// Float literal.
    Float(f64),
    /// String literal.
    String(String),
    /// SQL expression emitted verbatim (e.g. `CURRENT_TIMESTAMP`).
    Expression(String),
}

impl DefaultValue {
    /// Returns the SQL representation of this default value.
    #[must_use]
    pub fn to_sql(&self) -> String {
        match self {
            Self::Null => "NULL".to_string(),
            Self::Bool(b) => if *b { "1" } else { "0" }.to_string(),
            Self::Integer(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::String(s) => format!("'{}'", s.replace('\'', "''")),
            Self::Expression(expr) => expr.clone(),
        }
    }
}

/// Descriptor of a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    table: String,
    name: String,
    base_type: ColumnType,
    /// `Some(false)` renders `NOT NULL`, `Some(true)` renders `NULL`.
    nullable: Option<bool>,
    default: Option<DefaultValue>,
    on_update: Option<String>,
    primary_key: bool,
    auto_increment: bool,
    unique: bool,
    extra: Option<String>,
}

impl Column {
    /// Creates a column descriptor owned by `table`.
    #[must_use]
    pub fn new(table: impl Into<String>, name: impl Into<String>, base_type: ColumnType) -> Self {
        Self {
            table: table.into(),
            name: name.into(),
            base_type,
            nullable: None,
            default: None,
            on_update: None,
            primary_key: false,
            auto_increment: false,
            unique: false,
            extra: None,
        }
    }

    /// Marks the column NOT NULL.
    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.nullable = Some(false);
        self
    }

    /// Marks the column explicitly NULL.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = Some(true);
        self
    }

    /// Marks the column as the primary key.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Marks the column as auto-incrementing.
    #[must_use]
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// Adds a UNIQUE constraint.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default(mut self, value: DefaultValue) -> Self {
        self.default = Some(value);
        self
    }

    /// Sets an `ON UPDATE` expression (ignored by dialects without it).
    #[must_use]
    pub fn on_update(mut self, expression: impl Into<String>) -> Self {
        self.on_update = Some(expression.into());
        self
    }

    /// Appends raw SQL after the generated modifiers.
    #[must_use]
    pub fn extra(mut self, sql: impl Into<String>) -> Self {
        self.extra = Some(sql.into());
        self
    }

    /// Owning table.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Base type.
    #[must_use]
    pub fn base_type(&self) -> &ColumnType {
        &self.base_type
    }

    /// Declared nullability, if any.
    #[must_use]
    pub fn is_nullable(&self) -> Option<bool> {
        self.nullable
    }

    /// Default value, if any.
    #[must_use]
    pub fn default_value(&self) -> Option<&DefaultValue> {
        self.default.as_ref()
    }

    /// `ON UPDATE` expression, if any.
    #[must_use]
    pub fn on_update_expression(&self) -> Option<&str> {
        self.on_update.as_deref()
    }

    #[must_use]
    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    #[must_use]
    pub fn is_auto_increment(&self) -> bool {
        self.auto_increment
    }

    #[must_use]
    pub fn is_unique(&self) -> bool {
        self.unique
    }

    /// Raw trailing SQL, if any.
    #[must_use]
    pub fn extra_sql(&self) -> Option<&str> {
        self.extra.as_deref()
    }

    /// Checks that table and name are usable identifiers.
    pub fn validate(&self) -> Result<()> {
        validate_identifier(&self.table).map_err(|message| ReconcileError::InvalidDescriptor {
            table: self.table.clone(),
            message: format!("column '{}' has an invalid table name: {message}", self.name),
        })?;
        validate_identifier(&self.name).map_err(|message| ReconcileError::InvalidDescriptor {
            table: self.table.clone(),
            message: format!("invalid column name: {message}"),
        })
    }
}
