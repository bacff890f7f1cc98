//! The `Model` trait.
//!
//! A model is a type that declares one table. Implement [`Model::setup`]
//! and call [`Model::init`] once at startup; the table, any missing
//! columns and any missing foreign keys are created on the first call.

use crate::error::Result;
use crate::gateway::Connection;
use crate::identifier::table_name_of;
use crate::registry::SchemaRegistry;
use crate::schema::SchemaBuilder;

/// A declarative database model.
///
/// # Example
///
/// ```rust
/// use oxide_schema::prelude::*;
///
/// struct User;
///
/// impl Model for User {
///     fn setup(schema: &mut SchemaBuilder) {
///         let id = schema
///             .new_column("id", ColumnType::UnsignedInteger)
///             .not_null()
///             .auto_increment()
///             .primary_key();
///         let email = schema
///             .new_column("email", ColumnType::Varchar(255))
///             .not_null()
///             .unique();
///         schema.register_column(id).register_column(email);
///     }
/// }
///
/// assert_eq!(User::table(), "user");
/// assert_eq!(User::columns(), vec!["id", "email"]);
/// ```
#[allow(async_fn_in_trait)]
pub trait Model: Sized + Send + Sync + 'static {
    /// Declares the model's columns and foreign keys.
    ///
    /// Called at most once per registry; the result is cached.
    fn setup(schema: &mut SchemaBuilder);

    /// Returns the table name, derived from the type name by default.
    fn table() -> String {
        table_name_of::<Self>()
    }

    /// Reconciles the model's table using the global registry.
    ///
    /// Falls back to the registry's default connection when `connection`
    /// is `None`.
    async fn init(connection: Option<&Connection>) -> Result<()> {
        SchemaRegistry::global().init::<Self>(connection).await
    }

    /// Returns the declared column names, in declaration order.
    fn columns() -> Vec<String> {
        SchemaRegistry::global().schema::<Self>().column_names()
    }
}
