//! Declarative, additive schema reconciliation.
//!
//! `oxide-schema` lets each model declare its columns and foreign keys in
//! code. At startup, [`Model::init`] compares the declaration with the live
//! database and applies only what is missing:
//!
//! - a missing table is created with every declared column,
//! - missing columns are added one `ALTER TABLE ... ADD COLUMN` at a time,
//! - foreign keys are added with `ON DELETE CASCADE ON UPDATE CASCADE`;
//!   a constraint that already exists is not an error. Engines that cannot
//!   add constraints later (SQLite) get them inside the `CREATE TABLE`.
//!
//! Nothing is ever dropped or altered. Each model type is reconciled at
//! most once per process, even when `init` is called concurrently.
//!
//! # Architecture
//!
//! - **Descriptors** - [`Column`] and [`ForeignKey`]
//! - **Dialects** - engine-specific DDL builders ([`SqliteDialect`], [`MySqlDialect`])
//! - **Gateways** - introspection and execution ([`DatabaseGateway`]);
//!   drivers live in `oxide-schema-sqlx`, [`MemoryGateway`] and
//!   [`DryRunGateway`] live here
//! - **Registry** - per-type lifecycle state ([`SchemaRegistry`])
//! - **Ordering** - dependency-ordered initialization ([`ModelSet`])
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use oxide_schema::prelude::*;
//!
//! struct User;
//!
//! impl Model for User {
//!     fn setup(schema: &mut SchemaBuilder) {
//!         let id = schema
//!             .new_column("id", ColumnType::UnsignedInteger)
//!             .not_null()
//!             .auto_increment()
//!             .primary_key();
//!         let name = schema.new_column("name", ColumnType::Varchar(255)).not_null();
//!         schema.register_column(id).register_column(name);
//!     }
//! }
//!
//! struct Post;
//!
//! impl Model for Post {
//!     fn setup(schema: &mut SchemaBuilder) {
//!         let id = schema
//!             .new_column("id", ColumnType::UnsignedInteger)
//!             .not_null()
//!             .auto_increment()
//!             .primary_key();
//!         let user_id = schema
//!             .new_column("user_id", ColumnType::UnsignedInteger)
//!             .not_null();
//!         schema
//!             .register_column(id)
//!             .register_column(user_id)
//!             .add_foreign_key("user_id", "user", "id");
//!     }
//! }
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let gateway = Arc::new(MemoryGateway::new());
//! let conn: Connection = gateway.clone();
//!
//! User::init(Some(&conn)).await?;
//! Post::init(Some(&conn)).await?;
//!
//! assert!(gateway.has_constraint("fk_post_user_id"));
//! # Ok::<(), ReconcileError>(())
//! # }).unwrap();
//! ```

pub mod column;
pub mod dialect;
pub mod dry_run;
pub mod error;
pub mod foreign_key;
pub mod gateway;
pub mod identifier;
pub mod memory;
pub mod model;
pub mod ordering;
pub mod reconcile;
pub mod registry;
pub mod schema;

pub use column::{Column, ColumnType, DefaultValue};
pub use dialect::{DdlDialect, DdlOp, DdlStatement, MySqlDialect, SqliteDialect};
pub use dry_run::DryRunGateway;
pub use error::{ReconcileError, Result, SchemaObject};
pub use foreign_key::ForeignKey;
pub use gateway::{Connection, DatabaseError, DatabaseErrorKind, DatabaseGateway};
pub use memory::MemoryGateway;
pub use model::Model;
pub use ordering::ModelSet;
pub use reconcile::reconcile;
pub use registry::{Phase, SchemaRegistry};
pub use schema::{ModelSchema, SchemaBuilder};

/// Sets the process-wide default connection used by `Model::init(None)`.
pub fn set_default_connection(connection: Connection) {
    SchemaRegistry::global().set_default_connection(connection);
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::column::{Column, ColumnType, DefaultValue};
    pub use crate::error::{ReconcileError, Result};
    pub use crate::gateway::{Connection, DatabaseGateway};
    pub use crate::memory::MemoryGateway;
    pub use crate::model::Model;
    pub use crate::ordering::ModelSet;
    pub use crate::registry::SchemaRegistry;
    pub use crate::schema::SchemaBuilder;
}
