#![allow(dead_code)]

use std::sync::Arc;

use oxide_schema::prelude::*;
use oxide_schema::{DdlOp, DefaultValue};

pub struct User;

impl Model for User {
    fn setup(schema: &mut SchemaBuilder) {
        let id = schema
            .new_column("id", ColumnType::UnsignedInteger)
            .not_null()
            .auto_increment()
            .primary_key();
        let name = schema.new_column("name", ColumnType::Varchar(255)).not_null();
        let email = schema
            .new_column("email", ColumnType::Varchar(255))
            .not_null()
            .unique();
        schema
            .register_column(id)
            .register_column(name)
            .register_column(email);
    }
}

pub struct Post;

impl Model for Post {
    fn setup(schema: &mut SchemaBuilder) {
        let id = schema
            .new_column("id", ColumnType::UnsignedInteger)
            .not_null()
            .auto_increment()
            .primary_key();
        let title = schema.new_column("title", ColumnType::Varchar(255)).not_null();
        let user_id = schema
            .new_column("user_id", ColumnType::UnsignedInteger)
            .not_null();
        let created_at = schema
            .new_column("created_at", ColumnType::Timestamp)
            .default(DefaultValue::Expression("CURRENT_TIMESTAMP".into()));
        schema
            .register_column(id)
            .register_column(title)
            .register_column(user_id)
            .register_column(created_at)
            .add_foreign_key("user_id", "user", "id");
    }
}

pub fn memory() -> (Arc<MemoryGateway>, Connection) {
    let gateway = Arc::new(MemoryGateway::new());
    let connection: Connection = gateway.clone();
    (gateway, connection)
}

pub fn count_ops(gateway: &MemoryGateway, pred: impl Fn(&DdlOp) -> bool) -> usize {
    gateway.ops().iter().filter(|op| pred(op)).count()
}

pub fn is_create(op: &DdlOp) -> bool {
    matches!(op, DdlOp::CreateTable { .. })
}

pub fn is_add_column(op: &DdlOp) -> bool {
    matches!(op, DdlOp::AddColumn { .. })
}

pub fn is_add_foreign_key(op: &DdlOp) -> bool {
    matches!(op, DdlOp::AddForeignKey { .. })
}
