//! Models managed by the command-line tool.

use oxide_schema::prelude::*;

/// Application users.
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
        let created_at = schema
            .new_column("created_at", ColumnType::Timestamp)
            .default(DefaultValue::Expression("CURRENT_TIMESTAMP".into()));
        schema
            .register_column(id)
            .register_column(name)
            .register_column(email)
            .register_column(created_at);
    }
}

/// Posts written by a [`User`].
pub struct Post;

impl Model for Post {
    fn setup(schema: &mut SchemaBuilder) {
        let id = schema
            .new_column("id", ColumnType::UnsignedInteger)
            .not_null()
            .auto_increment()
            .primary_key();
        let title = schema.new_column("title", ColumnType::Varchar(255)).not_null();
        let body = schema.new_column("body", ColumnType::Text);
        let user_id = schema
            .new_column("user_id", ColumnType::UnsignedInteger)
            .not_null();
        let published = schema
            .new_column("published", ColumnType::Boolean)
            .not_null()
            .default(DefaultValue::Bool(false));
        schema
            .register_column(id)
            .register_column(title)
            .register_column(body)
            .register_column(user_id)
            .register_column(published)
            .add_foreign_key("user_id", "user", "id");
    }
}

/// Every managed model. Registration order does not matter; referenced
/// tables are initialized first.
#[must_use]
pub fn all() -> ModelSet {
    ModelSet::new().with::<Post>().with::<User>()
}
