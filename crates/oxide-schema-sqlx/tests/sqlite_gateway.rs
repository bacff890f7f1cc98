//! Reconciliation against a real SQLite database.

use std::str::FromStr;
use std::sync::Arc;

use oxide_schema::prelude::*;
use oxide_schema::{DatabaseErrorKind, DryRunGateway, Phase};
use oxide_schema_sqlx::{GatewayOptions, SqliteGateway};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

struct User;

impl Model for User {
    fn setup(schema: &mut SchemaBuilder) {
        let id = schema
            .new_column("id", ColumnType::Integer)
            .primary_key()
            .auto_increment();
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

/// `user` as it was declared by an earlier release.
struct UserV1;

impl Model for UserV1 {
    fn setup(schema: &mut SchemaBuilder) {
        let id = schema
            .new_column("id", ColumnType::Integer)
            .primary_key()
            .auto_increment();
        let name = schema.new_column("name", ColumnType::Varchar(255)).not_null();
        schema.register_column(id).register_column(name);
    }

    fn table() -> String {
        "user".to_string()
    }
}

struct Post;

impl Model for Post {
    fn setup(schema: &mut SchemaBuilder) {
        let id = schema
            .new_column("id", ColumnType::Integer)
            .primary_key()
            .auto_increment();
        let user_id = schema.new_column("user_id", ColumnType::Integer);
        schema
            .register_column(id)
            .register_column(user_id)
            .add_foreign_key("user_id", "user", "id");
    }
}

async fn memory_gateway() -> SqliteGateway {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("Failed to create in-memory SQLite pool");
    SqliteGateway::from_pool(pool)
}

async fn column_names(gateway: &SqliteGateway, table: &str) -> Vec<String> {
    sqlx::query_as::<_, (String,)>("SELECT name FROM pragma_table_info(?) ORDER BY cid")
        .bind(table)
        .fetch_all(gateway.pool())
        .await
        .unwrap()
        .into_iter()
        .map(|(name,)| name)
        .collect()
}

#[tokio::test]
async fn test_init_creates_table_in_declaration_order() {
    let gateway = memory_gateway().await;
    let conn = gateway.clone().into_connection();
    let registry = SchemaRegistry::new();

    registry.init::<User>(Some(&conn)).await.unwrap();

    assert!(conn.table_exists("user").await.unwrap());
    assert!(conn.column_exists("user", "email").await.unwrap());
    assert!(!conn.column_exists("user", "missing").await.unwrap());
    assert_eq!(column_names(&gateway, "user").await, vec!["id", "name", "email"]);
    assert_eq!(registry.phase::<User>(), Phase::Ready);
}

#[tokio::test]
async fn test_second_init_is_noop() {
    let gateway = memory_gateway().await;
    let conn = gateway.clone().into_connection();
    let registry = SchemaRegistry::new();

    registry.init::<User>(Some(&conn)).await.unwrap();
    registry.init::<User>(Some(&conn)).await.unwrap();

    // A new process sees the table and columns and plans nothing.
    let dry = DryRunGateway::new(conn.clone());
    oxide_schema::reconcile(&dry, &registry.schema::<User>())
        .await
        .unwrap();
    assert!(dry.statements().is_empty());
}

#[tokio::test]
async fn test_redeploy_adds_column_and_keeps_rows() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}", dir.path().join("app.db").display());

    {
        let conn = SqliteGateway::connect(&url).await.unwrap().into_connection();
        SchemaRegistry::new()
            .init::<UserV1>(Some(&conn))
            .await
            .unwrap();
    }

    let gateway = SqliteGateway::connect_with(&url, GatewayOptions::default().max_connections(1))
        .await
        .unwrap();
    sqlx::query("INSERT INTO \"user\" (name) VALUES ('ada')")
        .execute(gateway.pool())
        .await
        .unwrap();

    let conn = gateway.clone().into_connection();
    let dry = DryRunGateway::new(conn.clone());
    let registry = SchemaRegistry::new();
    oxide_schema::reconcile(&dry, &registry.schema::<User>())
        .await
        .unwrap();
    let planned = dry.statements();
    assert_eq!(planned.len(), 1);
    assert!(planned[0].sql.starts_with("ALTER TABLE \"user\" ADD COLUMN \"email\""));

    // SQLite cannot add a UNIQUE column; the failure names the column.
    let err = registry.init::<User>(Some(&conn)).await.unwrap_err();
    assert!(err.to_string().contains("user.email"), "unexpected error: {err}");
    assert!(!registry.is_initialized::<User>());

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM \"user\"")
        .fetch_one(gateway.pool())
        .await
        .unwrap();
    assert_eq!(count.0, 1);
    assert_eq!(column_names(&gateway, "user").await, vec!["id", "name"]);
}

#[tokio::test]
async fn test_redeploy_adds_nullable_column() {
    struct UserV2;

    impl Model for UserV2 {
        fn setup(schema: &mut SchemaBuilder) {
            UserV1::setup(schema);
            let bio = schema.new_column("bio", ColumnType::Text);
            schema.register_column(bio);
        }

        fn table() -> String {
            "user".to_string()
        }
    }

    let gateway = memory_gateway().await;
    let conn = gateway.clone().into_connection();
    SchemaRegistry::new()
        .init::<UserV1>(Some(&conn))
        .await
        .unwrap();

    SchemaRegistry::new()
        .init::<UserV2>(Some(&conn))
        .await
        .unwrap();
    assert_eq!(column_names(&gateway, "user").await, vec!["id", "name", "bio"]);
}

#[tokio::test]
async fn test_errors_are_classified() {
    let gateway = memory_gateway().await;
    let dialect = oxide_schema::SqliteDialect::new();
    let columns = vec![Column::new("t", "a", ColumnType::Text)];

    let create = oxide_schema::DdlDialect::create_table(&dialect, "t", &columns, &[]);
    gateway.execute(&create).await.unwrap();
    let err = gateway.execute(&create).await.unwrap_err();
    assert_eq!(err.kind(), DatabaseErrorKind::AlreadyExists);

    let add = oxide_schema::DdlDialect::add_column(&dialect, "t", &columns[0]);
    let err = gateway.execute(&add).await.unwrap_err();
    assert_eq!(err.kind(), DatabaseErrorKind::AlreadyExists);
    assert!(err.message().contains("duplicate column name"));
}

async fn post_count(gateway: &SqliteGateway) -> i64 {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM post")
        .fetch_one(gateway.pool())
        .await
        .unwrap();
    count
}

#[tokio::test]
async fn test_foreign_key_cascades_on_delete() {
    let gateway = memory_gateway().await;
    let conn = gateway.clone().into_connection();
    let registry = SchemaRegistry::new();

    registry.init::<User>(Some(&conn)).await.unwrap();
    registry.init::<Post>(Some(&conn)).await.unwrap();
    assert_eq!(column_names(&gateway, "post").await, vec!["id", "user_id"]);

    sqlx::query("INSERT INTO \"user\" (id, name, email) VALUES (1, 'ada', 'ada@example.com')")
        .execute(gateway.pool())
        .await
        .unwrap();
    sqlx::query("INSERT INTO post (user_id) VALUES (1)")
        .execute(gateway.pool())
        .await
        .unwrap();

    let orphan = sqlx::query("INSERT INTO post (user_id) VALUES (99)")
        .execute(gateway.pool())
        .await;
    assert!(orphan.is_err(), "orphan post was accepted");
    assert_eq!(post_count(&gateway).await, 1);

    sqlx::query("DELETE FROM \"user\" WHERE id = 1")
        .execute(gateway.pool())
        .await
        .unwrap();
    assert_eq!(post_count(&gateway).await, 0);
}

#[tokio::test]
async fn test_foreign_key_cascades_on_update() {
    let gateway = memory_gateway().await;
    let conn = gateway.clone().into_connection();
    ModelSet::new()
        .with::<Post>()
        .with::<User>()
        .init_in(&SchemaRegistry::new(), Some(&conn))
        .await
        .unwrap();

    sqlx::query("INSERT INTO \"user\" (id, name, email) VALUES (1, 'ada', 'ada@example.com')")
        .execute(gateway.pool())
        .await
        .unwrap();
    sqlx::query("INSERT INTO post (user_id) VALUES (1)")
        .execute(gateway.pool())
        .await
        .unwrap();
    sqlx::query("UPDATE \"user\" SET id = 7 WHERE id = 1")
        .execute(gateway.pool())
        .await
        .unwrap();

    let (user_id,): (i64,) = sqlx::query_as("SELECT user_id FROM post")
        .fetch_one(gateway.pool())
        .await
        .unwrap();
    assert_eq!(user_id, 7);
}

#[tokio::test]
async fn test_connection_is_shareable() {
    let gateway = Arc::new(memory_gateway().await);
    let conn: Connection = gateway.clone();
    let registry = SchemaRegistry::new();
    registry.set_default_connection(conn);

    registry.init::<User>(None).await.unwrap();
    assert!(registry.connection::<User>().is_some());
    assert!(gateway.table_exists("user").await.unwrap());
}
