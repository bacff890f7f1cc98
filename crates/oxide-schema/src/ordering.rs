//! Dependency-ordered initialization.
//!
//! [`Model::init`] reconciles one model and leaves ordering to the caller:
//! a model whose foreign key points at a table that does not exist yet
//! fails. A [`ModelSet`] takes that burden away by initializing its
//! members in topological order over their declared foreign keys.

use std::collections::{HashMap, VecDeque};

use futures::future::BoxFuture;
use tracing::debug;

use crate::error::{ReconcileError, Result};
use crate::gateway::Connection;
use crate::model::Model;
use crate::registry::SchemaRegistry;
use crate::schema::ModelSchema;

type InitFn = for<'a> fn(&'a SchemaRegistry, Option<&'a Connection>) -> BoxFuture<'a, Result<()>>;
type SchemaFn = fn(&SchemaRegistry) -> std::sync::Arc<ModelSchema>;

fn init_member<'a, M: Model>(
    registry: &'a SchemaRegistry,
    connection: Option<&'a Connection>,
) -> BoxFuture<'a, Result<()>> {
    Box::pin(registry.init::<M>(connection))
}

fn schema_member<M: Model>(registry: &SchemaRegistry) -> std::sync::Arc<ModelSchema> {
    registry.schema::<M>()
}

struct Member {
    init: InitFn,
    schema: SchemaFn,
}

/// A set of models initialized together, referenced tables first.
///
/// References to tables outside the set are assumed to be satisfied
/// already; self references are ignored.
///
/// ```rust,ignore
/// ModelSet::new().with::<Post>().with::<User>().init(Some(&conn)).await?;
/// // user is created before post, whatever the registration order.
/// ```
#[derive(Default)]
pub struct ModelSet {
    members: Vec<Member>,
}

impl ModelSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `M` to the set.
    #[must_use]
    pub fn with<M: Model>(mut self) -> Self {
        self.members.push(Member {
            init: init_member::<M>,
            schema: schema_member::<M>,
        });
        self
    }

    /// Number of models in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Table names in the order they will be initialized.
    pub fn ordered_tables(&self, registry: &SchemaRegistry) -> Result<Vec<String>> {
        let schemas = self.schemas(registry);
        let order = dependency_order(&schemas)?;
        Ok(order
            .into_iter()
            .map(|i| schemas[i].table().to_string())
            .collect())
    }

    /// Initializes every model in dependency order using the global
    /// registry.
    pub async fn init(&self, connection: Option<&Connection>) -> Result<()> {
        self.init_in(SchemaRegistry::global(), connection).await
    }

    /// Initializes every model in dependency order using `registry`.
    ///
    /// A dependency cycle is reported before any DDL is issued. The first
    /// failing model stops the pass.
    pub async fn init_in(
        &self,
        registry: &SchemaRegistry,
        connection: Option<&Connection>,
    ) -> Result<()> {
        let schemas = self.schemas(registry);
        let order = dependency_order(&schemas)?;
        for i in order {
            debug!(table = %schemas[i].table(), "Initializing model set member");
            (self.members[i].init)(registry, connection).await?;
        }
        Ok(())
    }

    /// Schemas of the members, in registration order.
    #[must_use]
    pub fn schemas(&self, registry: &SchemaRegistry) -> Vec<std::sync::Arc<ModelSchema>> {
        self.members.iter().map(|m| (m.schema)(registry)).collect()
    }
}

/// Kahn's algorithm over foreign-key edges; ties keep declaration order.
fn dependency_order(schemas: &[std::sync::Arc<ModelSchema>]) -> Result<Vec<usize>> {
    let index: HashMap<&str, usize> = schemas
        .iter()
        .enumerate()
        .map(|(i, s)| (s.table(), i))
        .collect();

    let mut indegree = vec![0usize; schemas.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); schemas.len()];
    for (i, schema) in schemas.iter().enumerate() {
        for referenced in schema.referenced_tables() {
            if let Some(&j) = index.get(referenced) {
                if j != i {
                    indegree[i] += 1;
                    dependents[j].push(i);
                }
            }
        }
    }

    let mut ready: VecDeque<usize> = (0..schemas.len()).filter(|&i| indegree[i] == 0).collect();
    let mut order = Vec::with_capacity(schemas.len());
    while let Some(i) = ready.pop_front() {
        order.push(i);
        for &d in &dependents[i] {
            indegree[d] -= 1;
            if indegree[d] == 0 {
                ready.push_back(d);
            }
        }
    }

    if order.len() < schemas.len() {
        let tables = (0..schemas.len())
            .filter(|i| !order.contains(i))
            .map(|i| schemas[i].table().to_string())
            .collect();
        return Err(ReconcileError::CircularDependency { tables });
    }
    Ok(order)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::column::ColumnType;
    use crate::dialect::DdlOp;
    use crate::memory::MemoryGateway;
    use crate::schema::SchemaBuilder;

    fn id_column(schema: &mut SchemaBuilder) {
        let id = schema
            .new_column("id", ColumnType::UnsignedInteger)
            .not_null()
            .auto_increment()
            .primary_key();
        schema.register_column(id);
    }

    fn reference(schema: &mut SchemaBuilder, column: &str, table: &str) {
        let col = schema.new_column(column, ColumnType::UnsignedInteger);
        schema
            .register_column(col)
            .add_foreign_key(column, table, "id");
    }

    struct Author;
    impl Model for Author {
        fn setup(schema: &mut SchemaBuilder) {
            id_column(schema);
        }
    }

    struct Book;
    impl Model for Book {
        fn setup(schema: &mut SchemaBuilder) {
            id_column(schema);
            reference(schema, "author_id", "author");
            reference(schema, "sequel_of", "book");
        }
    }

    struct Review;
    impl Model for Review {
        fn setup(schema: &mut SchemaBuilder) {
            id_column(schema);
            reference(schema, "book_id", "book");
            reference(schema, "author_id", "author");
        }
    }

    struct Chicken;
    impl Model for Chicken {
        fn setup(schema: &mut SchemaBuilder) {
            id_column(schema);
            reference(schema, "egg_id", "egg");
        }
    }

    struct Egg;
    impl Model for Egg {
        fn setup(schema: &mut SchemaBuilder) {
            id_column(schema);
            reference(schema, "chicken_id", "chicken");
        }
    }

    #[test]
    fn test_referenced_tables_come_first() {
        let registry = SchemaRegistry::new();
        let set = ModelSet::new().with::<Review>().with::<Book>().with::<Author>();
        assert_eq!(
            set.ordered_tables(&registry).unwrap(),
            vec!["author", "book", "review"]
        );
    }

    #[test]
    fn test_cycle_detected() {
        let registry = SchemaRegistry::new();
        let set = ModelSet::new().with::<Author>().with::<Chicken>().with::<Egg>();
        match set.ordered_tables(&registry) {
            Err(ReconcileError::CircularDependency { tables }) => {
                assert_eq!(tables, vec!["chicken", "egg"]);
            }
            other => panic!("Expected circular dependency, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_init_in_dependency_order() {
        let registry = SchemaRegistry::new();
        let gateway = Arc::new(MemoryGateway::new());
        let conn: Connection = gateway.clone();

        ModelSet::new()
            .with::<Review>()
            .with::<Book>()
            .with::<Author>()
            .init_in(&registry, Some(&conn))
            .await
            .unwrap();

        let created: Vec<String> = gateway
            .ops()
            .into_iter()
            .filter_map(|op| match op {
                DdlOp::CreateTable { table, .. } => Some(table),
                _ => None,
            })
            .collect();
        assert_eq!(created, vec!["author", "book", "review"]);
        assert!(gateway.has_constraint("fk_review_book_id"));
        assert!(gateway.has_constraint("fk_book_sequel_of"));
    }

    #[tokio::test]
    async fn test_cycle_issues_no_ddl() {
        let registry = SchemaRegistry::new();
        let gateway = Arc::new(MemoryGateway::new());
        let conn: Connection = gateway.clone();

        let err = ModelSet::new()
            .with::<Chicken>()
            .with::<Egg>()
            .init_in(&registry, Some(&conn))
            .await
            .unwrap_err();
        assert!(matches!(err, ReconcileError::CircularDependency { .. }));
        assert!(gateway.statements().is_empty());
    }
}
