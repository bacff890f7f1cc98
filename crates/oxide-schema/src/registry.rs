//! Per-model-type lifecycle state.
//!
//! Every model type gets one [`ModelEntry`] in a [`SchemaRegistry`],
//! keyed by its `TypeId`. The entry caches the declared schema, remembers
//! the bound connection and guards the
//! `Uninitialized -> SettingUp -> Reconciling -> Ready` transition so that
//! concurrent `init` calls for the same type reconcile exactly once.
//!
//! Application code normally uses the process-wide
//! [`SchemaRegistry::global`]; separate registries behave like separate
//! processes, which is what tests use to simulate a redeploy.

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError, RwLock};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::{ReconcileError, Result};
use crate::gateway::Connection;
use crate::model::Model;
use crate::reconcile::reconcile;
use crate::schema::{ModelSchema, SchemaBuilder};

/// Lifecycle phase of a model type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Not initialized, or the last attempt failed.
    Uninitialized,
    /// Collecting the declared schema.
    SettingUp,
    /// Applying DDL.
    Reconciling,
    /// Reconciled; terminal for the registry's lifetime.
    Ready,
}

struct ModelEntry {
    type_name: &'static str,
    schema: OnceLock<Arc<ModelSchema>>,
    ready: AtomicBool,
    phase: RwLock<Phase>,
    connection: RwLock<Option<Connection>>,
    init_lock: tokio::sync::Mutex<()>,
}

impl ModelEntry {
    fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            schema: OnceLock::new(),
            ready: AtomicBool::new(false),
            phase: RwLock::new(Phase::Uninitialized),
            connection: RwLock::new(None),
            init_lock: tokio::sync::Mutex::new(()),
        }
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    fn phase(&self) -> Phase {
        *self.phase.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_phase(&self, phase: Phase) {
        *self.phase.write().unwrap_or_else(PoisonError::into_inner) = phase;
    }

    fn bind(&self, connection: Connection) {
        *self.connection.write().unwrap_or_else(PoisonError::into_inner) = Some(connection);
    }

    fn connection(&self) -> Option<Connection> {
        self.connection
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Resets the phase unless the attempt completed, so a failed or
/// cancelled `init` leaves the model eligible for retry.
struct PhaseGuard<'a> {
    entry: &'a ModelEntry,
    completed: bool,
}

impl<'a> PhaseGuard<'a> {
    fn enter(entry: &'a ModelEntry, phase: Phase) -> Self {
        entry.set_phase(phase);
        Self {
            entry,
            completed: false,
        }
    }

    fn advance(&self, phase: Phase) {
        self.entry.set_phase(phase);
    }

    fn complete(mut self) {
        self.entry.set_phase(Phase::Ready);
        self.entry.ready.store(true, Ordering::Release);
        self.completed = true;
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        if !self.completed {
            self.entry.set_phase(Phase::Uninitialized);
        }
    }
}

/// Registry of per-model-type state.
pub struct SchemaRegistry {
    entries: Mutex<HashMap<TypeId, Arc<ModelEntry>>>,
    default_connection: RwLock<Option<Connection>>,
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            default_connection: RwLock::new(None),
        }
    }

    /// The process-wide registry used by [`Model::init`].
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<SchemaRegistry> = OnceLock::new();
        GLOBAL.get_or_init(Self::new)
    }

    /// Sets the connection used when `init` is given none.
    pub fn set_default_connection(&self, connection: Connection) {
        *self
            .default_connection
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(connection);
    }

    /// Removes the default connection.
    pub fn clear_default_connection(&self) {
        *self
            .default_connection
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Returns the default connection, if one is configured.
    #[must_use]
    pub fn default_connection(&self) -> Option<Connection> {
        self.default_connection
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the declared schema of `M`, running `M::setup` on first use.
    pub fn schema<M: Model>(&self) -> Arc<ModelSchema> {
        Self::schema_of::<M>(&self.entry::<M>())
    }

    /// Returns the lifecycle phase of `M`.
    #[must_use]
    pub fn phase<M: Model>(&self) -> Phase {
        self.existing_entry::<M>()
            .map_or(Phase::Uninitialized, |entry| entry.phase())
    }

    /// Returns whether `M` has been reconciled.
    #[must_use]
    pub fn is_initialized<M: Model>(&self) -> bool {
        self.existing_entry::<M>()
            .is_some_and(|entry| entry.is_ready())
    }

    /// Returns the connection `M` was last bound to.
    #[must_use]
    pub fn connection<M: Model>(&self) -> Option<Connection> {
        self.existing_entry::<M>().and_then(|entry| entry.connection())
    }

    /// Initializes `M`: binds a connection, collects its schema and
    /// reconciles the database with it.
    ///
    /// Returns immediately once `M` is ready. Concurrent calls for the same
    /// type wait for the one in progress. On failure nothing is marked
    /// done, so the next call starts over.
    pub async fn init<M: Model>(&self, connection: Option<&Connection>) -> Result<()> {
        let entry = self.entry::<M>();
        if entry.is_ready() {
            return Ok(());
        }

        let _lock = entry.init_lock.lock().await;
        if entry.is_ready() {
            return Ok(());
        }

        let connection = connection
            .cloned()
            .or_else(|| self.default_connection())
            .ok_or_else(|| ReconcileError::Configuration {
                model: entry.type_name.to_string(),
            })?;
        entry.bind(connection.clone());

        let guard = PhaseGuard::enter(&entry, Phase::SettingUp);
        let schema = Self::schema_of::<M>(&entry);

        guard.advance(Phase::Reconciling);
        info!(model = entry.type_name, table = %schema.table(), "Reconciling model");
        if let Err(e) = reconcile(&*connection, &schema).await {
            warn!(model = entry.type_name, error = %e, "Model initialization failed");
            return Err(e);
        }

        guard.complete();
        info!(model = entry.type_name, table = %schema.table(), "Model ready");
        Ok(())
    }

    /// Like [`init`](Self::init), but gives up after `timeout`.
    ///
    /// An elapsed deadline is reported as [`ReconcileError::Cancelled`]
    /// and leaves `M` eligible for retry.
    pub async fn init_with_timeout<M: Model>(
        &self,
        connection: Option<&Connection>,
        timeout: Duration,
    ) -> Result<()> {
        if let Ok(result) = tokio::time::timeout(timeout, self.init::<M>(connection)).await {
            result
        } else {
            let table = M::table();
            warn!(table = %table, ?timeout, "Model initialization timed out");
            Err(ReconcileError::Cancelled { table })
        }
    }

    fn entry<M: Model>(&self) -> Arc<ModelEntry> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .entry(TypeId::of::<M>())
            .or_insert_with(|| Arc::new(ModelEntry::new(type_name::<M>())))
            .clone()
    }

    fn existing_entry<M: Model>(&self) -> Option<Arc<ModelEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&TypeId::of::<M>())
            .cloned()
    }

    fn schema_of<M: Model>(entry: &ModelEntry) -> Arc<ModelSchema> {
        entry
            .schema
            .get_or_init(|| {
                let mut builder = SchemaBuilder::new(M::table());
                M::setup(&mut builder);
                let schema = builder.build();
                debug!(
                    model = entry.type_name,
                    table = %schema.table(),
                    columns = ?schema.column_names(),
                    "Collected model schema"
                );
                Arc::new(schema)
            })
            .clone()
    }
}
