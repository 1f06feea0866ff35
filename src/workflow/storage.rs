/// SQLite persistence layer for workflow storage
///
/// Each workflow is stored as one JSON record keyed by its id. Saves are full
/// snapshot upserts, so repeating a save with unchanged data is harmless.

use crate::workflow::types::Workflow;
use anyhow::{Context, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
    Row,
};
use std::path::Path;

/// File name of the store inside the configured data directory
pub const STORE_FILE: &str = "workflows.db";

/// SQLite-backed workflow store
#[derive(Debug, Clone)]
pub struct WorkflowStorage {
    pool: SqlitePool,
}

impl WorkflowStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if needed) the store under `data_dir` and initialize the schema
    pub async fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        std::fs::create_dir_all(data_dir).with_context(|| {
            format!("Failed to create data directory '{}'", data_dir.display())
        })?;
        let db_path = data_dir.join(STORE_FILE);

        tracing::info!("🗄️ Opening workflow store: {}", db_path.display());

        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;

        let storage = Self::new(pool);
        storage.init_schema().await?;
        Ok(storage)
    }

    /// Private in-memory store; lives as long as this value and its clones
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        let storage = Self::new(pool);
        storage.init_schema().await?;
        Ok(storage)
    }

    /// Create the workflows table. Safe to call multiple times.
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS workflows (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                definition TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_workflows_updated ON workflows(updated_at)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Fresh workflow with a new id. Nothing is written until the first save.
    pub fn create_new_workflow(&self) -> Workflow {
        Workflow::new()
    }

    /// Insert or overwrite the full workflow record
    pub async fn save_workflow(&self, workflow: &Workflow) -> Result<()> {
        let definition_json = serde_json::to_string(workflow)?;
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO workflows (id, title, definition, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                definition = excluded.definition,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&workflow.id)
        .bind(&workflow.title)
        .bind(&definition_json)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        tracing::debug!("💾 Saved workflow '{}' ({} nodes)", workflow.id, workflow.nodes.len());
        Ok(())
    }

    pub async fn get_workflow(&self, id: &str) -> Result<Option<Workflow>> {
        let row = sqlx::query("SELECT definition FROM workflows WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let definition_json: String = row.try_get("definition")?;
                let workflow: Workflow = serde_json::from_str(&definition_json)
                    .with_context(|| format!("Corrupt workflow record: {}", id))?;
                Ok(Some(workflow))
            }
            None => Ok(None),
        }
    }

    /// All stored workflows, most recently updated first
    pub async fn list_workflows(&self) -> Result<Vec<WorkflowMetadata>> {
        let rows = sqlx::query(
            "SELECT id, title, created_at, updated_at FROM workflows ORDER BY updated_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut workflows = Vec::with_capacity(rows.len());
        for row in rows {
            workflows.push(WorkflowMetadata {
                id: row.try_get("id")?,
                title: row.try_get("title")?,
                created_at: row.try_get("created_at")?,
                updated_at: row.try_get("updated_at")?,
            });
        }

        Ok(workflows)
    }
}

/// Listing entry for the workflow dashboard
#[derive(Debug, Clone, serde::Serialize)]
pub struct WorkflowMetadata {
    pub id: String,
    pub title: String,
    pub created_at: String,
    pub updated_at: String,
}
