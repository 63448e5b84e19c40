use std::str::FromStr;

use anyhow::{Context, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite,
};
use tracing::{info, warn};

use crate::models::{LifecyclePhase, PhaseTransition};

/// SQLite journal of observed phase transitions
pub struct TransitionStore {
    pool: Pool<Sqlite>,
}

impl TransitionStore {
    /// Create a new transition store and initialize the database
    pub async fn new(database_url: &str) -> Result<Self> {
        // Create data directory if needed
        if let Some(path) = database_url.strip_prefix("sqlite:") {
            if let Some(parent) = std::path::Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .context("Failed to create database directory")?;
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)
            .context("Invalid database URL")?
            .create_if_missing(true);

        // In-memory databases are per connection
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;

        let store = Self { pool };
        store.init_schema().await?;

        info!("Transition store initialized");
        Ok(store)
    }

    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS phase_transitions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                match_id TEXT NOT NULL,
                sport TEXT NOT NULL,
                from_phase TEXT,
                to_phase TEXT NOT NULL,
                observed_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create phase_transitions table")?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_transitions_match
            ON phase_transitions (match_id)
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_transitions_observed
            ON phase_transitions (observed_at)
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert a new transition
    pub async fn insert_transition(&self, transition: &PhaseTransition) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO phase_transitions (
                match_id,
                sport,
                from_phase,
                to_phase,
                observed_at
            ) VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&transition.match_id)
        .bind(&transition.sport)
        .bind(transition.from.as_ref().map(|p| p.as_str().to_string()))
        .bind(transition.to.as_str())
        .bind(transition.observed_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to insert transition")?;

        Ok(result.last_insert_rowid())
    }

    /// Get transitions for a match, most recent first
    pub async fn get_transitions_for_match(
        &self,
        match_id: &str,
        limit: i64,
    ) -> Result<Vec<PhaseTransition>> {
        let rows = sqlx::query_as::<_, TransitionRow>(
            r#"
            SELECT * FROM phase_transitions
            WHERE match_id = ?
            ORDER BY observed_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(match_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch transitions")?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    pub async fn get_transition_count(&self) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM phase_transitions")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count transitions")?;

        Ok(row.0)
    }
}

#[derive(sqlx::FromRow)]
struct TransitionRow {
    id: i64,
    match_id: String,
    sport: String,
    from_phase: Option<String>,
    to_phase: String,
    observed_at: String,
}

impl From<TransitionRow> for PhaseTransition {
    fn from(row: TransitionRow) -> Self {
        PhaseTransition {
            id: Some(row.id),
            match_id: row.match_id,
            sport: row.sport,
            from: row.from_phase.as_deref().map(LifecyclePhase::parse),
            to: LifecyclePhase::parse(&row.to_phase),
            observed_at: chrono::DateTime::parse_from_rfc3339(&row.observed_at)
                .map(|dt| dt.with_timezone(&chrono::Utc))
                .unwrap_or_else(|e| {
                    warn!(
                        "Transition {} has unparseable observed_at {:?}: {}",
                        row.id, row.observed_at, e
                    );
                    chrono::Utc::now()
                }),
        }
    }
}
