//! `SQLite` persistence of resource state and apply runs.

use chrono::{DateTime, Utc};
use fnapp_core::ResourceData;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

/// Errors raised by the state store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database error
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Stored attributes could not be (de)serialized
    #[error("state serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Stored timestamp is not RFC 3339
    #[error("invalid timestamp {0:?}")]
    Timestamp(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// One recorded apply run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyRun {
    /// Resource address
    pub address: String,
    /// Action taken, see [`crate::plan::Action::as_str`]
    pub action: String,
    /// Whether the action succeeded
    pub succeeded: bool,
    /// Failure message
    pub error: Option<String>,
    /// Start of the run
    pub started_at: DateTime<Utc>,
    /// End of the run
    pub finished_at: DateTime<Utc>,
}

/// `SQLite`-backed state store.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open or create a `SQLite` database.
    ///
    /// # Errors
    ///
    /// Returns error if database cannot be opened or initialized.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory database.
    ///
    /// # Errors
    ///
    /// Returns error if database cannot be created.
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StoreResult<()> {
        self.conn.execute_batch(
            r"
            -- Last known state per resource address
            CREATE TABLE IF NOT EXISTS resources (
                address TEXT PRIMARY KEY,
                resource_id TEXT,
                attributes_json TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            -- Apply log
            CREATE TABLE IF NOT EXISTS apply_runs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                address TEXT NOT NULL,
                action TEXT NOT NULL,
                succeeded INTEGER NOT NULL,
                error TEXT,
                started_at TEXT NOT NULL,
                finished_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_apply_runs_address ON apply_runs(address);
            ",
        )?;

        Ok(())
    }

    /// Save the state of a resource.
    ///
    /// # Errors
    ///
    /// Returns error if serialization or the insert fails.
    pub fn save_resource(&self, address: &str, data: &ResourceData) -> StoreResult<()> {
        let attributes = serde_json::to_string(data)?;
        let now = Utc::now().to_rfc3339();

        self.conn.execute(
            r"
            INSERT OR REPLACE INTO resources (address, resource_id, attributes_json, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ",
            (address, data.id.as_deref(), attributes, now),
        )?;

        Ok(())
    }

    /// Load the state of a resource.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails or the stored state is unreadable.
    pub fn load_resource(&self, address: &str) -> StoreResult<Option<ResourceData>> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT attributes_json FROM resources WHERE address = ?1",
                [address],
                |row| row.get(0),
            )
            .optional()?;

        json.map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(StoreError::from)
    }

    /// Forget a resource.
    ///
    /// # Errors
    ///
    /// Returns error if the delete fails.
    pub fn remove_resource(&self, address: &str) -> StoreResult<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM resources WHERE address = ?1", [address])?;
        Ok(deleted > 0)
    }

    /// Append a run to the apply log.
    ///
    /// # Errors
    ///
    /// Returns error if the insert fails.
    pub fn record_run(&self, run: &ApplyRun) -> StoreResult<()> {
        self.conn.execute(
            r"
            INSERT INTO apply_runs (address, action, succeeded, error, started_at, finished_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
            (
                &run.address,
                &run.action,
                run.succeeded,
                run.error.as_deref(),
                run.started_at.to_rfc3339(),
                run.finished_at.to_rfc3339(),
            ),
        )?;

        Ok(())
    }

    /// Most recent runs for an address, newest first.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    pub fn recent_runs(&self, address: &str, limit: usize) -> StoreResult<Vec<ApplyRun>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT address, action, succeeded, error, started_at, finished_at FROM apply_runs
            WHERE address = ?1
            ORDER BY id DESC
            LIMIT ?2
            ",
        )?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt
            .query_map((address, limit), |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, bool>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(address, action, succeeded, error, started_at, finished_at)| {
                Ok(ApplyRun {
                    address,
                    action,
                    succeeded,
                    error,
                    started_at: parse_timestamp(&started_at)?,
                    finished_at: parse_timestamp(&finished_at)?,
                })
            })
            .collect()
    }
}

fn parse_timestamp(value: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| StoreError::Timestamp(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fnapp_core::FunctionAppConfig;

    const ID: &str = "/subscriptions/s/resourceGroups/rg/providers/Microsoft.Web/sites/app";

    #[test]
    fn resource_state_roundtrip() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.load_resource("app").unwrap().is_none());

        let data = ResourceData::with_id(
            ID,
            FunctionAppConfig::new("app", "rg", "westeurope", "plan", "conn"),
        );
        store.save_resource("app", &data).unwrap();
        assert_eq!(store.load_resource("app").unwrap(), Some(data.clone()));

        let mut gone = data;
        gone.clear_id();
        store.save_resource("app", &gone).unwrap();
        assert!(!store.load_resource("app").unwrap().unwrap().exists());

        assert!(store.remove_resource("app").unwrap());
        assert!(!store.remove_resource("app").unwrap());
    }

    #[test]
    fn runs_newest_first() {
        let store = SqliteStore::in_memory().unwrap();
        let now = Utc::now();

        for (action, error) in [("create", None), ("update", Some("boom".to_string()))] {
            store
                .record_run(&ApplyRun {
                    address: "app".to_string(),
                    action: action.to_string(),
                    succeeded: error.is_none(),
                    error,
                    started_at: now,
                    finished_at: now,
                })
                .unwrap();
        }

        let runs = store.recent_runs("app", 10).unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].action, "update");
        assert!(!runs[0].succeeded);
        assert_eq!(runs[0].error.as_deref(), Some("boom"));
        assert_eq!(runs[1].action, "create");
        assert!(store.recent_runs("other", 10).unwrap().is_empty());
    }
}
