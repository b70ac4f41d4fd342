//! Storage-handle provider: maps a client-supplied database name to an open
//! SQLite handle. Production opens and closes one file-backed handle per
//! request; test mode reuses a single shared in-memory handle for the whole
//! process.

use crate::error::AppError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// File extension for database files under the data directory.
pub const DB_FILE_EXT: &str = "db";

/// Names returned by `list_databases` when running against the shared
/// in-memory handle, where there are no files to enumerate.
const MOCK_DATABASES: &[&str] = &["test", "testdb"];

#[derive(Clone)]
pub enum HandleProvider {
    /// One handle per request: opened on `acquire`, closed on `release`.
    PerRequest { data_dir: PathBuf },
    /// One shared in-memory handle for the process lifetime. Test isolation
    /// across cases is the caller's responsibility.
    Shared { pool: SqlitePool },
}

/// An acquired handle. `release` closes the pool only when this provider
/// opened it for the current request.
pub struct Handle {
    pool: SqlitePool,
    owned: bool,
}

impl Handle {
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn release(self) {
        if self.owned {
            self.pool.close().await;
        }
    }
}

impl HandleProvider {
    /// Production provider rooted at `data_dir`, created if missing.
    pub async fn per_request(data_dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let data_dir = data_dir.into();
        tokio::fs::create_dir_all(&data_dir).await?;
        Ok(HandleProvider::PerRequest { data_dir })
    }

    /// Test-mode provider: a single-connection in-memory pool. The connection
    /// must never be recycled, or the database contents vanish with it.
    pub async fn shared_in_memory() -> Result<Self, AppError> {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opts)
            .await?;
        Ok(HandleProvider::Shared { pool })
    }

    /// Open a handle for `name`. Any string is accepted; the backing file is
    /// created implicitly on first access.
    pub async fn acquire(&self, name: &str) -> Result<Handle, AppError> {
        match self {
            HandleProvider::PerRequest { data_dir } => {
                let opts = SqliteConnectOptions::new()
                    .filename(db_path(data_dir, name))
                    .create_if_missing(true);
                let pool = SqlitePoolOptions::new()
                    .max_connections(1)
                    .connect_with(opts)
                    .await?;
                Ok(Handle { pool, owned: true })
            }
            HandleProvider::Shared { pool } => Ok(Handle {
                pool: pool.clone(),
                owned: false,
            }),
        }
    }

    /// Enumerate database files under the data directory, extension stripped.
    pub async fn list_databases(&self) -> Result<Vec<String>, AppError> {
        match self {
            HandleProvider::PerRequest { data_dir } => {
                let mut names = Vec::new();
                let mut entries = tokio::fs::read_dir(data_dir).await?;
                while let Some(entry) = entries.next_entry().await? {
                    let path = entry.path();
                    if path.extension().and_then(|e| e.to_str()) != Some(DB_FILE_EXT) {
                        continue;
                    }
                    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                        names.push(stem.to_string());
                    }
                }
                names.sort();
                Ok(names)
            }
            HandleProvider::Shared { .. } => {
                Ok(MOCK_DATABASES.iter().map(|s| s.to_string()).collect())
            }
        }
    }

    /// Remove the backing file for `name`. Per-request handles are already
    /// closed by the time this runs; the shared handle is never torn down, so
    /// test mode succeeds without touching storage.
    pub async fn delete_database(&self, name: &str) -> Result<(), AppError> {
        match self {
            HandleProvider::PerRequest { data_dir } => {
                tokio::fs::remove_file(db_path(data_dir, name)).await?;
                Ok(())
            }
            HandleProvider::Shared { .. } => Ok(()),
        }
    }
}

fn db_path(data_dir: &Path, name: &str) -> PathBuf {
    data_dir.join(format!("{}.{}", name, DB_FILE_EXT))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lists_only_db_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let provider = HandleProvider::per_request(dir.path()).await.unwrap();
        for f in ["b.db", "a.db", "notes.txt", "c.db-journal"] {
            tokio::fs::write(dir.path().join(f), b"").await.unwrap();
        }
        let names = provider.list_databases().await.unwrap();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn acquire_creates_backing_file() {
        let dir = tempfile::tempdir().unwrap();
        let provider = HandleProvider::per_request(dir.path()).await.unwrap();
        let handle = provider.acquire("fresh").await.unwrap();
        handle.release().await;
        assert!(dir.path().join("fresh.db").exists());
    }

    #[tokio::test]
    async fn delete_database_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let provider = HandleProvider::per_request(dir.path()).await.unwrap();
        let handle = provider.acquire("doomed").await.unwrap();
        handle.release().await;
        provider.delete_database("doomed").await.unwrap();
        assert!(!dir.path().join("doomed.db").exists());
    }

    #[tokio::test]
    async fn delete_missing_database_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let provider = HandleProvider::per_request(dir.path()).await.unwrap();
        assert!(provider.delete_database("nope").await.is_err());
    }

    #[tokio::test]
    async fn shared_provider_mocks_listing_and_deletion() {
        let provider = HandleProvider::shared_in_memory().await.unwrap();
        assert_eq!(provider.list_databases().await.unwrap(), vec!["test", "testdb"]);
        provider.delete_database("anything").await.unwrap();
    }

    #[tokio::test]
    async fn shared_handle_survives_release() {
        let provider = HandleProvider::shared_in_memory().await.unwrap();
        let h1 = provider.acquire("one").await.unwrap();
        sqlx::query("CREATE TABLE t (x INTEGER)")
            .execute(h1.pool())
            .await
            .unwrap();
        h1.release().await;
        let h2 = provider.acquire("two").await.unwrap();
        sqlx::query("SELECT x FROM t").fetch_all(h2.pool()).await.unwrap();
        h2.release().await;
    }
}
