//! SQLite connection handling.
//!
//! SQLite silently creates an empty database when asked to open a path
//! that does not exist, so existence is checked before the driver sees the
//! path and the file is opened with `create_if_missing(false)` as well.

use super::SqliteAdapter;
use crate::Result;
use crate::adapters::helpers::close_connection;
use crate::error::SchemaDocError;
use sqlx::Connection;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};

impl SqliteAdapter {
    /// Builds read-only connect options for the descriptor's path.
    pub(crate) fn connect_options(&self) -> SqliteConnectOptions {
        SqliteConnectOptions::new()
            .filename(&self.descriptor.path)
            .read_only(true)
            .create_if_missing(false)
    }

    /// Opens the database file read-only.
    ///
    /// # Errors
    /// Returns `NotFound` if the file does not exist, cannot be opened, or
    /// is not a SQLite database.
    pub(crate) async fn connect(&self) -> Result<SqliteConnection> {
        let path = &self.descriptor.path;
        let target = self.target();

        match tokio::fs::try_exists(path).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::error!("Database file does not exist: {}", path.display());
                return Err(SchemaDocError::not_found(path));
            }
            Err(e) => {
                tracing::error!("Cannot access database file {}: {}", path.display(), e);
                return Err(SchemaDocError::unreadable(path, e));
            }
        }

        tracing::debug!("Opening {}", target);
        let mut conn = SqliteConnection::connect_with(&self.connect_options())
            .await
            .map_err(|e| {
                tracing::error!("Failed to open {}: {}", target, e);
                SchemaDocError::unreadable(path, e)
            })?;

        // Opening is lazy about the file header; reading the schema cookie
        // rejects files that are not SQLite databases.
        let header = sqlx::query_scalar::<_, i64>("PRAGMA schema_version")
            .fetch_one(&mut conn)
            .await;

        if let Err(e) = header {
            tracing::error!("{} is not a readable SQLite database: {}", target, e);
            close_connection(conn, &target).await;
            return Err(SchemaDocError::unreadable(path, e));
        }

        Ok(conn)
    }
}
