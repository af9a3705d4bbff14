//! SQLite catalog adapter.
//!
//! # Module Structure
//! - `connection`: Existence check and read-only open
//! - `schema_collection`: `sqlite_master` enumeration and per-table pragmas
//!
//! # Security Guarantees
//! - Databases are opened read-only and never created
//! - A missing file fails before the driver is involved

mod connection;
mod schema_collection;


use super::helpers::{catalog_query_failed, check_probe_value, close_connection};
use super::{CatalogAdapter, FileDescriptor};
use crate::Result;
use crate::catalog::CatalogRows;
use crate::models::EngineKind;
use async_trait::async_trait;

pub use schema_collection::quote_identifier;

/// SQLite adapter for file-based databases.
#[derive(Debug, Clone)]
pub struct SqliteAdapter {
    descriptor: FileDescriptor,
}

impl SqliteAdapter {
    /// Creates an adapter for the file without opening it.
    pub fn new(descriptor: FileDescriptor) -> Self {
        Self { descriptor }
    }

    fn target(&self) -> String {
        format!("SQLite({})", self.descriptor.path.display())
    }
}

#[async_trait]
impl CatalogAdapter for SqliteAdapter {
    fn engine_kind(&self) -> EngineKind {
        EngineKind::Sqlite
    }

    fn database_name(&self) -> Option<String> {
        self.descriptor.display_name()
    }

    async fn fetch_rows(&self) -> Result<CatalogRows> {
        let target = self.target();
        let mut conn = self.connect().await?;

        let result = schema_collection::collect_rows(&mut conn).await;

        close_connection(conn, &target).await;
        result
    }

    async fn probe(&self) -> Result<()> {
        let target = self.target();
        let mut conn = self.connect().await?;

        let result = sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&mut conn)
            .await
            .map_err(|e| catalog_query_failed("probe query", e))
            .and_then(|value| check_probe_value(value, &target));

        close_connection(conn, &target).await;
        result
    }
}
