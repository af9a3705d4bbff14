//! MySQL catalog adapter.
//!
//! MySQL has no schema namespace below the database: `INFORMATION_SCHEMA`
//! reports the database name in its `TABLE_SCHEMA` columns. Tables are
//! therefore reported unqualified and the database name becomes the
//! snapshot's display name.
//!
//! # Module Structure
//! - `connection`: Connect options, TLS mapping and read-only session setup
//! - `schema_collection`: `INFORMATION_SCHEMA` queries
//!
//! # Security Guarantees
//! - Sessions run with `SET SESSION TRANSACTION READ ONLY`
//! - Credentials are never logged

mod connection;
mod schema_collection;

#[cfg(test)]
mod tests;

use super::helpers::{catalog_query_failed, check_probe_value, close_connection};
use super::{CatalogAdapter, NetworkDescriptor};
use crate::Result;
use crate::catalog::CatalogRows;
use crate::models::EngineKind;
use async_trait::async_trait;

pub use connection::ssl_mode_for;

/// MySQL adapter. Holds the descriptor only; connections are opened per call.
#[derive(Debug, Clone)]
pub struct MySqlAdapter {
    descriptor: NetworkDescriptor,
}

impl MySqlAdapter {
    /// Creates an adapter for the descriptor without connecting.
    pub fn new(descriptor: NetworkDescriptor) -> Self {
        Self { descriptor }
    }

    /// The database whose catalog is read.
    ///
    /// A schema filter, when given, names the database to read: MySQL
    /// schemas and databases are the same thing.
    pub fn catalog_schema(&self) -> &str {
        self.descriptor
            .schema
            .as_deref()
            .unwrap_or(&self.descriptor.database)
    }

    fn target(&self) -> String {
        format!(
            "MySQL({}:{}/{})",
            self.descriptor.host, self.descriptor.port, self.descriptor.database
        )
    }
}

#[async_trait]
impl CatalogAdapter for MySqlAdapter {
    fn engine_kind(&self) -> EngineKind {
        EngineKind::MySql
    }

    fn database_name(&self) -> Option<String> {
        Some(self.catalog_schema().to_string())
    }

    async fn fetch_rows(&self) -> Result<CatalogRows> {
        let target = self.target();
        let mut conn = self.connect().await?;

        let result = schema_collection::collect_rows(&mut conn, self.catalog_schema()).await;

        close_connection(conn, &target).await;
        result
    }

    async fn probe(&self) -> Result<()> {
        let target = self.target();
        let mut conn = self.connect().await?;

        // SELECT 1 is BIGINT in MySQL
        let result = sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&mut conn)
            .await
            .map_err(|e| catalog_query_failed("probe query", e))
            .and_then(|value| check_probe_value(value, &target));

        close_connection(conn, &target).await;
        result
    }
}
