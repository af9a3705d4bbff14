//! PostgreSQL catalog adapter.
//!
//! # Module Structure
//! - `connection`: Connect options, TLS mapping and read-only session setup
//! - `schema_collection`: Catalog queries for tables, columns and constraints
//!
//! # Security Guarantees
//! - Sessions run with `default_transaction_read_only = on`
//! - Credentials are never logged; the adapter's `Display` omits them

mod connection;
mod schema_collection;

#[cfg(test)]
mod tests;

use super::helpers::{check_probe_value, close_connection};
use super::{CatalogAdapter, NetworkDescriptor};
use crate::Result;
use crate::catalog::CatalogRows;
use crate::models::EngineKind;
use async_trait::async_trait;

pub use connection::ssl_mode_for;

/// PostgreSQL adapter. Holds the descriptor only; connections are opened per call.
#[derive(Debug, Clone)]
pub struct PostgresAdapter {
    descriptor: NetworkDescriptor,
}

impl PostgresAdapter {
    /// Creates an adapter for the descriptor without connecting.
    pub fn new(descriptor: NetworkDescriptor) -> Self {
        Self { descriptor }
    }

    /// Redacted connection target for logs and error context.
    fn target(&self) -> String {
        format!(
            "PostgreSQL({}:{}/{})",
            self.descriptor.host, self.descriptor.port, self.descriptor.database
        )
    }
}

#[async_trait]
impl CatalogAdapter for PostgresAdapter {
    fn engine_kind(&self) -> EngineKind {
        EngineKind::Postgres
    }

    fn database_name(&self) -> Option<String> {
        Some(self.descriptor.database.clone())
    }

    async fn fetch_rows(&self) -> Result<CatalogRows> {
        let target = self.target();
        let mut conn = self.connect().await?;

        let result = schema_collection::collect_rows(&mut conn, self.descriptor.schema.as_deref()).await;

        close_connection(conn, &target).await;
        result
    }

    async fn probe(&self) -> Result<()> {
        let target = self.target();
        let mut conn = self.connect().await?;

        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&mut conn)
            .await
            .map_err(|e| super::helpers::catalog_query_failed("probe query", e))
            .and_then(|value| check_probe_value(i64::from(value), &target));

        close_connection(conn, &target).await;
        result
    }
}
