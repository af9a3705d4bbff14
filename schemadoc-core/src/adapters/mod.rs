//! Catalog adapters and the factory that selects one per descriptor.
//!
//! Each adapter translates one engine's catalog into the flat rows of
//! [`crate::catalog`]. Adapters hold connection options only; every call to
//! [`CatalogAdapter::fetch_rows`] or [`CatalogAdapter::probe`] opens its own
//! read-only connection and closes it before returning.
//!
//! # Module Structure
//! - `config`: Connection descriptors (networked and file-based)
//! - `helpers`: Row decoding and error classification shared by adapters
//! - Engine modules (`postgres`, `mysql`, `sqlite`), each behind its feature

use crate::Result;
use crate::catalog::CatalogRows;
use crate::models::EngineKind;
use async_trait::async_trait;

pub mod config;

pub use config::{ConnectionDescriptor, FileDescriptor, NetworkDescriptor, Secret, TlsMode};

/// Engine-specific catalog access with object-safe design.
///
/// # Security Guarantees
/// - All operations are read-only
/// - Credentials are never logged or included in errors
///
/// # Object Safety
/// This trait is object-safe, allowing dynamic dispatch through
/// `Box<dyn CatalogAdapter>`.
#[async_trait]
pub trait CatalogAdapter: Send + Sync {
    /// The engine this adapter reads.
    fn engine_kind(&self) -> EngineKind;

    /// Display name for the introspected database, if any.
    fn database_name(&self) -> Option<String>;

    /// Enumerates tables, columns, primary keys and foreign keys.
    ///
    /// # Errors
    /// - `Connection` if the connection cannot be established
    /// - `NotFound` if a SQLite file is missing or cannot be opened
    /// - `Introspection` if a catalog query fails after connecting
    async fn fetch_rows(&self) -> Result<CatalogRows>;

    /// Opens a connection, runs a trivial query and closes it again.
    ///
    /// # Errors
    /// Same classification as [`CatalogAdapter::fetch_rows`].
    async fn probe(&self) -> Result<()>;
}

/// Creates the adapter for a descriptor.
///
/// This is the only place engines are dispatched on. No connection is
/// opened here.
///
/// # Errors
/// Returns error if:
/// - The descriptor fails validation
/// - The engine's feature is not compiled in
/// - A networked descriptor names SQLite
pub fn create_adapter(descriptor: &ConnectionDescriptor) -> Result<Box<dyn CatalogAdapter>> {
    descriptor.validate()?;

    match descriptor {
        #[cfg(feature = "postgresql")]
        ConnectionDescriptor::Networked(network) if network.engine == EngineKind::Postgres => {
            Ok(Box::new(postgres::PostgresAdapter::new(network.clone())))
        }
        #[cfg(not(feature = "postgresql"))]
        ConnectionDescriptor::Networked(network) if network.engine == EngineKind::Postgres => {
            Err(crate::error::SchemaDocError::unsupported_engine(
                "PostgreSQL",
                "compile with --features postgresql to enable PostgreSQL support",
            ))
        }
        #[cfg(feature = "mysql")]
        ConnectionDescriptor::Networked(network) if network.engine == EngineKind::MySql => {
            Ok(Box::new(mysql::MySqlAdapter::new(network.clone())))
        }
        #[cfg(not(feature = "mysql"))]
        ConnectionDescriptor::Networked(network) if network.engine == EngineKind::MySql => {
            Err(crate::error::SchemaDocError::unsupported_engine(
                "MySQL",
                "compile with --features mysql to enable MySQL support",
            ))
        }
        ConnectionDescriptor::Networked(network) => {
            Err(crate::error::SchemaDocError::unsupported_engine(
                network.engine.to_string(),
                "file-based engines cannot be reached over the network",
            ))
        }
        #[cfg(feature = "sqlite")]
        ConnectionDescriptor::File(file) => Ok(Box::new(sqlite::SqliteAdapter::new(file.clone()))),
        #[cfg(not(feature = "sqlite"))]
        ConnectionDescriptor::File(_) => Err(crate::error::SchemaDocError::unsupported_engine(
            "SQLite",
            "compile with --features sqlite to enable SQLite support",
        )),
    }
}

// Shared helper utilities
#[cfg(any(feature = "postgresql", feature = "mysql", feature = "sqlite"))]
pub(crate) mod helpers;

#[cfg(feature = "postgresql")]
pub mod postgres;

#[cfg(feature = "mysql")]
pub mod mysql;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_create_adapter_per_engine() {
        let postgres = ConnectionDescriptor::from_url("postgres://app@localhost/shop").unwrap();
        let adapter = create_adapter(&postgres).unwrap();
        assert_eq!(adapter.engine_kind(), EngineKind::Postgres);
        assert_eq!(adapter.database_name().as_deref(), Some("shop"));

        let mysql = ConnectionDescriptor::from_url("mysql://app@localhost/shop").unwrap();
        let adapter = create_adapter(&mysql).unwrap();
        assert_eq!(adapter.engine_kind(), EngineKind::MySql);

        let sqlite = ConnectionDescriptor::from_url("/var/lib/app/data.db").unwrap();
        let adapter = create_adapter(&sqlite).unwrap();
        assert_eq!(adapter.engine_kind(), EngineKind::Sqlite);
        assert_eq!(adapter.database_name().as_deref(), Some("data.db"));
    }

    #[test]
    fn test_networked_sqlite_is_unsupported() {
        let descriptor = ConnectionDescriptor::Networked(NetworkDescriptor::new(
            EngineKind::Sqlite,
            "localhost",
            "main",
        )
        .with_port(1));

        let err = create_adapter(&descriptor).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::UnsupportedEngine);
    }

    #[test]
    fn test_invalid_descriptor_is_rejected_before_dispatch() {
        let descriptor = ConnectionDescriptor::Networked(
            NetworkDescriptor::new(EngineKind::Postgres, "", "shop"),
        );

        let err = create_adapter(&descriptor).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
