//! Core library for schemadoc.
//!
//! Reads the catalog of a PostgreSQL, MySQL or SQLite database, rebuilds
//! its multi-column constraints, and renders the result as a deterministic
//! markdown (or JSON) document.
//!
//! # Security Guarantees
//! - All database sessions are read-only
//! - SQLite files are never created
//! - Credentials are never logged or included in errors
//!
//! # Architecture
//! The pipeline runs in four stages:
//! - an engine adapter fetches flat catalog rows over one connection
//! - `reconstruct` groups multi-column constraints
//! - `normalize` assembles the engine-agnostic [`SchemaSnapshot`]
//! - `render` turns the snapshot into text
//!
//! # Example
//! ```rust,no_run
//! use schemadoc_core::{ConnectionDescriptor, OutputFormat, generate_document};
//!
//! # async fn run() -> schemadoc_core::Result<()> {
//! let descriptor = ConnectionDescriptor::from_url("sqlite:///var/lib/app/app.db")?;
//! let markdown = generate_document(&descriptor, OutputFormat::Markdown).await?;
//! print!("{}", markdown);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod catalog;
pub mod error;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod probe;
pub mod reconstruct;
pub mod render;

// Re-export commonly used types
pub use adapters::{
    CatalogAdapter, ConnectionDescriptor, FileDescriptor, NetworkDescriptor, Secret, TlsMode,
    create_adapter,
};
pub use error::{ErrorKind, Result, SchemaDocError};
pub use models::{
    ColumnDescriptor, EngineKind, ForeignKeyDescriptor, SchemaSnapshot, TableDescriptor,
    TableKind, TableRef,
};
pub use probe::probe;
pub use render::{DocumentRenderer, JsonRenderer, MarkdownRenderer, OutputFormat, render_document};

use chrono::Utc;

/// Introspects the database behind a descriptor.
///
/// Every call opens a fresh connection; nothing is cached between calls.
///
/// # Errors
/// - `Configuration` if the descriptor is invalid
/// - `UnsupportedEngine` if no adapter handles it
/// - `Connection`, `NotFound` or `Introspection` from the adapter
/// - `InvalidSchema` if reconstructed foreign keys are malformed
pub async fn introspect(descriptor: &ConnectionDescriptor) -> Result<SchemaSnapshot> {
    let start_time = std::time::Instant::now();
    let adapter = create_adapter(descriptor)?;

    tracing::info!("Introspecting {}", descriptor);

    let rows = adapter.fetch_rows().await.inspect_err(|e| {
        tracing::error!("Introspection of {} failed: {}", descriptor, e);
    })?;

    let snapshot = normalize::normalize(adapter.engine_kind(), adapter.database_name(), rows)?;

    tracing::info!(
        "Introspected {} in {:.2}s - {} tables, {} foreign keys",
        descriptor,
        start_time.elapsed().as_secs_f64(),
        snapshot.tables.len(),
        snapshot.foreign_key_count()
    );

    Ok(snapshot)
}

/// Introspects a database and renders the result, stamped with the current time.
///
/// # Errors
/// Everything [`introspect`] and [`render_document`] can return.
pub async fn generate_document(
    descriptor: &ConnectionDescriptor,
    format: OutputFormat,
) -> Result<String> {
    let snapshot = introspect(descriptor).await?;
    render_document(&snapshot, format, Utc::now())
}
