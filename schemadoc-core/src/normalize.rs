//! Assembly of catalog rows into a [`SchemaSnapshot`].
//!
//! Normalization is a pure merge: no I/O, deterministic output for a given
//! input, so it can be tested with synthetic adapter rows.

use crate::Result;
use crate::catalog::{CatalogRows, TableKey};
use crate::models::{ColumnDescriptor, EngineKind, SchemaSnapshot, TableDescriptor};
use crate::reconstruct::{group_foreign_keys, primary_key_set};
use indexmap::IndexMap;

const POSTGRES_SYSTEM_SCHEMAS: &[&str] = &["information_schema", "pg_catalog", "pg_toast"];
const POSTGRES_TEMP_SCHEMA_PREFIXES: &[&str] = &["pg_temp_", "pg_toast_temp_"];
const MYSQL_SYSTEM_SCHEMAS: &[&str] = &["information_schema", "mysql", "performance_schema", "sys"];
const SQLITE_INTERNAL_PREFIX: &str = "sqlite_";

/// Whether a table belongs to the engine's own catalog or internals.
pub fn is_system_table(engine: EngineKind, table: &TableKey) -> bool {
    let schema = table.schema.as_deref().unwrap_or_default();
    match engine {
        EngineKind::Postgres => {
            POSTGRES_SYSTEM_SCHEMAS.contains(&schema)
                || POSTGRES_TEMP_SCHEMA_PREFIXES
                    .iter()
                    .any(|prefix| schema.starts_with(prefix))
        }
        // Reads are confined to one user database; see `is_mysql_system_database`.
        EngineKind::MySql => false,
        EngineKind::Sqlite => table.name.starts_with(SQLITE_INTERNAL_PREFIX),
    }
}

/// Whether a MySQL database name is one of the server's own catalogs.
///
/// MySQL tables carry no schema, so system catalogs cannot be filtered per
/// table; descriptors naming one are rejected up front instead.
pub fn is_mysql_system_database(name: &str) -> bool {
    MYSQL_SYSTEM_SCHEMAS
        .iter()
        .any(|system| system.eq_ignore_ascii_case(name))
}

/// Merges adapter rows into the unified snapshot.
///
/// Tables keep the order the adapter enumerated them in, columns keep the
/// engine's ordinal order. Column and constraint rows for tables that were
/// not enumerated (or were filtered as system tables) are dropped.
///
/// # Errors
/// Returns `InvalidSchema` if a reconstructed foreign key has mismatched
/// column counts.
pub fn normalize(
    engine: EngineKind,
    database: Option<String>,
    rows: CatalogRows,
) -> Result<SchemaSnapshot> {
    let primary_keys = primary_key_set(&rows.primary_keys);
    let mut foreign_keys = group_foreign_keys(&rows.foreign_keys);

    let mut columns_by_table: IndexMap<TableKey, Vec<ColumnDescriptor>> = IndexMap::new();
    for column in rows.columns {
        let is_primary_key = primary_keys.contains(&(column.table.clone(), column.name.clone()));
        columns_by_table
            .entry(column.table)
            .or_default()
            .push(ColumnDescriptor {
                name: column.name,
                data_type: column.data_type,
                is_nullable: column.is_nullable,
                default_value: column.default_value,
                is_primary_key,
            });
    }

    let mut snapshot = SchemaSnapshot::new(engine, database);
    let mut skipped = 0usize;

    for table_row in rows.tables {
        if is_system_table(engine, &table_row.table) {
            skipped += 1;
            continue;
        }

        let columns = columns_by_table
            .swap_remove(&table_row.table)
            .unwrap_or_default();
        let table_foreign_keys = foreign_keys
            .swap_remove(&table_row.table)
            .unwrap_or_default();

        let TableKey { schema, name } = table_row.table;
        let table = TableDescriptor {
            name,
            schema,
            kind: table_row.kind,
            columns,
            foreign_keys: table_foreign_keys,
        };

        for fk in &table.foreign_keys {
            fk.validate(&table.qualified_name())?;
        }

        if table.columns.is_empty() {
            tracing::warn!(
                "No columns discovered for {} '{}'",
                table.kind,
                table.qualified_name()
            );
        }

        snapshot.tables.push(table);
    }

    tracing::debug!(
        "Normalized {} tables ({} system tables skipped, {} foreign keys)",
        snapshot.tables.len(),
        skipped,
        snapshot.foreign_key_count()
    );

    Ok(snapshot)
}
