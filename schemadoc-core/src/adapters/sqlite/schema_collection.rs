//! SQLite catalog queries.
//!
//! # SQLite System Tables
//! - `sqlite_master`: Contains schema definitions for all database objects
//! - `PRAGMA table_info()`: Returns column information for a table
//! - `PRAGMA foreign_key_list()`: Returns foreign key information
//!
//! Pragmas take the table name as an identifier, not a bind parameter, so
//! names are quoted with [`quote_identifier`].

use crate::Result;
use crate::adapters::helpers::{RowExt, catalog_query_failed};
use crate::catalog::{
    CatalogRows, ColumnRow, ConstraintKey, ForeignKeyRow, PrimaryKeyRow, TableKey, TableRow,
};
use crate::error::SchemaDocError;
use crate::models::TableKind;
use sqlx::sqlite::SqliteConnection;
use std::collections::HashMap;

/// Wraps an identifier in double quotes, doubling embedded quotes.
///
/// ```rust
/// use schemadoc_core::adapters::sqlite::quote_identifier;
///
/// assert_eq!(quote_identifier("users"), "\"users\"");
/// assert_eq!(quote_identifier("my\"table"), "\"my\"\"table\"");
/// ```
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Enumerates tables, then reads each table's columns and foreign keys.
pub(crate) async fn collect_rows(conn: &mut SqliteConnection) -> Result<CatalogRows> {
    let start_time = std::time::Instant::now();
    tracing::info!("Starting SQLite catalog collection");

    let mut rows = CatalogRows {
        tables: collect_tables(conn).await?,
        ..CatalogRows::default()
    };

    for index in 0..rows.tables.len() {
        let table = rows.tables[index].clone();
        let (columns, primary_keys) = collect_table_columns(conn, &table.table).await?;
        rows.columns.extend(columns);
        rows.primary_keys.extend(primary_keys);

        // Views cannot declare foreign keys.
        if table.kind == TableKind::Table {
            let foreign_keys = collect_table_foreign_keys(conn, &table.table).await?;
            rows.foreign_keys.extend(foreign_keys);
        }
    }

    tracing::info!(
        "SQLite catalog collection completed in {:.2}s - {} tables, {} columns, {} foreign key columns",
        start_time.elapsed().as_secs_f64(),
        rows.tables.len(),
        rows.columns.len(),
        rows.foreign_keys.len()
    );

    Ok(rows)
}

async fn collect_tables(conn: &mut SqliteConnection) -> Result<Vec<TableRow>> {
    let tables_query = r#"
        SELECT name, type
        FROM sqlite_master
        WHERE type IN ('table', 'view')
          AND name NOT LIKE 'sqlite\_%' ESCAPE '\'
        ORDER BY name
    "#;

    let rows = sqlx::query(tables_query)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| catalog_query_failed("sqlite_master", e))?;

    tracing::debug!("Enumerated {} tables and views", rows.len());

    let mut tables = Vec::with_capacity(rows.len());
    for row in &rows {
        let name: String = row.get_field("name", None)?;
        let object_type: String = row.get_field("type", Some(name.as_str()))?;

        let kind = if object_type == "view" {
            TableKind::View
        } else {
            TableKind::Table
        };

        tables.push(TableRow {
            table: TableKey::new(None, &name),
            kind,
        });
    }

    Ok(tables)
}

async fn collect_table_columns(
    conn: &mut SqliteConnection,
    table: &TableKey,
) -> Result<(Vec<ColumnRow>, Vec<PrimaryKeyRow>)> {
    let columns_query = format!("PRAGMA table_info({})", quote_identifier(&table.name));

    let rows = sqlx::query(&columns_query)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| catalog_query_failed(&format!("table_info for '{}'", table.name), e))?;

    let context = Some(table.name.as_str());
    let mut columns = Vec::with_capacity(rows.len());
    let mut key_positions = Vec::new();

    for row in &rows {
        let name: String = row.get_field("name", context)?;
        let data_type: String = row.get_field("type", context)?;
        let notnull: i64 = row.get_field("notnull", context)?;
        let default_value: Option<String> = row.get_field("dflt_value", context)?;
        let pk: i64 = row.get_field("pk", context)?;

        if pk > 0 {
            key_positions.push((pk, name.clone()));
        }

        // PRIMARY KEY columns are NOT NULL in practice even when the
        // pragma reports notnull = 0 (INTEGER PRIMARY KEY aliases ROWID).
        columns.push(ColumnRow {
            table: table.clone(),
            name,
            data_type,
            is_nullable: notnull == 0 && pk == 0,
            default_value,
        });
    }

    // pk holds the 1-based position within the primary key
    key_positions.sort_by_key(|(position, _)| *position);
    let primary_keys = key_positions
        .into_iter()
        .map(|(_, column)| PrimaryKeyRow {
            table: table.clone(),
            column,
        })
        .collect();

    Ok((columns, primary_keys))
}

async fn collect_table_foreign_keys(
    conn: &mut SqliteConnection,
    table: &TableKey,
) -> Result<Vec<ForeignKeyRow>> {
    let fk_query = format!("PRAGMA foreign_key_list({})", quote_identifier(&table.name));

    let rows = sqlx::query(&fk_query)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| {
            catalog_query_failed(&format!("foreign_key_list for '{}'", table.name), e)
        })?;

    let context = Some(table.name.as_str());
    let mut keyed = Vec::with_capacity(rows.len());
    // Parent primary keys, looked up once per parent table.
    let mut parent_keys: HashMap<String, Vec<String>> = HashMap::new();

    for row in &rows {
        let id: i64 = row.get_field("id", context)?;
        let seq: i64 = row.get_field("seq", context)?;
        let referenced_table: String = row.get_field("table", context)?;
        // NULL when the parent's primary key is referenced implicitly
        let referenced_column: Option<String> = row.get_field("to", context)?;

        let referenced_column = match referenced_column {
            Some(column) => column,
            None => {
                if !parent_keys.contains_key(&referenced_table) {
                    let parent = TableKey::new(None, &referenced_table);
                    let (_, key_rows) = collect_table_columns(conn, &parent).await?;
                    let columns = key_rows.into_iter().map(|key| key.column).collect();
                    parent_keys.insert(referenced_table.clone(), columns);
                }
                let parent_key = parent_keys
                    .get(&referenced_table)
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                implicit_reference(parent_key, &table.name, &referenced_table, seq)?
            }
        };

        keyed.push((
            (id, seq),
            ForeignKeyRow {
                table: table.clone(),
                constraint: ConstraintKey::from_parts(None, id),
                column: row.get_field("from", context)?,
                referenced_table: TableKey::new(None, &referenced_table),
                referenced_column,
                on_update: row.get_field("on_update", context)?,
                on_delete: row.get_field("on_delete", context)?,
            },
        ));
    }

    keyed.sort_by_key(|(position, _)| *position);
    Ok(keyed.into_iter().map(|(_, row)| row).collect())
}

/// Resolves position `seq` of an implicit reference to the parent's key.
///
/// # Errors
/// Returns `InvalidSchema` if the parent has no primary key column at that
/// position (SQLite itself reports such a constraint as a mismatch).
fn implicit_reference(
    parent_key: &[String],
    table: &str,
    parent: &str,
    seq: i64,
) -> Result<String> {
    usize::try_from(seq)
        .ok()
        .and_then(|position| parent_key.get(position))
        .cloned()
        .ok_or_else(|| {
            SchemaDocError::invalid_schema(format!(
                "foreign key on '{}' references '{}' without columns, but '{}' has no primary key column at position {}",
                table, parent, parent, seq
            ))
        })
}
