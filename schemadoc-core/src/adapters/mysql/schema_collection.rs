//! MySQL `INFORMATION_SCHEMA` queries.
//!
//! String columns are cast to `CHAR` because MySQL 8 reports several
//! `INFORMATION_SCHEMA` columns as `VARBINARY`, which does not decode into
//! `String`.

use crate::Result;
use crate::adapters::helpers::{RowExt, catalog_query_failed};
use crate::catalog::{
    CatalogRows, ColumnRow, ConstraintKey, ForeignKeyRow, PrimaryKeyRow, TableKey, TableRow,
};
use crate::models::TableKind;
use sqlx::mysql::MySqlConnection;

/// Runs all catalog queries for one database, sequentially.
pub(crate) async fn collect_rows(conn: &mut MySqlConnection, db_name: &str) -> Result<CatalogRows> {
    let start_time = std::time::Instant::now();
    tracing::info!("Starting MySQL catalog collection for database '{}'", db_name);

    let tables = collect_tables(conn, db_name).await?;
    let columns = collect_columns(conn, db_name).await?;
    let primary_keys = collect_primary_keys(conn, db_name).await?;
    let foreign_keys = collect_foreign_keys(conn, db_name).await?;

    tracing::info!(
        "MySQL catalog collection completed in {:.2}s - {} tables, {} columns, {} foreign key columns",
        start_time.elapsed().as_secs_f64(),
        tables.len(),
        columns.len(),
        foreign_keys.len()
    );

    Ok(CatalogRows {
        tables,
        columns,
        primary_keys,
        foreign_keys,
    })
}

async fn collect_tables(conn: &mut MySqlConnection, db_name: &str) -> Result<Vec<TableRow>> {
    let tables_query = r#"
        SELECT
            CAST(TABLE_NAME AS CHAR) AS TABLE_NAME,
            CAST(TABLE_TYPE AS CHAR) AS TABLE_TYPE
        FROM INFORMATION_SCHEMA.TABLES
        WHERE TABLE_SCHEMA = ?
          AND TABLE_TYPE IN ('BASE TABLE', 'VIEW')
        ORDER BY TABLE_NAME
    "#;

    let rows = sqlx::query(tables_query)
        .bind(db_name)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| catalog_query_failed("INFORMATION_SCHEMA.TABLES", e))?;

    tracing::debug!("Enumerated {} tables and views in '{}'", rows.len(), db_name);

    let mut tables = Vec::with_capacity(rows.len());
    for row in &rows {
        let table_name: String = row.get_field("TABLE_NAME", None)?;
        let table_type: String = row.get_field("TABLE_TYPE", Some(table_name.as_str()))?;

        let kind = if table_type.eq_ignore_ascii_case("VIEW") {
            TableKind::View
        } else {
            TableKind::Table
        };

        tables.push(TableRow {
            table: TableKey::new(None, &table_name),
            kind,
        });
    }

    Ok(tables)
}

async fn collect_columns(conn: &mut MySqlConnection, db_name: &str) -> Result<Vec<ColumnRow>> {
    // COLUMN_TYPE keeps display width, unsigned and enum members.
    let columns_query = r#"
        SELECT
            CAST(c.TABLE_NAME AS CHAR) AS TABLE_NAME,
            CAST(c.COLUMN_NAME AS CHAR) AS COLUMN_NAME,
            CAST(c.COLUMN_TYPE AS CHAR) AS COLUMN_TYPE,
            CAST(c.IS_NULLABLE AS CHAR) AS IS_NULLABLE,
            CAST(c.COLUMN_DEFAULT AS CHAR) AS COLUMN_DEFAULT
        FROM INFORMATION_SCHEMA.COLUMNS c
        WHERE c.TABLE_SCHEMA = ?
        ORDER BY c.TABLE_NAME, c.ORDINAL_POSITION
    "#;

    let rows = sqlx::query(columns_query)
        .bind(db_name)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| catalog_query_failed("INFORMATION_SCHEMA.COLUMNS", e))?;

    tracing::debug!("Enumerated {} columns in '{}'", rows.len(), db_name);

    let mut columns = Vec::with_capacity(rows.len());
    for row in &rows {
        let table_name: String = row.get_field("TABLE_NAME", None)?;
        let context = Some(table_name.as_str());
        let is_nullable: String = row.get_field("IS_NULLABLE", context)?;

        columns.push(ColumnRow {
            name: row.get_field("COLUMN_NAME", context)?,
            data_type: row.get_field("COLUMN_TYPE", context)?,
            is_nullable: is_nullable.eq_ignore_ascii_case("YES"),
            default_value: row.get_field("COLUMN_DEFAULT", context)?,
            table: TableKey::new(None, &table_name),
        });
    }

    Ok(columns)
}

async fn collect_primary_keys(
    conn: &mut MySqlConnection,
    db_name: &str,
) -> Result<Vec<PrimaryKeyRow>> {
    let pk_query = r#"
        SELECT
            CAST(kcu.TABLE_NAME AS CHAR) AS TABLE_NAME,
            CAST(kcu.COLUMN_NAME AS CHAR) AS COLUMN_NAME
        FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS tc
        JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE kcu
            ON tc.CONSTRAINT_NAME = kcu.CONSTRAINT_NAME
            AND tc.TABLE_SCHEMA = kcu.TABLE_SCHEMA
            AND tc.TABLE_NAME = kcu.TABLE_NAME
        WHERE tc.TABLE_SCHEMA = ?
          AND tc.CONSTRAINT_TYPE = 'PRIMARY KEY'
        ORDER BY kcu.TABLE_NAME, kcu.ORDINAL_POSITION
    "#;

    let rows = sqlx::query(pk_query)
        .bind(db_name)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| catalog_query_failed("primary key constraints", e))?;

    let mut primary_keys = Vec::with_capacity(rows.len());
    for row in &rows {
        let table_name: String = row.get_field("TABLE_NAME", None)?;

        primary_keys.push(PrimaryKeyRow {
            column: row.get_field("COLUMN_NAME", Some(table_name.as_str()))?,
            table: TableKey::new(None, &table_name),
        });
    }

    Ok(primary_keys)
}

async fn collect_foreign_keys(
    conn: &mut MySqlConnection,
    db_name: &str,
) -> Result<Vec<ForeignKeyRow>> {
    let fk_query = r#"
        SELECT
            CAST(kcu.TABLE_NAME AS CHAR) AS TABLE_NAME,
            CAST(kcu.CONSTRAINT_NAME AS CHAR) AS CONSTRAINT_NAME,
            CAST(kcu.COLUMN_NAME AS CHAR) AS COLUMN_NAME,
            CAST(kcu.REFERENCED_TABLE_SCHEMA AS CHAR) AS REFERENCED_TABLE_SCHEMA,
            CAST(kcu.REFERENCED_TABLE_NAME AS CHAR) AS REFERENCED_TABLE_NAME,
            CAST(kcu.REFERENCED_COLUMN_NAME AS CHAR) AS REFERENCED_COLUMN_NAME,
            CAST(rc.UPDATE_RULE AS CHAR) AS UPDATE_RULE,
            CAST(rc.DELETE_RULE AS CHAR) AS DELETE_RULE
        FROM INFORMATION_SCHEMA.KEY_COLUMN_USAGE kcu
        JOIN INFORMATION_SCHEMA.REFERENTIAL_CONSTRAINTS rc
            ON kcu.CONSTRAINT_NAME = rc.CONSTRAINT_NAME
            AND kcu.TABLE_SCHEMA = rc.CONSTRAINT_SCHEMA
            AND kcu.TABLE_NAME = rc.TABLE_NAME
        WHERE kcu.TABLE_SCHEMA = ?
          AND kcu.REFERENCED_TABLE_NAME IS NOT NULL
        ORDER BY kcu.TABLE_NAME, kcu.CONSTRAINT_NAME, kcu.ORDINAL_POSITION
    "#;

    let rows = sqlx::query(fk_query)
        .bind(db_name)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| catalog_query_failed("INFORMATION_SCHEMA.KEY_COLUMN_USAGE", e))?;

    tracing::debug!("Enumerated {} foreign key column pairs in '{}'", rows.len(), db_name);

    let mut foreign_keys = Vec::with_capacity(rows.len());
    for row in &rows {
        let table_name: String = row.get_field("TABLE_NAME", None)?;
        let context = Some(table_name.as_str());
        let constraint_name: String = row.get_field("CONSTRAINT_NAME", context)?;
        let referenced_schema: Option<String> = row.get_field("REFERENCED_TABLE_SCHEMA", context)?;
        let referenced_table: String = row.get_field("REFERENCED_TABLE_NAME", context)?;

        foreign_keys.push(ForeignKeyRow {
            table: TableKey::new(None, &table_name),
            constraint: ConstraintKey::Named(constraint_name),
            column: row.get_field("COLUMN_NAME", context)?,
            referenced_table: TableKey::new(
                referenced_schema_for(referenced_schema.as_deref(), db_name),
                &referenced_table,
            ),
            referenced_column: row.get_field("REFERENCED_COLUMN_NAME", context)?,
            on_update: row.get_field("UPDATE_RULE", context)?,
            on_delete: row.get_field("DELETE_RULE", context)?,
        });
    }

    Ok(foreign_keys)
}

/// Keeps the referenced schema only when it points outside the current database.
pub(crate) fn referenced_schema_for<'a>(referenced: Option<&'a str>, db_name: &str) -> Option<&'a str> {
    referenced.filter(|schema| *schema != db_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_referenced_schema_for() {
        assert_eq!(referenced_schema_for(Some("shop"), "shop"), None);
        assert_eq!(referenced_schema_for(Some("billing"), "shop"), Some("billing"));
        assert_eq!(referenced_schema_for(None, "shop"), None);
    }
}
