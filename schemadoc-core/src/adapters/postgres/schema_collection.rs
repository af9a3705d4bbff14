//! PostgreSQL catalog queries.
//!
//! Tables, columns and primary keys come from `information_schema`. Foreign
//! keys are read from `pg_constraint` directly, because the
//! `information_schema` views cannot pair local and referenced columns of a
//! multi-column constraint reliably.

use crate::Result;
use crate::adapters::helpers::{RowExt, catalog_query_failed};
use crate::catalog::{
    CatalogRows, ColumnRow, ConstraintKey, ForeignKeyRow, PrimaryKeyRow, TableKey, TableRow,
};
use crate::models::TableKind;
use sqlx::postgres::PgConnection;

/// Builds the `WHERE` fragment excluding system schemas and applying the
/// optional schema filter, bound as `$1`.
fn schema_filter(column: &str) -> String {
    format!(
        "{column} NOT IN ('information_schema', 'pg_catalog', 'pg_toast') \
         AND {column} NOT LIKE 'pg\\_temp\\_%' \
         AND {column} NOT LIKE 'pg\\_toast\\_temp\\_%' \
         AND ($1::text IS NULL OR {column}::text = $1)"
    )
}

/// Runs all catalog queries on one connection, sequentially.
pub(crate) async fn collect_rows(
    conn: &mut PgConnection,
    schema: Option<&str>,
) -> Result<CatalogRows> {
    let start_time = std::time::Instant::now();
    tracing::info!(
        "Starting PostgreSQL catalog collection (schema filter: {})",
        schema.unwrap_or("<all>")
    );

    let tables = collect_tables(conn, schema).await?;
    let columns = collect_columns(conn, schema).await?;
    let primary_keys = collect_primary_keys(conn, schema).await?;
    let foreign_keys = collect_foreign_keys(conn, schema).await?;

    tracing::info!(
        "PostgreSQL catalog collection completed in {:.2}s - {} tables, {} columns, {} foreign key columns",
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

async fn collect_tables(conn: &mut PgConnection, schema: Option<&str>) -> Result<Vec<TableRow>> {
    let query = format!(
        r#"
        SELECT
            table_schema::text AS table_schema,
            table_name::text AS table_name,
            table_type::text AS table_type
        FROM information_schema.tables
        WHERE table_type IN ('BASE TABLE', 'VIEW')
          AND {}
        ORDER BY table_schema, table_name
        "#,
        schema_filter("table_schema")
    );

    let rows = sqlx::query(&query)
        .bind(schema)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| catalog_query_failed("information_schema.tables", e))?;

    tracing::debug!("Enumerated {} tables and views", rows.len());

    let mut result = Vec::with_capacity(rows.len());
    for row in &rows {
        let table_schema: String = row.get_field("table_schema", None)?;
        let table_name: String = row.get_field("table_name", None)?;
        let table_type: String = row.get_field("table_type", Some(table_name.as_str()))?;

        result.push(TableRow {
            table: TableKey::new(Some(&table_schema), &table_name),
            kind: table_kind(&table_type),
        });
    }

    Ok(result)
}

async fn collect_columns(conn: &mut PgConnection, schema: Option<&str>) -> Result<Vec<ColumnRow>> {
    // format_type gives the declared type with modifiers (varchar(255),
    // numeric(10,2), user-defined enum names); data_type is the fallback.
    let query = format!(
        r#"
        SELECT
            c.table_schema::text AS table_schema,
            c.table_name::text AS table_name,
            c.column_name::text AS column_name,
            COALESCE(format_type(a.atttypid, a.atttypmod), c.data_type)::text AS data_type,
            (c.is_nullable = 'YES') AS is_nullable,
            c.column_default::text AS column_default
        FROM information_schema.columns c
        LEFT JOIN pg_catalog.pg_namespace n ON n.nspname = c.table_schema
        LEFT JOIN pg_catalog.pg_class cl
            ON cl.relname = c.table_name AND cl.relnamespace = n.oid
        LEFT JOIN pg_catalog.pg_attribute a
            ON a.attrelid = cl.oid AND a.attname = c.column_name AND NOT a.attisdropped
        WHERE {}
        ORDER BY c.table_schema, c.table_name, c.ordinal_position
        "#,
        schema_filter("c.table_schema")
    );

    let rows = sqlx::query(&query)
        .bind(schema)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| catalog_query_failed("information_schema.columns", e))?;

    tracing::debug!("Enumerated {} columns", rows.len());

    let mut result = Vec::with_capacity(rows.len());
    for row in &rows {
        let table_schema: String = row.get_field("table_schema", None)?;
        let table_name: String = row.get_field("table_name", None)?;
        let context = Some(table_name.as_str());

        result.push(ColumnRow {
            name: row.get_field("column_name", context)?,
            data_type: row.get_field("data_type", context)?,
            is_nullable: row.get_field("is_nullable", context)?,
            default_value: row.get_field("column_default", context)?,
            table: TableKey::new(Some(&table_schema), &table_name),
        });
    }

    Ok(result)
}

async fn collect_primary_keys(
    conn: &mut PgConnection,
    schema: Option<&str>,
) -> Result<Vec<PrimaryKeyRow>> {
    let query = format!(
        r#"
        SELECT
            tc.table_schema::text AS table_schema,
            tc.table_name::text AS table_name,
            kcu.column_name::text AS column_name
        FROM information_schema.table_constraints tc
        JOIN information_schema.key_column_usage kcu
            ON kcu.constraint_name = tc.constraint_name
            AND kcu.constraint_schema = tc.constraint_schema
            AND kcu.table_name = tc.table_name
        WHERE tc.constraint_type = 'PRIMARY KEY'
          AND {}
        ORDER BY tc.table_schema, tc.table_name, kcu.ordinal_position
        "#,
        schema_filter("tc.table_schema")
    );

    let rows = sqlx::query(&query)
        .bind(schema)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| catalog_query_failed("primary key constraints", e))?;

    let mut result = Vec::with_capacity(rows.len());
    for row in &rows {
        let table_schema: String = row.get_field("table_schema", None)?;
        let table_name: String = row.get_field("table_name", None)?;

        result.push(PrimaryKeyRow {
            column: row.get_field("column_name", Some(table_name.as_str()))?,
            table: TableKey::new(Some(&table_schema), &table_name),
        });
    }

    Ok(result)
}

async fn collect_foreign_keys(
    conn: &mut PgConnection,
    schema: Option<&str>,
) -> Result<Vec<ForeignKeyRow>> {
    // unnest WITH ORDINALITY keeps conkey[i] paired with confkey[i].
    let query = format!(
        r#"
        SELECT
            ns.nspname::text AS table_schema,
            cl.relname::text AS table_name,
            con.conname::text AS constraint_name,
            a.attname::text AS column_name,
            fns.nspname::text AS referenced_schema,
            fcl.relname::text AS referenced_table,
            fa.attname::text AS referenced_column,
            {} AS update_rule,
            {} AS delete_rule
        FROM pg_catalog.pg_constraint con
        JOIN pg_catalog.pg_class cl ON cl.oid = con.conrelid
        JOIN pg_catalog.pg_namespace ns ON ns.oid = cl.relnamespace
        JOIN pg_catalog.pg_class fcl ON fcl.oid = con.confrelid
        JOIN pg_catalog.pg_namespace fns ON fns.oid = fcl.relnamespace
        CROSS JOIN LATERAL unnest(con.conkey, con.confkey)
            WITH ORDINALITY AS k(attnum, ref_attnum, position)
        JOIN pg_catalog.pg_attribute a
            ON a.attrelid = con.conrelid AND a.attnum = k.attnum
        JOIN pg_catalog.pg_attribute fa
            ON fa.attrelid = con.confrelid AND fa.attnum = k.ref_attnum
        WHERE con.contype = 'f'
          AND {}
        ORDER BY ns.nspname, cl.relname, con.conname, k.position
        "#,
        referential_action_case("con.confupdtype"),
        referential_action_case("con.confdeltype"),
        schema_filter("ns.nspname")
    );

    let rows = sqlx::query(&query)
        .bind(schema)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| catalog_query_failed("pg_constraint foreign keys", e))?;

    tracing::debug!("Enumerated {} foreign key column pairs", rows.len());

    let mut result = Vec::with_capacity(rows.len());
    for row in &rows {
        let table_schema: String = row.get_field("table_schema", None)?;
        let table_name: String = row.get_field("table_name", None)?;
        let context = Some(table_name.as_str());
        let constraint_name: String = row.get_field("constraint_name", context)?;
        let referenced_schema: String = row.get_field("referenced_schema", context)?;
        let referenced_table: String = row.get_field("referenced_table", context)?;

        result.push(ForeignKeyRow {
            table: TableKey::new(Some(&table_schema), &table_name),
            constraint: ConstraintKey::Named(constraint_name),
            column: row.get_field("column_name", context)?,
            referenced_table: TableKey::new(Some(&referenced_schema), &referenced_table),
            referenced_column: row.get_field("referenced_column", context)?,
            on_update: row.get_field("update_rule", context)?,
            on_delete: row.get_field("delete_rule", context)?,
        });
    }

    Ok(result)
}

/// SQL `CASE` decoding a `pg_constraint` action code into its SQL name.
fn referential_action_case(column: &str) -> String {
    format!(
        "CASE {column} \
         WHEN 'a' THEN 'NO ACTION' \
         WHEN 'r' THEN 'RESTRICT' \
         WHEN 'c' THEN 'CASCADE' \
         WHEN 'n' THEN 'SET NULL' \
         WHEN 'd' THEN 'SET DEFAULT' \
         END"
    )
}

pub(crate) fn table_kind(table_type: &str) -> TableKind {
    if table_type.eq_ignore_ascii_case("VIEW") {
        TableKind::View
    } else {
        TableKind::Table
    }
}
