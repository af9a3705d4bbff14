//! SQLite introspection against real database files.
//!
//! These tests build small databases in a temporary directory and run the
//! full introspect-and-render pipeline over them.

#![cfg(feature = "sqlite")]

use chrono::{TimeZone, Utc};
use schemadoc_core::{
    ConnectionDescriptor, ErrorKind, FileDescriptor, OutputFormat, TableKind, introspect, probe,
    render_document,
};
use sqlx::Connection;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use std::path::Path;

const SHOP_SCHEMA: &[&str] = &[
    "CREATE TABLE customers (
        id INTEGER PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        note TEXT DEFAULT 'n/a'
    )",
    "CREATE TABLE orders (
        order_id INTEGER NOT NULL,
        line_no INTEGER NOT NULL,
        customer_id INTEGER REFERENCES customers(id) ON DELETE CASCADE,
        PRIMARY KEY (order_id, line_no)
    )",
    "CREATE TABLE shipments (
        id INTEGER PRIMARY KEY,
        order_id INTEGER,
        line_no INTEGER,
        FOREIGN KEY (order_id, line_no) REFERENCES orders(order_id, line_no) ON UPDATE CASCADE
    )",
    r#"CREATE TABLE "odd""name" ("pipe|col" TEXT)"#,
    "CREATE VIEW customer_emails AS SELECT id, email FROM customers",
];

async fn create_database(path: &Path, statements: &[&str]) {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let mut conn = SqliteConnection::connect_with(&options).await.unwrap();

    for statement in statements {
        sqlx::query(statement).execute(&mut conn).await.unwrap();
    }

    conn.close().await.unwrap();
}

fn descriptor(path: &Path) -> ConnectionDescriptor {
    ConnectionDescriptor::File(FileDescriptor::new(path))
}

#[tokio::test]
async fn test_sqlite_introspection_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shop.db");
    create_database(&path, SHOP_SCHEMA).await;

    let snapshot = introspect(&descriptor(&path)).await.unwrap();

    assert_eq!(snapshot.database.as_deref(), Some("shop.db"));
    let names: Vec<_> = snapshot.tables.iter().map(|t| t.qualified_name()).collect();
    assert_eq!(
        names,
        ["customer_emails", "customers", "odd\"name", "orders", "shipments"]
    );

    let customers = snapshot.table(None, "customers").unwrap();
    assert_eq!(customers.kind, TableKind::Table);
    let id = &customers.columns[0];
    assert_eq!(id.name, "id");
    assert_eq!(id.data_type, "INTEGER");
    assert!(id.is_primary_key);
    assert!(!id.is_nullable);
    assert_eq!(customers.columns[2].default_value.as_deref(), Some("'n/a'"));
    assert!(customers.columns[2].is_nullable);

    let orders = snapshot.table(None, "orders").unwrap();
    let keys: Vec<_> = orders
        .primary_key_columns()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(keys, ["order_id", "line_no"]);
    assert_eq!(orders.foreign_keys.len(), 1);
    assert_eq!(orders.foreign_keys[0].columns, ["customer_id"]);
    assert_eq!(orders.foreign_keys[0].on_delete.as_deref(), Some("CASCADE"));

    let view = snapshot.table(None, "customer_emails").unwrap();
    assert_eq!(view.kind, TableKind::View);
    assert_eq!(view.columns.len(), 2);
    assert!(view.foreign_keys.is_empty());
}

#[tokio::test]
async fn test_sqlite_multi_column_foreign_key_is_one_relation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shop.db");
    create_database(&path, SHOP_SCHEMA).await;

    let snapshot = introspect(&descriptor(&path)).await.unwrap();
    let shipments = snapshot.table(None, "shipments").unwrap();

    assert_eq!(shipments.foreign_keys.len(), 1);
    let fk = &shipments.foreign_keys[0];
    assert_eq!(fk.name, None);
    assert_eq!(fk.columns, ["order_id", "line_no"]);
    assert_eq!(fk.referenced_table.qualified_name(), "orders");
    assert_eq!(fk.referenced_columns, ["order_id", "line_no"]);
    assert_eq!(fk.on_update.as_deref(), Some("CASCADE"));
    assert_eq!(fk.on_delete.as_deref(), Some("NO ACTION"));
}

#[tokio::test]
async fn test_sqlite_implicit_reference_resolves_parent_key() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blog.db");
    create_database(
        &path,
        &[
            "CREATE TABLE accounts (id INTEGER PRIMARY KEY)",
            "CREATE TABLE users (author_id INTEGER REFERENCES accounts)",
            "CREATE TABLE regions (country TEXT, code TEXT, PRIMARY KEY (code, country))",
            "CREATE TABLE offices (
                country TEXT,
                code TEXT,
                FOREIGN KEY (code, country) REFERENCES regions
            )",
        ],
    )
    .await;

    let snapshot = introspect(&descriptor(&path)).await.unwrap();

    let users = snapshot.table(None, "users").unwrap();
    assert_eq!(users.foreign_keys.len(), 1);
    assert_eq!(users.foreign_keys[0].columns, ["author_id"]);
    assert_eq!(users.foreign_keys[0].referenced_columns, ["id"]);

    // Parent key order is the PRIMARY KEY clause order, not column order.
    let offices = snapshot.table(None, "offices").unwrap();
    assert_eq!(offices.foreign_keys[0].columns, ["code", "country"]);
    assert_eq!(offices.foreign_keys[0].referenced_columns, ["code", "country"]);

    let generated_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let markdown = render_document(&snapshot, OutputFormat::Markdown, generated_at).unwrap();
    assert!(markdown.contains("|  | author_id | accounts(id) | NO ACTION | NO ACTION |"));
    assert!(!markdown.contains("accounts()"));
}

#[tokio::test]
async fn test_sqlite_implicit_reference_without_parent_key_is_invalid() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("loose.db");
    create_database(
        &path,
        &[
            "CREATE TABLE notes (body TEXT)",
            "CREATE TABLE tags (note INTEGER REFERENCES notes)",
        ],
    )
    .await;

    let err = introspect(&descriptor(&path)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidSchema);
}

#[tokio::test]
async fn test_sqlite_separate_unnamed_constraints_stay_separate() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("links.db");
    create_database(
        &path,
        &[
            "CREATE TABLE nodes (id INTEGER PRIMARY KEY)",
            "CREATE TABLE edges (
                source INTEGER REFERENCES nodes(id),
                target INTEGER REFERENCES nodes(id)
            )",
        ],
    )
    .await;

    let snapshot = introspect(&descriptor(&path)).await.unwrap();
    let edges = snapshot.table(None, "edges").unwrap();

    assert_eq!(edges.foreign_keys.len(), 2);
    let mut columns: Vec<_> = edges
        .foreign_keys
        .iter()
        .map(|fk| fk.columns.join(","))
        .collect();
    columns.sort();
    assert_eq!(columns, ["source", "target"]);
}

#[tokio::test]
async fn test_sqlite_markdown_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shop.db");
    create_database(&path, SHOP_SCHEMA).await;

    let snapshot = introspect(&descriptor(&path)).await.unwrap();
    let generated_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let markdown = render_document(&snapshot, OutputFormat::Markdown, generated_at).unwrap();

    assert!(markdown.starts_with("# Database Schema: shop.db\n"));
    assert!(markdown.contains("- Engine: SQLite\n"));
    assert!(markdown.contains("- Generated: 2024-01-01T00:00:00Z\n"));
    assert!(markdown.contains("## shipments\n"));
    assert!(markdown.contains("Kind: view\n"));
    assert!(markdown.contains(
        "|  | order_id, line_no | orders(order_id, line_no) | CASCADE | NO ACTION |"
    ));
    assert!(markdown.contains("| pipe\\|col | TEXT | yes |  |  |"));

    // A second introspection of the unchanged file renders identically.
    let again = introspect(&descriptor(&path)).await.unwrap();
    let rerendered = render_document(&again, OutputFormat::Markdown, generated_at).unwrap();
    assert_eq!(markdown, rerendered);
}

#[tokio::test]
async fn test_sqlite_empty_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.db");
    create_database(&path, &["CREATE TABLE scratch (id INTEGER)", "DROP TABLE scratch"]).await;

    let snapshot = introspect(&descriptor(&path)).await.unwrap();
    assert!(snapshot.tables.is_empty());

    probe(&descriptor(&path)).await.unwrap();
}

#[tokio::test]
async fn test_sqlite_missing_file_is_not_created() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.db");

    let err = introspect(&descriptor(&path)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = probe(&descriptor(&path)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    assert!(!path.exists());
}

#[tokio::test]
async fn test_sqlite_introspection_does_not_modify_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shop.db");
    create_database(&path, SHOP_SCHEMA).await;

    let before = std::fs::read(&path).unwrap();
    introspect(&descriptor(&path)).await.unwrap();
    probe(&descriptor(&path)).await.unwrap();
    let after = std::fs::read(&path).unwrap();

    assert_eq!(before, after);
}

#[tokio::test]
async fn test_sqlite_failed_catalog_query_is_introspection_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stale.db");
    create_database(
        &path,
        &[
            "CREATE TABLE t (id INTEGER)",
            "CREATE VIEW v AS SELECT * FROM t",
            "DROP TABLE t",
        ],
    )
    .await;

    // table_info on a view whose base table is gone fails after connecting.
    let err = introspect(&descriptor(&path)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Introspection);
    assert!(err.to_string().contains("table_info"));

    // The failed call released its connection: the file can be probed,
    // written to, and introspected again.
    probe(&descriptor(&path)).await.unwrap();
    create_database(&path, &["DROP VIEW v"]).await;
    let snapshot = introspect(&descriptor(&path)).await.unwrap();
    assert!(snapshot.tables.is_empty());
}
