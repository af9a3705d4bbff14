//! Unit tests for PostgreSQL adapter.

use super::*;
use crate::adapters::{Secret, TlsMode};
use sqlx::postgres::PgSslMode;

fn descriptor() -> NetworkDescriptor {
    NetworkDescriptor::new(EngineKind::Postgres, "db.internal", "shop")
        .with_port(6543)
        .with_credentials("reader", Secret::new("hunter2"))
        .with_schema("sales")
}

#[test]
fn test_ssl_mode_mapping() {
    assert!(matches!(ssl_mode_for(TlsMode::Enabled), PgSslMode::Require));
    assert!(matches!(ssl_mode_for(TlsMode::Disabled), PgSslMode::Disable));
    assert!(matches!(ssl_mode_for(TlsMode::Unspecified), PgSslMode::Prefer));
}

#[test]
fn test_connect_options_from_descriptor() {
    let adapter = PostgresAdapter::new(descriptor());
    let options = adapter.connect_options();

    assert_eq!(options.get_host(), "db.internal");
    assert_eq!(options.get_port(), 6543);
    assert_eq!(options.get_username(), "reader");
    assert_eq!(options.get_database(), Some("shop"));
}

#[test]
fn test_adapter_metadata() {
    let adapter = PostgresAdapter::new(descriptor());

    assert_eq!(adapter.engine_kind(), EngineKind::Postgres);
    assert_eq!(adapter.database_name().as_deref(), Some("shop"));
    assert_eq!(adapter.target(), "PostgreSQL(db.internal:6543/shop)");
}

#[test]
fn test_debug_output_hides_secret() {
    let adapter = PostgresAdapter::new(descriptor());
    let debug = format!("{:?}", adapter);

    assert!(debug.contains("db.internal"));
    assert!(!debug.contains("hunter2"));
}

#[test]
fn test_application_name_carries_version() {
    let name = connection::application_name();
    assert!(name.starts_with("schemadoc-"));
    assert!(name.ends_with(env!("CARGO_PKG_VERSION")));
}
