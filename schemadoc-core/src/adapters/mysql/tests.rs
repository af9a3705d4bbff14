//! Unit tests for MySQL adapter.

use super::*;
use crate::adapters::{Secret, TlsMode};
use sqlx::mysql::MySqlSslMode;

fn descriptor() -> NetworkDescriptor {
    NetworkDescriptor::new(EngineKind::MySql, "mysql.internal", "shop")
        .with_credentials("reader", Secret::new("hunter2"))
}

#[test]
fn test_ssl_mode_mapping() {
    assert!(matches!(ssl_mode_for(TlsMode::Enabled), MySqlSslMode::Required));
    assert!(matches!(ssl_mode_for(TlsMode::Disabled), MySqlSslMode::Disabled));
    assert!(matches!(ssl_mode_for(TlsMode::Unspecified), MySqlSslMode::Preferred));
}

#[test]
fn test_default_port_and_target() {
    let adapter = MySqlAdapter::new(descriptor());

    assert_eq!(adapter.descriptor.port, 3306);
    assert_eq!(adapter.target(), "MySQL(mysql.internal:3306/shop)");
}

#[test]
fn test_catalog_schema_defaults_to_database() {
    let adapter = MySqlAdapter::new(descriptor());
    assert_eq!(adapter.catalog_schema(), "shop");
    assert_eq!(adapter.database_name().as_deref(), Some("shop"));

    let adapter = MySqlAdapter::new(descriptor().with_schema("billing"));
    assert_eq!(adapter.catalog_schema(), "billing");
    assert_eq!(adapter.database_name().as_deref(), Some("billing"));
}

#[test]
fn test_debug_output_hides_secret() {
    let adapter = MySqlAdapter::new(descriptor());
    assert!(!format!("{:?}", adapter).contains("hunter2"));
}
