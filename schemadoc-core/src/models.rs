//! Engine-agnostic schema model.
//!
//! These types are the single output of normalization and the single input
//! of rendering. They are plain value objects: built once per introspection
//! call, never mutated afterwards and never cached.

use serde::{Deserialize, Serialize};

/// Supported database engines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    Postgres,
    MySql,
    Sqlite,
}

impl EngineKind {
    /// Resolves a URL scheme to an engine, if it names one.
    pub fn from_scheme(scheme: &str) -> Option<Self> {
        match scheme.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Some(Self::Postgres),
            "mysql" | "mariadb" => Some(Self::MySql),
            "sqlite" | "sqlite3" => Some(Self::Sqlite),
            _ => None,
        }
    }

    /// Default TCP port for networked engines.
    pub const fn default_port(self) -> Option<u16> {
        match self {
            Self::Postgres => Some(5432),
            Self::MySql => Some(3306),
            Self::Sqlite => None,
        }
    }
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineKind::Postgres => write!(f, "PostgreSQL"),
            EngineKind::MySql => write!(f, "MySQL"),
            EngineKind::Sqlite => write!(f, "SQLite"),
        }
    }
}

/// Whether a relation is a base table or a view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    Table,
    View,
}

impl std::fmt::Display for TableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableKind::Table => write!(f, "table"),
            TableKind::View => write!(f, "view"),
        }
    }
}

/// A reference to a table, schema-qualified where the engine has schemas.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableRef {
    pub schema: Option<String>,
    pub name: String,
}

impl TableRef {
    /// Creates a reference to a (possibly schema-qualified) table.
    pub fn new(schema: Option<String>, name: impl Into<String>) -> Self {
        Self {
            schema,
            name: name.into(),
        }
    }

    /// Returns `schema.name`, or just `name` when there is no schema.
    pub fn qualified_name(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", schema, self.name),
            None => self.name.clone(),
        }
    }
}

impl std::fmt::Display for TableRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.qualified_name())
    }
}

/// Database column information.
///
/// `data_type` keeps the engine's own vocabulary (`character varying(255)`,
/// `int unsigned`, `TEXT`) rather than a unified type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub data_type: String,
    pub is_nullable: bool,
    pub default_value: Option<String>,
    pub is_primary_key: bool,
}

/// Foreign key constraint, possibly spanning several columns.
///
/// `columns[i]` references `referenced_columns[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyDescriptor {
    pub name: Option<String>,
    pub columns: Vec<String>,
    pub referenced_table: TableRef,
    pub referenced_columns: Vec<String>,
    pub on_update: Option<String>,
    pub on_delete: Option<String>,
}

impl ForeignKeyDescriptor {
    /// Checks that local and referenced columns are non-empty and aligned.
    ///
    /// # Errors
    /// Returns `InvalidSchema` when the invariant is violated, which points
    /// at an adapter or reconstruction bug rather than a user error.
    pub fn validate(&self, owner: &str) -> crate::Result<()> {
        if self.columns.is_empty() {
            return Err(crate::error::SchemaDocError::invalid_schema(format!(
                "foreign key {} on '{}' has no columns",
                self.display_name(),
                owner
            )));
        }

        if self.columns.len() != self.referenced_columns.len() {
            return Err(crate::error::SchemaDocError::invalid_schema(format!(
                "foreign key {} on '{}' has {} columns but {} referenced columns",
                self.display_name(),
                owner,
                self.columns.len(),
                self.referenced_columns.len()
            )));
        }

        Ok(())
    }

    fn display_name(&self) -> String {
        self.name
            .as_deref()
            .map_or_else(|| "<unnamed>".to_string(), |n| format!("'{}'", n))
    }
}

/// A table or view with its columns and foreign keys
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub name: String,
    pub schema: Option<String>,
    pub kind: TableKind,
    pub columns: Vec<ColumnDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub foreign_keys: Vec<ForeignKeyDescriptor>,
}

impl TableDescriptor {
    /// Returns `schema.table`, or just `table` when there is no schema.
    pub fn qualified_name(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", schema, self.name),
            None => self.name.clone(),
        }
    }

    /// Columns flagged as primary-key members, in column order.
    pub fn primary_key_columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter().filter(|c| c.is_primary_key)
    }
}

/// The unified structure of one database at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    pub engine: EngineKind,
    pub database: Option<String>,
    pub tables: Vec<TableDescriptor>,
}

impl SchemaSnapshot {
    /// Creates an empty snapshot for the given engine.
    pub fn new(engine: EngineKind, database: Option<String>) -> Self {
        Self {
            engine,
            database,
            tables: Vec::new(),
        }
    }

    /// Finds a table by schema and name.
    pub fn table(&self, schema: Option<&str>, name: &str) -> Option<&TableDescriptor> {
        self.tables
            .iter()
            .find(|t| t.name == name && t.schema.as_deref() == schema)
    }

    /// Total number of foreign keys across all tables.
    pub fn foreign_key_count(&self) -> usize {
        self.tables.iter().map(|t| t.foreign_keys.len()).sum()
    }
}
