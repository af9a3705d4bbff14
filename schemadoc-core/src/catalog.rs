//! Flat catalog rows shared by all engine adapters.
//!
//! Each adapter translates its engine's catalog dialect into these shapes,
//! one row per table, column, primary-key member, or foreign-key column
//! pair. Everything downstream (reconstruction, normalization) works on
//! these rows only and never touches a driver.

use crate::models::TableKind;
use serde::{Deserialize, Serialize};

/// Identifies the table a row belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableKey {
    /// Owning schema; `None` for engines without schemas below the database
    pub schema: Option<String>,
    /// Table or view name as stored in the catalog
    pub name: String,
}

impl TableKey {
    /// Creates a key, copying the borrowed names.
    pub fn new(schema: Option<&str>, name: &str) -> Self {
        Self {
            schema: schema.map(str::to_string),
            name: name.to_string(),
        }
    }
}

/// One enumerated table or view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    /// The enumerated relation
    pub table: TableKey,
    /// Base table or view
    pub kind: TableKind,
}

/// One column, in the engine's ordinal order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRow {
    /// Owning table
    pub table: TableKey,
    /// Column name
    pub name: String,
    /// Native type as the engine spells it (`varchar(255)`, `INTEGER`)
    pub data_type: String,
    /// Whether the column accepts NULL
    pub is_nullable: bool,
    /// Default expression text, verbatim
    pub default_value: Option<String>,
}

/// One column that is a member of its table's primary key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryKeyRow {
    /// Owning table
    pub table: TableKey,
    /// Key member column
    pub column: String,
}

/// How rows belonging to the same foreign key are recognized.
///
/// Named constraints group by name. Engines that do not name constraints
/// (SQLite) report a small per-table group id instead; unnamed constraints
/// with different ids are never merged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintKey {
    /// Constraint name reported by the engine
    Named(String),
    /// Engine-local group id of an unnamed constraint
    Unnamed(i64),
}

impl ConstraintKey {
    /// Builds the grouping key from an optional name and an engine-local id.
    pub fn from_parts(name: Option<&str>, group_id: i64) -> Self {
        match name {
            Some(name) => Self::Named(name.to_string()),
            None => Self::Unnamed(group_id),
        }
    }

    /// The constraint name, if the engine reported one.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Named(name) => Some(name),
            Self::Unnamed(_) => None,
        }
    }
}

/// One `(local column -> referenced column)` pair of a foreign key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyRow {
    /// Table that declares the constraint
    pub table: TableKey,
    /// Groups the rows of one constraint
    pub constraint: ConstraintKey,
    /// Local column of this pair
    pub column: String,
    /// Parent table of the constraint
    pub referenced_table: TableKey,
    /// Column in `referenced_table` paired with `column`
    pub referenced_column: String,
    /// `ON UPDATE` rule as reported (`CASCADE`, `NO ACTION`, ...)
    pub on_update: Option<String>,
    /// `ON DELETE` rule as reported
    pub on_delete: Option<String>,
}

/// Everything an adapter reports for one introspection call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRows {
    /// Tables and views, in enumeration order
    pub tables: Vec<TableRow>,
    /// Columns of all tables, in ordinal order per table
    pub columns: Vec<ColumnRow>,
    /// Primary-key members, in key order per table
    pub primary_keys: Vec<PrimaryKeyRow>,
    /// Foreign-key column pairs, in constraint position order
    pub foreign_keys: Vec<ForeignKeyRow>,
}
