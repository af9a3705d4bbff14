//! Reconstruction of multi-column constraints from flat catalog rows.
//!
//! Engines report a foreign key spanning N columns as N rows sharing a
//! constraint identifier. Rows are grouped first by owning table, then by
//! [`ConstraintKey`], both in first-seen order, and each row appends its
//! column pair in row order. Primary keys are only needed as per-column
//! flags, so their rows collapse into a set of `(table, column)` pairs.

use crate::catalog::{ConstraintKey, ForeignKeyRow, PrimaryKeyRow, TableKey};
use crate::models::{ForeignKeyDescriptor, TableRef};
use indexmap::IndexMap;
use std::collections::HashSet;

/// Foreign keys grouped per owning table, in first-seen order.
pub type ForeignKeysByTable = IndexMap<TableKey, Vec<ForeignKeyDescriptor>>;

/// Groups foreign-key rows into structured constraints.
///
/// The referenced table and the update/delete rules are taken from the
/// first row of each group.
pub fn group_foreign_keys(rows: &[ForeignKeyRow]) -> ForeignKeysByTable {
    let mut groups: IndexMap<TableKey, IndexMap<ConstraintKey, ForeignKeyDescriptor>> =
        IndexMap::new();

    for row in rows {
        let fk = groups
            .entry(row.table.clone())
            .or_default()
            .entry(row.constraint.clone())
            .or_insert_with(|| ForeignKeyDescriptor {
                name: row.constraint.name().map(str::to_string),
                columns: Vec::new(),
                referenced_table: TableRef::new(
                    row.referenced_table.schema.clone(),
                    row.referenced_table.name.clone(),
                ),
                referenced_columns: Vec::new(),
                on_update: row.on_update.clone(),
                on_delete: row.on_delete.clone(),
            });

        fk.columns.push(row.column.clone());
        fk.referenced_columns.push(row.referenced_column.clone());
    }

    tracing::trace!(
        "Reconstructed foreign keys for {} tables from {} rows",
        groups.len(),
        rows.len()
    );

    groups
        .into_iter()
        .map(|(table, constraints)| (table, constraints.into_values().collect()))
        .collect()
}

/// Reduces primary-key rows to the set of `(table, column)` members.
pub fn primary_key_set(rows: &[PrimaryKeyRow]) -> HashSet<(TableKey, String)> {
    rows.iter()
        .map(|row| (row.table.clone(), row.column.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fk_row(table: &str, constraint: ConstraintKey, column: &str, referenced: &str) -> ForeignKeyRow {
        ForeignKeyRow {
            table: TableKey::new(Some("public"), table),
            constraint,
            column: column.to_string(),
            referenced_table: TableKey::new(Some("public"), "parent"),
            referenced_column: referenced.to_string(),
            on_update: None,
            on_delete: Some("CASCADE".to_string()),
        }
    }

    fn named(name: &str) -> ConstraintKey {
        ConstraintKey::Named(name.to_string())
    }

    #[test]
    fn test_groups_multi_column_constraints() {
        let rows = vec![
            fk_row("t1", named("fk_a"), "c1", "r1"),
            fk_row("t1", named("fk_a"), "c2", "r2"),
            fk_row("t1", named("fk_b"), "c3", "r3"),
        ];

        let grouped = group_foreign_keys(&rows);
        let fks = &grouped[&TableKey::new(Some("public"), "t1")];

        assert_eq!(fks.len(), 2);
        assert_eq!(fks[0].name.as_deref(), Some("fk_a"));
        assert_eq!(fks[0].columns, ["c1", "c2"]);
        assert_eq!(fks[0].referenced_columns, ["r1", "r2"]);
        assert_eq!(fks[1].name.as_deref(), Some("fk_b"));
        assert_eq!(fks[1].columns, ["c3"]);
        assert_eq!(fks[1].referenced_columns, ["r3"]);
    }

    #[test]
    fn test_unnamed_constraints_are_not_merged() {
        let rows = vec![
            fk_row("t1", ConstraintKey::Unnamed(0), "a", "x"),
            fk_row("t1", ConstraintKey::Unnamed(1), "b", "y"),
            fk_row("t1", ConstraintKey::Unnamed(0), "c", "z"),
        ];

        let grouped = group_foreign_keys(&rows);
        let fks = &grouped[&TableKey::new(Some("public"), "t1")];

        assert_eq!(fks.len(), 2);
        assert!(fks.iter().all(|fk| fk.name.is_none()));
        assert_eq!(fks[0].columns, ["a", "c"]);
        assert_eq!(fks[0].referenced_columns, ["x", "z"]);
        assert_eq!(fks[1].columns, ["b"]);
    }

    #[test]
    fn test_same_constraint_name_on_different_tables() {
        let rows = vec![
            fk_row("t2", named("fk_parent"), "p", "id"),
            fk_row("t1", named("fk_parent"), "q", "id"),
        ];

        let grouped = group_foreign_keys(&rows);
        let tables: Vec<_> = grouped.keys().map(|k| k.name.as_str()).collect();

        // first-seen order, not alphabetical
        assert_eq!(tables, ["t2", "t1"]);
        assert_eq!(grouped[0].len(), 1);
        assert_eq!(grouped[1][0].columns, ["q"]);
    }

    #[test]
    fn test_rules_and_target_come_from_first_row() {
        let mut second = fk_row("t1", named("fk"), "b", "y");
        second.on_delete = Some("SET NULL".to_string());
        let rows = vec![fk_row("t1", named("fk"), "a", "x"), second];

        let grouped = group_foreign_keys(&rows);
        let fk = &grouped[0][0];

        assert_eq!(fk.on_delete.as_deref(), Some("CASCADE"));
        assert_eq!(fk.referenced_table.qualified_name(), "public.parent");
    }

    #[test]
    fn test_empty_rows() {
        assert!(group_foreign_keys(&[]).is_empty());
        assert!(primary_key_set(&[]).is_empty());
    }

    #[test]
    fn test_primary_key_set() {
        let table = TableKey::new(None, "accounts");
        let rows = vec![
            PrimaryKeyRow {
                table: table.clone(),
                column: "tenant_id".to_string(),
            },
            PrimaryKeyRow {
                table: table.clone(),
                column: "id".to_string(),
            },
        ];

        let set = primary_key_set(&rows);
        assert_eq!(set.len(), 2);
        assert!(set.contains(&(table.clone(), "id".to_string())));
        assert!(!set.contains(&(TableKey::new(None, "other"), "id".to_string())));
    }
}
