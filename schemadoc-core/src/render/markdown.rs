//! Markdown rendering of schema snapshots.
//!
//! # Layout
//! ```text
//! # Database Schema: <database>
//!
//! - Engine: PostgreSQL
//! - Database: <database>
//! - Generated: 2024-01-01T00:00:00Z
//!
//! ## public.users
//!
//! Kind: table
//!
//! | Column | Type | Nullable | Default | Primary Key |
//! | --- | --- | --- | --- | --- |
//! | id | integer | no |  | yes |
//!
//! ### Relations
//!
//! | Name | Columns | References | On Update | On Delete |
//! | --- | --- | --- | --- | --- |
//! | users_author_id_fkey | author_id | public.accounts(id) | NO ACTION | CASCADE |
//! ```

use super::{DocumentRenderer, format_timestamp, validate_snapshot};
use crate::Result;
use crate::models::{ColumnDescriptor, ForeignKeyDescriptor, SchemaSnapshot, TableDescriptor};
use chrono::{DateTime, Utc};

/// Line emitted in place of the column table when a table has no columns.
///
/// An empty column list almost always means a catalog query returned
/// nothing for the table, so it is called out instead of rendering an
/// empty table.
pub const NO_COLUMNS_MARKER: &str = "_No columns discovered._";

const COLUMN_HEADERS: [&str; 5] = ["Column", "Type", "Nullable", "Default", "Primary Key"];
const RELATION_HEADERS: [&str; 5] = ["Name", "Columns", "References", "On Update", "On Delete"];

/// Renders snapshots as markdown documents.
#[derive(Debug, Clone, Default)]
pub struct MarkdownRenderer;

impl DocumentRenderer for MarkdownRenderer {
    fn render(&self, snapshot: &SchemaSnapshot, generated_at: DateTime<Utc>) -> Result<String> {
        validate_snapshot(snapshot)?;

        let mut lines = header_lines(snapshot, generated_at);
        for table in &snapshot.tables {
            lines.push(String::new());
            lines.extend(table_lines(table));
        }

        let mut document = lines.join("\n");
        document.push('\n');
        Ok(document)
    }
}

fn header_lines(snapshot: &SchemaSnapshot, generated_at: DateTime<Utc>) -> Vec<String> {
    let mut lines = Vec::with_capacity(6);

    match &snapshot.database {
        Some(database) => lines.push(format!("# Database Schema: {}", database)),
        None => lines.push("# Database Schema".to_string()),
    }
    lines.push(String::new());
    lines.push(format!("- Engine: {}", snapshot.engine));
    if let Some(database) = &snapshot.database {
        lines.push(format!("- Database: {}", database));
    }
    lines.push(format!("- Generated: {}", format_timestamp(generated_at)));

    lines
}

fn table_lines(table: &TableDescriptor) -> Vec<String> {
    let mut lines = vec![
        format!("## {}", table.qualified_name()),
        String::new(),
        format!("Kind: {}", table.kind),
        String::new(),
    ];

    if table.columns.is_empty() {
        lines.push(NO_COLUMNS_MARKER.to_string());
    } else {
        lines.push(table_row(&COLUMN_HEADERS));
        lines.push(separator_row(COLUMN_HEADERS.len()));
        lines.extend(table.columns.iter().map(column_row));
    }

    if !table.foreign_keys.is_empty() {
        lines.push(String::new());
        lines.push("### Relations".to_string());
        lines.push(String::new());
        lines.push(table_row(&RELATION_HEADERS));
        lines.push(separator_row(RELATION_HEADERS.len()));
        lines.extend(table.foreign_keys.iter().map(relation_row));
    }

    lines
}

fn column_row(column: &ColumnDescriptor) -> String {
    table_row(&[
        column.name.as_str(),
        column.data_type.as_str(),
        yes_no(column.is_nullable),
        column.default_value.as_deref().unwrap_or_default(),
        if column.is_primary_key { "yes" } else { "" },
    ])
}

fn relation_row(fk: &ForeignKeyDescriptor) -> String {
    let references = format!(
        "{}({})",
        fk.referenced_table.qualified_name(),
        fk.referenced_columns.join(", ")
    );
    let columns = fk.columns.join(", ");

    table_row(&[
        fk.name.as_deref().unwrap_or_default(),
        columns.as_str(),
        references.as_str(),
        fk.on_update.as_deref().unwrap_or_default(),
        fk.on_delete.as_deref().unwrap_or_default(),
    ])
}

fn table_row(cells: &[&str]) -> String {
    let escaped: Vec<String> = cells.iter().map(|cell| escape_cell(cell)).collect();
    format!("| {} |", escaped.join(" | "))
}

fn separator_row(width: usize) -> String {
    format!("| {} |", vec!["---"; width].join(" | "))
}

const fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

/// Escapes a value for use inside a markdown table cell.
///
/// `|` becomes `\|`. Backslashes are doubled and line breaks become `\n`
/// / `\r`, so [`unescape_cell`] recovers the original exactly.
pub fn escape_cell(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '|' => escaped.push_str("\\|"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Reverses [`escape_cell`].
pub fn unescape_cell(value: &str) -> String {
    let mut unescaped = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            unescaped.push(ch);
            continue;
        }
        match chars.next() {
            Some('\\') => unescaped.push('\\'),
            Some('|') => unescaped.push('|'),
            Some('n') => unescaped.push('\n'),
            Some('r') => unescaped.push('\r'),
            Some(other) => {
                unescaped.push('\\');
                unescaped.push(other);
            }
            None => unescaped.push('\\'),
        }
    }

    unescaped
}
