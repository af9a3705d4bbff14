//! Document rendering for schema snapshots.
//!
//! Rendering is a pure function of the snapshot and the generation
//! timestamp; the timestamp only ever appears on a single header line, so
//! two renders of the same snapshot differ at most on that line.

mod json;
mod markdown;

pub use json::JsonRenderer;
pub use markdown::{MarkdownRenderer, NO_COLUMNS_MARKER, escape_cell, unescape_cell};

use crate::Result;
use crate::models::SchemaSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Output format options for rendered documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable markdown document
    #[default]
    Markdown,
    /// Pretty-printed JSON snapshot
    Json,
}

/// Converts a snapshot into text.
///
/// Implementations must be deterministic: identical snapshots and
/// timestamps produce byte-identical output.
pub trait DocumentRenderer {
    /// Renders the snapshot.
    ///
    /// # Errors
    /// Returns `InvalidSchema` when the snapshot violates a model invariant.
    fn render(&self, snapshot: &SchemaSnapshot, generated_at: DateTime<Utc>) -> Result<String>;
}

/// Renders a snapshot in the requested format.
///
/// # Errors
/// Propagates renderer failures (invalid schema, serialization).
pub fn render_document(
    snapshot: &SchemaSnapshot,
    format: OutputFormat,
    generated_at: DateTime<Utc>,
) -> Result<String> {
    match format {
        OutputFormat::Markdown => MarkdownRenderer::default().render(snapshot, generated_at),
        OutputFormat::Json => JsonRenderer::default().render(snapshot, generated_at),
    }
}

/// Validates every foreign key of the snapshot before rendering.
fn validate_snapshot(snapshot: &SchemaSnapshot) -> Result<()> {
    for table in &snapshot.tables {
        let owner = table.qualified_name();
        for fk in &table.foreign_keys {
            fk.validate(&owner)?;
        }
    }
    Ok(())
}

/// Formats the generation timestamp as RFC 3339 UTC with second precision.
fn format_timestamp(generated_at: DateTime<Utc>) -> String {
    generated_at.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}
