use super::{DocumentRenderer, format_timestamp, validate_snapshot};
use crate::Result;
use crate::error::SchemaDocError;
use crate::models::SchemaSnapshot;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Serialize)]
struct JsonDocument<'a> {
    generated_at: String,
    snapshot: &'a SchemaSnapshot,
}

/// Renders snapshots as pretty-printed JSON.
#[derive(Debug, Clone, Default)]
pub struct JsonRenderer;

impl DocumentRenderer for JsonRenderer {
    fn render(&self, snapshot: &SchemaSnapshot, generated_at: DateTime<Utc>) -> Result<String> {
        validate_snapshot(snapshot)?;

        let document = JsonDocument {
            generated_at: format_timestamp(generated_at),
            snapshot,
        };

        let mut json =
            serde_json::to_string_pretty(&document).map_err(|e| SchemaDocError::Serialization {
                context: "Failed to serialize schema snapshot".to_string(),
                source: e,
            })?;
        json.push('\n');
        Ok(json)
    }
}
