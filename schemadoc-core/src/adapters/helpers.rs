//! Helper utilities for catalog adapter implementations.
//!
//! Provides row decoding, error classification and connection teardown
//! shared by the engine adapters so that all of them report failures the
//! same way.

use crate::{Result, error::SchemaDocError};
use sqlx::Row;

/// SQLSTATE for "insufficient privilege".
const INSUFFICIENT_PRIVILEGE: &str = "42501";
/// MySQL error number for "command denied to user" (its SQLSTATE is the
/// generic 42000).
#[cfg(feature = "mysql")]
const MYSQL_COMMAND_DENIED: u16 = 1142;

/// Extension trait for extracting typed values from catalog rows
/// with consistent error handling.
///
/// # Example
/// ```rust,ignore
/// use crate::adapters::helpers::RowExt;
///
/// let name: String = row.get_field("column_name", Some("public.users"))?;
/// let default: Option<String> = row.get_field("column_default", None)?;
/// ```
pub trait RowExt: Row {
    /// Extracts a typed field from the row with proper error context.
    ///
    /// # Arguments
    /// * `field_name` - Name of the column to extract
    /// * `table_context` - Optional table name for error messages
    fn get_field<'r, T>(&'r self, field_name: &str, table_context: Option<&str>) -> Result<T>
    where
        T: sqlx::Decode<'r, Self::Database> + sqlx::Type<Self::Database>;
}

impl<R> RowExt for R
where
    R: Row,
    for<'a> &'a str: sqlx::ColumnIndex<R>,
{
    fn get_field<'r, T>(&'r self, field_name: &str, table_context: Option<&str>) -> Result<T>
    where
        T: sqlx::Decode<'r, Self::Database> + sqlx::Type<Self::Database>,
    {
        self.try_get(field_name)
            .map_err(|e| SchemaDocError::parse_field(field_name, table_context, e))
    }
}

/// Maps a failed catalog query to an `Introspection` error.
///
/// Permission failures get a dedicated context so that the message points
/// at the grant that is missing rather than at the SQL.
pub(crate) fn catalog_query_failed(resource: &str, error: sqlx::Error) -> SchemaDocError {
    let denied = match &error {
        sqlx::Error::Database(db_err) => is_permission_denied(db_err.as_ref()),
        _ => false,
    };

    let context = if denied {
        format!("Cannot access {} - insufficient privileges", resource)
    } else {
        format!("Failed to query {}", resource)
    };

    tracing::error!("{}", context);
    SchemaDocError::introspection_failed(context, error)
}

fn is_permission_denied(db_err: &(dyn sqlx::error::DatabaseError + 'static)) -> bool {
    if db_err.code().as_deref() == Some(INSUFFICIENT_PRIVILEGE) {
        return true;
    }

    #[cfg(feature = "mysql")]
    {
        if let Some(mysql_err) = db_err.try_downcast_ref::<sqlx::mysql::MySqlDatabaseError>() {
            return mysql_err.number() == MYSQL_COMMAND_DENIED;
        }
    }

    false
}

/// Closes a connection, logging but otherwise ignoring a failed close.
///
/// The connection is consumed either way, so its socket or file handle is
/// released even when the graceful shutdown fails.
pub(crate) async fn close_connection<C>(connection: C, target: &str)
where
    C: sqlx::Connection,
{
    if let Err(e) = connection.close().await {
        tracing::warn!("Failed to close connection to {} cleanly: {}", target, e);
    } else {
        tracing::trace!("Closed connection to {}", target);
    }
}

/// Checks the value returned by a probe's `SELECT 1`.
pub(crate) fn check_probe_value(value: i64, target: &str) -> Result<()> {
    if value == 1 {
        Ok(())
    } else {
        Err(SchemaDocError::introspection_failed(
            format!("Probe query on {} returned an unexpected value", target),
            std::io::Error::other(format!("expected 1, got {}", value)),
        ))
    }
}
