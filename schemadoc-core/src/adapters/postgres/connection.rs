//! PostgreSQL connection setup.
//!
//! # Security Features
//! - Every session is switched to read-only before any catalog query runs
//! - Application name identifies schemadoc sessions in `pg_stat_activity`
//! - TLS preference is taken from the descriptor, never guessed

use super::PostgresAdapter;
use crate::Result;
use crate::adapters::TlsMode;
use crate::adapters::helpers::close_connection;
use crate::error::SchemaDocError;
use sqlx::Connection;
use sqlx::postgres::{PgConnectOptions, PgConnection, PgSslMode};

/// Maps the descriptor's TLS preference to a PostgreSQL SSL mode.
pub fn ssl_mode_for(tls: TlsMode) -> PgSslMode {
    match tls {
        TlsMode::Enabled => PgSslMode::Require,
        TlsMode::Disabled => PgSslMode::Disable,
        TlsMode::Unspecified => PgSslMode::Prefer,
    }
}

pub(crate) fn application_name() -> String {
    format!("schemadoc-{}", env!("CARGO_PKG_VERSION"))
}

impl PostgresAdapter {
    /// Builds connect options from the descriptor.
    pub(crate) fn connect_options(&self) -> PgConnectOptions {
        let descriptor = &self.descriptor;

        let mut options = PgConnectOptions::new()
            .host(&descriptor.host)
            .port(descriptor.port)
            .database(&descriptor.database)
            .ssl_mode(ssl_mode_for(descriptor.tls))
            .application_name(&application_name());

        if !descriptor.user.is_empty() {
            options = options.username(&descriptor.user);
        }
        if !descriptor.secret.is_empty() {
            options = options.password(descriptor.secret.expose());
        }

        options
    }

    /// Opens one read-only connection.
    ///
    /// # Errors
    /// Returns `Connection` if the server is unreachable, rejects the
    /// credentials, or refuses the read-only session settings.
    pub(crate) async fn connect(&self) -> Result<PgConnection> {
        let target = self.target();
        tracing::debug!("Connecting to {}", target);

        let mut conn = PgConnection::connect_with(&self.connect_options())
            .await
            .map_err(|e| {
                tracing::error!("Failed to connect to {}: {}", target, e);
                SchemaDocError::connection_failed(format!("Failed to connect to {}", target), e)
            })?;

        let session = setup_session(&mut conn).await;
        if let Err(e) = session {
            tracing::error!("Failed to initialize session on {}: {}", target, e);
            close_connection(conn, &target).await;
            return Err(SchemaDocError::connection_failed(
                format!("Failed to initialize read-only session on {}", target),
                e,
            ));
        }

        Ok(conn)
    }
}

/// Applies session settings before any catalog query.
async fn setup_session(conn: &mut PgConnection) -> std::result::Result<(), sqlx::Error> {
    sqlx::query("SET default_transaction_read_only = on")
        .execute(&mut *conn)
        .await?;

    sqlx::query(&format!("SET application_name = '{}'", application_name()))
        .execute(&mut *conn)
        .await?;

    Ok(())
}
