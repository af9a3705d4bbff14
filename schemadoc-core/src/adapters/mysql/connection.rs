//! MySQL connection setup.

use super::MySqlAdapter;
use crate::Result;
use crate::adapters::TlsMode;
use crate::adapters::helpers::close_connection;
use crate::error::SchemaDocError;
use sqlx::Connection;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlSslMode};

/// Maps the descriptor's TLS preference to a MySQL SSL mode.
pub fn ssl_mode_for(tls: TlsMode) -> MySqlSslMode {
    match tls {
        TlsMode::Enabled => MySqlSslMode::Required,
        TlsMode::Disabled => MySqlSslMode::Disabled,
        TlsMode::Unspecified => MySqlSslMode::Preferred,
    }
}

impl MySqlAdapter {
    /// Builds connect options from the descriptor.
    pub(crate) fn connect_options(&self) -> MySqlConnectOptions {
        let descriptor = &self.descriptor;

        let mut options = MySqlConnectOptions::new()
            .host(&descriptor.host)
            .port(descriptor.port)
            .database(&descriptor.database)
            .ssl_mode(ssl_mode_for(descriptor.tls));

        if !descriptor.user.is_empty() {
            options = options.username(&descriptor.user);
        }
        if !descriptor.secret.is_empty() {
            options = options.password(descriptor.secret.expose());
        }

        options
    }

    /// Opens one connection and switches it to read-only transactions.
    ///
    /// # Errors
    /// Returns `Connection` if the server is unreachable, rejects the
    /// credentials, or refuses the session settings.
    pub(crate) async fn connect(&self) -> Result<MySqlConnection> {
        let target = self.target();
        tracing::debug!("Connecting to {}", target);

        let mut conn = MySqlConnection::connect_with(&self.connect_options())
            .await
            .map_err(|e| {
                tracing::error!("Failed to connect to {}: {}", target, e);
                SchemaDocError::connection_failed(format!("Failed to connect to {}", target), e)
            })?;

        let session = sqlx::query("SET SESSION TRANSACTION READ ONLY")
            .execute(&mut conn)
            .await;

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
