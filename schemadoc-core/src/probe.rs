//! Liveness probing.

use crate::Result;
use crate::adapters::{ConnectionDescriptor, create_adapter};

/// Checks that a descriptor can be connected to, without reading the catalog.
///
/// Opens one read-only connection, runs `SELECT 1`, and closes it. For
/// SQLite a missing file fails with `NotFound` and is never created.
///
/// # Errors
/// Returns the same classified errors as introspection: `Connection`,
/// `NotFound`, `Introspection`, `UnsupportedEngine` or `Configuration`.
pub async fn probe(descriptor: &ConnectionDescriptor) -> Result<()> {
    let start_time = std::time::Instant::now();
    let adapter = create_adapter(descriptor)?;

    tracing::debug!("Probing {}", descriptor);

    match adapter.probe().await {
        Ok(()) => {
            tracing::info!(
                "{} is reachable ({} ms)",
                descriptor,
                start_time.elapsed().as_millis()
            );
            Ok(())
        }
        Err(e) => {
            tracing::warn!("Probe of {} failed ({}): {}", descriptor, e.kind(), e);
            Err(e)
        }
    }
}
