//! Reconnect policy.
//!
//! After a link drops, wait a cooldown, then ask the central to
//! auto-connect if the peripheral is still disconnected. A failed request
//! is retried after another cooldown, indefinitely: there is no backoff
//! and no attempt cap, so a peripheral that never comes back keeps one
//! task and one request per cooldown alive until the manager shuts down.

use std::time::Duration;

use crate::ports::{ConnectionState, GattPeripheral, ScanGateway};

/// Cooldown between a disconnect and the reconnect request.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(15);

/// How a reconnect task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectOutcome {
    /// The peripheral was no longer disconnected when checked.
    Skipped,
    /// An auto-connect request was accepted after `attempts` tries.
    Requested { attempts: u32 },
}

/// Wait `cooldown`, then reconnect `peripheral` if it is still
/// disconnected. Loops until a request is accepted or the state changes.
pub async fn reconnect_when_idle<G: ScanGateway>(
    gateway: &G,
    peripheral: &G::Peripheral,
    cooldown: Duration,
) -> ReconnectOutcome {
    let address = peripheral.address();
    let mut attempts = 0u32;

    loop {
        tokio::time::sleep(cooldown).await;

        let state = gateway.connection_state(peripheral).await;
        if state != ConnectionState::Disconnected {
            tracing::debug!(%address, %state, "no reconnect needed");
            return ReconnectOutcome::Skipped;
        }

        attempts = attempts.saturating_add(1);
        tracing::info!(%address, attempts, "requesting auto-connect");
        match gateway.auto_connect(peripheral).await {
            Ok(()) => return ReconnectOutcome::Requested { attempts },
            Err(err) => {
                tracing::warn!(%err, %address, attempts, "auto-connect failed, retrying after cooldown");
            }
        }
    }
}
