//! Connection manager — owns the scan gateway, the per-peripheral session
//! tasks and the pending reconnect tasks.
//!
//! | Event | Action |
//! |-------|--------|
//! | `Connected` | cancel pending reconnect, replace the session task |
//! | `Disconnected` | abort the session task, schedule a reconnect |
//! | other states | logged only |
//!
//! Events for peripherals the manager never connected to are ignored.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_stream::StreamExt as _;

use crate::dispatcher::ObservationDispatcher;
use crate::error::GattError;
use crate::ports::{ConnectionEvent, ConnectionState, DeviceTarget, GattPeripheral, ScanGateway};
use crate::reconnect::{self, DEFAULT_RECONNECT_DELAY};
use crate::session::{PeripheralSession, SessionOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionOptions {
    pub session: SessionOptions,
    pub reconnect_delay: Duration,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            session: SessionOptions::default(),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
        }
    }
}

pub struct ConnectionManager<G: ScanGateway> {
    gateway: Arc<G>,
    dispatcher: Arc<ObservationDispatcher>,
    options: ConnectionOptions,
    known: HashSet<String>,
    sessions: HashMap<String, JoinHandle<()>>,
    reconnects: HashMap<String, JoinHandle<()>>,
}

impl<G: ScanGateway + 'static> ConnectionManager<G> {
    #[must_use]
    pub fn new(gateway: Arc<G>, dispatcher: Arc<ObservationDispatcher>, options: ConnectionOptions) -> Self {
        Self {
            gateway,
            dispatcher,
            options,
            known: HashSet::new(),
            sessions: HashMap::new(),
            reconnects: HashMap::new(),
        }
    }

    /// Find `target`, connect to it and keep it connected until the
    /// central's event stream ends.
    ///
    /// # Errors
    ///
    /// Returns [`GattError`] when connection events cannot be subscribed
    /// to or the target is never found. A failed initial connect is not an
    /// error: it schedules a reconnect like any other link loss.
    pub async fn run(&mut self, target: &DeviceTarget) -> Result<(), GattError> {
        let mut events = self.gateway.connection_events().await?;

        tracing::info!(%target, "scanning");
        let peripheral = self.gateway.scan_for(target).await?;
        let address = peripheral.address();
        tracing::info!(%address, "peripheral found, connecting");
        self.known.insert(address.clone());

        if let Err(err) = self.gateway.connect(&peripheral).await {
            tracing::warn!(%err, %address, "initial connect failed");
            self.schedule_reconnect(peripheral);
        }

        while let Some(event) = events.next().await {
            self.handle_event(event);
        }
        tracing::info!("connection event stream ended");
        self.shutdown();
        Ok(())
    }

    /// React to one link state change.
    pub fn handle_event(&mut self, event: ConnectionEvent<G::Peripheral>) {
        let ConnectionEvent { peripheral, state } = event;
        let address = peripheral.address();
        if !self.known.contains(&address) {
            tracing::trace!(%address, %state, "ignoring event for unmanaged peripheral");
            return;
        }

        match state {
            ConnectionState::Connected => {
                tracing::info!(%address, "connected");
                if let Some(pending) = self.reconnects.remove(&address) {
                    pending.abort();
                }
                self.start_session(address, peripheral);
            }
            ConnectionState::Disconnected => {
                tracing::info!(%address, "disconnected");
                if let Some(session) = self.sessions.remove(&address) {
                    session.abort();
                }
                self.schedule_reconnect(peripheral);
            }
            ConnectionState::Connecting | ConnectionState::Disconnecting => {
                tracing::debug!(%address, %state, "link state changed");
            }
        }
    }

    /// Number of session tasks currently running.
    #[must_use]
    pub fn active_sessions(&self) -> usize {
        self.sessions.values().filter(|task| !task.is_finished()).count()
    }

    /// Number of reconnect tasks still waiting.
    #[must_use]
    pub fn pending_reconnects(&self) -> usize {
        self.reconnects.values().filter(|task| !task.is_finished()).count()
    }

    /// Abort every session and reconnect task.
    pub fn shutdown(&mut self) {
        for (_, task) in self.sessions.drain().chain(self.reconnects.drain()) {
            task.abort();
        }
    }

    fn start_session(&mut self, address: String, peripheral: G::Peripheral) {
        let session = PeripheralSession::new(
            peripheral,
            Arc::clone(&self.dispatcher),
            self.options.session,
        );
        let task = tokio::spawn(session.run());
        if let Some(previous) = self.sessions.insert(address, task) {
            previous.abort();
        }
    }

    fn schedule_reconnect(&mut self, peripheral: G::Peripheral) {
        let address = peripheral.address();
        if self
            .reconnects
            .get(&address)
            .is_some_and(|task| !task.is_finished())
        {
            tracing::debug!(%address, "reconnect already pending");
            return;
        }

        let gateway = Arc::clone(&self.gateway);
        let delay = self.options.reconnect_delay;
        tracing::info!(%address, delay_secs = delay.as_secs(), "reconnect scheduled");
        let task = tokio::spawn(async move {
            let outcome = reconnect::reconnect_when_idle(&*gateway, &peripheral, delay).await;
            tracing::debug!(?outcome, "reconnect task finished");
        });
        self.reconnects.insert(address, task);
    }
}

impl<G: ScanGateway> Drop for ConnectionManager<G> {
    fn drop(&mut self) {
        for task in self.sessions.values().chain(self.reconnects.values()) {
            task.abort();
        }
    }
}
