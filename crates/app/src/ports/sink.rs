//! Sink port — consumers of decoded observations.

use tokio::sync::mpsc;
use wearsync_domain::observation::Observation;

use crate::error::SinkError;

/// Receives observations from the dispatcher.
///
/// Delivery is synchronous and happens on the session task, so
/// implementations must not block. Slow consumers should forward to a
/// channel (see the `UnboundedSender` impl) and do their work elsewhere.
pub trait MeasurementSink: Send + Sync {
    /// # Errors
    ///
    /// Any error is logged by the dispatcher and otherwise ignored.
    fn deliver(&self, observation: &Observation) -> Result<(), SinkError>;
}

impl<F> MeasurementSink for F
where
    F: Fn(&Observation) -> Result<(), SinkError> + Send + Sync,
{
    fn deliver(&self, observation: &Observation) -> Result<(), SinkError> {
        self(observation)
    }
}

impl MeasurementSink for mpsc::UnboundedSender<Observation> {
    fn deliver(&self, observation: &Observation) -> Result<(), SinkError> {
        self.send(observation.clone()).map_err(|_| SinkError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wearsync_domain::measurement::{BatteryLevel, Measurement};

    fn observation() -> Observation {
        Observation::new(
            "AA:BB:CC:DD:EE:FF",
            Utc::now(),
            Measurement::Battery(BatteryLevel { percent: 12 }),
        )
    }

    #[test]
    fn should_call_closure_sink() {
        let calls = AtomicUsize::new(0);
        let sink = |_: &Observation| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<(), SinkError>(())
        };
        sink.deliver(&observation()).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn should_forward_to_channel() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sent = observation();
        tx.deliver(&sent).unwrap();
        assert_eq!(rx.try_recv().unwrap(), sent);
    }

    #[test]
    fn should_report_closed_channel() {
        let (tx, rx) = mpsc::unbounded_channel::<Observation>();
        drop(rx);
        assert!(matches!(tx.deliver(&observation()), Err(SinkError::Closed)));
    }
}
