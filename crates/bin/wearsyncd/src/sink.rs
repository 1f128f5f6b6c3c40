//! Observation sinks wired up by the daemon.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use wearsync_app::error::SinkError;
use wearsync_app::ports::MeasurementSink;
use wearsync_domain::observation::Observation;

/// Logs every observation at `info`.
pub struct LogSink;

impl MeasurementSink for LogSink {
    fn deliver(&self, observation: &Observation) -> Result<(), SinkError> {
        tracing::info!(
            source = %observation.source,
            kind = %observation.kind(),
            measurement = ?observation.measurement,
            "observation"
        );
        Ok(())
    }
}

/// Writes every observation as one JSON object per line.
pub struct JsonLinesSink<W> {
    writer: Mutex<W>,
}

impl JsonLinesSink<BufWriter<File>> {
    /// Open `path` for appending, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns the I/O error when the file cannot be opened.
    pub fn append(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> MeasurementSink for JsonLinesSink<W> {
    fn deliver(&self, observation: &Observation) -> Result<(), SinkError> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        serde_json::to_writer(&mut *writer, observation)
            .map_err(|err| SinkError::Failed(Box::new(err)))?;
        writer
            .write_all(b"\n")
            .and_then(|()| writer.flush())
            .map_err(|err| SinkError::Failed(Box::new(err)))
    }
}
