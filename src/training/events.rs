//! Lifecycle events and the sinks that record them.
//!
//! The network reports configuration steps, matrix dimensions, epoch
//! boundaries and elapsed time through an injected [`EventSink`]. Events
//! serialize to tagged JSON, one object per line in [`JsonlSink`].

use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// A single lifecycle fact emitted by the network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TrainEvent {
    Configured {
        hidden: usize,
        visible: usize,
        learning_rate: f64,
    },
    WeightsInitialized {
        rows: usize,
        cols: usize,
        std_dev: f64,
    },
    BiasInitialized {
        strategy: String,
    },
    DataLoaded {
        rows: usize,
        cols: usize,
    },
    DataRejected {
        expected_cols: usize,
        found_cols: usize,
    },
    MatrixAllocated {
        name: String,
        rows: usize,
        cols: usize,
    },
    TrainingStarted {
        epochs: usize,
        rows: usize,
        cols: usize,
    },
    EpochStarted {
        epoch: usize,
    },
    EpochCompleted {
        epoch: usize,
        learning_rate: f64,
        error: f64,
    },
    TrainingCompleted {
        epochs: usize,
        elapsed_ms: u64,
    },
}

/// Receiver for [`TrainEvent`]s, called synchronously from the core.
pub trait EventSink: Send {
    fn record(&mut self, event: &TrainEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&mut self, _event: &TrainEvent) {}
}

/// Keeps events in memory.
///
/// Clones share one buffer, so a caller can hand a clone to the network and
/// read the recorded events from the original.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<TrainEvent>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every event recorded so far.
    pub fn events(&self) -> Vec<TrainEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl EventSink for MemorySink {
    fn record(&mut self, event: &TrainEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event.clone()),
            Err(poisoned) => poisoned.into_inner().push(event.clone()),
        }
    }
}

/// Writes each event as one JSON line and flushes after it.
///
/// Write failures are reported once on stderr and then ignored; logging never
/// aborts training.
pub struct JsonlSink<W: Write + Send> {
    writer: W,
    failed: bool,
}

impl JsonlSink<BufWriter<File>> {
    /// Create (or truncate) a log file.
    pub fn create(path: &Path) -> io::Result<Self> {
        create_parent(path)?;
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }

    /// Open a log file for appending, creating it if needed.
    pub fn append(path: &Path) -> io::Result<Self> {
        create_parent(path)?;
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

fn create_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

impl<W: Write + Send> JsonlSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            failed: false,
        }
    }

    /// Consume the sink and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_event(&mut self, event: &TrainEvent) -> io::Result<()> {
        let line = serde_json::to_string(event).map_err(io::Error::from)?;
        writeln!(self.writer, "{}", line)?;
        self.writer.flush()
    }
}

impl<W: Write + Send> EventSink for JsonlSink<W> {
    fn record(&mut self, event: &TrainEvent) {
        if let Err(e) = self.write_event(event) {
            if !self.failed {
                eprintln!("Failed to write training event: {e}");
                self.failed = true;
            }
        }
    }
}
