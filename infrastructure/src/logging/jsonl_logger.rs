//! JSONL file writer for run events.
//!
//! Each [`ConversationEvent`] becomes one JSON line carrying `type`, `seq`
//! and `timestamp` next to the event payload. Several runs of one chat
//! session append to the same file; `seq` restarts per logger.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thinker_application::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use tracing::warn;

struct Sink {
    writer: BufWriter<File>,
    seq: u64,
}

pub struct JsonlTranscriptLogger {
    sink: Mutex<Sink>,
    path: PathBuf,
}

impl JsonlTranscriptLogger {
    /// Open `path` for appending, creating it and its parent directories.
    ///
    /// Returns `None` (after a warning) when the file cannot be opened; the
    /// caller then runs without a transcript.
    pub fn open(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create transcript directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open transcript {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            sink: Mutex::new(Sink {
                writer: BufWriter::new(file),
                seq: 0,
            }),
            path: path.to_path_buf(),
        })
    }

    /// Open a fresh transcript named after `started` inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>, started: DateTime<Utc>) -> Option<Self> {
        let name = format!("run-{}.jsonl", started.format("%Y%m%d-%H%M%S"));
        Self::open(dir.as_ref().join(name))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn record(event: ConversationEvent, seq: u64) -> Value {
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let mut map = match event.payload {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            let mut map = Map::new();
            map.insert("data".to_string(), other);
            map
        }
    };
    map.insert("type".to_string(), Value::from(event.event_type));
    map.insert("seq".to_string(), Value::from(seq));
    map.insert("timestamp".to_string(), Value::from(timestamp));
    Value::Object(map)
}

impl ConversationLogger for JsonlTranscriptLogger {
    fn log(&self, event: ConversationEvent) {
        let Ok(mut sink) = self.sink.lock() else {
            return;
        };
        sink.seq += 1;
        let line = match serde_json::to_string(&record(event, sink.seq)) {
            Ok(line) => line,
            Err(e) => {
                warn!("Dropping transcript event: {}", e);
                return;
            }
        };
        // Flushed per line so an interrupted run still leaves a readable transcript
        if writeln!(sink.writer, "{}", line)
            .and_then(|_| sink.writer.flush())
            .is_err()
        {
            warn!("Failed to write transcript {}", self.path.display());
        }
    }
}

impl Drop for JsonlTranscriptLogger {
    fn drop(&mut self) {
        if let Ok(mut sink) = self.sink.lock() {
            let _ = sink.writer.flush();
        }
    }
}
