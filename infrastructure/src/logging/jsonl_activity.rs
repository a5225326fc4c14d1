//! JSONL transcript writer for activity events.
//!
//! Each [`ActivityEvent`] is serialized as one JSON line with a `timestamp`
//! added, appended through a buffered writer.

use finteam_application::ActivityObserver;
use finteam_domain::ActivityEvent;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Activity observer that writes one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes on `Drop`.
pub struct JsonlActivityLog {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlActivityLog {
    /// Create the transcript file, and its parent directories if missing.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let file = File::create(path)?;
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ActivityObserver for JsonlActivityLog {
    fn notify(&self, event: &ActivityEvent) {
        let record = serde_json::json!({
            "timestamp": chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            "source": event.source,
            "kind": event.kind,
            "sequence": event.sequence,
            "payload": event.payload,
        });

        let Ok(line) = serde_json::to_string(&record) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            if let Err(e) = writeln!(writer, "{}", line).and_then(|_| writer.flush()) {
                warn!("Could not write activity log {}: {}", self.path.display(), e);
            }
        }
    }
}

impl Drop for JsonlActivityLog {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}
