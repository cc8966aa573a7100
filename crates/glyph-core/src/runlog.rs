//! Append-only per-invocation record of file outcomes.
//!
//! Each batch run opens its own timestamped log file in the working
//! directory. Entries are appended in processing order and flushed per
//! line, so a partially completed run still leaves a usable record. This
//! file is a product surface, distinct from the `tracing` diagnostics.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::ConvertError;

/// Append-only run log for one batch invocation.
pub struct RunLog {
    path: PathBuf,
    file: File,
}

impl RunLog {
    /// Create a new run log in `dir`, named after the invocation time,
    /// e.g. `glyph_run_20250101_093000.log`.
    pub fn create(dir: &Path) -> std::io::Result<Self> {
        let name = format!(
            "glyph_run_{}.log",
            chrono::Local::now().format("%Y%m%d_%H%M%S")
        );
        Self::create_at(dir.join(name))
    }

    /// Create (or append to) a run log at an explicit path.
    pub fn create_at(path: PathBuf) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self { path, file })
    }

    /// Path of the underlying log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record a successful conversion.
    pub fn success(&mut self, source: &Path, output: &Path, latency_ms: u64) {
        self.append(
            "INFO",
            &format!(
                "{} -> {} ({latency_ms} ms)",
                display_name(source),
                display_name(output)
            ),
        );
    }

    /// Record a failed conversion.
    pub fn failure(&mut self, source: &Path, error: &ConvertError) {
        self.append("ERROR", &format!("{}: {error}", display_name(source)));
    }

    /// Record a batch-level note (run start, run summary).
    pub fn note(&mut self, message: &str) {
        self.append("INFO", message);
    }

    /// A log write must never abort the batch; failures degrade to a
    /// tracing warning.
    fn append(&mut self, level: &str, message: &str) {
        let line = format!(
            "{} - {level} - {message}\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        );
        if let Err(e) = self.file.write_all(line.as_bytes()).and_then(|()| self.file.flush()) {
            tracing::warn!("Failed to append to run log {:?}: {e}", self.path);
        }
    }
}

/// File name without its directory, for compact log lines.
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
