use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use chrono::Local;
use tracing::warn;

/// Append-only log of failed per-symbol analyses.
///
/// The first write to an empty file adds a header with the analysis date and
/// window label; every entry after that is one `symbol: reason` line. Writes
/// are best-effort: a failed log write warns and never interrupts a scan.
pub struct FailureLog {
    path: PathBuf,
    window_label: String,
}

impl FailureLog {
    pub fn new(path: impl Into<PathBuf>, window_label: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            window_label: window_label.into(),
        }
    }

    pub fn append(&self, symbol: &str, reason: &str) {
        if let Err(e) = self.try_append(symbol, reason) {
            warn!("Could not write failure log {}: {}", self.path.display(), e);
        }
    }

    fn try_append(&self, symbol: &str, reason: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        // Header goes in only when the file is empty
        if file.metadata()?.len() == 0 {
            writeln!(
                file,
                "Analysis Date: {}",
                Local::now().format("%Y-%m-%d %H:%M:%S")
            )?;
            writeln!(file, "Period: {}", self.window_label)?;
            writeln!(file)?;
        }

        writeln!(file, "{}: {}", symbol, reason)?;
        Ok(())
    }
}
