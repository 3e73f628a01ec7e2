//! Append-only log of completed analyses

use crate::model::AnalysisResult;
use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// One completed analysis
#[derive(Debug)]
pub struct LogEntry<'a> {
    pub timestamp: String,
    pub client: &'a str,
    pub filename: &'a str,
    pub result: &'a AnalysisResult,
}

impl<'a> LogEntry<'a> {
    /// Entry stamped with the current local time
    pub fn now(client: &'a str, filename: &'a str, result: &'a AnalysisResult) -> Self {
        Self {
            timestamp: chrono::Local::now().to_rfc3339(),
            client,
            filename,
            result,
        }
    }

    /// Single-line rendering: `<timestamp> client=<id> file=<name> result=<json>`
    pub fn to_line(&self) -> Result<String> {
        let result = serde_json::to_string(self.result).context("Failed to serialize result")?;
        Ok(format!(
            "{} client={} file={:?} result={}",
            self.timestamp, self.client, self.filename, result
        ))
    }
}

/// Log capability injected into the service
pub trait AnalysisLog: Send + Sync {
    fn append(&self, entry: &LogEntry<'_>) -> Result<()>;
}

/// Appends one line per analysis to a file
#[derive(Debug)]
pub struct FileAnalysisLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileAnalysisLog {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create log directory {:?}", parent))?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open analysis log {:?}", path))?;

        log::debug!("Analysis log: {:?}", path);

        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AnalysisLog for FileAnalysisLog {
    fn append(&self, entry: &LogEntry<'_>) -> Result<()> {
        let line = entry.to_line()?;
        let mut file = self
            .file
            .lock()
            .map_err(|_| anyhow::anyhow!("analysis log lock has been poisoned"))?;
        writeln!(file, "{}", line).with_context(|| format!("Failed to append to {:?}", self.path))?;
        Ok(())
    }
}

/// Emits entries through the `log` facade instead of a file
#[derive(Debug, Default)]
pub struct ConsoleAnalysisLog;

impl AnalysisLog for ConsoleAnalysisLog {
    fn append(&self, entry: &LogEntry<'_>) -> Result<()> {
        log::info!("{}", entry.to_line()?);
        Ok(())
    }
}
