//! Export log for reproducibility
//!
//! Every saved still appends a record with the full parameter snapshot, so any
//! exported image can be rendered again exactly. Appends hold an exclusive
//! lock on a sidecar `.lock` file, so concurrent exports from separate
//! processes do not drop each other's records.

use crate::params::SimulationParameters;
use chrono::{Local, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Read as _};
use std::path::Path;
use tracing::{error, info, warn};

const LOG_FILE_PATH: &str = "export_log.json";
const LOCK_SUFFIX: &str = ".lock";

/// Complete record of one export
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRecord {
    pub timestamp: String,

    /// Output file name
    pub file_name: String,

    /// Simulation time of the first exposure, in seconds
    pub time: f64,

    pub frame_count: u32,
    pub resolution: u32,
    pub watermark: bool,

    pub params: SimulationParameters,
}

impl ExportRecord {
    /// Create a new export record with the current timestamp
    pub fn new(
        file_name: String,
        time: f64,
        frame_count: u32,
        resolution: u32,
        watermark: bool,
        params: SimulationParameters,
    ) -> Self {
        Self {
            timestamp: Local::now().to_rfc3339(),
            file_name,
            time,
            frame_count,
            resolution,
            watermark,
            params,
        }
    }
}

/// Appends [`ExportRecord`]s to a JSON array on disk.
pub struct ExportLogger {
    log_file_path: String,
    lock_file_path: String,
}

impl ExportLogger {
    pub fn new() -> Self {
        Self::with_path(LOG_FILE_PATH)
    }

    /// Log at `log_path`, locking `<log_path>.lock`.
    pub fn with_path(log_path: impl Into<String>) -> Self {
        let log_file_path = log_path.into();
        let lock_file_path = format!("{log_file_path}{LOCK_SUFFIX}");
        Self { log_file_path, lock_file_path }
    }

    pub fn path(&self) -> &str {
        &self.log_file_path
    }

    pub fn lock_path(&self) -> &str {
        &self.lock_file_path
    }

    /// Append a record. Failures are logged, never returned; a missing log
    /// entry must not fail an export that already succeeded.
    pub fn log_export(&self, record: ExportRecord) {
        let lock_file = match OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.lock_file_path)
        {
            Ok(f) => f,
            Err(e) => {
                error!("Failed to open export log lock {}: {}", self.lock_file_path, e);
                return;
            }
        };
        if let Err(e) = lock_file.lock() {
            error!("Failed to lock {}: {}", self.lock_file_path, e);
            return;
        }

        // Lock held until `lock_file` drops.
        match self.append(&record) {
            Ok(_) => info!("Export logged: {}", record.file_name),
            Err(e) => error!("Failed to save export log: {}", e),
        }
    }

    fn append(&self, record: &ExportRecord) -> std::io::Result<()> {
        let mut history = self.load_records();
        history.push(record.clone());

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.log_file_path)?;

        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &history).map_err(std::io::Error::other)
    }

    /// All records on disk. A corrupt log is backed up and treated as empty.
    pub fn load_records(&self) -> Vec<ExportRecord> {
        let path = Path::new(&self.log_file_path);
        if !path.exists() {
            return Vec::new();
        }

        let mut contents = String::new();
        if let Err(e) = File::open(path).and_then(|mut f| f.read_to_string(&mut contents)) {
            error!("Failed to read export log: {}", e);
            return Vec::new();
        }

        let contents = contents.trim();
        if contents.is_empty() {
            return Vec::new();
        }

        match serde_json::from_str(contents) {
            Ok(records) => records,
            Err(e) => {
                warn!("Failed to parse export log, starting fresh: {}", e);
                self.backup_corrupt_log(contents);
                Vec::new()
            }
        }
    }

    fn backup_corrupt_log(&self, contents: &str) {
        let backup = format!("{}.corrupt.{}", self.log_file_path, Utc::now().timestamp());
        match std::fs::write(&backup, contents) {
            Ok(_) => warn!("Unreadable export log moved aside to {backup}"),
            Err(e) => warn!("Could not keep unreadable export log: {e}"),
        }
    }
}

impl Default for ExportLogger {
    fn default() -> Self {
        Self::new()
    }
}
