#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

//! Process memory from `/proc/self/status`

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

const SELF_STATUS: &str = "/proc/self/status";

/// Errors reading process memory.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: String, reason: String },

    #[error("{0} not found in status file")]
    MissingField(&'static str),

    #[error("malformed status line '{line}': {reason}")]
    Parse { line: String, reason: String },
}

/// Status fields we care about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    VmRss,
    VmSize,
    VmPeak,
    RssAnon,
}

impl Field {
    fn from_line(line: &str) -> Option<Self> {
        [
            ("VmRSS:", Self::VmRss),
            ("VmSize:", Self::VmSize),
            ("VmPeak:", Self::VmPeak),
            ("RssAnon:", Self::RssAnon),
        ]
        .into_iter()
        .find_map(|(prefix, field)| line.starts_with(prefix).then_some(field))
    }
}

/// Memory of the running process, in kilobytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessMemory {
    pub rss_kb: u64,
    pub vm_size_kb: u64,
    pub vm_peak_kb: u64,
    /// Anonymous resident memory; 0 on kernels that do not report it
    pub rss_anon_kb: u64,
}

impl ProcessMemory {
    /// Read this process's memory figures.
    ///
    /// # Errors
    ///
    /// Returns error if `/proc/self/status` is unavailable (non-Linux
    /// platforms) or malformed.
    pub fn read_self() -> Result<Self, MemoryError> {
        Self::read_from_file(Path::new(SELF_STATUS))
    }

    fn read_from_file(path: &Path) -> Result<Self, MemoryError> {
        let read_failed = |reason: String| MemoryError::ReadFailed {
            path: path.display().to_string(),
            reason,
        };
        let file = File::open(path).map_err(|e| read_failed(e.to_string()))?;

        #[derive(Default)]
        struct Accumulator {
            rss_kb: Option<u64>,
            vm_size_kb: Option<u64>,
            vm_peak_kb: Option<u64>,
            rss_anon_kb: Option<u64>,
        }

        let mut acc = Accumulator::default();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|e| read_failed(e.to_string()))?;
            let Some((field, value)) = Self::parse_line(&line)? else {
                continue;
            };
            match field {
                Field::VmRss => acc.rss_kb = Some(value),
                Field::VmSize => acc.vm_size_kb = Some(value),
                Field::VmPeak => acc.vm_peak_kb = Some(value),
                Field::RssAnon => acc.rss_anon_kb = Some(value),
            }
        }

        Ok(Self {
            rss_kb: acc.rss_kb.ok_or(MemoryError::MissingField("VmRSS"))?,
            vm_size_kb: acc.vm_size_kb.ok_or(MemoryError::MissingField("VmSize"))?,
            vm_peak_kb: acc.vm_peak_kb.ok_or(MemoryError::MissingField("VmPeak"))?,
            rss_anon_kb: acc.rss_anon_kb.unwrap_or(0),
        })
    }

    /// Parse "`FieldName`:    12345 kB"; unrelated lines yield `None`.
    fn parse_line(line: &str) -> Result<Option<(Field, u64)>, MemoryError> {
        let Some(field) = Field::from_line(line) else {
            return Ok(None);
        };
        let parse_error = |reason: String| MemoryError::Parse {
            line: line.to_string(),
            reason,
        };
        let value = line
            .split_whitespace()
            .nth(1)
            .ok_or_else(|| parse_error("missing value".to_string()))?
            .parse::<u64>()
            .map_err(|e| parse_error(e.to_string()))?;
        Ok(Some((field, value)))
    }
}
