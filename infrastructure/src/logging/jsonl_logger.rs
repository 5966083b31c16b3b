//! Append-only JSONL log of tool invocations.
//!
//! Each line is one [`InvocationEvent`] plus a UTC `timestamp`:
//!
//! ```text
//! {"timestamp":"2026-01-05T10:12:03.120Z","type":"tool_failed","tool":"fsl_fast_segmentation","kind":"missing_input",...}
//! ```

use neuro_application::{InvocationEvent, InvocationLogger};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

#[derive(Serialize)]
struct LogLine<'a> {
    timestamp: String,
    #[serde(flatten)]
    event: &'a InvocationEvent,
}

/// Writes each event as a single `write_all`, so concurrent calls never
/// interleave within a line.
pub struct JsonlInvocationLogger {
    file: Mutex<File>,
    path: PathBuf,
    write_failed: AtomicBool,
}

impl JsonlInvocationLogger {
    /// Open `path` for appending, creating it and its parent directories.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            file: Mutex::new(file),
            path: path.to_path_buf(),
            write_failed: AtomicBool::new(false),
        })
    }

    fn write_line(&self, event: &InvocationEvent) -> io::Result<()> {
        let line = LogLine {
            timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            event,
        };
        let mut bytes = serde_json::to_vec(&line)?;
        bytes.push(b'\n');

        let mut file = self.file.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        file.write_all(&bytes)
    }
}

impl InvocationLogger for JsonlInvocationLogger {
    fn log(&self, event: InvocationEvent) {
        if let Err(e) = self.write_line(&event) {
            // Warn once per logger
            if !self.write_failed.swap(true, Ordering::Relaxed) {
                warn!(
                    path = %self.path.display(),
                    event = event.event_type(),
                    tool = event.tool().rpc_name(),
                    error = %e,
                    "Invocation log write failed, later failures are not reported"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neuro_domain::{NeuroTool, ParameterMap};
    use std::collections::BTreeMap;

    fn read_lines(path: &Path) -> Vec<serde_json::Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    fn completed(outputs: BTreeMap<String, PathBuf>) -> InvocationEvent {
        InvocationEvent::ToolCompleted {
            tool: NeuroTool::Bet,
            parameters: ParameterMap::new().with("infile", "/in/t1.nii.gz"),
            outputs,
            duration_ms: 1200,
        }
    }

    #[test]
    fn test_writes_one_typed_line_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("invocations.jsonl");
        let logger = JsonlInvocationLogger::open(&path).unwrap();

        logger.log(InvocationEvent::ToolStarted {
            tool: NeuroTool::Bet,
        });
        logger.log(completed(BTreeMap::from([(
            "outfile".to_string(),
            PathBuf::from("/out/brain.nii.gz"),
        )])));
        logger.log(InvocationEvent::ToolFailed {
            tool: NeuroTool::Dwi2Fod,
            kind: "missing_input",
            error: "DWI file not found: /in/dwi.mif".to_string(),
            duration_ms: 0,
        });

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["type"], "tool_started");
        assert_eq!(lines[0]["tool"], "fsl_bet_brain_extraction");
        assert!(lines[0]["timestamp"].as_str().unwrap().ends_with('Z'));
        assert_eq!(lines[1]["parameters"]["infile"], "/in/t1.nii.gz");
        assert_eq!(lines[1]["outputs"]["outfile"], "/out/brain.nii.gz");
        assert_eq!(lines[1]["duration_ms"], 1200);
        assert_eq!(lines[2]["tool"], "mrtrix_dwi2fod");
        assert_eq!(lines[2]["kind"], "missing_input");
        assert!(!logger.write_failed.load(Ordering::Relaxed));
    }

    #[test]
    fn test_appends_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invocations.jsonl");

        for tool in [NeuroTool::Fast, NeuroTool::Flirt] {
            let logger = JsonlInvocationLogger::open(&path).unwrap();
            logger.log(InvocationEvent::ToolStarted { tool });
        }

        let lines = read_lines(&path);
        assert_eq!(lines[0]["tool"], "fsl_fast_segmentation");
        assert_eq!(lines[1]["tool"], "fsl_flirt_registration");
    }

    #[test]
    fn test_open_reports_unusable_path() {
        let dir = tempfile::tempdir().unwrap();
        assert!(JsonlInvocationLogger::open(dir.path()).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_unencodable_event_is_skipped_and_flagged() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invocations.jsonl");
        let logger = JsonlInvocationLogger::open(&path).unwrap();

        let bad = PathBuf::from(OsStr::from_bytes(b"/out/\xffbrain.nii.gz"));
        logger.log(completed(BTreeMap::from([("outfile".to_string(), bad)])));
        logger.log(InvocationEvent::ToolStarted {
            tool: NeuroTool::ReconAll,
        });

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["type"], "tool_started");
        assert!(logger.write_failed.load(Ordering::Relaxed));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_full_device_flags_write_failure() {
        let Ok(logger) = JsonlInvocationLogger::open("/dev/full") else {
            return;
        };
        logger.log(InvocationEvent::ToolStarted {
            tool: NeuroTool::Bet,
        });
        assert!(logger.write_failed.load(Ordering::Relaxed));
    }
}
