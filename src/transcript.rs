use crate::validator::Violation;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only JSONL log of one prompt session.
pub struct Transcript {
    pub path: PathBuf,
    session_id: String,
    file: File,
}

#[derive(Serialize)]
struct Event<'a> {
    ts: DateTime<Utc>,
    session_id: &'a str,
    #[serde(rename = "type")]
    event_type: &'a str,
    #[serde(flatten)]
    data: serde_json::Value,
}

impl Transcript {
    pub fn new(path: &Path, session_id: &str) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            session_id: session_id.to_string(),
            file,
        })
    }

    /// Create `<dir>/<session_id>.jsonl`, creating the directory if needed
    pub fn create_in(dir: &Path, session_id: &str) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        Self::new(&dir.join(format!("{}.jsonl", session_id)), session_id)
    }

    pub fn log(&mut self, event_type: &str, data: serde_json::Value) -> Result<()> {
        let event = Event {
            ts: Utc::now(),
            session_id: &self.session_id,
            event_type,
            data,
        };
        let line = serde_json::to_string(&event)?;
        writeln!(self.file, "{}", line)?;
        self.file.flush()?;
        Ok(())
    }

    pub fn session_start(&mut self, mode: &str, max_attempts: Option<usize>) -> Result<()> {
        self.log(
            "session_start",
            serde_json::json!({ "mode": mode, "max_attempts": max_attempts }),
        )
    }

    /// Log a line that reached the validator
    pub fn attempt(
        &mut self,
        attempt: usize,
        input: &str,
        violation: Option<Violation>,
    ) -> Result<()> {
        self.log(
            "attempt",
            serde_json::json!({
                "attempt": attempt,
                "input": input,
                "valid": violation.is_none(),
                "violation": violation.map(|v| v.as_str()),
            }),
        )
    }

    /// Log a line refused before validation (empty or too long)
    pub fn rejected(&mut self, attempt: usize, reason: &str, len: usize) -> Result<()> {
        self.log(
            "rejected",
            serde_json::json!({
                "attempt": attempt,
                "reason": reason,
                "len": len,
            }),
        )
    }

    pub fn accepted(&mut self, email: &str, attempts: usize) -> Result<()> {
        self.log(
            "accepted",
            serde_json::json!({ "email": email, "attempts": attempts }),
        )
    }

    pub fn aborted(&mut self, reason: &str, attempts: usize) -> Result<()> {
        self.log(
            "aborted",
            serde_json::json!({ "reason": reason, "attempts": attempts }),
        )
    }
}
