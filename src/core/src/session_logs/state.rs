use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::SessionLogError;

#[derive(Debug, Default, Serialize, Deserialize)]
struct StateFile {
    #[serde(default)]
    last_run_time: Option<String>,
    #[serde(default)]
    processed_session_ids: Vec<String>,
}

/// Progress carried between runs of the session log job.
///
/// Persisted as flat JSON with a whole-file write. A crash between fetching and
/// saving means the next run fetches the same sessions again.
#[derive(Debug, Clone)]
pub struct RunState {
    path: PathBuf,
    last_run_time: Option<DateTime<Utc>>,
    processed: BTreeSet<String>,
}

impl RunState {
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            last_run_time: None,
            processed: BTreeSet::new(),
        }
    }

    /// Load state from `path`. A missing or unreadable file yields an empty state.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let mut state = Self::empty(path);
        let raw = match std::fs::read_to_string(&state.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return state,
            Err(e) => {
                tracing::warn!(path = %state.path.display(), error = %e, "failed to read run state");
                return state;
            }
        };
        let file: StateFile = match serde_json::from_str(&raw) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(path = %state.path.display(), error = %e, "failed to decode run state");
                return state;
            }
        };

        state.last_run_time = file.last_run_time.as_deref().and_then(|raw| {
            match DateTime::parse_from_rfc3339(raw) {
                Ok(ts) => Some(ts.with_timezone(&Utc)),
                Err(e) => {
                    tracing::warn!(value = raw, error = %e, "ignoring unparseable last_run_time");
                    None
                }
            }
        });
        state.processed = file.processed_session_ids.into_iter().collect();
        state
    }

    pub fn save(&self) -> Result<(), SessionLogError> {
        let file = StateFile {
            last_run_time: self.last_run_time.map(format_timestamp),
            processed_session_ids: self.processed.iter().cloned().collect(),
        };
        let body = serde_json::to_string_pretty(&file)?;
        std::fs::write(&self.path, body).map_err(|source| SessionLogError::Write {
            path: self.path.clone(),
            source,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn last_run_time(&self) -> Option<DateTime<Utc>> {
        self.last_run_time
    }

    pub fn set_last_run_time(&mut self, at: DateTime<Utc>) {
        self.last_run_time = Some(at);
    }

    pub fn mark_processed(&mut self, session_id: impl Into<String>) {
        self.processed.insert(session_id.into());
    }

    pub fn is_processed(&self, session_id: &str) -> bool {
        self.processed.contains(session_id)
    }

    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }
}

/// RFC 3339, UTC, whole seconds, `Z` suffix: the format the sessions endpoint filters on.
pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}
