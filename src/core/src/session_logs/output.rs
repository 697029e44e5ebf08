use std::path::Path;

use border0_types::SessionLog;
use serde_json::Value;

use super::SessionLogError;

/// Load the accumulated output file. A missing or undecodable file reads as empty.
pub fn load_output(path: &Path) -> Vec<Value> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read processed sessions");
            return Vec::new();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(sessions) => sessions,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to decode processed sessions");
            Vec::new()
        }
    }
}

/// Append `sessions` to the JSON array stored at `path`, rewriting the whole file.
pub fn append_sessions(path: &Path, sessions: &[SessionLog]) -> Result<usize, SessionLogError> {
    let mut all = load_output(path);
    for session in sessions {
        all.push(serde_json::to_value(session)?);
    }
    let body = serde_json::to_string_pretty(&all)?;
    std::fs::write(path, body).map_err(|source| SessionLogError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(all.len())
}
