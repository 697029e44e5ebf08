use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Recording type whose payload is fetched as a plain text replay.
pub const ASCIINEMA_RECORDING_TYPE: &str = "asciinema";

/// One page of `GET sessions`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionLogPage {
    #[serde(default)]
    pub session_logs: Vec<SessionLog>,
}

/// A single user connection through a socket.
///
/// Fields not modelled here are kept in `extra` so a session can be written
/// back out exactly as the API returned it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionLog {
    pub session_id: String,
    pub socket_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default)]
    pub recordings: Vec<Recording>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_log_type: Option<SessionLogType>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SessionLog {
    /// A session without an end time is still running.
    pub fn is_finished(&self) -> bool {
        self.end_time
            .as_deref()
            .is_some_and(|end| !end.trim().is_empty())
    }

    pub fn log_type(&self) -> SessionLogType {
        if self.is_finished() {
            SessionLogType::SessionCompleted
        } else {
            SessionLogType::SessionStarted
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionLogType {
    SessionStarted,
    SessionCompleted,
}

/// Reference to a recording attached to a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recording_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recording_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recording_data: Option<RecordingData>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Recording {
    pub fn is_asciinema(&self) -> bool {
        self.recording_type.as_deref() == Some(ASCIINEMA_RECORDING_TYPE)
    }
}

/// Fetched recording payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordingData {
    /// Timed events, one JSON value per JSONL line.
    Events(Vec<Value>),
    /// Terminal replay rendered as text.
    Text(String),
}

impl RecordingData {
    pub fn empty() -> Self {
        Self::Events(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn open_session_is_started() {
        let session: SessionLog = serde_json::from_value(json!({
            "session_id": "s-1",
            "socket_id": "sock-1",
            "start_time": "2024-05-01T10:00:00Z",
            "end_time": null,
        }))
        .unwrap();
        assert_eq!(session.log_type(), SessionLogType::SessionStarted);
    }

    #[test]
    fn empty_end_time_counts_as_open() {
        let session: SessionLog = serde_json::from_value(json!({
            "session_id": "s-1",
            "socket_id": "sock-1",
            "end_time": "",
        }))
        .unwrap();
        assert!(!session.is_finished());
    }

    #[test]
    fn unknown_fields_survive_a_round_trip() {
        let raw = json!({
            "session_id": "s-1",
            "socket_id": "sock-1",
            "end_time": "2024-05-01T10:05:00Z",
            "user": { "email": "ops@example.com" },
            "recordings": [{ "recording_id": "r-1", "recording_type": "asciinema", "size": 12 }],
        });
        let session: SessionLog = serde_json::from_value(raw).unwrap();
        assert!(session.recordings[0].is_asciinema());

        let out = serde_json::to_value(&session).unwrap();
        assert_eq!(out["user"]["email"], "ops@example.com");
        assert_eq!(out["recordings"][0]["size"], 12);
    }

    #[test]
    fn recording_data_serializes_untagged() {
        let text = serde_json::to_value(RecordingData::Text("$ ls\n".into())).unwrap();
        assert_eq!(text, json!("$ ls\n"));
        let events = serde_json::to_value(RecordingData::empty()).unwrap();
        assert_eq!(events, json!([]));
    }
}
