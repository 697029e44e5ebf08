use border0_types::RecordingData;
use serde_json::Value;

/// Parse JSONL recording events. Blank lines are skipped; malformed lines are
/// logged and dropped.
pub fn parse_jsonl_recording(recording: &str) -> Vec<Value> {
    recording
        .trim()
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match serde_json::from_str(line) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::warn!(error = %e, "skipping malformed recording line");
                None
            }
        })
        .collect()
}

/// Turn a `session_log` response into stored recording data.
///
/// The endpoint answers with a JSON string: JSONL events, or a text replay when
/// `as_text` was requested.
pub fn recording_data_from_payload(payload: Value, as_text: bool) -> RecordingData {
    match payload {
        Value::String(text) if as_text => RecordingData::Text(text),
        Value::String(text) => RecordingData::Events(parse_jsonl_recording(&text)),
        Value::Array(events) => RecordingData::Events(events),
        Value::Null => RecordingData::empty(),
        other => RecordingData::Events(vec![other]),
    }
}
