use border0_types::{SessionLog, SessionLogPage};
use serde_json::Value;

use super::{ApiClient, ApiError};

/// `format` value that asks for a terminal recording rendered as text.
pub const RECORDING_FORMAT_TEXT: &str = "text";

/// Filters for `GET sessions`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionFilter {
    /// RFC 3339 lower bound.
    pub start_date: Option<String>,
    /// RFC 3339 upper bound.
    pub end_date: Option<String>,
    /// Only finished (`true`) or only running (`false`) sessions.
    pub finished: Option<bool>,
}

impl SessionFilter {
    fn query(&self, page: u32, page_size: u32) -> Vec<(&'static str, String)> {
        let mut query = vec![("page", page.to_string()), ("page_size", page_size.to_string())];
        if let Some(start) = &self.start_date {
            query.push(("start_date", start.clone()));
        }
        if let Some(end) = &self.end_date {
            query.push(("end_date", end.clone()));
        }
        if let Some(finished) = self.finished {
            query.push(("finished", finished.to_string()));
        }
        query
    }
}

impl ApiClient {
    /// Fetch one page of session logs.
    pub async fn list_sessions(
        &self,
        page: u32,
        page_size: u32,
        filter: &SessionFilter,
    ) -> Result<Vec<SessionLog>, ApiError> {
        let page: SessionLogPage = self
            .get_json(&["sessions"], &filter.query(page, page_size))
            .await?;
        Ok(page.session_logs)
    }

    /// Fetch the raw payload of one recording attached to a session.
    pub async fn get_session_recording(
        &self,
        socket_id: &str,
        session_id: &str,
        recording_id: Option<&str>,
        format: Option<&str>,
    ) -> Result<Value, ApiError> {
        let mut query = Vec::new();
        if let Some(id) = recording_id.filter(|id| !id.is_empty()) {
            query.push(("recording_id", id.to_string()));
        }
        if let Some(format) = format.filter(|f| !f.is_empty()) {
            query.push(("format", format.to_string()));
        }
        self.get_json(&["session", socket_id, session_id, "session_log"], &query)
            .await
    }
}
