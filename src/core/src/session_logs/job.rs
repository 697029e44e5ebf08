use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use border0_types::{RecordingData, SessionLog};
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::api::{ApiClient, SessionFilter, RECORDING_FORMAT_TEXT};
use crate::examples_config::SessionLogsConfig;

use super::output::append_sessions;
use super::recording::recording_data_from_payload;
use super::state::{format_timestamp, RunState};
use super::SessionLogError;

/// Knobs for one run of [`SessionLogJob`].
#[derive(Debug, Clone)]
pub struct JobOptions {
    pub state_file: PathBuf,
    pub output_file: PathBuf,
    /// Sessions whose recordings are fetched concurrently.
    pub workers: usize,
    pub page_size: u32,
    /// Window start when no previous run is recorded.
    pub lookback: Duration,
    pub finished: Option<bool>,
}

impl Default for JobOptions {
    fn default() -> Self {
        Self::from(&SessionLogsConfig::default())
    }
}

impl From<&SessionLogsConfig> for JobOptions {
    fn from(config: &SessionLogsConfig) -> Self {
        Self {
            state_file: config.state_file.clone(),
            output_file: config.output_file.clone(),
            workers: config.workers,
            page_size: config.page_size,
            lookback: Duration::hours(config.lookback_hours.max(1)),
            finished: None,
        }
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobReport {
    pub window_start: String,
    pub window_end: String,
    /// Sessions returned by the listing.
    pub listed: usize,
    /// Sessions skipped because an earlier run already processed them.
    pub already_processed: usize,
    /// Sessions fetched and written in this run.
    pub new_sessions: usize,
    /// Size of the output file after appending, when anything was written.
    pub output_total: Option<usize>,
}

/// Incremental export of session logs and their recordings.
pub struct SessionLogJob {
    client: ApiClient,
    options: JobOptions,
}

impl SessionLogJob {
    pub fn new(client: ApiClient, options: JobOptions) -> Self {
        Self { client, options }
    }

    pub async fn run(&self) -> Result<JobReport, SessionLogError> {
        self.run_at(Utc::now()).await
    }

    /// Run with an explicit "now", which becomes the window end and the
    /// recorded run time.
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<JobReport, SessionLogError> {
        let mut state = RunState::load(&self.options.state_file);
        let start = state
            .last_run_time()
            .unwrap_or_else(|| now - self.options.lookback);

        let filter = SessionFilter {
            start_date: Some(format_timestamp(start)),
            end_date: Some(format_timestamp(now)),
            finished: self.options.finished,
        };
        let mut report = JobReport {
            window_start: format_timestamp(start),
            window_end: format_timestamp(now),
            ..JobReport::default()
        };

        let Some(sessions) = self.list_window(&filter).await? else {
            tracing::info!("no sessions found");
            return Ok(report);
        };
        report.listed = sessions.len();

        let fresh: Vec<SessionLog> = sessions
            .into_iter()
            .filter(|s| !state.is_processed(&s.session_id))
            .collect();
        report.already_processed = report.listed - fresh.len();
        tracing::info!(
            listed = report.listed,
            new = fresh.len(),
            start = %report.window_start,
            end = %report.window_end,
            "listed sessions"
        );

        let updated = self.fetch_all(fresh).await;
        for session in &updated {
            state.mark_processed(session.session_id.clone());
        }
        report.new_sessions = updated.len();

        state.set_last_run_time(now);
        if let Err(e) = state.save() {
            tracing::error!(path = %state.path().display(), error = %e, "failed to save run state");
        }

        if !updated.is_empty() {
            report.output_total = Some(append_sessions(&self.options.output_file, &updated)?);
        }
        Ok(report)
    }

    /// Every session in the window, page by page until a short page.
    /// `None` when the first page is a 404.
    async fn list_window(
        &self,
        filter: &SessionFilter,
    ) -> Result<Option<Vec<SessionLog>>, SessionLogError> {
        let page_size = self.options.page_size.max(1);
        let mut sessions: Vec<SessionLog> = Vec::new();
        let mut seen = HashSet::new();
        let mut page = 1;
        loop {
            let batch = match self.client.list_sessions(page, page_size, filter).await {
                Ok(batch) => batch,
                Err(e) if e.is_not_found() && page == 1 => return Ok(None),
                Err(e) if e.is_not_found() => break,
                Err(e) => return Err(e.into()),
            };
            let full = batch.len() >= page_size as usize;
            let before = sessions.len();
            sessions.extend(
                batch
                    .into_iter()
                    .filter(|s| seen.insert(s.session_id.clone())),
            );
            // A server that ignores `page` keeps returning the same rows.
            if !full || sessions.len() == before {
                break;
            }
            page += 1;
        }
        Ok(Some(sessions))
    }

    /// Fetch recordings for every session with at most `workers` in flight.
    /// Results arrive in completion order.
    async fn fetch_all(&self, sessions: Vec<SessionLog>) -> Vec<SessionLog> {
        let slots = Arc::new(Semaphore::new(self.options.workers.max(1)));
        let mut set = JoinSet::new();

        for mut session in sessions {
            session.session_log_type = Some(session.log_type());
            let client = self.client.clone();
            let slots = slots.clone();
            set.spawn(async move {
                let _permit = slots.acquire_owned().await.ok();
                fetch_session_recordings(&client, session).await
            });
        }

        let mut updated = Vec::new();
        while let Some(res) = set.join_next().await {
            match res {
                Ok(session) => updated.push(session),
                Err(e) => tracing::warn!("session fetch task failed: {e}"),
            }
        }
        updated
    }
}

/// Fill in `recording_data` for each recording of `session`.
///
/// Fetch failures are logged and leave an empty event list; they never fail the session.
pub async fn fetch_session_recordings(client: &ApiClient, mut session: SessionLog) -> SessionLog {
    for recording in &mut session.recordings {
        let Some(recording_id) = recording.recording_id.clone().filter(|id| !id.is_empty())
        else {
            continue;
        };
        let as_text = recording.is_asciinema();
        let format = as_text.then_some(RECORDING_FORMAT_TEXT);

        let data = match client
            .get_session_recording(
                &session.socket_id,
                &session.session_id,
                Some(&recording_id),
                format,
            )
            .await
        {
            Ok(payload) => recording_data_from_payload(payload, as_text),
            Err(e) => {
                tracing::warn!(
                    session_id = %session.session_id,
                    %recording_id,
                    error = %e,
                    "failed to fetch recording"
                );
                RecordingData::empty()
            }
        };
        recording.recording_data = Some(data);
    }
    session
}
