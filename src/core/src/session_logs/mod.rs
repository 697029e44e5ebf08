mod job;
mod output;
mod recording;
mod state;

pub use job::{fetch_session_recordings, JobOptions, JobReport, SessionLogJob};
pub use output::{append_sessions, load_output};
pub use recording::{parse_jsonl_recording, recording_data_from_payload};
pub use state::RunState;

use std::path::PathBuf;

use thiserror::Error;

use crate::api::ApiError;

#[derive(Debug, Error)]
pub enum SessionLogError {
    #[error("read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("encode json: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("list sessions: {0}")]
    Api(#[from] ApiError),
}
