mod files;
mod run;

pub use files::{ConnectorRecord, ProvisionerSource, ProvisionerState};
pub use run::{Provisioner, StepAction, StepOutcome, DEFAULT_SOURCE_FILE, DEFAULT_STATE_FILE};

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProvisionerError {
    #[error("failed to find source file {path}: {source}")]
    SourceNotFound {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read source file {path}: {source}")]
    SourceRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to decode source file {path}: {source}")]
    SourceDecode {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to read state file {path}: {source}")]
    StateRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to decode state file {path}: {source}")]
    StateDecode {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to encode state file: {0}")]
    StateEncode(serde_json::Error),

    #[error("failed to write state file {path}: {source}")]
    StateWrite {
        path: PathBuf,
        source: std::io::Error,
    },
}
