use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::Path;

use border0_types::{Connector, ConnectorToken, Socket};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ProvisionerError;

/// Desired resources: every connector gets one socket per entry in `sockets`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProvisionerSource {
    /// Socket name suffix to upstream configuration.
    #[serde(default)]
    pub sockets: BTreeMap<String, Value>,
    #[serde(default)]
    pub connectors: Vec<String>,
}

impl ProvisionerSource {
    pub fn load(path: &Path) -> Result<Self, ProvisionerError> {
        if let Err(source) = std::fs::metadata(path) {
            return Err(ProvisionerError::SourceNotFound {
                path: path.to_path_buf(),
                source,
            });
        }
        let raw = std::fs::read(path).map_err(|source| ProvisionerError::SourceRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_slice(&raw).map_err(|source| ProvisionerError::SourceDecode {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Resources created by earlier runs, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProvisionerState {
    #[serde(default)]
    pub sockets: BTreeMap<String, Socket>,
    #[serde(default)]
    pub connectors: BTreeMap<String, ConnectorRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorRecord {
    pub connector: Option<Connector>,
    pub token: Option<ConnectorToken>,
}

impl ProvisionerState {
    /// Load state; a missing file is an empty state.
    pub fn load(path: &Path) -> Result<Self, ProvisionerError> {
        let raw = match std::fs::read(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ProvisionerError::StateRead {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        serde_json::from_slice(&raw).map_err(|source| ProvisionerError::StateDecode {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), ProvisionerError> {
        let body = serde_json::to_vec(self).map_err(ProvisionerError::StateEncode)?;
        std::fs::write(path, body).map_err(|source| ProvisionerError::StateWrite {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.sockets.is_empty() && self.connectors.is_empty()
    }
}
