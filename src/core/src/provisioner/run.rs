use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use border0_types::{NewConnector, NewConnectorToken, NewSocket};
use serde_json::Value;

use crate::api::ApiClient;

use super::files::{ConnectorRecord, ProvisionerSource, ProvisionerState};
use super::ProvisionerError;

pub const DEFAULT_SOURCE_FILE: &str = "source.json";
pub const DEFAULT_STATE_FILE: &str = "provisioner.state";

const CLIENT_CATEGORY: &str = "drones";
const CLIENT_ICON_URL: &str =
    "https://pbs.twimg.com/profile_images/1487876492642197504/eX0g5kIC_400x400.jpg";
const CLIENT_ICON_TEXT: &str = "My Awesome Drone";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepAction {
    CreateConnector,
    CreateConnectorToken,
    CreateSocket,
    DeleteSocket,
    DeleteConnectorToken,
    DeleteConnector,
}

impl fmt::Display for StepAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::CreateConnector => "create connector",
            Self::CreateConnectorToken => "create connector token",
            Self::CreateSocket => "create socket",
            Self::DeleteSocket => "delete socket",
            Self::DeleteConnectorToken => "delete connector token",
            Self::DeleteConnector => "delete connector",
        };
        f.write_str(label)
    }
}

/// Result of one API call made during apply/destroy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub action: StepAction,
    pub name: String,
    /// `None` on success.
    pub error: Option<String>,
}

impl StepOutcome {
    fn ok(action: StepAction, name: impl Into<String>) -> Self {
        Self {
            action,
            name: name.into(),
            error: None,
        }
    }

    fn failed(action: StepAction, name: impl Into<String>, error: impl fmt::Display) -> Self {
        Self {
            action,
            name: name.into(),
            error: Some(error.to_string()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Bulk-creates connectors with a fixed set of sockets each, and tears them
/// down again from the recorded state.
pub struct Provisioner {
    client: ApiClient,
    source_path: PathBuf,
    state_path: PathBuf,
}

impl Provisioner {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            source_path: PathBuf::from(DEFAULT_SOURCE_FILE),
            state_path: PathBuf::from(DEFAULT_STATE_FILE),
        }
    }

    pub fn with_source_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_path = path.into();
        self
    }

    pub fn with_state_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_path = path.into();
        self
    }

    /// Create everything in the source file that the state does not already hold.
    ///
    /// Individual failures are reported in the returned outcomes. The state file is
    /// written once the pass ends.
    pub async fn apply(&self) -> Result<Vec<StepOutcome>, ProvisionerError> {
        let source = ProvisionerSource::load(&self.source_path)?;
        let mut state = ProvisionerState::load(&self.state_path)?;
        let mut outcomes = Vec::new();

        for connector_name in &source.connectors {
            let Some(connector_id) = self
                .ensure_connector(connector_name, &mut state, &mut outcomes)
                .await
            else {
                continue;
            };

            for (suffix, upstream) in &source.sockets {
                let socket_name = format!("{connector_name}-{suffix}");
                if state.sockets.contains_key(&socket_name) {
                    tracing::debug!(socket = %socket_name, "socket already provisioned");
                    continue;
                }
                let outcome = match self
                    .create_socket(&socket_name, suffix, connector_name, &connector_id, upstream)
                    .await
                {
                    Ok(socket) => {
                        state.sockets.insert(socket_name.clone(), socket);
                        StepOutcome::ok(StepAction::CreateSocket, &socket_name)
                    }
                    Err(e) => StepOutcome::failed(StepAction::CreateSocket, &socket_name, e),
                };
                outcomes.push(outcome);
            }
        }

        state.save(&self.state_path)?;
        Ok(outcomes)
    }

    /// Delete every socket, connector token and connector recorded in state.
    ///
    /// Items that fail to delete stay in the state file for a later attempt.
    pub async fn destroy(&self) -> Result<Vec<StepOutcome>, ProvisionerError> {
        let mut state = ProvisionerState::load(&self.state_path)?;
        let mut outcomes = Vec::new();

        let socket_names: Vec<String> = state.sockets.keys().cloned().collect();
        for name in socket_names {
            let Some(socket_id) = state.sockets.get(&name).map(|s| s.socket_id.clone()) else {
                continue;
            };
            match self.client.delete_socket(&socket_id).await {
                Ok(()) => {
                    state.sockets.remove(&name);
                    outcomes.push(StepOutcome::ok(StepAction::DeleteSocket, &name));
                }
                Err(e) => outcomes.push(StepOutcome::failed(StepAction::DeleteSocket, &name, e)),
            }
        }

        let connector_names: Vec<String> = state.connectors.keys().cloned().collect();
        for name in connector_names {
            let Some(record) = state.connectors.get_mut(&name) else {
                continue;
            };
            let connector_id = record.connector.as_ref().map(|c| c.connector_id.clone());

            if let (Some(connector_id), Some(token)) = (&connector_id, record.token.clone()) {
                let token_name = format!("{} ({name})", token.name);
                let action = StepAction::DeleteConnectorToken;
                match self.client.delete_connector_token(connector_id, &token.id).await {
                    Ok(()) => {
                        record.token = None;
                        outcomes.push(StepOutcome::ok(action, token_name));
                    }
                    Err(e) => outcomes.push(StepOutcome::failed(action, token_name, e)),
                }
            }

            let deleted = match &connector_id {
                Some(connector_id) => match self.client.delete_connector(connector_id).await {
                    Ok(()) => {
                        outcomes.push(StepOutcome::ok(StepAction::DeleteConnector, &name));
                        true
                    }
                    Err(e) => {
                        outcomes.push(StepOutcome::failed(StepAction::DeleteConnector, &name, e));
                        false
                    }
                },
                None => true,
            };
            if deleted {
                state.connectors.remove(&name);
            }
        }

        state.save(&self.state_path)?;
        Ok(outcomes)
    }

    /// Return the id of the connector named `name`, creating it and its token
    /// when state does not have them yet.
    async fn ensure_connector(
        &self,
        name: &str,
        state: &mut ProvisionerState,
        outcomes: &mut Vec<StepOutcome>,
    ) -> Option<String> {
        let existing = state
            .connectors
            .get(name)
            .and_then(|record| record.connector.clone());

        let connector = match existing {
            Some(connector) => connector,
            None => {
                let request = NewConnector {
                    name: name.to_string(),
                    description: format!("Bulk provisioned connector {name}"),
                    built_in_ssh_service_enabled: false,
                };
                match self.client.create_connector(&request).await {
                    Ok(connector) => {
                        outcomes.push(StepOutcome::ok(StepAction::CreateConnector, name));
                        state.connectors.insert(
                            name.to_string(),
                            ConnectorRecord {
                                connector: Some(connector.clone()),
                                token: None,
                            },
                        );
                        connector
                    }
                    Err(e) => {
                        outcomes.push(StepOutcome::failed(StepAction::CreateConnector, name, e));
                        return None;
                    }
                }
            }
        };

        let has_token = state
            .connectors
            .get(name)
            .is_some_and(|record| record.token.is_some());
        if !has_token {
            let token_name = format!("{name}-token");
            let request = NewConnectorToken {
                connector_id: connector.connector_id.clone(),
                name: token_name.clone(),
                expires_at: None,
            };
            match self.client.create_connector_token(&request).await {
                Ok(token) => {
                    if let Some(record) = state.connectors.get_mut(name) {
                        record.token = Some(token);
                    }
                    outcomes.push(StepOutcome::ok(StepAction::CreateConnectorToken, token_name));
                }
                Err(e) => {
                    outcomes.push(StepOutcome::failed(
                        StepAction::CreateConnectorToken,
                        token_name,
                        e,
                    ));
                    return None;
                }
            }
        }

        Some(connector.connector_id)
    }

    async fn create_socket(
        &self,
        socket_name: &str,
        suffix: &str,
        connector_name: &str,
        connector_id: &str,
        upstream: &Value,
    ) -> Result<border0_types::Socket, String> {
        let socket_type = upstream
            .get("service_type")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| format!("upstream configuration for {suffix} has no service_type"))?;

        let tags = BTreeMap::from([
            ("border0_client_category".to_string(), CLIENT_CATEGORY.to_string()),
            ("border0_client_subcategory".to_string(), connector_name.to_string()),
            ("border0_client_icon_url".to_string(), CLIENT_ICON_URL.to_string()),
            ("border0_client_icon_text".to_string(), CLIENT_ICON_TEXT.to_string()),
        ]);
        let request = NewSocket {
            name: socket_name.to_string(),
            socket_type: socket_type.to_string(),
            description: Some(format!(
                "Bulk provisioned socket for {suffix} with connector {connector_name}"
            )),
            recording_enabled: true,
            connector_authentication_enabled: false,
            connector_id: connector_id.to_string(),
            upstream_configuration: upstream.clone(),
            tags,
        };
        self.client
            .create_socket(&request)
            .await
            .map_err(|e| e.to_string())
    }
}
