use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A connector as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    pub connector_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub built_in_ssh_service_enabled: bool,
}

/// Body of `POST connector`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewConnector {
    pub name: String,
    pub description: String,
    pub built_in_ssh_service_enabled: bool,
}

/// A connector token. `token` is only populated in the create response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorToken {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub connector_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Body of `POST connector/token`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewConnectorToken {
    pub connector_id: String,
    pub name: String,
    /// Unix seconds. Omitted for tokens that never expire.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}
