use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const POLICY_VERSION_V2: &str = "v2";

/// Body of `POST policies`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPolicy {
    pub name: String,
    pub description: String,
    pub socket_ids: Vec<String>,
    pub org_wide: bool,
    pub policy_data: PolicyData,
    pub version: String,
    /// Unix seconds after which the policy stops applying.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<i64>,
}

/// A policy as returned by the API. Fields this crate does not model are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyData {
    pub condition: PolicyCondition,
    pub permissions: PolicyPermissions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyCondition {
    pub who: PolicyWho,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyWho {
    #[serde(default)]
    pub email: Vec<String>,
    #[serde(default)]
    pub group: Vec<String>,
    #[serde(default)]
    pub service_account: Vec<String>,
}

/// Per-protocol permissions. An empty object grants the protocol with no restrictions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyPermissions {
    #[serde(default)]
    pub database: Map<String, Value>,
    #[serde(default)]
    pub http: Map<String, Value>,
    #[serde(default)]
    pub kubernetes: Map<String, Value>,
    #[serde(default)]
    pub network: Map<String, Value>,
    #[serde(default)]
    pub rdp: Map<String, Value>,
    #[serde(default)]
    pub ssh: SshPermissions,
    #[serde(default)]
    pub tls: Map<String, Value>,
    #[serde(default)]
    pub vnc: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SshPermissions {
    #[serde(default)]
    pub docker_exec: Map<String, Value>,
    #[serde(default)]
    pub exec: Map<String, Value>,
    #[serde(default)]
    pub kubectl_exec: Map<String, Value>,
    #[serde(default)]
    pub sftp: Map<String, Value>,
    #[serde(default)]
    pub shell: Map<String, Value>,
    #[serde(default)]
    pub tcp_forwarding: Map<String, Value>,
}
