use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST socket`.
///
/// `upstream_configuration` is passed through untouched; its shape depends on
/// the `service_type` it carries (ssh, http, database, vnc, rdp, tls).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewSocket {
    pub name: String,
    pub socket_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub recording_enabled: bool,
    pub connector_authentication_enabled: bool,
    pub connector_id: String,
    pub upstream_configuration: Value,
    pub tags: BTreeMap<String, String>,
}

/// A socket as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Socket {
    pub socket_id: String,
    pub name: String,
    #[serde(default)]
    pub dnsname: String,
    #[serde(default)]
    pub socket_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connector_id: Option<String>,
}
