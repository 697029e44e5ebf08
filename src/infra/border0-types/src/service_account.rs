use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Organization role granted to a service account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceAccountRole {
    Admin,
    Member,
    Client,
}

impl fmt::Display for ServiceAccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Admin => "admin",
            Self::Member => "member",
            Self::Client => "client",
        };
        f.write_str(name)
    }
}

impl FromStr for ServiceAccountRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            "client" => Ok(Self::Client),
            other => Err(format!("unknown role {other:?} (expected admin, member or client)")),
        }
    }
}

/// Body of `POST organizations/iam/service_accounts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewServiceAccount {
    pub name: String,
    pub description: String,
    pub role: ServiceAccountRole,
}

/// A service account as returned by the API. `role` stays a plain string so
/// roles this crate does not know about still decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceAccount {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
}

/// Body of `POST .../{name}/tokens`. `expires_at` of 0 means the token never expires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewServiceAccountToken {
    pub name: String,
    pub expires_at: i64,
}

/// A service account token. `token` is only populated in the create response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceAccountToken {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("Admin".parse::<ServiceAccountRole>(), Ok(ServiceAccountRole::Admin));
        assert!("owner".parse::<ServiceAccountRole>().is_err());
    }

    #[test]
    fn role_serializes_lowercase() {
        let body = serde_json::to_string(&NewServiceAccount {
            name: "ci".into(),
            description: "ci runner".into(),
            role: ServiceAccountRole::Client,
        })
        .unwrap();
        assert!(body.contains(r#""role":"client""#));
    }

    #[test]
    fn account_keeps_unrecognised_role() {
        let account: ServiceAccount =
            serde_json::from_str(r#"{"name":"ro","role":"read_only"}"#).unwrap();
        assert_eq!(account.role.as_deref(), Some("read_only"));
    }
}
