use std::collections::BTreeMap;

use border0_types::{Connector, NewConnector, NewConnectorToken, NewSocket, Socket};
use chrono::{Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde_json::{json, Value};
use thiserror::Error;

use crate::api::{ApiClient, ApiError};

#[derive(Debug, Error)]
pub enum PlaygroundError {
    #[error("error creating connector: {0}")]
    CreateConnector(ApiError),

    #[error("error creating connector token: {0}")]
    CreateToken(ApiError),

    #[error("connector token response did not include a token")]
    MissingToken,
}

/// What [`create_playground`] built.
#[derive(Debug)]
pub struct PlaygroundReport {
    pub connector: Connector,
    /// Secret used to start the connector process.
    pub connector_token: String,
    pub sockets: Vec<PlaygroundSocket>,
}

#[derive(Debug)]
pub struct PlaygroundSocket {
    pub kind: &'static str,
    pub result: Result<Socket, String>,
}

/// Lowercase ASCII letters, used to keep generated names unique.
pub fn random_name(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .map(|b| (b as char).to_ascii_lowercase())
        .filter(char::is_ascii_lowercase)
        .take(len)
        .collect()
}

/// SQL flavours share the `database` socket type.
pub fn socket_type_for(kind: &str) -> &str {
    if kind.contains("sql") {
        "database"
    } else {
        kind
    }
}

/// Upstream configurations for the public playground services, in creation order.
pub fn playground_upstreams() -> Vec<(&'static str, Value)> {
    vec![
        (
            "ssh",
            json!({
                "service_type": "ssh",
                "ssh_service_configuration": {
                    "ssh_service_type": "standard",
                    "standard_ssh_service_configuration": {
                        "hostname": "ssh.playground.border0.io",
                        "port": 22,
                        "ssh_authentication_type": "username_and_password",
                        "username_and_password_auth_configuration": {
                            "username": "border0",
                            "password": "Border0<3Ssh",
                        },
                    },
                },
            }),
        ),
        (
            "http",
            json!({
                "service_type": "http",
                "http_service_configuration": {
                    "http_service_type": "standard",
                    "standard_http_service_configuration": {
                        "host_header": "localhost",
                        "hostname": "http.playground.border0.io",
                        "port": 80,
                    },
                },
            }),
        ),
        (
            "mysql",
            database_upstream("mysql.playground.border0.io", 3306, "mysql", "Border0<3MySql"),
        ),
        (
            "pgsql",
            database_upstream("psql.playground.border0.io", 5432, "postgres", "Border0<3Psql"),
        ),
        (
            "vnc",
            json!({
                "service_type": "vnc",
                "vnc_service_configuration": {
                    "hostname": "vnc.playground.border0.io",
                    "port": 5900,
                    "vnc_authentication_type": "password",
                    "password_auth_configuration": { "password": "Border0<3VNC" },
                },
            }),
        ),
        (
            "rdp",
            json!({
                "service_type": "rdp",
                "rdp_service_configuration": {
                    "hostname": "rdp.playground.border0.io",
                    "port": 3389,
                    "rdp_authentication_type": "password",
                    "password_auth_configuration": { "password": "Border0<3RDP" },
                },
            }),
        ),
        (
            "tls",
            json!({
                "service_type": "tls",
                "tls_service_configuration": {
                    "tls_service_type": "standard",
                    "standard_tls_service_configuration": {
                        "hostname": "tls.playground.border0.io",
                        "port": 9000,
                    },
                },
            }),
        ),
    ]
}

fn database_upstream(hostname: &str, port: u16, protocol: &str, password: &str) -> Value {
    json!({
        "service_type": "database",
        "database_service_configuration": {
            "database_service_type": "standard",
            "standard_database_service_configuration": {
                "authentication_type": "username_and_password",
                "hostname": hostname,
                "port": port,
                "protocol": protocol,
                "username_and_password_auth_configuration": {
                    "username": "border0",
                    "password": password,
                },
            },
        },
    })
}

/// Create a connector, a token for it, and one socket per playground service.
///
/// Socket failures are collected in the report; connector or token failures abort.
pub async fn create_playground(client: &ApiClient) -> Result<PlaygroundReport, PlaygroundError> {
    let (connector, connector_token) = create_playground_connector(client).await?;
    let sockets = create_playground_sockets(client, &connector.connector_id).await;
    Ok(PlaygroundReport {
        connector,
        connector_token,
        sockets,
    })
}

/// Create a randomly named connector and a token valid for 800 to 1440 minutes.
///
/// Returns the connector and the token secret.
pub async fn create_playground_connector(
    client: &ApiClient,
) -> Result<(Connector, String), PlaygroundError> {
    let connector = client
        .create_connector(&NewConnector {
            name: format!("connector-{}", random_name(10)),
            description: format!("description-for-the-connector-{}", random_name(10)),
            built_in_ssh_service_enabled: true,
        })
        .await
        .map_err(PlaygroundError::CreateConnector)?;
    tracing::info!(connector_id = %connector.connector_id, "created connector");

    let lifetime = Duration::minutes(rand::thread_rng().gen_range(800..=1440));
    let token = client
        .create_connector_token(&NewConnectorToken {
            connector_id: connector.connector_id.clone(),
            name: format!("token-name-{}", random_name(10)),
            expires_at: Some((Utc::now() + lifetime).timestamp()),
        })
        .await
        .map_err(PlaygroundError::CreateToken)?;
    let secret = token
        .token
        .filter(|t| !t.is_empty())
        .ok_or(PlaygroundError::MissingToken)?;
    Ok((connector, secret))
}

/// One socket per playground upstream, in order. Failures do not stop the loop.
pub async fn create_playground_sockets(
    client: &ApiClient,
    connector_id: &str,
) -> Vec<PlaygroundSocket> {
    let mut sockets = Vec::new();
    for (kind, upstream) in playground_upstreams() {
        let request = NewSocket {
            name: format!("rust-{kind}-{}", random_name(10)),
            socket_type: socket_type_for(kind).to_string(),
            description: None,
            recording_enabled: false,
            connector_authentication_enabled: false,
            connector_id: connector_id.to_string(),
            upstream_configuration: upstream,
            tags: BTreeMap::from([
                ("origin".to_string(), "rust".to_string()),
                ("border0_client_subcategory".to_string(), "The Cloud".to_string()),
                ("border0_client_category".to_string(), "Playground".to_string()),
            ]),
        };
        let result = client.create_socket(&request).await.map_err(|e| {
            tracing::warn!(kind, error = %e, "failed to create socket");
            e.to_string()
        });
        sockets.push(PlaygroundSocket { kind, result });
    }
    sockets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_name_is_lowercase_letters() {
        let name = random_name(16);
        assert_eq!(name.len(), 16);
        assert!(name.chars().all(|c| c.is_ascii_lowercase()));
    }

    #[test]
    fn sql_kinds_map_to_database() {
        assert_eq!(socket_type_for("mysql"), "database");
        assert_eq!(socket_type_for("pgsql"), "database");
        assert_eq!(socket_type_for("vnc"), "vnc");
    }

    #[test]
    fn every_upstream_declares_its_service_type() {
        let upstreams = playground_upstreams();
        assert_eq!(upstreams.len(), 7);
        for (kind, upstream) in upstreams {
            assert_eq!(upstream["service_type"], socket_type_for(kind), "{kind}");
        }
    }
}
