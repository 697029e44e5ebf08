use std::error::Error;
use std::net::SocketAddr;
use std::path::PathBuf;

use border0_core::api::{email_ssh_policy, expiring_policy};
use border0_core::credentials::{resolve_token, ENV_ADMIN_TOKEN, ENV_API_TOKEN, ENV_TOKEN};
use border0_core::httpsig::{build_verify_router, load_jwks};
use border0_core::playground::{create_playground_connector, create_playground_sockets};
use border0_core::provisioner::{Provisioner, StepOutcome};
use border0_core::session_logs::{JobOptions, SessionLogJob};
use border0_core::{ApiClient, Credentials, ExamplesConfig, SessionLogsConfig};
use border0_types::{NewServiceAccount, NewServiceAccountToken};
use chrono::{Duration, Utc};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpListener;

use crate::{ProvisionAction, ServiceAccountAction};

type CmdResult = Result<(), Box<dyn Error>>;

fn api_client(
    config: &ExamplesConfig,
    credentials: Credentials,
) -> Result<ApiClient, Box<dyn Error>> {
    Ok(ApiClient::with_timeout(
        &config.api_url(),
        credentials,
        config.api.timeout(),
    )?)
}

fn pretty(value: &impl serde::Serialize) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("<unprintable: {e}>"))
}

pub(crate) async fn session_logs(
    config: &ExamplesConfig,
    settings: &SessionLogsConfig,
    finished: Option<bool>,
) -> CmdResult {
    let token = resolve_token(&[ENV_API_TOKEN])?;
    let client = api_client(config, Credentials::AccessToken(token))?;

    let options = JobOptions {
        finished,
        ..JobOptions::from(settings)
    };
    let job = SessionLogJob::new(client, options);
    let report = job.run().await?;

    println!(
        "Fetched sessions from {} to {}",
        report.window_start, report.window_end
    );
    match report.output_total {
        Some(total) => println!(
            "Wrote {} new sessions to {} ({total} total, {} already processed)",
            report.new_sessions,
            settings.output_file.display(),
            report.already_processed
        ),
        None => println!("No new sessions to process"),
    }
    Ok(())
}

pub(crate) async fn service_accounts(
    config: &ExamplesConfig,
    action: ServiceAccountAction,
) -> CmdResult {
    let token = resolve_token(&[ENV_ADMIN_TOKEN])?;
    let client = api_client(config, Credentials::Bearer(token))?;

    match action {
        ServiceAccountAction::Create {
            account_name,
            description,
            role,
            token_name,
        } => {
            match (description, role) {
                (Some(description), Some(role)) => {
                    let account = client
                        .create_service_account(&NewServiceAccount {
                            name: account_name.clone(),
                            description,
                            role,
                        })
                        .await?;
                    println!("Created service account:\n{}", pretty(&account));
                }
                _ if token_name.is_none() => {
                    return Err("creating an account needs --description and --role; \
                                creating a token needs --token-name"
                        .into());
                }
                _ => {}
            }
            if let Some(name) = token_name {
                let token = client
                    .create_service_account_token(
                        &account_name,
                        &NewServiceAccountToken {
                            name,
                            expires_at: 0,
                        },
                    )
                    .await?;
                println!("Created token:\n{}", pretty(&token));
            }
        }
        ServiceAccountAction::Delete {
            account_name,
            token_name,
        } => match token_name {
            Some(token) => {
                client
                    .delete_service_account_token(&account_name, &token)
                    .await?;
                println!("Deleted token {token} of {account_name}");
            }
            None => {
                client.delete_service_account(&account_name).await?;
                println!("Deleted service account {account_name}");
            }
        },
        ServiceAccountAction::List => {
            let accounts = client.list_service_accounts().await?;
            println!("{}", pretty(&accounts));
        }
        ServiceAccountAction::ListTokens { account_name } => {
            let tokens = client.list_service_account_tokens(&account_name).await?;
            println!("{}", pretty(&tokens));
        }
    }
    Ok(())
}

pub(crate) async fn playground(config: &ExamplesConfig) -> CmdResult {
    let token = resolve_token(&[ENV_ADMIN_TOKEN])?;
    let client = api_client(config, Credentials::Bearer(token))?;

    let (connector, secret) = create_playground_connector(&client).await?;
    println!("Created connector {} ({})", connector.name, connector.connector_id);
    println!("To start the connector execute:\n\nBORDER0_TOKEN={secret} border0 connector start\n");

    for socket in create_playground_sockets(&client, &connector.connector_id).await {
        match socket.result {
            Ok(created) => println!(
                "Created {} socket {} ({})",
                socket.kind, created.name, created.dnsname
            ),
            Err(e) => println!("Error creating {} socket: {e}", socket.kind),
        }
    }
    Ok(())
}

pub(crate) async fn create_expiring_policy(
    config: &ExamplesConfig,
    email: &str,
    ttl_minutes: i64,
) -> CmdResult {
    let token = resolve_token(&[ENV_TOKEN])?;
    let client = api_client(config, Credentials::Bearer(token))?;

    let now = Utc::now();
    let expiry = now + Duration::minutes(ttl_minutes.max(1));
    let request = expiring_policy(
        &format!("my-test-policy-{}", now.timestamp()),
        email_ssh_policy(email),
        expiry.timestamp(),
    );
    let policy = client.create_policy(&request).await?;
    println!(
        "Created policy {} ({}), expires at {}",
        policy.name,
        policy.id,
        expiry.to_rfc3339()
    );
    Ok(())
}

pub(crate) async fn provision(
    config: &ExamplesConfig,
    action: ProvisionAction,
    source: PathBuf,
    state: PathBuf,
) -> CmdResult {
    let token = resolve_token(&[ENV_TOKEN])?;
    let client = api_client(config, Credentials::Bearer(token))?;
    let provisioner = Provisioner::new(client)
        .with_source_path(source)
        .with_state_path(state);

    if matches!(action, ProvisionAction::Apply | ProvisionAction::Demo) {
        print_outcomes(&provisioner.apply().await?);
    }
    if action == ProvisionAction::Demo {
        println!("Type 'proceed' to destroy everything that was provisioned:");
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await? {
                Some(line) if line.trim() == "proceed" => break,
                Some(_) => println!("Type 'proceed' to continue"),
                None => return Err("stdin closed before 'proceed'".into()),
            }
        }
    }
    if matches!(action, ProvisionAction::Destroy | ProvisionAction::Demo) {
        print_outcomes(&provisioner.destroy().await?);
    }
    Ok(())
}

fn print_outcomes(outcomes: &[StepOutcome]) {
    for outcome in outcomes {
        match &outcome.error {
            None => println!("{} {}: ok", outcome.action, outcome.name),
            Some(e) => println!("{} {}: failed: {e}", outcome.action, outcome.name),
        }
    }
    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
    if failed > 0 {
        println!("{failed} of {} steps failed", outcomes.len());
    }
}

pub(crate) async fn verify_server(jwks_url: &str, bind: SocketAddr) -> CmdResult {
    let keys = load_jwks(jwks_url).await?;
    let app = build_verify_router(keys);

    let listener = TcpListener::bind(bind).await?;
    tracing::info!(addr = %bind, "listening; all requests must carry a valid Ed25519 signature");
    axum::serve(listener, app).await?;
    Ok(())
}
