use std::net::SocketAddr;
use std::path::PathBuf;

use border0_types::ServiceAccountRole;
use clap::{Parser, Subcommand};

mod commands;

/// Example scripts for the Border0 REST API.
#[derive(Parser, Debug)]
#[command(name = "border0-examples", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Export new session logs and their recordings to a JSON file.
    SessionLogs {
        #[arg(long)]
        state_file: Option<PathBuf>,
        #[arg(long)]
        output_file: Option<PathBuf>,
        /// Sessions whose recordings are fetched concurrently.
        #[arg(long)]
        workers: Option<usize>,
        /// Only list finished (true) or unfinished (false) sessions.
        #[arg(long)]
        finished: Option<bool>,
    },
    /// Manage service accounts and their tokens.
    ServiceAccounts {
        #[command(subcommand)]
        action: ServiceAccountAction,
    },
    /// Create a connector with one socket per playground service.
    Playground,
    /// Create an SSH policy for one email that expires shortly.
    ExpiringPolicy {
        #[arg(long)]
        email: String,
        #[arg(long, default_value_t = 5)]
        ttl_minutes: i64,
    },
    /// Bulk-provision connectors and sockets from a source file.
    Provision {
        #[command(subcommand)]
        action: ProvisionAction,
        #[arg(long, global = true)]
        source: Option<PathBuf>,
        #[arg(long, global = true)]
        state: Option<PathBuf>,
    },
    /// Serve an echo endpoint that only accepts Ed25519-signed requests.
    VerifyServer {
        #[arg(long)]
        jwks_url: String,
        #[arg(long, default_value = "0.0.0.0:8080")]
        bind: SocketAddr,
    },
}

#[derive(Subcommand, Debug)]
enum ServiceAccountAction {
    /// Create an account (with --description and --role), a token, or both.
    Create {
        #[arg(short = 'a', long)]
        account_name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        role: Option<ServiceAccountRole>,
        #[arg(short = 't', long)]
        token_name: Option<String>,
    },
    /// Delete a token when --token-name is given, otherwise the account.
    Delete {
        #[arg(short = 'a', long)]
        account_name: String,
        /// Token name or ID.
        #[arg(short = 't', long, alias = "token-id")]
        token_name: Option<String>,
    },
    List,
    ListTokens {
        #[arg(short = 'a', long)]
        account_name: String,
    },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum ProvisionAction {
    Apply,
    Destroy,
    /// Apply, wait for `proceed` on stdin, then destroy.
    Demo,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(border0_core::logging::tracing_filter())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = border0_core::ExamplesConfig::load()?;

    match cli.command {
        Commands::SessionLogs {
            state_file,
            output_file,
            workers,
            finished,
        } => {
            let mut settings = config.session_logs.clone();
            if let Some(path) = state_file {
                settings.state_file = path;
            }
            if let Some(path) = output_file {
                settings.output_file = path;
            }
            if let Some(workers) = workers {
                settings.workers = workers;
            }
            commands::session_logs(&config, &settings, finished).await
        }
        Commands::ServiceAccounts { action } => commands::service_accounts(&config, action).await,
        Commands::Playground => commands::playground(&config).await,
        Commands::ExpiringPolicy { email, ttl_minutes } => {
            commands::create_expiring_policy(&config, &email, ttl_minutes).await
        }
        Commands::Provision {
            action,
            source,
            state,
        } => {
            let source = source.unwrap_or_else(|| config.provisioner.source_file.clone());
            let state = state.unwrap_or_else(|| config.provisioner.state_file.clone());
            commands::provision(&config, action, source, state).await
        }
        Commands::VerifyServer { jwks_url, bind } => commands::verify_server(&jwks_url, bind).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_service_account_create() {
        let cli = Cli::try_parse_from([
            "border0-examples",
            "service-accounts",
            "create",
            "-a",
            "ci-bot",
            "--description",
            "CI pipeline",
            "--role",
            "Member",
            "-t",
            "ci-token",
        ])
        .unwrap();
        match cli.command {
            Commands::ServiceAccounts {
                action:
                    ServiceAccountAction::Create {
                        account_name,
                        role,
                        token_name,
                        ..
                    },
            } => {
                assert_eq!(account_name, "ci-bot");
                assert_eq!(role, Some(ServiceAccountRole::Member));
                assert_eq!(token_name.as_deref(), Some("ci-token"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn delete_picks_token_by_name() {
        let cli = Cli::try_parse_from([
            "border0-examples",
            "service-accounts",
            "delete",
            "-a",
            "ci-bot",
            "--token-name",
            "ci-token",
        ])
        .unwrap();
        match cli.command {
            Commands::ServiceAccounts {
                action:
                    ServiceAccountAction::Delete {
                        account_name,
                        token_name,
                    },
            } => {
                assert_eq!(account_name, "ci-bot");
                assert_eq!(token_name.as_deref(), Some("ci-token"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn provision_paths_are_global() {
        let cli = Cli::try_parse_from([
            "border0-examples",
            "provision",
            "destroy",
            "--state",
            "/tmp/drones.state",
        ])
        .unwrap();
        match cli.command {
            Commands::Provision { action, state, .. } => {
                assert_eq!(action, ProvisionAction::Destroy);
                assert_eq!(state, Some(PathBuf::from("/tmp/drones.state")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_role() {
        assert!(Cli::try_parse_from([
            "border0-examples",
            "service-accounts",
            "create",
            "-a",
            "x",
            "--role",
            "superuser",
        ])
        .is_err());
    }
}
