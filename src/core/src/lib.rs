pub mod api;
mod auth;
mod config;
pub mod credentials;
mod examples_config;
pub mod httpsig;
pub mod logging;
pub mod paths;
pub mod playground;
pub mod policy;
pub mod provisioner;
mod server;
pub mod session_logs;

pub use api::{ApiClient, ApiError, Credentials};
pub use config::{ServerConfig, DEFAULT_API_SECRET, DEFAULT_GEO_URL, DEFAULT_WEATHER_URL};
pub use examples_config::{ApiConfig, ExamplesConfig, ProvisionerConfig, SessionLogsConfig};
pub use server::{build_router, PolicyDeps};
