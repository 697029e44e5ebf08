mod client;
mod connectors;
mod policies;
mod service_accounts;
mod sessions;
mod sockets;

pub use client::{ApiClient, ApiError, Credentials, DEFAULT_API_URL, DEFAULT_TIMEOUT};
pub use policies::{email_ssh_policy, expiring_policy};
pub use sessions::{SessionFilter, RECORDING_FORMAT_TEXT};
