//! Verification of Ed25519-signed requests forwarded by a Border0 HTTP socket.

mod canonical;
mod jwks;
mod verify;

pub use canonical::{canonical_request, SIGNED_HEADERS};
pub use jwks::{load_jwks, parse_jwks, KeySet};
pub use verify::{build_verify_router, verify_request, verify_signature};

pub const HEADER_KID: &str = "x-auth-kid";
pub const HEADER_SIG: &str = "x-auth-sig";
pub const HEADER_TIMESTAMP: &str = "x-auth-timestamp";
pub const HEADER_REQUEST_ID: &str = "x-auth-request-id";

#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("failed to fetch JWKS: {0}")]
    JwksFetch(#[from] reqwest::Error),

    #[error("JWKS endpoint returned status {0}")]
    JwksStatus(reqwest::StatusCode),

    #[error("failed to parse JWKS: {0}")]
    JwksDecode(#[from] serde_json::Error),

    #[error("no valid Ed25519 keys found in JWKS")]
    NoKeys,

    #[error("missing X-Auth-Kid header")]
    MissingKid,

    #[error("unknown key ID")]
    UnknownKid(String),

    #[error("missing X-Auth-Sig header")]
    MissingSignature,

    #[error("failed to decode signature: {0}")]
    SignatureEncoding(#[from] base64::DecodeError),

    #[error("signature verification failed")]
    Mismatch,
}
