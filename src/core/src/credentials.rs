use std::path::Path;

use crate::paths::border0_token_path;

/// Env var holding an admin token for the management examples.
pub const ENV_ADMIN_TOKEN: &str = "BORDER0_ADMIN_TOKEN";
/// Env var holding a generic API token.
pub const ENV_TOKEN: &str = "BORDER0_TOKEN";
/// Env var holding the token used for session log exports.
pub const ENV_API_TOKEN: &str = "BORDER0_API_TOKEN";

/// Resolve an API token from the first non-empty env var in `env_keys`,
/// falling back to `~/.border0/token`.
pub fn resolve_token(env_keys: &[&str]) -> Result<String, String> {
    let token_path = border0_token_path().ok();
    resolve_token_from(
        env_keys,
        |key| std::env::var(key).ok(),
        token_path.as_deref(),
    )
}

pub(crate) fn resolve_token_from(
    env_keys: &[&str],
    lookup: impl Fn(&str) -> Option<String>,
    token_file: Option<&Path>,
) -> Result<String, String> {
    for key in env_keys {
        if let Some(value) = lookup(key) {
            let value = value.trim();
            if !value.is_empty() {
                return Ok(value.to_string());
            }
        }
    }
    if let Some(path) = token_file {
        match std::fs::read_to_string(path) {
            Ok(raw) if !raw.trim().is_empty() => return Ok(raw.trim().to_string()),
            Ok(_) => tracing::warn!(path = %path.display(), "token file is empty"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "read token file"),
        }
    }
    Err(format!(
        "token not found; set {} or create ~/.border0/token",
        env_keys.join(" or ")
    ))
}
