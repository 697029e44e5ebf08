use std::env;

use tracing_subscriber::EnvFilter;

/// Log filter for the binaries: `BORDER0_LOG`, then `RUST_LOG`, then
/// `BORDER0_DEBUG=1` for `debug`, else `info`.
pub fn tracing_filter() -> EnvFilter {
    EnvFilter::new(filter_directive(
        env::var("BORDER0_LOG").ok(),
        env::var("RUST_LOG").ok(),
        env::var("BORDER0_DEBUG").ok(),
    ))
}

fn filter_directive(
    border0_log: Option<String>,
    rust_log: Option<String>,
    debug: Option<String>,
) -> String {
    if let Some(filter) = border0_log.or(rust_log) {
        return filter;
    }
    if matches!(debug.as_deref(), Some("1" | "true" | "TRUE" | "yes" | "YES")) {
        return "debug".to_string();
    }
    "info".to_string()
}
