use tracing_subscriber::EnvFilter;

/// Initialize tracing once, honoring RUST_LOG (default `info`).
///
/// Logs go to stderr so stdio mode keeps stdout for protocol frames.
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
