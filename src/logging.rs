use tracing_subscriber::{fmt, EnvFilter};

/// Installs a fmt subscriber filtered by `RUST_LOG`, defaulting to `info`.
///
/// Returns `Ok(false)` when a global subscriber was already installed.
pub fn init_tracing() -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::from_default_env().add_directive("info".parse()?);
    Ok(fmt().with_env_filter(filter).try_init().is_ok())
}
