use crate::config::Config;

/// Installs `env_logger` at the configured level. `RUST_LOG` still overrides
/// per-module filters. Calling it twice is harmless.
pub fn init(config: &Config) {
    let result = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .format_timestamp_millis()
    .try_init();

    if result.is_ok() {
        log::debug!("Logger initialised at level '{}'", config.log_level);
    }
}
