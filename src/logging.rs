//! Logging setup for binaries embedding this crate

use crate::config::Settings;

/// Install an `env_logger` logger.
///
/// `RUST_LOG` wins over [`Settings::log_filter`]. Calling this more than once is harmless: only the first call installs a logger.
pub fn init(settings: &Settings) {
    let env = env_logger::Env::default().default_filter_or(settings.log_filter.as_str());
    if env_logger::Builder::from_env(env).try_init().is_err() {
        log::debug!("A logger was already installed");
    }
}
