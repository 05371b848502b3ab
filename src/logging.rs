//! Logger initialization.
//!
//! Logging is configured explicitly by the embedding process at startup,
//! never as a module-level side effect of the first API call.

/// Initialize env_logger with `info` as the default level.
///
/// Call once at process start; subsequent calls are ignored. Respects the
/// standard `RUST_LOG` environment variable.
pub fn init() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
