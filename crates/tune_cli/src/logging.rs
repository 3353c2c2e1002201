//! Log setup for the CLI
//!
//! Events go to stderr so frames and JSON on stdout stay clean.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const DEFAULT_LEVEL: &str = "warn";

/// `--log-level` wins, then `RUST_LOG`, then [`DEFAULT_LEVEL`].
pub fn build_filter(level: Option<&str>) -> EnvFilter {
    match level {
        Some(custom) => EnvFilter::try_new(custom).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL)),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL)),
    }
}

pub fn init_logging(level: Option<&str>) {
    let layer = fmt::layer().with_writer(std::io::stderr).with_target(false).compact();
    // a second init (tests) is harmless
    let _ = tracing_subscriber::registry().with(build_filter(level)).with(layer).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_explicit_level() {
        assert_eq!(build_filter(Some("debug")).max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(build_filter(Some("tune_core=trace")).max_level_hint(), Some(LevelFilter::TRACE));
    }

    #[test]
    fn test_bad_level_falls_back() {
        assert_eq!(build_filter(Some("tune_core=loud")).max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn test_init_twice() {
        init_logging(Some("error"));
        init_logging(Some("error"));
    }
}
