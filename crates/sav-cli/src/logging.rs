//! Console logging through `log` + `log4rs`.
//!
//! Our crates log at the requested level; everything else (reqwest, hyper, ...)
//! only at WARN unless the filter sets `root=<level>`.

use log::LevelFilter;
use log4rs::{
    append::console::{ConsoleAppender, Target},
    config::{Appender, Logger, Root},
    encode::pattern::PatternEncoder,
    Config,
};
use std::io::IsTerminal;

const CONSOLE_APPENDER: &str = "stderr";

/// Format: `timestamp [LEVEL] message [module]`
pub const LOG_LINE_PATTERN_COLORED: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{h({l:5})}] {m} [{M}]{n}";
pub const LOG_LINE_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l:5}] {m} [{M}]{n}";

pub const APP_CRATES: &[&str] = &["sav_core", "sav_sdk", "sav_cli"];

/// Initialize the global logger. Repeated calls are ignored.
///
/// `filters` is a comma list: a bare level (`debug`) applies to our crates,
/// `root=<level>` opens up third-party logs.
pub fn init_logger(filters: &str) {
    let app_level = parse_app_level(filters);
    let root_level = parse_root_override(filters).unwrap_or(LevelFilter::Warn);

    let pattern = if std::io::stderr().is_terminal() {
        LOG_LINE_PATTERN_COLORED
    } else {
        LOG_LINE_PATTERN
    };
    let console = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let mut builder =
        Config::builder().appender(Appender::builder().build(CONSOLE_APPENDER, Box::new(console)));
    for crate_name in APP_CRATES {
        builder = builder.logger(
            Logger::builder()
                .appender(CONSOLE_APPENDER)
                .additive(false)
                .build(*crate_name, app_level),
        );
    }

    match builder.build(Root::builder().appender(CONSOLE_APPENDER).build(root_level)) {
        Ok(config) => {
            let _ = log4rs::init_config(config);
        }
        Err(e) => eprintln!("logger configuration rejected: {}", e),
    }
}

pub fn parse_app_level(filters: &str) -> LevelFilter {
    filters
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty() && !part.contains('='))
        .find_map(|part| part.parse().ok())
        .unwrap_or(LevelFilter::Info)
}

pub fn parse_root_override(filters: &str) -> Option<LevelFilter> {
    filters.split(',').find_map(|part| {
        let (key, level) = part.trim().split_once('=')?;
        if key.trim() == "root" {
            level.trim().parse().ok()
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_level() {
        assert_eq!(parse_app_level("debug"), LevelFilter::Debug);
        assert_eq!(parse_app_level("root=trace, warn"), LevelFilter::Warn);
        assert_eq!(parse_app_level(""), LevelFilter::Info);
        assert_eq!(parse_app_level("nonsense"), LevelFilter::Info);
    }

    #[test]
    fn test_root_override() {
        assert_eq!(parse_root_override("info,root=debug"), Some(LevelFilter::Debug));
        assert_eq!(parse_root_override("info"), None);
        assert_eq!(parse_root_override("reqwest=debug"), None);
    }
}
