use std::fs::OpenOptions;
use std::path::Path;

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

use crate::config::LoggingConfig;

/// Parse a level name, falling back to `warn` for anything unrecognized.
pub fn level_from_str(level: &str) -> LevelFilter {
    level.trim().parse().unwrap_or(LevelFilter::Warn)
}

/// Install the global logger.
///
/// Records go to the configured file (appended, `~` expanded) and, when
/// `verbose` is set, to stderr. With neither, no logger is installed so the
/// standard streams carry nothing but command output.
/// Best-effort: an unopenable log file is reported once and skipped.
pub fn init(config: &LoggingConfig, verbose: bool) {
    let level = level_from_str(&config.level);
    let log_config = ConfigBuilder::new()
        .set_thread_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();

    if !config.file.trim().is_empty() {
        let path = shellexpand::tilde(config.file.trim()).into_owned();
        if let Some(dir) = Path::new(&path).parent() {
            let _ = std::fs::create_dir_all(dir);
        }
        match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => loggers.push(WriteLogger::new(level, log_config.clone(), file)),
            Err(e) => eprintln!("shexec: cannot open log file {path}: {e}"),
        }
    }

    if verbose {
        loggers.push(TermLogger::new(
            level,
            log_config,
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ));
    }

    if !loggers.is_empty() {
        let _ = CombinedLogger::init(loggers);
    }
}
