//! File logging for the `treesh` binary.
//!
//! The library only uses the `log` macros; the binary decides where they go.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::str::FromStr;

use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

use crate::config::LoggingConfig;

/// Install a file logger as configured. Best-effort: a bad level, an
/// unwritable path or a logger that is already set leave logging off.
pub fn init(config: &LoggingConfig) {
    let level = match LevelFilter::from_str(&config.level) {
        Ok(level) => level,
        Err(_) => {
            eprintln!("treesh: unknown log level {:?}, logging disabled", config.level);
            return;
        }
    };
    if level == LevelFilter::Off {
        return;
    }

    let path = PathBuf::from(shellexpand::tilde(&config.path).as_ref());
    if let Some(dir) = path.parent() {
        let _ = fs::create_dir_all(dir);
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    let _ = WriteLogger::init(level, log_config, file);
}

/// An argument vector as one shell-quoted line, for log messages.
pub fn quote_argv(argv: &[String]) -> String {
    shlex::try_join(argv.iter().map(String::as_str))
        .unwrap_or_else(|_| argv.join(" ").replace('\0', "\\0"))
}
