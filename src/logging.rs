//! Logger set-up.

use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::error::Error;

/// Default log4rs configuration file, read from the working directory.
pub const LOG_CONFIG_FILE: &str = "log4rs.yml";

const CONSOLE_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {h({l:<5})} {t} - {m}{n}";

/// Console-only configuration used when no config file can be loaded.
pub fn default_config(level: LevelFilter) -> Result<Config, Box<dyn Error>> {
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(CONSOLE_PATTERN)))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(level))?;
    Ok(config)
}

/// Initialize log4rs from `config_file`, falling back to the console at info.
pub fn init_logging(config_file: &str) -> Result<(), Box<dyn Error>> {
    match log4rs::init_file(config_file, Default::default()) {
        Ok(()) => {
            log::debug!("Logging configured from {config_file}");
        }
        Err(e) => {
            log4rs::init_config(default_config(LevelFilter::Info)?)?;
            log::warn!("Could not load {config_file}, logging to console: {e}");
        }
    }
    Ok(())
}
