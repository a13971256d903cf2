use std::{env, path::PathBuf, time::Duration};

use simplelog::LevelFilter;

use crate::error::{Result, SnakeError};

const DEFAULT_TICK_MS: u64 = 60;
const DEFAULT_LOG_NAME: &str = ".snake.log";
const INITIAL_SNAKE_LENGTH: usize = 3;

const TICK_VAR: &str = "SNAKE_TICK_MS";
const LOG_VAR: &str = "SNAKE_LOG";
const LOG_LEVEL_VAR: &str = "SNAKE_LOG_LEVEL";

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub tick: Duration,
    pub log_file: PathBuf,
    pub log_level: LevelFilter,
    pub initial_length: usize,
}

impl Default for Config {
    fn default() -> Self {
        let home = env::var_os("HOME").map(PathBuf::from).unwrap_or_default();

        Config {
            tick: Duration::from_millis(DEFAULT_TICK_MS),
            log_file: home.join(DEFAULT_LOG_NAME),
            log_level: LevelFilter::Info,
            initial_length: INITIAL_SNAKE_LENGTH,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source, starting from the defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(ms) = lookup(TICK_VAR) {
            let ms: u64 = ms
                .trim()
                .parse()
                .map_err(|_| SnakeError::Config(format!("{} must be a number of milliseconds, got {:?}", TICK_VAR, ms)))?;
            if ms == 0 {
                return Err(SnakeError::Config(format!("{} must be positive", TICK_VAR)));
            }
            config.tick = Duration::from_millis(ms);
        }

        if let Some(path) = lookup(LOG_VAR) {
            config.log_file = PathBuf::from(path);
        }

        if let Some(level) = lookup(LOG_LEVEL_VAR) {
            config.log_level = level
                .trim()
                .parse()
                .map_err(|_| SnakeError::Config(format!("unknown log level {:?}", level)))?;
        }

        Ok(config)
    }
}
