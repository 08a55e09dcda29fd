use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::TermInt;

pub const MIN_SNAKE_LENGTH: usize = 3;
/// The starting snake trails left of the center column, so half the width
/// must hold it.
pub const MIN_BOARD_WIDTH: TermInt = 2 * MIN_SNAKE_LENGTH as TermInt;
/// Leaves three interior rows.
pub const MIN_BOARD_HEIGHT: TermInt = 5;

#[derive(Parser, Debug, Clone)]
#[command(name = "snake", version, about = "Classic snake in the terminal")]
pub struct Config {
    /// Board columns, walls included
    #[arg(long, default_value_t = 40)]
    pub width: TermInt,

    /// Board rows, walls included
    #[arg(long, default_value_t = 20)]
    pub height: TermInt,

    /// Delay between game ticks, in milliseconds
    #[arg(long = "tick-ms", default_value_t = 200)]
    pub tick_interval_ms: u64,

    /// Score awarded per food eaten
    #[arg(long, default_value_t = 10)]
    pub food_reward: u64,

    /// Starting snake length
    #[arg(long, default_value_t = 3)]
    pub initial_length: usize,

    /// Seed for food placement; random when omitted
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("board must be at least {min_width}x{min_height}, got {width}x{height}")]
    BoardTooSmall { width: TermInt, height: TermInt, min_width: TermInt, min_height: TermInt },
    #[error("initial length must be at least {min}, got {length}")]
    SnakeTooShort { length: usize, min: usize },
    #[error("a snake of length {length} does not fit left of the center of a {width}-wide board")]
    SnakeDoesNotFit { length: usize, width: TermInt },
    #[error("tick interval must be greater than zero")]
    ZeroTick,
    #[error("a {width}x{height} board and its score line do not fit a {cols}x{term_rows} terminal")]
    TerminalTooSmall { width: TermInt, height: TermInt, cols: TermInt, term_rows: TermInt },
}

impl Default for Config {
    fn default() -> Self {
        Config {
            width: 40,
            height: 20,
            tick_interval_ms: 200,
            food_reward: 10,
            initial_length: MIN_SNAKE_LENGTH,
            seed: None,
            log_file: None,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width < MIN_BOARD_WIDTH || self.height < MIN_BOARD_HEIGHT {
            return Err(ConfigError::BoardTooSmall {
                width: self.width,
                height: self.height,
                min_width: MIN_BOARD_WIDTH,
                min_height: MIN_BOARD_HEIGHT,
            });
        }

        if self.initial_length < MIN_SNAKE_LENGTH {
            return Err(ConfigError::SnakeTooShort { length: self.initial_length, min: MIN_SNAKE_LENGTH });
        }

        // Head sits on the center column, the body trails to the left of it
        let room = (self.width / 2) as usize;
        if self.initial_length > room {
            return Err(ConfigError::SnakeDoesNotFit { length: self.initial_length, width: self.width });
        }

        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTick);
        }

        Ok(())
    }

    /// Checks that the board and the score line below it fit in a terminal of
    /// `cols` x `rows`.
    pub fn fit_terminal(&self, cols: TermInt, rows: TermInt) -> Result<(), ConfigError> {
        if self.width > cols || self.height >= rows {
            return Err(ConfigError::TerminalTooSmall {
                width: self.width,
                height: self.height,
                cols,
                term_rows: rows,
            });
        }

        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.tick_interval(), Duration::from_millis(200));
    }

    #[test]
    fn parses_command_line() {
        let config = Config::try_parse_from([
            "snake", "--width", "30", "--height", "15", "--tick-ms", "120",
            "--food-reward", "5", "--initial-length", "4", "--seed", "42",
        ]).unwrap();

        assert_eq!(config.width, 30);
        assert_eq!(config.height, 15);
        assert_eq!(config.tick_interval_ms, 120);
        assert_eq!(config.food_reward, 5);
        assert_eq!(config.initial_length, 4);
        assert_eq!(config.seed, Some(42));
        assert!(config.log_file.is_none());
    }

    #[test]
    fn command_line_defaults_match_default() {
        let parsed = Config::try_parse_from(["snake"]).unwrap();
        let default = Config::default();
        assert_eq!(parsed.width, default.width);
        assert_eq!(parsed.height, default.height);
        assert_eq!(parsed.tick_interval_ms, default.tick_interval_ms);
        assert_eq!(parsed.food_reward, default.food_reward);
        assert_eq!(parsed.initial_length, default.initial_length);
    }

    #[test]
    fn rejects_bad_settings() {
        let tiny = Config { width: 4, ..Config::default() };
        assert!(matches!(tiny.validate(), Err(ConfigError::BoardTooSmall { .. })));

        let short = Config { initial_length: 2, ..Config::default() };
        assert_eq!(short.validate(), Err(ConfigError::SnakeTooShort { length: 2, min: 3 }));

        let long = Config { width: 10, initial_length: 6, ..Config::default() };
        assert!(matches!(long.validate(), Err(ConfigError::SnakeDoesNotFit { length: 6, width: 10 })));

        let fits = Config { width: 10, initial_length: 5, ..Config::default() };
        assert_eq!(fits.validate(), Ok(()));

        let frozen = Config { tick_interval_ms: 0, ..Config::default() };
        assert_eq!(frozen.validate(), Err(ConfigError::ZeroTick));
    }

    #[test]
    fn smallest_board_fits_the_shortest_snake() {
        let smallest = Config { width: MIN_BOARD_WIDTH, height: MIN_BOARD_HEIGHT, ..Config::default() };
        assert_eq!(smallest.validate(), Ok(()));

        let narrow = Config { width: 5, height: 5, ..Config::default() };
        assert_eq!(narrow.validate(), Err(ConfigError::BoardTooSmall {
            width: 5,
            height: 5,
            min_width: 6,
            min_height: 5,
        }));

        let flat = Config { width: 10, height: 4, ..Config::default() };
        assert!(matches!(flat.validate(), Err(ConfigError::BoardTooSmall { .. })));
    }

    #[test]
    fn board_must_fit_the_terminal() {
        let config = Config::default();
        assert_eq!(config.fit_terminal(80, 24), Ok(()));
        assert_eq!(config.fit_terminal(40, 21), Ok(()));
        assert!(config.fit_terminal(39, 24).is_err());
        assert!(config.fit_terminal(80, 20).is_err());
    }
}
