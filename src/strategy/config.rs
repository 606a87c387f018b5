use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Upper bound accepted for `max_tick_deviation`.
pub const MAX_TICK_DEVIATION_LIMIT: i32 = 5_000;
/// Upper bound accepted for `twap_interval_seconds`.
pub const MAX_TWAP_INTERVAL: u32 = 3_600;
/// Intervals shorter than this are accepted but likely to find no history.
pub const SHORT_TWAP_INTERVAL: u32 = 60;

/// Operator-controlled strategy parameters.
///
/// `position_width` and `max_tick_deviation` count ticks, not price
/// percentages.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Half-width of the main range in ticks.
    pub position_width: i32,
    /// Largest tolerated distance between current and time-weighted tick.
    pub max_tick_deviation: i32,
    /// Lookback window of the time-weighted tick.
    pub twap_interval_seconds: u32,
}

impl StrategyConfig {
    /// Parses a TOML document such as
    ///
    /// ```toml
    /// position_width = 200
    /// max_tick_deviation = 50
    /// twap_interval_seconds = 120
    /// ```
    ///
    /// Parsing does not validate; call [`StrategyConfig::validate`] with
    /// the pool's spacing.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Checks the parameters against the pool's tick spacing.
    pub fn validate(&self, tick_spacing: i32) -> Result<(), ConfigError> {
        if self.position_width <= 0 {
            return Err(ConfigError::ZeroWidth);
        }
        if tick_spacing <= 0 || self.position_width % tick_spacing != 0 {
            return Err(ConfigError::WidthNotSpacingMultiple {
                width: self.position_width,
                spacing: tick_spacing,
            });
        }

        if self.max_tick_deviation < 0 {
            return Err(ConfigError::NegativeDeviation);
        }
        if self.max_tick_deviation > MAX_TICK_DEVIATION_LIMIT {
            return Err(ConfigError::DeviationTooLarge {
                deviation: self.max_tick_deviation,
                limit: MAX_TICK_DEVIATION_LIMIT,
            });
        }

        if self.twap_interval_seconds == 0 || self.twap_interval_seconds > MAX_TWAP_INTERVAL {
            return Err(ConfigError::InvalidTwapInterval(self.twap_interval_seconds));
        }
        if self.twap_interval_seconds < SHORT_TWAP_INTERVAL {
            tracing::warn!(
                twap_interval_seconds = self.twap_interval_seconds,
                "short twap interval may leave the calm check without history"
            );
        }

        Ok(())
    }

    /// `max_tick_deviation` as the unsigned tolerance used by the calm
    /// guard. Only meaningful after validation.
    pub fn deviation_tolerance(&self) -> u32 {
        self.max_tick_deviation.max(0) as u32
    }
}
