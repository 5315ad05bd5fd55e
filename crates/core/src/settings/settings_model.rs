use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::constants::{DEFAULT_MAX_PAGES, DEFAULT_PAGE_SIZE, SHARES_DUST_THRESHOLD};
use crate::errors::{Error, Result};

/// Which instant of a calendar day a position must precede to count for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum AsOfPolicy {
    /// Position timestamp must be at or before UTC midnight starting the day.
    #[default]
    DayStart,
    /// Position timestamp must be at or before the last second of the day.
    DayEnd,
}

/// Tunables for the portfolio engine and the history service.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineSettings {
    pub as_of: AsOfPolicy,
    /// Multiplier applied to percent series (1 = fraction, 100 = percent).
    pub percent_scale: Decimal,
    pub page_size: usize,
    pub max_pages: usize,
    /// Share balances below this magnitude count as no position.
    pub dust_threshold: Decimal,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            as_of: AsOfPolicy::default(),
            percent_scale: dec!(1),
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
            dust_threshold: Decimal::from_str(SHARES_DUST_THRESHOLD)
                .unwrap_or_else(|_| Decimal::new(1, 12)),
        }
    }
}

impl EngineSettings {
    /// Parses settings from JSON. Missing keys take their defaults.
    pub fn from_json(raw: &str) -> Result<Self> {
        let settings: EngineSettings = serde_json::from_str(raw)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::InvalidConfigValue(
                "pageSize must be greater than zero".to_string(),
            ));
        }
        if self.max_pages == 0 {
            return Err(Error::InvalidConfigValue(
                "maxPages must be greater than zero".to_string(),
            ));
        }
        if self.percent_scale <= Decimal::ZERO {
            return Err(Error::InvalidConfigValue(format!(
                "percentScale must be positive, got {}",
                self.percent_scale
            )));
        }
        if self.dust_threshold.is_sign_negative() {
            return Err(Error::InvalidConfigValue(format!(
                "dustThreshold must not be negative, got {}",
                self.dust_threshold
            )));
        }
        Ok(())
    }

    pub fn is_dust(&self, shares: Decimal) -> bool {
        shares.abs() < self.dust_threshold
    }
}
