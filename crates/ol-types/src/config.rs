//! Tunable constants for the analytics core.
//!
//! Every heuristic threshold lives here rather than in the functions that use
//! it, so callers can swap constants without touching the math.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

use crate::config_error;
use crate::errors::OlResult;

/// Top-level analytics configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub moneyness: MoneynessSettings,
    pub premium: PremiumSettings,
    pub volatility: VolatilitySettings,
    pub scanner: ScannerSettings,
}

/// At-the-money tolerance and chain display window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoneynessSettings {
    /// Absolute ATM band in price units.
    pub atm_absolute: Decimal,
    /// ATM band as a fraction of the underlying price.
    pub atm_pct: Decimal,
    /// Chain rows are shown when |strike - spot| is within this fraction of spot.
    pub display_window_pct: Decimal,
}

impl Default for MoneynessSettings {
    fn default() -> Self {
        Self {
            atm_absolute: Decimal::TWO,
            atm_pct: Decimal::new(5, 3), // 0.5%
            display_window_pct: Decimal::new(15, 2),
        }
    }
}

/// Constants of the linear premium heuristic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PremiumSettings {
    pub floor_value: Decimal,
    pub distance_factor: Decimal,
    pub time_factor: Decimal,
}

impl Default for PremiumSettings {
    fn default() -> Self {
        Self {
            floor_value: Decimal::new(50, 2),
            distance_factor: Decimal::new(10, 2),
            time_factor: Decimal::new(2, 2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolatilitySettings {
    /// Recent window length, in returns.
    pub window: usize,
}

impl Default for VolatilitySettings {
    fn default() -> Self {
        Self { window: 30 }
    }
}

/// Filters applied by the volatility scanner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerSettings {
    pub min_price: Decimal,
    pub max_price: Decimal,
    /// How far out to look for an ATM contract, in calendar days.
    pub lookahead_days: i64,
    pub max_results: usize,
}

impl Default for ScannerSettings {
    fn default() -> Self {
        Self {
            min_price: Decimal::from(5),
            max_price: Decimal::from(500),
            lookahead_days: 45,
            max_results: 10,
        }
    }
}

impl AnalyticsConfig {
    pub fn from_json_str(json: &str) -> OlResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> OlResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        debug!("Loaded analytics config from {}", path.as_ref().display());
        Self::from_json_str(&raw)
    }

    /// Apply `OPTIONLENS_*` environment overrides on top of this config.
    pub fn with_env_overrides(self) -> OlResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn with_overrides<F>(mut self, lookup: F) -> OlResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        override_value(&lookup, "OPTIONLENS_ATM_ABSOLUTE", &mut self.moneyness.atm_absolute)?;
        override_value(&lookup, "OPTIONLENS_ATM_PCT", &mut self.moneyness.atm_pct)?;
        override_value(
            &lookup,
            "OPTIONLENS_DISPLAY_WINDOW_PCT",
            &mut self.moneyness.display_window_pct,
        )?;
        override_value(&lookup, "OPTIONLENS_PREMIUM_FLOOR", &mut self.premium.floor_value)?;
        override_value(
            &lookup,
            "OPTIONLENS_PREMIUM_DISTANCE_FACTOR",
            &mut self.premium.distance_factor,
        )?;
        override_value(
            &lookup,
            "OPTIONLENS_PREMIUM_TIME_FACTOR",
            &mut self.premium.time_factor,
        )?;
        override_value(&lookup, "OPTIONLENS_VOL_WINDOW", &mut self.volatility.window)?;
        override_value(&lookup, "OPTIONLENS_SCAN_MIN_PRICE", &mut self.scanner.min_price)?;
        override_value(&lookup, "OPTIONLENS_SCAN_MAX_PRICE", &mut self.scanner.max_price)?;
        override_value(
            &lookup,
            "OPTIONLENS_SCAN_LOOKAHEAD_DAYS",
            &mut self.scanner.lookahead_days,
        )?;
        override_value(&lookup, "OPTIONLENS_SCAN_MAX_RESULTS", &mut self.scanner.max_results)?;
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> OlResult<()> {
        let m = &self.moneyness;
        if m.atm_absolute < Decimal::ZERO || m.atm_pct < Decimal::ZERO {
            return Err(config_error!("ATM tolerance must be non-negative"));
        }
        if m.display_window_pct <= Decimal::ZERO {
            return Err(config_error!(
                "display window must be positive, got {}",
                m.display_window_pct
            ));
        }

        let p = &self.premium;
        if p.floor_value <= Decimal::ZERO {
            return Err(config_error!(
                "premium floor must be positive, got {}",
                p.floor_value
            ));
        }
        if p.distance_factor < Decimal::ZERO || p.time_factor < Decimal::ZERO {
            return Err(config_error!("premium factors must be non-negative"));
        }

        if self.volatility.window == 0 {
            return Err(config_error!("volatility window must be at least 1"));
        }

        let s = &self.scanner;
        if s.min_price > s.max_price {
            return Err(config_error!(
                "scanner min_price {} exceeds max_price {}",
                s.min_price,
                s.max_price
            ));
        }
        if s.lookahead_days < 0 {
            return Err(config_error!("scanner lookahead_days must be non-negative"));
        }
        Ok(())
    }
}

fn override_value<F, T>(lookup: &F, key: &str, target: &mut T) -> OlResult<()>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    if let Some(raw) = lookup(key) {
        *target = raw
            .trim()
            .parse::<T>()
            .map_err(|e| config_error!("{key}: {e}"))?;
        debug!("Config override {key}={raw}");
    }
    Ok(())
}
