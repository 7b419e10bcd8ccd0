//! Heuristic premium estimate.
//!
//! This is a rough linear proxy for illustration, not a pricing model:
//!
//! ```text
//! premium = max(floor, distance_factor * |K - S| + time_factor * (days / 365) * S)
//! ```
//!
//! Anything derived from it must be presented as an estimate (see
//! [`PremiumBasis::Estimated`]), never as a market price.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use ol_types::config::PremiumSettings;
use ol_types::{invalid_parameter, OlResult};

use crate::contract::OptionKind;
use crate::payoff::{check_price, check_strike, checked};

const DAYS_PER_YEAR: i64 = 365;

/// Where a premium figure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PremiumBasis {
    /// Supplied by the caller, e.g. a quoted or filled price.
    Quoted,
    /// Produced by [`estimate_premium`]; not a market price.
    Estimated,
}

impl fmt::Display for PremiumBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PremiumBasis::Quoted => write!(f, "quoted"),
            PremiumBasis::Estimated => write!(f, "estimated (heuristic, not a market price)"),
        }
    }
}

/// Constants of the linear premium heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PremiumHeuristic {
    /// Minimum premium per share. Must be positive.
    pub floor_value: Decimal,
    /// Premium per dollar of strike distance.
    pub distance_factor: Decimal,
    /// Premium per year to expiration, as a fraction of the underlying price.
    pub time_factor: Decimal,
}

impl Default for PremiumHeuristic {
    fn default() -> Self {
        Self::from(&PremiumSettings::default())
    }
}

impl From<&PremiumSettings> for PremiumHeuristic {
    fn from(settings: &PremiumSettings) -> Self {
        Self {
            floor_value: settings.floor_value,
            distance_factor: settings.distance_factor,
            time_factor: settings.time_factor,
        }
    }
}

impl PremiumHeuristic {
    /// Constants the covered-call income table has always used.
    pub fn covered_call() -> Self {
        Self {
            floor_value: Decimal::new(50, 2),
            distance_factor: Decimal::new(10, 2),
            time_factor: Decimal::ZERO,
        }
    }

    /// Constants the protective-put insurance table has always used.
    pub fn protective_put() -> Self {
        Self {
            floor_value: Decimal::ONE,
            distance_factor: Decimal::new(15, 2),
            time_factor: Decimal::new(2, 2),
        }
    }

    pub fn validate(&self) -> OlResult<()> {
        if self.floor_value <= Decimal::ZERO {
            return Err(invalid_parameter!(
                "floor_value",
                "must be positive, got {}",
                self.floor_value
            ));
        }
        if self.distance_factor < Decimal::ZERO {
            return Err(invalid_parameter!(
                "distance_factor",
                "must be non-negative, got {}",
                self.distance_factor
            ));
        }
        if self.time_factor < Decimal::ZERO {
            return Err(invalid_parameter!(
                "time_factor",
                "must be non-negative, got {}",
                self.time_factor
            ));
        }
        Ok(())
    }
}

/// Approximate a per-share premium. Always strictly positive on success.
pub fn estimate_premium(
    strike: Decimal,
    underlying_price: Decimal,
    days_to_expiration: i64,
    kind: OptionKind,
    params: Option<&PremiumHeuristic>,
) -> OlResult<Decimal> {
    check_strike(strike)?;
    check_price("underlying_price", underlying_price)?;
    if days_to_expiration < 0 {
        return Err(invalid_parameter!(
            "days_to_expiration",
            "must be non-negative, got {days_to_expiration}"
        ));
    }

    let defaults = PremiumHeuristic::default();
    let params = params.unwrap_or(&defaults);
    params.validate()?;

    let distance_component = checked(
        params
            .distance_factor
            .checked_mul((strike - underlying_price).abs()),
        "distance_factor",
    )?;
    let years = Decimal::from(days_to_expiration) / Decimal::from(DAYS_PER_YEAR);
    let time_component = checked(
        params
            .time_factor
            .checked_mul(years)
            .and_then(|v| v.checked_mul(underlying_price)),
        "time_factor",
    )?;
    let premium = params.floor_value.max(checked(
        distance_component.checked_add(time_component),
        "premium",
    )?);

    debug!(
        "Estimated {} premium {} (K={}, S={}, dte={})",
        kind, premium, strike, underlying_price, days_to_expiration
    );
    Ok(premium)
}
