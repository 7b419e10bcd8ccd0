//! Volatility rank proxy.
//!
//! Real IV rank needs option-implied volatilities. This estimator only sees
//! daily closes of the underlying, so it compares recent realized volatility
//! with realized volatility over the whole sample and reports the ratio on a
//! 0-100 scale. Results are always labelled as a realized-vol proxy.

use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::fmt;
use tracing::debug;

use ol_types::{invalid_parameter, AnalyticsError, OlResult};

/// Trading days used to annualise daily volatility.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Default recent window, in returns.
pub const DEFAULT_VOL_WINDOW: usize = 30;

/// Absolute minimum number of closes, whatever the window.
pub const MIN_OBSERVATIONS: usize = 20;

/// Proxy IV rank plus the two volatilities it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilityRank {
    /// Clamped to [0, 100].
    pub rank: f64,
    /// Annualised realized volatility of the last `window` returns, in percent.
    pub recent_vol: f64,
    /// Annualised realized volatility of all returns, in percent.
    pub full_vol: f64,
    pub window: usize,
    /// Number of closes supplied.
    pub observations: usize,
}

impl VolatilityRank {
    /// Always true: this rank is derived from realized, not implied, volatility.
    pub fn is_proxy(&self) -> bool {
        true
    }

    pub fn regime(&self) -> VolRegime {
        VolRegime::from_rank(self.rank)
    }
}

impl fmt::Display for VolatilityRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.1} (realized-vol proxy; recent {:.1}% vs full {:.1}%)",
            self.rank, self.recent_vol, self.full_vol
        )
    }
}

/// Coarse reading of a volatility rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VolRegime {
    /// rank > 75
    VeryHigh,
    /// 50 < rank <= 75
    High,
    /// 25 <= rank <= 50
    Medium,
    /// rank < 25
    Low,
}

/// What a regime suggests about option premium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PremiumStance {
    SellPremium,
    Neutral,
    BuyPremium,
}

impl VolRegime {
    pub fn from_rank(rank: f64) -> Self {
        if rank > 75.0 {
            VolRegime::VeryHigh
        } else if rank > 50.0 {
            VolRegime::High
        } else if rank < 25.0 {
            VolRegime::Low
        } else {
            VolRegime::Medium
        }
    }

    pub fn stance(&self) -> PremiumStance {
        match self {
            VolRegime::VeryHigh | VolRegime::High => PremiumStance::SellPremium,
            VolRegime::Medium => PremiumStance::Neutral,
            VolRegime::Low => PremiumStance::BuyPremium,
        }
    }
}

impl fmt::Display for VolRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VolRegime::VeryHigh => "very high",
            VolRegime::High => "high",
            VolRegime::Medium => "medium",
            VolRegime::Low => "low",
        };
        write!(f, "{}", s)
    }
}

/// Minimum number of closes for a given window: `max(2 * window, 20)`.
pub fn required_observations(window: usize) -> usize {
    window.saturating_mul(2).max(MIN_OBSERVATIONS)
}

/// Simple daily returns `(c[i] - c[i-1]) / c[i-1]`.
pub fn daily_returns(closes: &[Decimal]) -> OlResult<Vec<f64>> {
    let values = closes
        .iter()
        .enumerate()
        .map(|(i, close)| match close.to_f64() {
            Some(v) if v > 0.0 && v.is_finite() => Ok(v),
            _ => Err(invalid_parameter!(
                "closes",
                "close #{i} must be a positive price, got {close}"
            )),
        })
        .collect::<OlResult<Vec<f64>>>()?;

    Ok(values.windows(2).map(|w| (w[1] - w[0]) / w[0]).collect())
}

/// Annualised sample standard deviation of returns, in percent.
pub fn annualized_volatility(returns: &[f64]) -> f64 {
    returns.std_dev() * TRADING_DAYS_PER_YEAR.sqrt() * 100.0
}

/// Estimate the realized-volatility proxy for IV rank from chronological
/// daily closes.
///
/// Fails with `InsufficientData` when fewer than `max(2 * window, 20)` closes
/// are supplied, or when the sample has no volatility at all.
pub fn estimate_volatility_rank(closes: &[Decimal], window: usize) -> OlResult<VolatilityRank> {
    if window == 0 {
        return Err(invalid_parameter!("window", "must be at least 1"));
    }
    let required = required_observations(window);
    if closes.len() < required {
        return Err(AnalyticsError::InsufficientData {
            required,
            available: closes.len(),
            message: format!("daily closes for a {window}-return window"),
        }
        .into());
    }

    let returns = daily_returns(closes)?;
    let recent = &returns[returns.len() - window..];

    let recent_vol = annualized_volatility(recent);
    let full_vol = annualized_volatility(&returns);

    // A one-return window has no sample deviation.
    if !recent_vol.is_finite() {
        return Err(AnalyticsError::InsufficientData {
            required: 2,
            available: recent.len(),
            message: "returns in the recent window; sample volatility is undefined".to_string(),
        }
        .into());
    }
    if !full_vol.is_finite() || full_vol <= 0.0 {
        return Err(AnalyticsError::InsufficientData {
            required,
            available: closes.len(),
            message: "closes show zero realized volatility; rank is undefined".to_string(),
        }
        .into());
    }

    let rank = (recent_vol / full_vol * 100.0).clamp(0.0, 100.0);
    debug!(
        "Volatility rank {:.2} (recent {:.2}%, full {:.2}%, {} closes)",
        rank,
        recent_vol,
        full_vol,
        closes.len()
    );

    Ok(VolatilityRank {
        rank,
        recent_vol,
        full_vol,
        window,
        observations: closes.len(),
    })
}
