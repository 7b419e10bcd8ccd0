use chrono::NaiveDate;
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use ol_types::market::Symbol;
use ol_types::{invalid_contract, OlResult};

/// Call or put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionKind {
    Call,
    Put,
}

impl OptionKind {
    /// Single-letter code used in OCC contract symbols.
    pub fn code(&self) -> char {
        match self {
            OptionKind::Call => 'C',
            OptionKind::Put => 'P',
        }
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionKind::Call => write!(f, "Call"),
            OptionKind::Put => write!(f, "Put"),
        }
    }
}

/// A single listed options contract, as returned by the market data gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionContract {
    /// Underlying symbol.
    pub underlying: Symbol,
    /// Call or put.
    pub kind: OptionKind,
    /// Strike price.
    pub strike: Decimal,
    /// Last trading day.
    pub expiration: NaiveDate,
    /// Contract multiplier (typically 100 for equity options).
    pub multiplier: Decimal,
}

impl OptionContract {
    pub fn new(
        underlying: Symbol,
        kind: OptionKind,
        strike: Decimal,
        expiration: NaiveDate,
        multiplier: Decimal,
    ) -> OlResult<Self> {
        let contract = Self {
            underlying,
            kind,
            strike,
            expiration,
            multiplier,
        };
        contract.validate()?;
        Ok(contract)
    }

    /// Convenience constructor for a standard equity option (multiplier = 100).
    pub fn equity(
        underlying: Symbol,
        kind: OptionKind,
        strike: Decimal,
        expiration: NaiveDate,
    ) -> OlResult<Self> {
        Self::new(underlying, kind, strike, expiration, Decimal::ONE_HUNDRED)
    }

    /// Check the fields a deserialized or hand-built contract may have gotten wrong.
    pub fn validate(&self) -> OlResult<()> {
        if self.strike <= Decimal::ZERO {
            return Err(invalid_contract!(
                "strike must be positive, got {} for {}",
                self.strike,
                self.underlying.symbol
            ));
        }
        if self.multiplier <= Decimal::ZERO {
            return Err(invalid_contract!(
                "multiplier must be positive, got {}",
                self.multiplier
            ));
        }
        Ok(())
    }

    /// Calendar days remaining until expiration from `today`.
    /// Returns 0 if already expired.
    pub fn days_to_expiration(&self, today: NaiveDate) -> i64 {
        (self.expiration - today).num_days().max(0)
    }

    /// True if the option has expired relative to `today`.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        today > self.expiration
    }

    /// Intrinsic value given an underlying price. Never negative.
    pub fn intrinsic_value(&self, spot: Decimal) -> Decimal {
        intrinsic_value(self.kind, self.strike, spot)
    }

    /// OCC-style contract symbol, e.g. `AAPL260620C00150000`.
    pub fn occ_symbol(&self) -> String {
        let strike_thousandths = self
            .strike
            .checked_mul(Decimal::ONE_THOUSAND)
            .and_then(|v| v.round().to_u64())
            .unwrap_or(0);
        format!(
            "{}{}{}{:08}",
            self.underlying.symbol,
            self.expiration.format("%y%m%d"),
            self.kind.code(),
            strike_thousandths
        )
    }
}

/// `max(spot - strike, 0)` for calls, `max(strike - spot, 0)` for puts.
pub fn intrinsic_value(kind: OptionKind, strike: Decimal, spot: Decimal) -> Decimal {
    let iv = match kind {
        OptionKind::Call => spot - strike,
        OptionKind::Put => strike - spot,
    };
    iv.max(Decimal::ZERO)
}

impl fmt::Display for OptionContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.underlying.symbol,
            self.expiration.format("%Y-%m-%d"),
            self.strike,
            self.kind,
        )
    }
}
