//! Moneyness classification.
//!
//! Classification is exact: the ATM band is the only tolerance, and it is a
//! parameter. The display window is separate and only decides which strikes a
//! chain view shows.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use ol_types::config::MoneynessSettings;
use ol_types::{invalid_parameter, OlResult};

use crate::contract::{OptionContract, OptionKind};
use crate::payoff::{checked, pct_of};

/// Strike vs. underlying relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Moneyness {
    InTheMoney,
    AtTheMoney,
    OutOfTheMoney,
}

impl Moneyness {
    pub fn short_label(&self) -> &'static str {
        match self {
            Moneyness::InTheMoney => "ITM",
            Moneyness::AtTheMoney => "ATM",
            Moneyness::OutOfTheMoney => "OTM",
        }
    }
}

impl fmt::Display for Moneyness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_label())
    }
}

/// ATM band: `min(absolute, pct_of_price * price)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AtmTolerance {
    pub absolute: Decimal,
    pub pct_of_price: Decimal,
}

impl Default for AtmTolerance {
    fn default() -> Self {
        Self::from(&MoneynessSettings::default())
    }
}

impl From<&MoneynessSettings> for AtmTolerance {
    fn from(settings: &MoneynessSettings) -> Self {
        Self {
            absolute: settings.atm_absolute,
            pct_of_price: settings.atm_pct,
        }
    }
}

impl AtmTolerance {
    /// The epsilon to use for an underlying trading at `price`.
    pub fn epsilon(&self, price: Decimal) -> Decimal {
        self.absolute.min(self.pct_of_price.saturating_mul(price))
    }
}

/// Result of classifying one contract against one underlying price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoneynessReading {
    pub moneyness: Moneyness,
    /// `price - strike` for calls, `strike - price` for puts.
    pub distance: Decimal,
    /// `distance / price * 100`; `None` when price is zero.
    pub distance_pct: Option<Decimal>,
}

/// Classify a contract as ITM/ATM/OTM with the default ATM tolerance unless
/// `epsilon` is supplied.
pub fn classify_moneyness(
    contract: &OptionContract,
    underlying_price: Decimal,
    epsilon: Option<Decimal>,
) -> OlResult<MoneynessReading> {
    contract.validate()?;
    let epsilon = match epsilon {
        Some(e) => e,
        None => AtmTolerance::default().epsilon(underlying_price),
    };
    classify(contract.kind, contract.strike, underlying_price, epsilon)
}

/// Same as [`classify_moneyness`] with an explicit tolerance policy.
pub fn classify_with_tolerance(
    contract: &OptionContract,
    underlying_price: Decimal,
    tolerance: &AtmTolerance,
) -> OlResult<MoneynessReading> {
    classify_moneyness(
        contract,
        underlying_price,
        Some(tolerance.epsilon(underlying_price)),
    )
}

fn classify(
    kind: OptionKind,
    strike: Decimal,
    price: Decimal,
    epsilon: Decimal,
) -> OlResult<MoneynessReading> {
    if price < Decimal::ZERO {
        return Err(invalid_parameter!(
            "underlying_price",
            "must be non-negative, got {price}"
        ));
    }
    if epsilon < Decimal::ZERO {
        return Err(invalid_parameter!("epsilon", "must be non-negative, got {epsilon}"));
    }

    let distance = match kind {
        OptionKind::Call => price - strike,
        OptionKind::Put => strike - price,
    };

    let moneyness = if distance.abs() < epsilon {
        Moneyness::AtTheMoney
    } else if distance > Decimal::ZERO {
        Moneyness::InTheMoney
    } else {
        Moneyness::OutOfTheMoney
    };

    let distance_pct = if price.is_zero() {
        None
    } else {
        Some(checked(pct_of(distance, price), "underlying_price")?)
    };

    Ok(MoneynessReading {
        moneyness,
        distance,
        distance_pct,
    })
}

/// True when `strike` lies strictly within `window_pct` (a fraction) of `price`.
pub fn within_display_window(strike: Decimal, price: Decimal, window_pct: Decimal) -> bool {
    (strike - price).abs() < price.saturating_mul(window_pct)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ol_types::market::Symbol;
    use ol_types::{AnalyticsError, OlError};
    use rust_decimal_macros::dec;

    fn contract(kind: OptionKind, strike: Decimal) -> OptionContract {
        OptionContract::equity(
            Symbol::etf("SPY"),
            kind,
            strike,
            NaiveDate::from_ymd_opt(2026, 5, 15).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_default_epsilon() {
        let tol = AtmTolerance::default();
        // 0.5% of 100 = 0.50 < $2
        assert_eq!(tol.epsilon(dec!(100)), dec!(0.500));
        // 0.5% of 600 = 3.00 > $2
        assert_eq!(tol.epsilon(dec!(600)), dec!(2));
    }

    #[test]
    fn test_call_classification() {
        let price = dec!(450);
        let itm = classify_moneyness(&contract(OptionKind::Call, dec!(440)), price, None).unwrap();
        assert_eq!(itm.moneyness, Moneyness::InTheMoney);
        assert_eq!(itm.distance, dec!(10));

        let atm = classify_moneyness(&contract(OptionKind::Call, dec!(451)), price, None).unwrap();
        assert_eq!(atm.moneyness, Moneyness::AtTheMoney);
        assert_eq!(atm.distance, dec!(-1));

        let otm = classify_moneyness(&contract(OptionKind::Call, dec!(460)), price, None).unwrap();
        assert_eq!(otm.moneyness, Moneyness::OutOfTheMoney);
        assert_eq!(otm.distance, dec!(-10));
    }

    #[test]
    fn test_put_classification_is_inverted() {
        let price = dec!(450);
        let itm = classify_moneyness(&contract(OptionKind::Put, dec!(460)), price, None).unwrap();
        assert_eq!(itm.moneyness, Moneyness::InTheMoney);
        assert_eq!(itm.distance, dec!(10));

        let otm = classify_moneyness(&contract(OptionKind::Put, dec!(440)), price, None).unwrap();
        assert_eq!(otm.moneyness, Moneyness::OutOfTheMoney);
    }

    #[test]
    fn test_explicit_epsilon() {
        let c = contract(OptionKind::Call, dec!(103));
        let tight = classify_moneyness(&c, dec!(100), Some(dec!(1))).unwrap();
        assert_eq!(tight.moneyness, Moneyness::OutOfTheMoney);
        let loose = classify_moneyness(&c, dec!(100), Some(dec!(5))).unwrap();
        assert_eq!(loose.moneyness, Moneyness::AtTheMoney);

        let custom = AtmTolerance {
            absolute: dec!(5),
            pct_of_price: dec!(0.10),
        };
        let r = classify_with_tolerance(&c, dec!(100), &custom).unwrap();
        assert_eq!(r.moneyness, Moneyness::AtTheMoney);
    }

    #[test]
    fn test_positive_intrinsic_is_never_otm() {
        let prices = [dec!(90), dec!(99.6), dec!(100), dec!(100.3), dec!(101), dec!(130)];
        for kind in [OptionKind::Call, OptionKind::Put] {
            let c = contract(kind, dec!(100));
            for price in prices {
                let reading = classify_moneyness(&c, price, None).unwrap();
                if c.intrinsic_value(price) > Decimal::ZERO {
                    assert_ne!(reading.moneyness, Moneyness::OutOfTheMoney, "{kind} at {price}");
                }
            }
        }
    }

    #[test]
    fn test_distance_pct() {
        let r = classify_moneyness(&contract(OptionKind::Call, dec!(90)), dec!(100), None).unwrap();
        assert_eq!(r.distance_pct, Some(dec!(10)));
        let zero = classify_moneyness(&contract(OptionKind::Put, dec!(10)), dec!(0), None).unwrap();
        assert_eq!(zero.distance_pct, None);
        assert_eq!(zero.moneyness, Moneyness::InTheMoney);
    }

    #[test]
    fn test_invalid_inputs() {
        let mut bad = contract(OptionKind::Call, dec!(100));
        bad.strike = dec!(0);
        assert!(matches!(
            classify_moneyness(&bad, dec!(100), None),
            Err(OlError::Analytics(AnalyticsError::InvalidContract { .. }))
        ));

        let c = contract(OptionKind::Call, dec!(100));
        assert!(matches!(
            classify_moneyness(&c, dec!(-1), None),
            Err(OlError::Analytics(AnalyticsError::InvalidParameter { .. }))
        ));
        assert!(classify_moneyness(&c, dec!(100), Some(dec!(-0.1))).is_err());
    }

    #[test]
    fn test_tiny_price_overflow_is_an_error() {
        let far = contract(OptionKind::Call, Decimal::MAX / dec!(2));
        let tiny = Decimal::new(1, 20);
        assert!(matches!(
            classify_moneyness(&far, tiny, None),
            Err(OlError::Analytics(AnalyticsError::InvalidParameter { .. }))
        ));
        assert!(within_display_window(dec!(1), Decimal::MAX, Decimal::MAX));
    }

    #[test]
    fn test_display_window() {
        assert!(within_display_window(dec!(110), dec!(100), dec!(0.15)));
        assert!(!within_display_window(dec!(115), dec!(100), dec!(0.15)));
        assert!(within_display_window(dec!(86), dec!(100), dec!(0.15)));
    }
}
