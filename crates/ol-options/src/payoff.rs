//! Expiration payoff for single-leg option positions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use ol_types::{invalid_contract, invalid_parameter, OlResult};

use crate::contract::{intrinsic_value, OptionKind};

/// Which side of the contract the holder is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionDirection {
    /// Bought the option, paid the premium.
    Long,
    /// Wrote the option, received the premium.
    Short,
}

impl fmt::Display for PositionDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionDirection::Long => write!(f, "Long"),
            PositionDirection::Short => write!(f, "Short"),
        }
    }
}

/// A named point on the underlying price axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub label: String,
    pub underlying_price: Decimal,
}

impl Scenario {
    pub fn new(label: impl Into<String>, underlying_price: Decimal) -> Self {
        Self {
            label: label.into(),
            underlying_price,
        }
    }

    /// Scenario labelled with its own price.
    pub fn at(underlying_price: Decimal) -> Self {
        Self::new(format!("At {underlying_price}"), underlying_price)
    }
}

/// Payoff of one scenario at expiration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario: Scenario,
    /// Option intrinsic value per share.
    pub option_intrinsic_value: Decimal,
    pub profit_loss: Decimal,
    /// P/L relative to the position's cost basis; `None` when the basis is zero.
    pub profit_loss_pct: Option<Decimal>,
}

/// Breakeven, best and worst case of a single-leg position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoffProfile {
    pub breakeven: Decimal,
    /// `None` means unbounded.
    pub max_gain: Option<Decimal>,
    /// Positive amount; `None` means unbounded.
    pub max_loss: Option<Decimal>,
}

pub(crate) fn check_strike(strike: Decimal) -> OlResult<()> {
    if strike <= Decimal::ZERO {
        return Err(invalid_contract!("strike must be positive, got {strike}"));
    }
    Ok(())
}

pub(crate) fn check_premium(premium: Decimal) -> OlResult<()> {
    if premium < Decimal::ZERO {
        return Err(invalid_parameter!("premium", "must be non-negative, got {premium}"));
    }
    Ok(())
}

pub(crate) fn check_price(name: &str, price: Decimal) -> OlResult<()> {
    if price < Decimal::ZERO {
        return Err(invalid_parameter!(name, "must be non-negative, got {price}"));
    }
    Ok(())
}

/// Turn an overflowed checked operation into an `InvalidParameter` error.
pub(crate) fn checked(value: Option<Decimal>, parameter: &str) -> OlResult<Decimal> {
    value.ok_or_else(|| invalid_parameter!(parameter, "out of range for decimal arithmetic"))
}

/// `profit_loss / basis * 100`, undefined for a zero basis or when the ratio
/// does not fit in a `Decimal`.
pub(crate) fn pct_of(profit_loss: Decimal, basis: Decimal) -> Option<Decimal> {
    if basis.is_zero() {
        return None;
    }
    profit_loss
        .checked_div(basis)?
        .checked_mul(Decimal::ONE_HUNDRED)
}

/// Per-share P/L of a single option leg at expiration.
pub fn option_profit_loss(
    kind: OptionKind,
    strike: Decimal,
    premium: Decimal,
    direction: PositionDirection,
    price: Decimal,
) -> Decimal {
    let intrinsic = intrinsic_value(kind, strike, price);
    match direction {
        PositionDirection::Long => intrinsic - premium,
        PositionDirection::Short => premium - intrinsic,
    }
}

/// Evaluate expiration payoff at each hypothetical underlying price, in order.
pub fn evaluate_payoff(
    kind: OptionKind,
    strike: Decimal,
    premium: Decimal,
    direction: PositionDirection,
    prices: &[Decimal],
) -> OlResult<Vec<ScenarioResult>> {
    let scenarios: Vec<Scenario> = prices.iter().copied().map(Scenario::at).collect();
    evaluate_scenarios(kind, strike, premium, direction, &scenarios)
}

/// Like [`evaluate_payoff`], keeping the caller's scenario labels.
pub fn evaluate_scenarios(
    kind: OptionKind,
    strike: Decimal,
    premium: Decimal,
    direction: PositionDirection,
    scenarios: &[Scenario],
) -> OlResult<Vec<ScenarioResult>> {
    check_strike(strike)?;
    check_premium(premium)?;

    scenarios
        .iter()
        .map(|scenario| {
            check_price("hypothetical_price", scenario.underlying_price)?;
            let profit_loss =
                option_profit_loss(kind, strike, premium, direction, scenario.underlying_price);
            Ok(ScenarioResult {
                scenario: scenario.clone(),
                option_intrinsic_value: intrinsic_value(kind, strike, scenario.underlying_price),
                profit_loss,
                profit_loss_pct: pct_of(profit_loss, premium),
            })
        })
        .collect()
}

/// Underlying price at which a position breaks even at expiration:
/// `strike + premium` for calls, `strike - premium` for puts.
pub fn breakeven(kind: OptionKind, strike: Decimal, premium: Decimal) -> OlResult<Decimal> {
    let level = match kind {
        OptionKind::Call => strike.checked_add(premium),
        OptionKind::Put => strike.checked_sub(premium),
    };
    checked(level, "premium")
}

/// Breakeven and bounds of a single-leg position, per share.
pub fn payoff_profile(
    kind: OptionKind,
    strike: Decimal,
    premium: Decimal,
    direction: PositionDirection,
) -> OlResult<PayoffProfile> {
    check_strike(strike)?;
    check_premium(premium)?;

    // A put's payoff is capped by the underlying going to zero.
    let put_cap = (strike - premium).max(Decimal::ZERO);
    let (max_gain, max_loss) = match (kind, direction) {
        (OptionKind::Call, PositionDirection::Long) => (None, Some(premium)),
        (OptionKind::Put, PositionDirection::Long) => (Some(put_cap), Some(premium)),
        (OptionKind::Call, PositionDirection::Short) => (Some(premium), None),
        (OptionKind::Put, PositionDirection::Short) => (Some(premium), Some(put_cap)),
    };

    Ok(PayoffProfile {
        breakeven: breakeven(kind, strike, premium)?,
        max_gain,
        max_loss,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ol_types::{AnalyticsError, OlError};
    use rust_decimal_macros::dec;

    fn pl(results: &[ScenarioResult]) -> Vec<Decimal> {
        results.iter().map(|r| r.profit_loss).collect()
    }

    #[test]
    fn test_long_call_example() {
        let prices = [dec!(90), dec!(100), dec!(103), dec!(108), dec!(113)];
        let res = evaluate_payoff(
            OptionKind::Call,
            dec!(100),
            dec!(3.00),
            PositionDirection::Long,
            &prices,
        )
        .unwrap();
        assert_eq!(pl(&res), vec![dec!(-3), dec!(-3), dec!(0), dec!(5), dec!(10)]);
        assert_eq!(res[3].option_intrinsic_value, dec!(8));
        assert_eq!(res[0].profit_loss_pct, Some(dec!(-100)));
    }

    #[test]
    fn test_long_put_example() {
        let prices = [dec!(113), dec!(108), dec!(100), dec!(97), dec!(90)];
        let res = evaluate_payoff(
            OptionKind::Put,
            dec!(100),
            dec!(3.00),
            PositionDirection::Long,
            &prices,
        )
        .unwrap();
        assert_eq!(pl(&res), vec![dec!(-3), dec!(-3), dec!(-3), dec!(0), dec!(7)]);
    }

    #[test]
    fn test_short_mirrors_long() {
        let prices = [dec!(80), dec!(100), dec!(120)];
        let call = |direction| {
            evaluate_payoff(OptionKind::Call, dec!(100), dec!(4), direction, &prices).unwrap()
        };
        let long = call(PositionDirection::Long);
        let short = call(PositionDirection::Short);
        for (l, s) in long.iter().zip(&short) {
            assert_eq!(l.profit_loss, -s.profit_loss);
        }
    }

    #[test]
    fn test_long_call_monotonic_non_decreasing() {
        let prices: Vec<Decimal> = (0..=400).map(|i| Decimal::from(i) / dec!(2)).collect();
        let long = PositionDirection::Long;
        let res = evaluate_payoff(OptionKind::Call, dec!(97.5), dec!(2.35), long, &prices).unwrap();
        for w in res.windows(2) {
            assert!(w[1].profit_loss >= w[0].profit_loss);
        }
    }

    #[test]
    fn test_long_put_monotonic_non_increasing() {
        let prices: Vec<Decimal> = (0..=400).map(|i| Decimal::from(i) / dec!(2)).collect();
        let long = PositionDirection::Long;
        let res = evaluate_payoff(OptionKind::Put, dec!(97.5), dec!(2.35), long, &prices).unwrap();
        for w in res.windows(2) {
            assert!(w[1].profit_loss <= w[0].profit_loss);
        }
    }

    #[test]
    fn test_breakeven_yields_zero() {
        for (kind, strike, premium) in [
            (OptionKind::Call, dec!(100), dec!(3)),
            (OptionKind::Call, dec!(452.5), dec!(7.35)),
            (OptionKind::Put, dec!(100), dec!(3)),
            (OptionKind::Put, dec!(38), dec!(1.15)),
        ] {
            let be = breakeven(kind, strike, premium).unwrap();
            let long = PositionDirection::Long;
            let res = evaluate_payoff(kind, strike, premium, long, &[be]).unwrap();
            assert!(res[0].profit_loss.abs() < dec!(0.0000001), "{kind} {strike} {premium}");
        }
    }

    #[test]
    fn test_breakeven_overflow_is_an_error() {
        let half = Decimal::MAX / dec!(2);
        assert!(matches!(
            breakeven(OptionKind::Call, Decimal::MAX, half),
            Err(OlError::Analytics(AnalyticsError::InvalidParameter { .. }))
        ));
        let long = PositionDirection::Long;
        assert!(payoff_profile(OptionKind::Call, half, half, long).is_ok());
        assert!(payoff_profile(OptionKind::Call, Decimal::MAX, half, long).is_err());
    }

    #[test]
    fn test_zero_premium_pct_undefined() {
        let long = PositionDirection::Long;
        let res =
            evaluate_payoff(OptionKind::Call, dec!(100), dec!(0), long, &[dec!(110)]).unwrap();
        assert_eq!(res[0].profit_loss, dec!(10));
        assert_eq!(res[0].profit_loss_pct, None);
    }

    #[test]
    fn test_invalid_inputs() {
        let long = PositionDirection::Long;
        assert!(matches!(
            evaluate_payoff(OptionKind::Call, dec!(0), dec!(1), long, &[dec!(1)]),
            Err(OlError::Analytics(AnalyticsError::InvalidContract { .. }))
        ));
        assert!(matches!(
            evaluate_payoff(OptionKind::Call, dec!(10), dec!(-1), long, &[dec!(1)]),
            Err(OlError::Analytics(AnalyticsError::InvalidParameter { .. }))
        ));
        assert!(evaluate_payoff(OptionKind::Put, dec!(10), dec!(1), long, &[dec!(-1)]).is_err());
    }

    #[test]
    fn test_scenario_labels_preserved() {
        let scenarios = vec![
            Scenario::new("Stock drops", dec!(90)),
            Scenario::new("Stock flat", dec!(100)),
        ];
        let long = PositionDirection::Long;
        let res =
            evaluate_scenarios(OptionKind::Call, dec!(100), dec!(3), long, &scenarios).unwrap();
        assert_eq!(res[0].scenario.label, "Stock drops");
        assert_eq!(res[1].scenario.label, "Stock flat");
    }

    #[test]
    fn test_payoff_profiles() {
        use PositionDirection::{Long, Short};
        let long_call = payoff_profile(OptionKind::Call, dec!(100), dec!(3), Long).unwrap();
        assert_eq!(long_call.breakeven, dec!(103));
        assert_eq!(long_call.max_gain, None);
        assert_eq!(long_call.max_loss, Some(dec!(3)));

        let long_put = payoff_profile(OptionKind::Put, dec!(100), dec!(3), Long).unwrap();
        assert_eq!(long_put.breakeven, dec!(97));
        assert_eq!(long_put.max_gain, Some(dec!(97)));

        let short_call = payoff_profile(OptionKind::Call, dec!(100), dec!(3), Short).unwrap();
        assert_eq!(short_call.max_gain, Some(dec!(3)));
        assert_eq!(short_call.max_loss, None);

        let short_put = payoff_profile(OptionKind::Put, dec!(100), dec!(3), Short).unwrap();
        assert_eq!(short_put.max_loss, Some(dec!(97)));
    }
}
