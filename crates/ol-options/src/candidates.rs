//! Income and insurance tables over a list of contracts.
//!
//! Premiums here come from the heuristic estimator and are tagged as such.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ol_types::{invalid_parameter, OlResult};

use crate::contract::{OptionContract, OptionKind};
use crate::payoff::{checked, pct_of};
use crate::premium::{estimate_premium, PremiumBasis, PremiumHeuristic};

const DAYS_PER_YEAR: i64 = 365;

/// A call that could be written against 100 shares held at `spot`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoveredCallCandidate {
    pub contract: OptionContract,
    /// `strike - spot`.
    pub distance: Decimal,
    pub pct_otm: Decimal,
    pub days_to_expiration: i64,
    pub premium_per_contract: Decimal,
    pub premium_basis: PremiumBasis,
    /// Stock gain up to the strike plus premium, per contract.
    pub max_profit: Decimal,
    /// `max_profit` over the stock position, annualised over the days held.
    pub annualized_return_pct: Decimal,
}

/// A put that could insure 100 shares held at `spot`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtectivePutCandidate {
    pub contract: OptionContract,
    /// `spot - strike`.
    pub distance: Decimal,
    /// How far below spot the protection starts, in percent.
    pub pct_below: Decimal,
    pub days_to_expiration: i64,
    pub premium_per_contract: Decimal,
    pub premium_basis: PremiumBasis,
    /// Stock drop down to the strike plus premium, per contract.
    pub max_loss: Decimal,
    pub max_loss_pct: Decimal,
}

fn check_spot(spot: Decimal) -> OlResult<()> {
    if spot <= Decimal::ZERO {
        return Err(invalid_parameter!("spot", "must be positive, got {spot}"));
    }
    Ok(())
}

/// Out-of-the-money calls, nearest strike first.
pub fn covered_call_candidates(
    contracts: &[OptionContract],
    spot: Decimal,
    today: NaiveDate,
    heuristic: &PremiumHeuristic,
) -> OlResult<Vec<CoveredCallCandidate>> {
    check_spot(spot)?;

    let mut out = Vec::new();
    for c in contracts
        .iter()
        .filter(|c| c.kind == OptionKind::Call && c.strike > spot && !c.is_expired(today))
    {
        c.validate()?;
        let days = c.days_to_expiration(today);
        let m = c.multiplier;
        let distance = c.strike - spot;
        let premium = estimate_premium(c.strike, spot, days, OptionKind::Call, Some(heuristic))?;
        let premium_per_contract = checked(premium.checked_mul(m), "multiplier")?;
        let max_profit = checked(
            distance
                .checked_mul(m)
                .and_then(|v| v.checked_add(premium_per_contract)),
            "multiplier",
        )?;
        let held_days = Decimal::from(days.max(1));
        let annualized_return_pct = checked(
            spot.checked_mul(m)
                .and_then(|position| max_profit.checked_div(position))
                .and_then(|r| r.checked_mul(Decimal::from(DAYS_PER_YEAR) / held_days))
                .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED)),
            "spot",
        )?;

        out.push(CoveredCallCandidate {
            contract: c.clone(),
            distance,
            pct_otm: checked(pct_of(distance, spot), "spot")?,
            days_to_expiration: days,
            premium_per_contract,
            premium_basis: PremiumBasis::Estimated,
            max_profit,
            annualized_return_pct,
        });
    }
    out.sort_by(|a, b| {
        a.contract
            .strike
            .cmp(&b.contract.strike)
            .then_with(|| a.contract.expiration.cmp(&b.contract.expiration))
    });
    Ok(out)
}

/// Out-of-the-money puts, nearest strike first.
pub fn protective_put_candidates(
    contracts: &[OptionContract],
    spot: Decimal,
    today: NaiveDate,
    heuristic: &PremiumHeuristic,
) -> OlResult<Vec<ProtectivePutCandidate>> {
    check_spot(spot)?;

    let mut out = Vec::new();
    for c in contracts
        .iter()
        .filter(|c| c.kind == OptionKind::Put && c.strike < spot && !c.is_expired(today))
    {
        c.validate()?;
        let days = c.days_to_expiration(today);
        let m = c.multiplier;
        let distance = spot - c.strike;
        let premium = estimate_premium(c.strike, spot, days, OptionKind::Put, Some(heuristic))?;
        let premium_per_contract = checked(premium.checked_mul(m), "multiplier")?;
        let max_loss = checked(
            distance
                .checked_mul(m)
                .and_then(|v| v.checked_add(premium_per_contract)),
            "multiplier",
        )?;
        let position = checked(spot.checked_mul(m), "spot")?;

        out.push(ProtectivePutCandidate {
            contract: c.clone(),
            distance,
            pct_below: checked(pct_of(distance, spot), "spot")?,
            days_to_expiration: days,
            premium_per_contract,
            premium_basis: PremiumBasis::Estimated,
            max_loss,
            max_loss_pct: checked(pct_of(max_loss, position), "spot")?,
        });
    }
    out.sort_by(|a, b| {
        b.contract
            .strike
            .cmp(&a.contract.strike)
            .then_with(|| a.contract.expiration.cmp(&b.contract.expiration))
    });
    Ok(out)
}
