//! Scenario tables for the four supported strategies.
//!
//! One entry point, [`build_scenario_report`], dispatches on [`Strategy`].
//! Option-only strategies report per-share figures; stock-backed strategies
//! report per-contract figures (shares = multiplier).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use ol_types::{invalid_contract, OlResult};

use crate::contract::{OptionContract, OptionKind};
use crate::payoff::{check_premium, check_price, checked, pct_of, Scenario, ScenarioResult};
use crate::premium::PremiumBasis;

/// Percentage moves of the default scenario set.
pub const DEFAULT_SCENARIO_STEPS: [i64; 7] = [-30, -15, -5, 0, 5, 15, 30];

/// Strategy tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// Buy a call.
    LongCall,
    /// Buy a put.
    LongPut,
    /// Own the shares, sell a call against them.
    CoveredCall,
    /// Own the shares, buy a put under them.
    ProtectivePut,
}

impl Strategy {
    /// The option kind this strategy trades.
    pub fn option_kind(&self) -> OptionKind {
        match self {
            Strategy::LongCall | Strategy::CoveredCall => OptionKind::Call,
            Strategy::LongPut | Strategy::ProtectivePut => OptionKind::Put,
        }
    }

    /// True when the strategy includes a stock leg.
    pub fn holds_stock(&self) -> bool {
        matches!(self, Strategy::CoveredCall | Strategy::ProtectivePut)
    }

    pub fn units(&self) -> PnlUnits {
        if self.holds_stock() {
            PnlUnits::PerContract
        } else {
            PnlUnits::PerShare
        }
    }

    /// Underlying price at which the whole position breaks even.
    pub fn breakeven(
        &self,
        strike: Decimal,
        premium: Decimal,
        entry_price: Decimal,
    ) -> OlResult<Decimal> {
        let value = match self {
            Strategy::LongCall => strike.checked_add(premium),
            Strategy::LongPut => strike.checked_sub(premium),
            Strategy::CoveredCall => entry_price.checked_sub(premium),
            Strategy::ProtectivePut => entry_price.checked_add(premium),
        };
        checked(value, "premium")
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Strategy::LongCall => "Long Call",
            Strategy::LongPut => "Long Put",
            Strategy::CoveredCall => "Covered Call",
            Strategy::ProtectivePut => "Protective Put",
        };
        write!(f, "{}", s)
    }
}

/// Unit of `profit_loss` in a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PnlUnits {
    PerShare,
    /// Per contract, i.e. per `multiplier` shares.
    PerContract,
}

/// Scenario table for one strategy on one contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub strategy: Strategy,
    pub contract: OptionContract,
    /// Per-share premium paid or received.
    pub premium: Decimal,
    pub premium_basis: PremiumBasis,
    /// Underlying price when the report was built; the stock entry price for
    /// stock-backed strategies.
    pub underlying_price: Decimal,
    pub breakeven: Decimal,
    pub units: PnlUnits,
    pub results: Vec<ScenarioResult>,
}

impl ScenarioReport {
    /// Tag the premium as a heuristic estimate.
    pub fn with_premium_basis(mut self, basis: PremiumBasis) -> Self {
        self.premium_basis = basis;
        self
    }

    pub fn best(&self) -> Option<&ScenarioResult> {
        self.results.iter().max_by(|a, b| a.profit_loss.cmp(&b.profit_loss))
    }

    pub fn worst(&self) -> Option<&ScenarioResult> {
        self.results.iter().min_by(|a, b| a.profit_loss.cmp(&b.profit_loss))
    }
}

/// Default scenario set: fixed percentage moves of the underlying plus the
/// strike and breakeven points, in ascending price order.
pub fn default_scenarios(
    underlying_price: Decimal,
    strike: Decimal,
    breakeven: Decimal,
) -> OlResult<Vec<Scenario>> {
    let mut scenarios = DEFAULT_SCENARIO_STEPS
        .iter()
        .map(|&step| {
            let label = match step {
                0 => "Flat".to_string(),
                s if s < 0 => format!("Down {}%", -s),
                s => format!("Up {}%", s),
            };
            let factor = Decimal::ONE + Decimal::from(step) / Decimal::ONE_HUNDRED;
            let price = checked(underlying_price.checked_mul(factor), "underlying_price")?;
            Ok(Scenario::new(label, price))
        })
        .collect::<OlResult<Vec<Scenario>>>()?;

    scenarios.push(Scenario::new("At strike", strike));
    if breakeven >= Decimal::ZERO {
        scenarios.push(Scenario::new("Breakeven", breakeven));
    }

    // Stable: ties keep the percentage point ahead of strike/breakeven.
    scenarios.sort_by(|a, b| a.underlying_price.cmp(&b.underlying_price));
    Ok(scenarios)
}

/// Build the scenario table for `strategy`.
///
/// Given scenarios keep their order; `None` uses [`default_scenarios`]. The
/// premium is reported as [`PremiumBasis::Quoted`] unless re-tagged.
pub fn build_scenario_report(
    strategy: Strategy,
    contract: &OptionContract,
    premium: Decimal,
    underlying_price: Decimal,
    scenarios: Option<&[Scenario]>,
) -> OlResult<ScenarioReport> {
    contract.validate()?;
    check_premium(premium)?;
    check_price("underlying_price", underlying_price)?;
    if contract.kind != strategy.option_kind() {
        return Err(invalid_contract!(
            "{} needs a {} contract, got {}",
            strategy,
            strategy.option_kind(),
            contract.kind
        ));
    }

    let strike = contract.strike;
    let breakeven = strategy.breakeven(strike, premium, underlying_price)?;
    let scenarios = match scenarios {
        Some(given) => given.to_vec(),
        None => default_scenarios(underlying_price, strike, breakeven)?,
    };

    let results = scenarios
        .into_iter()
        .map(|scenario| {
            check_price("hypothetical_price", scenario.underlying_price)?;
            evaluate(strategy, contract, premium, underlying_price, scenario)
        })
        .collect::<OlResult<Vec<_>>>()?;

    debug!(
        "Built {} report for {} with {} scenarios",
        strategy,
        contract,
        results.len()
    );

    Ok(ScenarioReport {
        strategy,
        contract: contract.clone(),
        premium,
        premium_basis: PremiumBasis::Quoted,
        underlying_price,
        breakeven,
        units: strategy.units(),
        results,
    })
}

fn evaluate(
    strategy: Strategy,
    contract: &OptionContract,
    premium: Decimal,
    entry_price: Decimal,
    scenario: Scenario,
) -> OlResult<ScenarioResult> {
    let price = scenario.underlying_price;
    let intrinsic = contract.intrinsic_value(price);
    let m = contract.multiplier;

    let (profit_loss, basis) = match strategy {
        Strategy::LongCall | Strategy::LongPut => (intrinsic - premium, premium),
        // Shares are called away above the strike, so the call's intrinsic
        // value cancels the stock's upside.
        Strategy::CoveredCall => {
            let per_share = (price - entry_price)
                .checked_add(premium)
                .and_then(|v| v.checked_sub(intrinsic));
            (
                checked(per_share.and_then(|v| v.checked_mul(m)), "multiplier")?,
                checked(entry_price.checked_mul(m), "multiplier")?,
            )
        }
        Strategy::ProtectivePut => {
            let per_share = (price - entry_price)
                .checked_add(intrinsic)
                .and_then(|v| v.checked_sub(premium));
            let cost = entry_price.checked_add(premium).and_then(|v| v.checked_mul(m));
            (
                checked(per_share.and_then(|v| v.checked_mul(m)), "multiplier")?,
                checked(cost, "multiplier")?,
            )
        }
    };

    Ok(ScenarioResult {
        scenario,
        option_intrinsic_value: intrinsic,
        profit_loss,
        profit_loss_pct: pct_of(profit_loss, basis),
    })
}
