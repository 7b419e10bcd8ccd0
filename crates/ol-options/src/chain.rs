//! Option chain view: contracts for one underlying, grouped by expiration.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use ol_types::market::Symbol;
use ol_types::{invalid_contract, OlResult};

use crate::contract::{OptionContract, OptionKind};
use crate::moneyness::{
    classify_with_tolerance, within_display_window, AtmTolerance, MoneynessReading,
};

/// One contract with its moneyness against the chain's spot price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainRow {
    pub contract: OptionContract,
    pub reading: MoneynessReading,
}

/// Snapshot of the listed contracts for one underlying at a given spot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionChain {
    pub underlying: Symbol,
    pub spot: Decimal,
    /// Sorted by expiration, then kind, then strike.
    pub contracts: Vec<OptionContract>,
}

impl OptionChain {
    /// Build a chain, rejecting contracts on a different underlying or with a
    /// non-positive strike.
    pub fn from_contracts(
        underlying: Symbol,
        spot: Decimal,
        mut contracts: Vec<OptionContract>,
    ) -> OlResult<Self> {
        for c in &contracts {
            c.validate()?;
            if c.underlying.symbol != underlying.symbol {
                return Err(invalid_contract!(
                    "{} does not belong to the {} chain",
                    c,
                    underlying.symbol
                ));
            }
        }
        contracts.sort_by(|a, b| {
            a.expiration
                .cmp(&b.expiration)
                .then_with(|| kind_order(a.kind).cmp(&kind_order(b.kind)))
                .then_with(|| a.strike.cmp(&b.strike))
        });
        Ok(Self {
            underlying,
            spot,
            contracts,
        })
    }

    /// Distinct expirations, ascending.
    pub fn expirations(&self) -> Vec<NaiveDate> {
        self.contracts
            .iter()
            .map(|c| c.expiration)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn nearest_expiration(&self) -> Option<NaiveDate> {
        self.contracts.iter().map(|c| c.expiration).min()
    }

    /// A sub-chain holding only the given expiration.
    pub fn for_expiration(&self, expiration: NaiveDate) -> OptionChain {
        OptionChain {
            underlying: self.underlying.clone(),
            spot: self.spot,
            contracts: self
                .contracts
                .iter()
                .filter(|c| c.expiration == expiration)
                .cloned()
                .collect(),
        }
    }

    /// Contracts of one kind, in chain order.
    pub fn of_kind(&self, kind: OptionKind) -> impl Iterator<Item = &OptionContract> {
        self.contracts.iter().filter(move |c| c.kind == kind)
    }

    /// Contract of `kind` whose strike is closest to spot. Ties go to the
    /// lower strike of the nearest expiration.
    pub fn atm_contract(&self, kind: OptionKind) -> Option<&OptionContract> {
        self.of_kind(kind)
            .min_by_key(|c| ((c.strike - self.spot).abs(), c.expiration, c.strike))
    }

    /// Get a specific contract by kind and strike (first expiration wins).
    pub fn get_strike(&self, kind: OptionKind, strike: Decimal) -> Option<&OptionContract> {
        self.of_kind(kind).find(|c| c.strike == strike)
    }

    /// Contracts of `kind` with strikes inside the display window, classified.
    pub fn window_rows(
        &self,
        kind: OptionKind,
        window_pct: Decimal,
        tolerance: &AtmTolerance,
    ) -> OlResult<Vec<ChainRow>> {
        self.of_kind(kind)
            .filter(|c| within_display_window(c.strike, self.spot, window_pct))
            .map(|c| {
                Ok(ChainRow {
                    contract: c.clone(),
                    reading: classify_with_tolerance(c, self.spot, tolerance)?,
                })
            })
            .collect()
    }

    /// Number of contracts in the chain.
    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    /// True if the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}

fn kind_order(kind: OptionKind) -> u8 {
    match kind {
        OptionKind::Call => 0,
        OptionKind::Put => 1,
    }
}
