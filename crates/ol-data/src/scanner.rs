//! Volatility-rank scanner over a list of symbols.
//!
//! Every symbol ends up in exactly one bucket: a hit, a skip (filtered out by
//! price, rank or the result cap) or a failure (gateway or analytics error).
//! Failures are logged and returned, never dropped.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

use ol_options::{OptionChain, OptionKind, VolRegime, VolatilityRank};
use ol_types::config::{AnalyticsConfig, ScannerSettings};
use ol_types::{DateRange, OlResult, Symbol};

use crate::analysis::symbol_volatility_rank;
use crate::gateway::MarketDataGateway;

/// Rank threshold separating the two scan modes.
const RANK_SPLIT: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScanMode {
    /// Elevated volatility, candidates for selling premium.
    HighRank,
    /// Quiet volatility, candidates for buying options.
    LowRank,
}

/// Starting point suggested for a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyIdea {
    CoveredCall,
    CashSecuredPut,
    LongOption,
    DebitSpread,
}

impl fmt::Display for StrategyIdea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StrategyIdea::CoveredCall => "Covered Call",
            StrategyIdea::CashSecuredPut => "Cash-Secured Put",
            StrategyIdea::LongOption => "Long Call/Put",
            StrategyIdea::DebitSpread => "Debit Spread",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanHit {
    pub symbol: Symbol,
    pub price: Decimal,
    pub volatility: VolatilityRank,
    pub regime: VolRegime,
    pub atm_strike: Decimal,
    pub expiration: NaiveDate,
    pub idea: StrategyIdea,
}

/// Why a symbol was passed over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SkipReason {
    PriceOutOfRange { price: Decimal },
    RankOutOfMode { rank: f64 },
    NoContracts,
    /// Qualified, but ranked past `max_results`.
    BelowTopN { rank: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSkip {
    pub symbol: Symbol,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanFailure {
    pub symbol: Symbol,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanOutcome {
    pub mode: ScanMode,
    /// Sorted by rank: descending for `HighRank`, ascending for `LowRank`.
    pub hits: Vec<ScanHit>,
    pub skipped: Vec<ScanSkip>,
    pub failures: Vec<ScanFailure>,
}

enum Screened {
    Hit(ScanHit),
    Skip(SkipReason),
}

/// Scans symbols for volatility-rank extremes through an injected gateway.
#[derive(Debug, Clone)]
pub struct VolatilityScanner {
    pub settings: ScannerSettings,
    pub window: usize,
}

impl VolatilityScanner {
    pub fn new(settings: ScannerSettings, window: usize) -> Self {
        Self { settings, window }
    }

    pub fn from_config(config: &AnalyticsConfig) -> Self {
        Self::new(config.scanner.clone(), config.volatility.window)
    }

    pub fn scan<G>(
        &self,
        gateway: &G,
        symbols: &[Symbol],
        mode: ScanMode,
        today: NaiveDate,
    ) -> ScanOutcome
    where
        G: MarketDataGateway + ?Sized,
    {
        info!(
            "Scanning {} symbols for {:?} via {}",
            symbols.len(),
            mode,
            gateway.name()
        );

        let mut outcome = ScanOutcome {
            mode,
            hits: Vec::new(),
            skipped: Vec::new(),
            failures: Vec::new(),
        };

        for symbol in symbols {
            match self.screen(gateway, symbol, mode, today) {
                Ok(Screened::Hit(hit)) => outcome.hits.push(hit),
                Ok(Screened::Skip(reason)) => {
                    debug!("Skipping {}: {:?}", symbol, reason);
                    outcome.skipped.push(ScanSkip {
                        symbol: symbol.clone(),
                        reason,
                    });
                }
                Err(e) => {
                    warn!("Scan of {} failed: {}", symbol, e);
                    outcome.failures.push(ScanFailure {
                        symbol: symbol.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        match mode {
            ScanMode::HighRank => outcome
                .hits
                .sort_by(|a, b| b.volatility.rank.total_cmp(&a.volatility.rank)),
            ScanMode::LowRank => outcome
                .hits
                .sort_by(|a, b| a.volatility.rank.total_cmp(&b.volatility.rank)),
        }
        if outcome.hits.len() > self.settings.max_results {
            let overflow = outcome.hits.split_off(self.settings.max_results);
            debug!("{} hits past the top {}", overflow.len(), self.settings.max_results);
            outcome
                .skipped
                .extend(overflow.into_iter().map(|hit| ScanSkip {
                    reason: SkipReason::BelowTopN {
                        rank: hit.volatility.rank,
                    },
                    symbol: hit.symbol,
                }));
        }

        info!(
            "Scan complete: {} hits, {} skipped, {} failed",
            outcome.hits.len(),
            outcome.skipped.len(),
            outcome.failures.len()
        );
        outcome
    }

    fn screen<G>(
        &self,
        gateway: &G,
        symbol: &Symbol,
        mode: ScanMode,
        today: NaiveDate,
    ) -> OlResult<Screened>
    where
        G: MarketDataGateway + ?Sized,
    {
        let price = gateway.get_price(symbol)?;
        if price < self.settings.min_price || price > self.settings.max_price {
            return Ok(Screened::Skip(SkipReason::PriceOutOfRange { price }));
        }

        let volatility = symbol_volatility_rank(gateway, symbol, today, self.window)?;
        let in_mode = match mode {
            ScanMode::HighRank => volatility.rank >= RANK_SPLIT,
            ScanMode::LowRank => volatility.rank <= RANK_SPLIT,
        };
        if !in_mode {
            return Ok(Screened::Skip(SkipReason::RankOutOfMode {
                rank: volatility.rank,
            }));
        }

        let range = DateRange::days_ahead(today, self.settings.lookahead_days);
        let calls = gateway.get_option_contracts(symbol, range, OptionKind::Call)?;
        let chain = OptionChain::from_contracts(symbol.clone(), price, calls)?;
        let Some(atm) = chain.atm_contract(OptionKind::Call) else {
            return Ok(Screened::Skip(SkipReason::NoContracts));
        };

        let idea = match mode {
            ScanMode::HighRank if price < Decimal::from(200) => StrategyIdea::CoveredCall,
            ScanMode::HighRank => StrategyIdea::CashSecuredPut,
            ScanMode::LowRank if volatility.rank < 25.0 => StrategyIdea::LongOption,
            ScanMode::LowRank => StrategyIdea::DebitSpread,
        };

        Ok(Screened::Hit(ScanHit {
            symbol: symbol.clone(),
            price,
            regime: volatility.regime(),
            atm_strike: atm.strike,
            expiration: atm.expiration,
            volatility,
            idea,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::InMemoryGateway;
    use ol_options::OptionContract;
    use rust_decimal_macros::dec;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 31).unwrap()
    }

    /// 90 daily closes; `late_amp` sets the size of the last 30 swings.
    fn closes(base: f64, early_amp: f64, late_amp: f64) -> Vec<Decimal> {
        (0..90)
            .map(|i| {
                let amp = if i < 60 { early_amp } else { late_amp };
                let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
                Decimal::from_f64_retain(base + sign * amp).unwrap()
            })
            .collect()
    }

    fn add_symbol(
        gw: InMemoryGateway,
        ticker: &str,
        price: Decimal,
        closes: &[Decimal],
    ) -> InMemoryGateway {
        let sym = Symbol::equity(ticker);
        let exp = today() + chrono::Duration::days(20);
        let contracts = [price - dec!(5), price.round(), price + dec!(5)]
            .into_iter()
            .map(|k| OptionContract::equity(sym.clone(), OptionKind::Call, k, exp).unwrap())
            .collect();
        gw.with_quote(&sym, price)
            .with_closes(&sym, today(), closes)
            .with_contracts(&sym, contracts)
    }

    fn fixture() -> InMemoryGateway {
        let gw = InMemoryGateway::new();
        let gw = add_symbol(gw, "HOT", dec!(120), &closes(120.0, 1.0, 6.0));
        let gw = add_symbol(gw, "WARM", dec!(250), &closes(250.0, 2.0, 4.0));
        let gw = add_symbol(gw, "CALM", dec!(80), &closes(80.0, 3.0, 0.3));
        let gw = add_symbol(gw, "PENNY", dec!(2), &closes(2.0, 0.1, 0.1));
        // Quote but no history.
        gw.with_quote(&Symbol::equity("NEW"), dec!(40))
    }

    fn symbols() -> Vec<Symbol> {
        ["HOT", "WARM", "CALM", "PENNY", "NEW", "GONE"]
            .iter()
            .map(|s| Symbol::equity(s))
            .collect()
    }

    #[test]
    fn test_high_rank_scan() {
        let scanner = VolatilityScanner::new(ScannerSettings::default(), 30);
        let out = scanner.scan(&fixture(), &symbols(), ScanMode::HighRank, today());

        let hits: Vec<&str> = out.hits.iter().map(|h| h.symbol.symbol.as_str()).collect();
        assert_eq!(hits.len(), 2);
        assert!(hits.contains(&"HOT") && hits.contains(&"WARM"));
        for w in out.hits.windows(2) {
            assert!(w[0].volatility.rank >= w[1].volatility.rank);
        }

        let hot = out.hits.iter().find(|h| h.symbol.symbol == "HOT").unwrap();
        assert_eq!(hot.idea, StrategyIdea::CoveredCall);
        assert_eq!(hot.atm_strike, dec!(120));
        let warm = out.hits.iter().find(|h| h.symbol.symbol == "WARM").unwrap();
        assert_eq!(warm.idea, StrategyIdea::CashSecuredPut);
    }

    #[test]
    fn test_failures_are_reported_not_swallowed() {
        let scanner = VolatilityScanner::new(ScannerSettings::default(), 30);
        let out = scanner.scan(&fixture(), &symbols(), ScanMode::HighRank, today());

        let failed: Vec<&str> = out.failures.iter().map(|f| f.symbol.symbol.as_str()).collect();
        assert!(failed.contains(&"NEW"));
        assert!(failed.contains(&"GONE"));
        assert_eq!(out.hits.len() + out.skipped.len() + out.failures.len(), symbols().len());

        let penny = out.skipped.iter().find(|s| s.symbol.symbol == "PENNY").unwrap();
        assert!(matches!(penny.reason, SkipReason::PriceOutOfRange { .. }));
        let calm = out.skipped.iter().find(|s| s.symbol.symbol == "CALM").unwrap();
        assert!(matches!(calm.reason, SkipReason::RankOutOfMode { .. }));
    }

    #[test]
    fn test_low_rank_scan() {
        let scanner = VolatilityScanner::new(ScannerSettings::default(), 30);
        let out = scanner.scan(&fixture(), &symbols(), ScanMode::LowRank, today());
        assert_eq!(out.hits.len(), 1);
        assert_eq!(out.hits[0].symbol.symbol, "CALM");
        assert_eq!(out.hits[0].idea, StrategyIdea::LongOption);
        assert_eq!(out.hits[0].regime, VolRegime::Low);
    }

    #[test]
    fn test_max_results_truncates() {
        let settings = ScannerSettings {
            max_results: 1,
            ..ScannerSettings::default()
        };
        let scanner = VolatilityScanner::new(settings, 30);
        let out = scanner.scan(&fixture(), &symbols(), ScanMode::HighRank, today());
        assert_eq!(out.hits.len(), 1);
        assert_eq!(out.hits[0].symbol.symbol, "HOT");

        // The cut hit is still accounted for.
        let warm = out.skipped.iter().find(|s| s.symbol.symbol == "WARM").unwrap();
        assert!(matches!(warm.reason, SkipReason::BelowTopN { rank } if rank >= 50.0));
        assert_eq!(out.hits.len() + out.skipped.len() + out.failures.len(), symbols().len());
    }
}
