//! Analyses that pull their inputs through a [`MarketDataGateway`].

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use ol_options::{
    build_scenario_report, estimate_premium, estimate_volatility_rank, AtmTolerance, ChainRow,
    OptionChain, OptionContract, OptionKind, PremiumBasis, PremiumHeuristic, Scenario,
    ScenarioReport, Strategy, VolRegime, VolatilityRank,
};
use ol_types::config::AnalyticsConfig;
use ol_types::{DateRange, GatewayError, OlResult, Symbol};

use crate::gateway::MarketDataGateway;

/// Volatility-rank proxy for `symbol` from the last `3 * window` calendar
/// days of closes.
pub fn symbol_volatility_rank<G>(
    gateway: &G,
    symbol: &Symbol,
    today: NaiveDate,
    window: usize,
) -> OlResult<VolatilityRank>
where
    G: MarketDataGateway + ?Sized,
{
    let days = i64::try_from(window).unwrap_or(i64::MAX).saturating_mul(3);
    let range = DateRange::trailing(today, days);
    let closes = gateway.get_daily_closes(symbol, range)?;
    debug!("Fetched {} closes for {} over {}", closes.len(), symbol, range);
    estimate_volatility_rank(&closes, window)
}

/// Chain snapshot for one underlying with its volatility context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainAnalysis {
    pub symbol: Symbol,
    pub spot: Decimal,
    pub volatility: Option<VolatilityRank>,
    /// Why `volatility` is missing, if it is.
    pub volatility_error: Option<String>,
    pub regime: Option<VolRegime>,
    pub expirations: Vec<NaiveDate>,
    pub nearest_expiration: Option<NaiveDate>,
    /// Calls of the nearest expiration inside the display window.
    pub call_rows: Vec<ChainRow>,
    /// Puts of the nearest expiration inside the display window.
    pub put_rows: Vec<ChainRow>,
    pub atm_call: Option<OptionContract>,
    pub atm_put: Option<OptionContract>,
}

/// Fetch quote, contracts and history for `symbol` and assemble a
/// [`ChainAnalysis`].
///
/// A failed volatility estimate does not fail the analysis; the error text is
/// kept in `volatility_error` instead.
pub fn analyze_chain<G>(
    gateway: &G,
    symbol: &Symbol,
    today: NaiveDate,
    days_to_expiry: i64,
    config: &AnalyticsConfig,
) -> OlResult<ChainAnalysis>
where
    G: MarketDataGateway + ?Sized,
{
    let spot = gateway.get_price(symbol)?;
    let range = DateRange::days_ahead(today, days_to_expiry);
    let mut contracts = gateway.get_option_contracts(symbol, range, OptionKind::Call)?;
    contracts.extend(gateway.get_option_contracts(symbol, range, OptionKind::Put)?);
    let chain = OptionChain::from_contracts(symbol.clone(), spot, contracts)?;

    let (volatility, volatility_error) =
        match symbol_volatility_rank(gateway, symbol, today, config.volatility.window) {
            Ok(rank) => (Some(rank), None),
            Err(e) => {
                warn!("No volatility rank for {}: {}", symbol, e);
                (None, Some(e.to_string()))
            }
        };

    let tolerance = AtmTolerance::from(&config.moneyness);
    let window_pct = config.moneyness.display_window_pct;
    let nearest_expiration = chain.nearest_expiration();
    let (call_rows, put_rows, atm_call, atm_put) = match nearest_expiration {
        Some(exp) => {
            let near = chain.for_expiration(exp);
            (
                near.window_rows(OptionKind::Call, window_pct, &tolerance)?,
                near.window_rows(OptionKind::Put, window_pct, &tolerance)?,
                near.atm_contract(OptionKind::Call).cloned(),
                near.atm_contract(OptionKind::Put).cloned(),
            )
        }
        None => (Vec::new(), Vec::new(), None, None),
    };

    info!(
        "Analyzed {} chain: spot {}, {} contracts over {} expirations",
        symbol,
        spot,
        chain.len(),
        chain.expirations().len()
    );

    Ok(ChainAnalysis {
        symbol: symbol.clone(),
        spot,
        regime: volatility.as_ref().map(VolatilityRank::regime),
        volatility,
        volatility_error,
        expirations: chain.expirations(),
        nearest_expiration,
        call_rows,
        put_rows,
        atm_call,
        atm_put,
    })
}

/// Inputs for [`scenario_report_for`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRequest {
    pub symbol: Symbol,
    pub strategy: Strategy,
    pub today: NaiveDate,
    /// Look for contracts expiring within this many calendar days.
    pub days_to_expiry: i64,
    /// Per-share premium actually paid or received. Estimated when absent.
    pub premium: Option<Decimal>,
    /// Custom scenarios; the default set is used when absent.
    pub scenarios: Option<Vec<Scenario>>,
}

impl ScenarioRequest {
    pub fn new(symbol: Symbol, strategy: Strategy, today: NaiveDate, days_to_expiry: i64) -> Self {
        Self {
            symbol,
            strategy,
            today,
            days_to_expiry,
            premium: None,
            scenarios: None,
        }
    }

    pub fn with_premium(mut self, premium: Decimal) -> Self {
        self.premium = Some(premium);
        self
    }

    pub fn with_scenarios(mut self, scenarios: Vec<Scenario>) -> Self {
        self.scenarios = Some(scenarios);
        self
    }
}

/// Build a scenario report on the at-the-money contract of the requested
/// strategy's kind.
pub fn scenario_report_for<G>(
    gateway: &G,
    request: &ScenarioRequest,
    heuristic: &PremiumHeuristic,
) -> OlResult<ScenarioReport>
where
    G: MarketDataGateway + ?Sized,
{
    let symbol = &request.symbol;
    let kind = request.strategy.option_kind();
    let spot = gateway.get_price(symbol)?;
    let range = DateRange::days_ahead(request.today, request.days_to_expiry);
    let contracts = gateway.get_option_contracts(symbol, range, kind)?;
    let chain = OptionChain::from_contracts(symbol.clone(), spot, contracts)?;

    let contract = chain.atm_contract(kind).ok_or_else(|| GatewayError::NoData {
        symbol: symbol.symbol.clone(),
        range: format!("{} contracts, {}", kind, range),
    })?;

    let (premium, basis) = match request.premium {
        Some(p) => (p, PremiumBasis::Quoted),
        None => {
            let days = contract.days_to_expiration(request.today);
            let p = estimate_premium(contract.strike, spot, days, kind, Some(heuristic))?;
            (p, PremiumBasis::Estimated)
        }
    };

    info!(
        "{} on {} at spot {} with {} premium {}",
        request.strategy, contract, spot, basis, premium
    );

    let report = build_scenario_report(
        request.strategy,
        contract,
        premium,
        spot,
        request.scenarios.as_deref(),
    )?;
    Ok(report.with_premium_basis(basis))
}
