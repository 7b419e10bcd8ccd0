use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::debug;

use ol_options::{OptionContract, OptionKind};
use ol_types::{DailyBar, DateRange, GatewayError, OlResult, Quote, Symbol};

/// Source of quotes, option chains and daily bars.
///
/// Implementations may wrap a brokerage API or read local files. Calls are
/// blocking and issued sequentially; retry policy belongs to the
/// implementation, not to callers in this crate.
pub trait MarketDataGateway: Send + Sync {
    /// Latest top-of-book quote for the underlying.
    fn get_quote(&self, symbol: &Symbol) -> OlResult<Quote>;

    /// Current underlying price: the midpoint of the latest quote.
    fn get_price(&self, symbol: &Symbol) -> OlResult<Decimal> {
        let quote = self.get_quote(symbol)?;
        debug!(
            "{} bid {} ask {} (spread {})",
            symbol,
            quote.bid,
            quote.ask,
            quote.spread()
        );
        Ok(quote.mid())
    }

    /// Listed contracts of `kind` expiring within `range`.
    fn get_option_contracts(
        &self,
        symbol: &Symbol,
        range: DateRange,
        kind: OptionKind,
    ) -> OlResult<Vec<OptionContract>>;

    /// Daily bars within `range`, oldest first.
    fn get_daily_bars(&self, symbol: &Symbol, range: DateRange) -> OlResult<Vec<DailyBar>>;

    /// Daily closes within `range`, oldest first.
    fn get_daily_closes(&self, symbol: &Symbol, range: DateRange) -> OlResult<Vec<Decimal>> {
        Ok(self
            .get_daily_bars(symbol, range)?
            .into_iter()
            .map(|b| b.close)
            .collect())
    }

    /// Gateway name, for logs.
    fn name(&self) -> &str;
}

/// Gateway over data held in memory. Used for fixtures and demos.
#[derive(Debug, Default, Clone)]
pub struct InMemoryGateway {
    quotes: HashMap<String, Quote>,
    contracts: HashMap<String, Vec<OptionContract>>,
    bars: HashMap<String, Vec<DailyBar>>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Quote with no spread at `price`.
    pub fn with_quote(self, symbol: &Symbol, price: Decimal) -> Self {
        self.with_bid_ask(symbol, price, price)
    }

    pub fn with_bid_ask(mut self, symbol: &Symbol, bid: Decimal, ask: Decimal) -> Self {
        self.quotes
            .insert(symbol.symbol.clone(), Quote::new(symbol.clone(), bid, ask));
        self
    }

    pub fn with_contracts(mut self, symbol: &Symbol, contracts: Vec<OptionContract>) -> Self {
        self.contracts
            .entry(symbol.symbol.clone())
            .or_default()
            .extend(contracts);
        self
    }

    pub fn with_bars(mut self, symbol: &Symbol, mut bars: Vec<DailyBar>) -> Self {
        bars.sort_by_key(|b| b.date);
        self.bars.insert(symbol.symbol.clone(), bars);
        self
    }

    /// Daily bars whose last close lands on `last_date`, one per calendar day.
    pub fn with_closes(self, symbol: &Symbol, last_date: NaiveDate, closes: &[Decimal]) -> Self {
        let n = closes.len() as i64;
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, close)| {
                let date = last_date - Duration::days(n - 1 - i as i64);
                DailyBar::new(symbol.clone(), date, *close, *close, *close, *close, Decimal::ZERO)
            })
            .collect();
        self.with_bars(symbol, bars)
    }
}

impl MarketDataGateway for InMemoryGateway {
    fn get_quote(&self, symbol: &Symbol) -> OlResult<Quote> {
        self.quotes.get(&symbol.symbol).cloned().ok_or_else(|| {
            GatewayError::SymbolNotFound {
                symbol: symbol.symbol.clone(),
            }
            .into()
        })
    }

    fn get_option_contracts(
        &self,
        symbol: &Symbol,
        range: DateRange,
        kind: OptionKind,
    ) -> OlResult<Vec<OptionContract>> {
        Ok(self
            .contracts
            .get(&symbol.symbol)
            .map(|all| {
                all.iter()
                    .filter(|c| c.kind == kind && range.contains(c.expiration))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn get_daily_bars(&self, symbol: &Symbol, range: DateRange) -> OlResult<Vec<DailyBar>> {
        let bars = self
            .bars
            .get(&symbol.symbol)
            .ok_or_else(|| GatewayError::NoData {
                symbol: symbol.symbol.clone(),
                range: range.to_string(),
            })?;
        Ok(bars
            .iter()
            .filter(|b| range.contains(b.date))
            .cloned()
            .collect())
    }

    fn name(&self) -> &str {
        "in-memory"
    }
}
