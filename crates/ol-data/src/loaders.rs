//! CSV-backed gateway.
//!
//! Layout of the data directory:
//!
//! * `{symbol}_day.csv`: daily bars with `Date,Open,High,Low,Close,Volume`
//! * `{symbol}_options.csv`: listed contracts with `expiration,type,strike[,multiplier]`
//!
//! The quote is the last close on file, with no spread.

use chrono::NaiveDate;
use csv::ReaderBuilder;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use ol_options::{OptionContract, OptionKind};
use ol_types::{DailyBar, DateRange, GatewayError, OlResult, Quote, Symbol};

use crate::gateway::MarketDataGateway;

#[derive(Debug)]
pub struct CsvBarsGateway {
    pub name: String,
    pub data_directory: PathBuf,
    pub bars_pattern: String,
    pub options_pattern: String,
}

#[derive(Debug, Deserialize)]
struct BarRecord {
    #[serde(alias = "Date", alias = "date", alias = "timestamp")]
    date: String,
    #[serde(alias = "Open", alias = "open")]
    open: Decimal,
    #[serde(alias = "High", alias = "high")]
    high: Decimal,
    #[serde(alias = "Low", alias = "low")]
    low: Decimal,
    #[serde(alias = "Close", alias = "close")]
    close: Decimal,
    #[serde(alias = "Volume", alias = "volume", default)]
    volume: Decimal,
}

#[derive(Debug, Deserialize)]
struct ContractRecord {
    expiration: String,
    #[serde(rename = "type")]
    kind: String,
    strike: Decimal,
    #[serde(default)]
    multiplier: Option<Decimal>,
}

impl CsvBarsGateway {
    pub fn new<P: AsRef<Path>>(data_directory: P) -> Self {
        Self {
            name: "CSV Gateway".to_string(),
            data_directory: data_directory.as_ref().to_path_buf(),
            bars_pattern: "{symbol}_day.csv".to_string(),
            options_pattern: "{symbol}_options.csv".to_string(),
        }
    }

    pub fn with_bars_pattern(mut self, pattern: &str) -> Self {
        self.bars_pattern = pattern.to_string();
        self
    }

    fn path_for(&self, pattern: &str, symbol: &Symbol) -> PathBuf {
        let filename = pattern
            .replace("{symbol}", &symbol.symbol)
            .replace("{exchange}", &symbol.exchange);
        self.data_directory.join(filename)
    }

    fn load_bars(&self, symbol: &Symbol) -> OlResult<Vec<DailyBar>> {
        let path = self.path_for(&self.bars_pattern, symbol);
        if !path.exists() {
            return Err(GatewayError::SymbolNotFound {
                symbol: symbol.symbol.clone(),
            }
            .into());
        }

        let file = std::fs::File::open(&path)?;
        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);

        let mut bars = Vec::new();
        for result in reader.deserialize() {
            let record: BarRecord = result.map_err(|e| GatewayError::ParseError {
                message: format!("{}: {}", path.display(), e),
            })?;
            bars.push(DailyBar::new(
                symbol.clone(),
                parse_date(&record.date)?,
                record.open,
                record.high,
                record.low,
                record.close,
                record.volume,
            ));
        }

        bars.sort_by_key(|b| b.date);
        debug!("Loaded {} bars for {} from {}", bars.len(), symbol, path.display());
        Ok(bars)
    }

    fn load_contracts(&self, symbol: &Symbol) -> OlResult<Vec<OptionContract>> {
        let path = self.path_for(&self.options_pattern, symbol);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = std::fs::File::open(&path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let mut contracts = Vec::new();
        for result in reader.deserialize() {
            let record: ContractRecord = result.map_err(|e| GatewayError::ParseError {
                message: format!("{}: {}", path.display(), e),
            })?;
            let kind = parse_kind(&record.kind)?;
            contracts.push(OptionContract::new(
                symbol.clone(),
                kind,
                record.strike,
                parse_date(&record.expiration)?,
                record.multiplier.unwrap_or(Decimal::ONE_HUNDRED),
            )?);
        }
        Ok(contracts)
    }
}

fn parse_date(raw: &str) -> OlResult<NaiveDate> {
    let raw = raw.trim();
    // Accept plain dates and timestamps that start with one.
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|e| {
        GatewayError::ParseError {
            message: format!("date {raw:?}: {e}"),
        }
        .into()
    })
}

fn parse_kind(raw: &str) -> OlResult<OptionKind> {
    match raw.to_ascii_lowercase().as_str() {
        "call" | "c" => Ok(OptionKind::Call),
        "put" | "p" => Ok(OptionKind::Put),
        other => Err(GatewayError::ParseError {
            message: format!("unknown option type {other:?}"),
        }
        .into()),
    }
}

impl MarketDataGateway for CsvBarsGateway {
    fn get_quote(&self, symbol: &Symbol) -> OlResult<Quote> {
        self.load_bars(symbol)?
            .last()
            .map(|b| Quote::at(symbol.clone(), b.close))
            .ok_or_else(|| {
                GatewayError::NoData {
                    symbol: symbol.symbol.clone(),
                    range: "any date".to_string(),
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
            .load_contracts(symbol)?
            .into_iter()
            .filter(|c| c.kind == kind && range.contains(c.expiration))
            .collect())
    }

    fn get_daily_bars(&self, symbol: &Symbol, range: DateRange) -> OlResult<Vec<DailyBar>> {
        Ok(self
            .load_bars(symbol)?
            .into_iter()
            .filter(|b| range.contains(b.date))
            .collect())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
