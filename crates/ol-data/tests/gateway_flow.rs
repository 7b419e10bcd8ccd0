use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use ol_data::{
    analyze_chain, scenario_report_for, CsvBarsGateway, MarketDataGateway, ScanMode,
    ScenarioRequest, VolatilityScanner,
};
use ol_options::{PnlUnits, PremiumBasis, PremiumHeuristic, Strategy};
use ol_types::config::AnalyticsConfig;
use ol_types::{OlError, Symbol};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
}

/// 90 days of bars ending today; the last 30 swing four times as hard.
fn write_bars(dir: &Path, ticker: &str, base: f64) {
    let mut csv = String::from("Date,Open,High,Low,Close,Volume\n");
    for i in 0..90i64 {
        let date = today() - Duration::days(89 - i);
        let amp = if i < 60 { 1.0 } else { 4.0 };
        let close = if i % 2 == 0 { base + amp } else { base - amp };
        writeln!(csv, "{date},{close},{},{},{close},10000", close + 1.0, close - 1.0).unwrap();
    }
    fs::write(dir.join(format!("{ticker}_day.csv")), csv).unwrap();
}

fn write_options(dir: &Path, ticker: &str, strikes: &[u32]) {
    let near = today() + Duration::days(18);
    let far = today() + Duration::days(95);
    let mut csv = String::from("expiration,type,strike\n");
    for exp in [near, far] {
        for strike in strikes {
            writeln!(csv, "{exp},call,{strike}").unwrap();
            writeln!(csv, "{exp},put,{strike}").unwrap();
        }
    }
    fs::write(dir.join(format!("{ticker}_options.csv")), csv).unwrap();
}

fn fixture_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_bars(dir.path(), "AAPL", 150.0);
    write_options(dir.path(), "AAPL", &[135, 140, 145, 150, 155, 160, 165]);
    write_bars(dir.path(), "XYZ", 60.0);
    dir
}

#[test]
fn chain_analysis_from_csv() {
    let dir = fixture_dir();
    let gw = CsvBarsGateway::new(dir.path());
    let aapl = Symbol::equity("AAPL");

    // Quote is the last close: i = 89 is odd, so base - 4.
    assert_eq!(gw.get_price(&aapl).unwrap(), dec!(146));

    let analysis = analyze_chain(&gw, &aapl, today(), 45, &AnalyticsConfig::default()).unwrap();
    assert_eq!(analysis.expirations, vec![today() + Duration::days(18)]);
    let vol = analysis.volatility.expect("90 closes cover a 30-return window");
    assert!(vol.recent_vol > vol.full_vol);
    assert_eq!(vol.rank, 100.0);
    assert_eq!(analysis.atm_call.unwrap().strike, dec!(145));
    assert_eq!(analysis.call_rows.len(), 7);
}

#[test]
fn estimated_scenario_report_from_csv() {
    let dir = fixture_dir();
    let gw = CsvBarsGateway::new(dir.path());
    let aapl = Symbol::equity("AAPL");
    let request = ScenarioRequest::new(aapl, Strategy::ProtectivePut, today(), 45);
    let report = scenario_report_for(&gw, &request, &PremiumHeuristic::protective_put()).unwrap();

    assert_eq!(report.premium_basis, PremiumBasis::Estimated);
    assert_eq!(report.units, PnlUnits::PerContract);
    assert_eq!(report.contract.strike, dec!(145));
    assert!(report.premium > Decimal::ZERO);
    assert_eq!(report.breakeven, dec!(146) + report.premium);

    // Loss is capped below the strike.
    let worst = report.worst().unwrap();
    let floor = (dec!(145) - dec!(146) - report.premium) * dec!(100);
    assert_eq!(worst.profit_loss, floor);

    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("ProtectivePut"));
}

#[test]
fn scanner_over_csv_reports_every_symbol() {
    let dir = fixture_dir();
    let gw = CsvBarsGateway::new(dir.path());
    let symbols = vec![Symbol::equity("AAPL"), Symbol::equity("XYZ"), Symbol::equity("MISSING")];

    let scanner = VolatilityScanner::from_config(&AnalyticsConfig::default());
    let outcome = scanner.scan(&gw, &symbols, ScanMode::HighRank, today());

    assert_eq!(outcome.hits.len(), 1);
    assert_eq!(outcome.hits[0].symbol.symbol, "AAPL");
    // XYZ has history but no listed options.
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].symbol.symbol, "XYZ");
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].symbol.symbol, "MISSING");
}

#[test]
fn gateway_errors_propagate() {
    let dir = fixture_dir();
    let gw = CsvBarsGateway::new(dir.path());
    let request = ScenarioRequest::new(Symbol::equity("NOPE"), Strategy::LongCall, today(), 45);
    let err = scenario_report_for(&gw, &request, &PremiumHeuristic::default()).unwrap_err();
    assert!(matches!(err, OlError::Gateway(_)));
}
