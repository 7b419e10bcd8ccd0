//! Walk through the analytics on an in-memory fixture.
//!
//! Run with `RUST_LOG=debug` to see the estimator and report-builder logs.

use chrono::{Duration, Local};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

use ol_data::*;
use ol_options::*;
use ol_types::config::AnalyticsConfig;
use ol_types::Symbol;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AnalyticsConfig::default().with_env_overrides()?;
    let today = Local::now().date_naive();

    let aapl = Symbol::equity("AAPL");
    let closes: Vec<Decimal> = (0..120)
        .map(|i| {
            let swing = if i < 90 { 1 } else { 5 };
            let sign = if i % 2 == 0 { 1 } else { -1 };
            Decimal::from(185 + sign * swing)
        })
        .collect();
    let mut contracts = Vec::new();
    for days in [17, 45] {
        let exp = today + Duration::days(days);
        for strike in (160..=210).step_by(5) {
            for kind in [OptionKind::Call, OptionKind::Put] {
                let strike = Decimal::from(strike);
                contracts.push(OptionContract::equity(aapl.clone(), kind, strike, exp)?);
            }
        }
    }
    let gateway = InMemoryGateway::new()
        .with_quote(&aapl, Decimal::new(18725, 2))
        .with_closes(&aapl, today, &closes)
        .with_contracts(&aapl, contracts.clone());

    println!("OptionLens walkthrough ({})", gateway.name());

    let analysis = analyze_chain(&gateway, &aapl, today, 30, &config)?;
    println!("\n{} spot {}", analysis.symbol, analysis.spot);
    match (&analysis.volatility, &analysis.regime) {
        (Some(vol), Some(regime)) => {
            println!("Vol rank {} -> {} ({:?})", vol, regime, regime.stance())
        }
        _ => println!(
            "Vol rank unavailable: {}",
            analysis.volatility_error.as_deref().unwrap_or("unknown")
        ),
    }
    for row in &analysis.call_rows {
        println!(
            "  {:>8} {}  {}",
            row.contract.strike,
            row.reading.moneyness.short_label(),
            row.reading.distance
        );
    }

    for strategy in [Strategy::LongCall, Strategy::CoveredCall, Strategy::ProtectivePut] {
        let request = ScenarioRequest::new(aapl.clone(), strategy, today, 30);
        let heuristic = match strategy {
            Strategy::CoveredCall => PremiumHeuristic::covered_call(),
            Strategy::ProtectivePut => PremiumHeuristic::protective_put(),
            _ => PremiumHeuristic::from(&config.premium),
        };
        let report = scenario_report_for(&gateway, &request, &heuristic)?;
        println!(
            "\n{} {}: premium {} ({}), breakeven {}",
            report.strategy, report.contract, report.premium, report.premium_basis, report.breakeven
        );
        for r in &report.results {
            println!(
                "  {:<10} {:>9} {:>10} ({:?})",
                r.scenario.label, r.scenario.underlying_price, r.profit_loss, report.units
            );
        }
    }

    let income = covered_call_candidates(
        &contracts,
        analysis.spot,
        today,
        &PremiumHeuristic::covered_call(),
    )?;
    println!("\nCovered call candidates:");
    for c in income.iter().take(3) {
        println!(
            "  {} {}d  ${} premium, {:.1}% annualized",
            c.contract.strike,
            c.days_to_expiration,
            c.premium_per_contract,
            c.annualized_return_pct
        );
    }

    let scanner = VolatilityScanner::from_config(&config);
    let outcome = scanner.scan(&gateway, &[aapl], ScanMode::HighRank, today);
    println!("\nScan: {}", serde_json::to_string_pretty(&outcome)?);

    Ok(())
}
