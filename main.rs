use anyhow::{bail, Result};
use backtesting::{
    calculate_metrics, equity_returns, format_text_report, write_json_report, write_text_report,
    BacktestReport,
};
use chrono::{Local, NaiveDate};
use crossover_study::*;
use data_streamer::{klines_to_series, BybitClient};
use finance_tools::PriceSeries;
use log::info;
use std::collections::BTreeMap;
use std::path::Path;

async fn fetch_prices(config: &Config, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries> {
    match &config.data_file {
        Some(path) => {
            info!("Loading prices from {}", path.display());
            let all = load_price_series(path)?;
            Ok(select_date_range(&all, start, end))
        }
        None => {
            info!(
                "Downloading {} {} daily prices {} to {}",
                config.category, config.symbol, start, end
            );
            let client = BybitClient::new();
            let klines = client
                .get_daily_klines(&config.category, &config.symbol, start, end)
                .await?;
            Ok(klines_to_series(&klines))
        }
    }
}

fn sorted_metrics(values: &[f64]) -> BTreeMap<String, f64> {
    calculate_metrics(&equity_returns(values), 0.0)
        .into_iter()
        .collect()
}

fn saved(path: &Path) {
    println!("Saved: {}", path.display());
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::load()?;
    config.validate()?;

    let run_time = Local::now().naive_local();
    let start_date = config.start_date;
    let end_date = config.end_date_or(run_time.date());

    let layout = OutputLayout::new(&config.output_root, &config.symbol, run_time);
    layout.create()?;

    let prices = fetch_prices(&config, start_date, end_date).await?;
    if prices.is_empty() {
        bail!(
            "No {} prices between {} and {}",
            config.symbol,
            start_date,
            end_date
        );
    }
    info!("Loaded {} daily closes", prices.len());

    let strategy = CrossoverStrategy::new(config.short_window, config.long_window)?;
    let run = strategy.evaluate(&prices, config.initial_balance)?;

    if config.no_charts {
        info!("Chart rendering disabled");
    } else {
        let path = layout.path("01_price_chart.png");
        plot_price_chart(&prices, &config.symbol, &path)
            .map_err(|e| anyhow::anyhow!("Price chart failed: {}", e))?;
        saved(&path);

        let path = layout.path("02_trading_signals.png");
        plot_trading_signals(&prices, &run, &path)
            .map_err(|e| anyhow::anyhow!("Signal chart failed: {}", e))?;
        saved(&path);

        let path = layout.path("03_performance_comparison.png");
        plot_performance_comparison(&run, &path)
            .map_err(|e| anyhow::anyhow!("Performance chart failed: {}", e))?;
        saved(&path);
    }

    let summary = run.summary();
    let text = format_text_report(&summary, start_date, end_date);
    println!("{}", text);

    let path = layout.path("performance_report.txt");
    write_text_report(&text, &path)?;
    saved(&path);

    let report = BacktestReport {
        symbol: &config.symbol,
        start_date,
        end_date,
        summary: &summary,
        strategy_metrics: sorted_metrics(&run.result().strategy_values()),
        baseline_metrics: sorted_metrics(&run.result().baseline_values()),
        short_ma: run.short_ma(),
        long_ma: run.long_ma(),
        signal: run.signal(),
        transitions: run.transitions(),
        result: run.result(),
    };
    let path = layout.path("backtest_results.json");
    write_json_report(&report, &path)?;
    saved(&path);

    println!(
        "\nAnalysis complete! All outputs saved to: {}",
        layout.dir().display()
    );
    Ok(())
}
