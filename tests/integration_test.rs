//! End-to-end tests: price file -> crossover run -> reports

use backtesting::{
    calculate_metrics, detect_transitions, equity_returns, format_text_report, generate_signal,
    run_backtest, write_json_report, write_text_report, BacktestReport, SignalState, TradeSide,
};
use chrono::{NaiveDate, NaiveDateTime};
use crossover_study::*;
use finance_tools::{FinanceError, PriceSeries};
use indicators::rolling_mean;
use std::collections::BTreeMap;
use std::io::Write;
use tempfile::tempdir;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn prices(closes: &[f64]) -> PriceSeries {
    PriceSeries::from_closes(day(2025, 1, 1), closes)
}

fn wave(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 100.0 + (i as f64 / 6.0).sin() * 8.0 + i as f64 * 0.05)
        .collect()
}

fn run_time() -> NaiveDateTime {
    day(2025, 10, 16).and_hms_opt(12, 0, 0).unwrap()
}

#[test]
fn test_four_day_scenario() {
    let p = prices(&[100.0, 110.0, 100.0, 121.0]);
    let short = rolling_mean(&p, 1).unwrap();
    let long = rolling_mean(&p, 2).unwrap();

    assert_eq!(short.values(), p.closes());
    assert_eq!(long.values(), vec![100.0, 105.0, 105.0, 110.5]);

    let signal = generate_signal(&short, &long).unwrap();
    assert_eq!(
        signal.states(),
        vec![
            SignalState::Flat,
            SignalState::Long,
            SignalState::Flat,
            SignalState::Long
        ]
    );

    let transitions = detect_transitions(&signal);
    let found: Vec<(usize, TradeSide)> = transitions.iter().map(|t| (t.index, t.side)).collect();
    assert_eq!(
        found,
        vec![(1, TradeSide::Buy), (2, TradeSide::Sell), (3, TradeSide::Buy)]
    );

    let result = run_backtest(&p, &signal, 1000.0).unwrap();
    let expected_strategy = [1000.0, 1100.0, 1100.0, 1331.0];
    let expected_baseline = [1000.0, 1100.0, 1000.0, 1210.0];
    for (got, want) in result.strategy_values().iter().zip(expected_strategy) {
        assert!((got - want).abs() < 1e-9);
    }
    for (got, want) in result.baseline_values().iter().zip(expected_baseline) {
        assert!((got - want).abs() < 1e-9);
    }
}

#[test]
fn test_window_one_is_identity() {
    let p = prices(&wave(50));
    assert_eq!(rolling_mean(&p, 1).unwrap().values(), p.closes());
}

#[test]
fn test_rolling_mean_matches_definition() {
    let closes = wave(60);
    let p = prices(&closes);
    for window in [2, 7, 20, 100] {
        let ma = rolling_mean(&p, window).unwrap();
        assert_eq!(ma.len(), closes.len());
        for (i, value) in ma.values().iter().enumerate() {
            let lo = (i + 1).saturating_sub(window);
            let expected = closes[lo..=i].iter().sum::<f64>() / (i + 1 - lo) as f64;
            assert!((value - expected).abs() < 1e-9, "window {} day {}", window, i);
        }
    }
}

#[test]
fn test_constant_prices_never_trade() {
    let p = prices(&[250.0; 80]);
    let run = CrossoverStrategy::new(10, 40)
        .unwrap()
        .evaluate(&p, 10000.0)
        .unwrap();

    assert!(run.signal().states().iter().all(|s| *s == SignalState::Flat));
    assert!(run.transitions().is_empty());
    assert!((run.result().final_strategy_value() - 10000.0).abs() < 1e-9);
    assert!((run.result().final_baseline_value() - 10000.0).abs() < 1e-9);
}

#[test]
fn test_always_long_matches_buy_and_hold() {
    // Strictly rising closes keep the 1-day average above the 2-day one.
    let closes: Vec<f64> = (0..30).map(|i| 100.0 * 1.01_f64.powi(i)).collect();
    let run = CrossoverStrategy::new(1, 2)
        .unwrap()
        .evaluate(&prices(&closes), 5000.0)
        .unwrap();

    assert_eq!(run.signal().state(0), Some(SignalState::Flat));
    assert!(run.signal().states()[1..].iter().all(|s| *s == SignalState::Long));
    // Day 0 is a neutral return, so flat there costs nothing.
    for point in run.result().points() {
        assert!((point.strategy_value - point.baseline_value).abs() < 1e-6);
    }
}

#[test]
fn test_always_flat_keeps_initial_balance() {
    let closes: Vec<f64> = (0..30).map(|i| 100.0 * 0.99_f64.powi(i)).collect();
    let run = CrossoverStrategy::new(1, 5)
        .unwrap()
        .evaluate(&prices(&closes), 5000.0)
        .unwrap();

    assert!(run.signal().states().iter().all(|s| *s == SignalState::Flat));
    assert!(run
        .result()
        .strategy_values()
        .iter()
        .all(|v| (v - 5000.0).abs() < 1e-9));
    assert!(run.result().final_baseline_value() < 5000.0);
}

#[test]
fn test_transitions_never_at_first_day_and_alternate() {
    let run = CrossoverStrategy::new(3, 12)
        .unwrap()
        .evaluate(&prices(&wave(200)), 10000.0)
        .unwrap();

    assert!(!run.transitions().is_empty());
    assert!(run.transitions().iter().all(|t| t.index > 0));
    for pair in run.transitions().windows(2) {
        assert_ne!(pair[0].side, pair[1].side);
        assert!(pair[0].index < pair[1].index);
    }
    let summary = run.summary();
    assert_eq!(summary.total_trades, run.transitions().len());
    assert_eq!(summary.buy_signals + summary.sell_signals, summary.total_trades);
}

#[test]
fn test_invalid_parameters() {
    assert!(matches!(
        CrossoverStrategy::new(0, 5),
        Err(FinanceError::InvalidParameter(_))
    ));

    let strategy = CrossoverStrategy::new(2, 5).unwrap();
    let p = prices(&wave(20));
    for balance in [0.0, -100.0, f64::NAN] {
        assert!(matches!(
            strategy.evaluate(&p, balance),
            Err(FinanceError::InvalidParameter(_))
        ));
    }
}

#[test]
fn test_bad_close_reports_index() {
    let p = prices(&[100.0, 101.0, 0.0, 103.0]);
    let err = CrossoverStrategy::new(1, 2)
        .unwrap()
        .evaluate(&p, 1000.0)
        .unwrap_err();
    assert!(matches!(err, FinanceError::InvalidPriceData { index: 2, .. }));
}

#[test]
fn test_misaligned_series_rejected() {
    let short = rolling_mean(&prices(&wave(10)), 2).unwrap();
    let long = rolling_mean(&prices(&wave(11)), 4).unwrap();
    assert!(matches!(
        generate_signal(&short, &long),
        Err(FinanceError::MisalignedSeries { .. })
    ));

    let shifted = PriceSeries::from_closes(day(2025, 2, 1), &wave(10));
    let signal = generate_signal(&short, &rolling_mean(&prices(&wave(10)), 4).unwrap()).unwrap();
    assert!(matches!(
        run_backtest(&shifted, &signal, 1000.0),
        Err(FinanceError::MisalignedSeries { .. })
    ));
}

#[test]
fn test_empty_series_runs_and_skips_charts() {
    let dir = tempdir().unwrap();
    let run = CrossoverStrategy::new(10, 40)
        .unwrap()
        .evaluate(&PriceSeries::default(), 10000.0)
        .unwrap();

    assert!(run.result().is_empty());
    assert!(run.transitions().is_empty());
    assert_eq!(run.summary().strategy_final, 10000.0);

    let empty = PriceSeries::default();
    plot_price_chart(&empty, "BTCUSDT", dir.path().join("a.png")).unwrap();
    plot_trading_signals(&empty, &run, dir.path().join("b.png")).unwrap();
    plot_performance_comparison(&run, dir.path().join("c.png")).unwrap();
    assert!(!dir.path().join("a.png").exists());
    assert!(!dir.path().join("c.png").exists());
}

#[test]
fn test_charts_render_with_trades() {
    let dir = tempdir().unwrap();
    let p = prices(&wave(120));
    let run = CrossoverStrategy::new(10, 40)
        .unwrap()
        .evaluate(&p, 10000.0)
        .unwrap();

    let sides: Vec<TradeSide> = run.transitions().iter().map(|t| t.side).collect();
    assert!(sides.contains(&TradeSide::Buy));
    assert!(sides.contains(&TradeSide::Sell));

    let price_png = dir.path().join("01_price_chart.png");
    let signals_png = dir.path().join("02_trading_signals.png");
    let performance_png = dir.path().join("03_performance_comparison.png");

    plot_price_chart(&p, "BTCUSDT", &price_png).unwrap();
    plot_trading_signals(&p, &run, &signals_png).unwrap();
    plot_performance_comparison(&run, &performance_png).unwrap();

    for path in [&price_png, &signals_png, &performance_png] {
        let size = std::fs::metadata(path).unwrap().len();
        assert!(size > 0, "{} is empty", path.display());
    }
}

#[test]
fn test_file_to_reports_pipeline() {
    let dir = tempdir().unwrap();

    let data_path = dir.path().join("BTCUSDT.TXT");
    let mut file = std::fs::File::create(&data_path).unwrap();
    let start = day(2024, 12, 1);
    for (i, close) in wave(120).iter().enumerate() {
        let date = start + chrono::Duration::days(i as i64);
        writeln!(
            file,
            "{} {:.4} {:.4} {:.4} {:.4}",
            date.format("%Y%m%d"),
            close,
            close + 1.0,
            close - 1.0,
            close
        )
        .unwrap();
    }
    drop(file);

    let (period_start, period_end) = (day(2025, 1, 1), day(2025, 3, 15));
    let all = load_price_series(&data_path).unwrap();
    let p = select_date_range(&all, period_start, period_end);
    assert_eq!(p.first_date(), Some(period_start));
    assert_eq!(p.last_date(), Some(period_end));

    let run = CrossoverStrategy::new(5, 20)
        .unwrap()
        .evaluate(&p, 10000.0)
        .unwrap();
    let summary = run.summary();

    let layout = OutputLayout::new(dir.path(), "BTCUSDT", run_time());
    layout.create().unwrap();

    let text = format_text_report(&summary, period_start, period_end);
    assert!(text.contains("Evaluation Period: Jan 1, 2025 - Mar 15, 2025"));
    assert!(text.contains("Starting Capital: $10,000.00"));
    write_text_report(&text, layout.path("performance_report.txt")).unwrap();

    let metrics = |values: Vec<f64>| -> BTreeMap<String, f64> {
        calculate_metrics(&equity_returns(&values), 0.0)
            .into_iter()
            .collect()
    };
    let report = BacktestReport {
        symbol: "BTCUSDT",
        start_date: period_start,
        end_date: period_end,
        summary: &summary,
        strategy_metrics: metrics(run.result().strategy_values()),
        baseline_metrics: metrics(run.result().baseline_values()),
        short_ma: run.short_ma(),
        long_ma: run.long_ma(),
        signal: run.signal(),
        transitions: run.transitions(),
        result: run.result(),
    };
    write_json_report(&report, layout.path("backtest_results.json")).unwrap();

    assert!(layout.dir().ends_with("btcusdt_analysis_20251016_120000"));
    let saved_text = std::fs::read_to_string(layout.path("performance_report.txt")).unwrap();
    assert_eq!(saved_text, text);

    let json: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(layout.path("backtest_results.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(json["symbol"], "BTCUSDT");
    assert_eq!(
        json["summary"]["total_trades"].as_u64(),
        Some(run.transitions().len() as u64)
    );
    assert_eq!(
        json["result"]["points"].as_array().map(|a| a.len()),
        Some(p.len())
    );
    assert!(json["baseline_metrics"]["Max Drawdown"].is_number());
}

#[test]
fn test_config_file_drives_run() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("study.toml");
    std::fs::write(
        &config_path,
        "symbol = \"ETHUSDT\"\nshort_window = 2\nlong_window = 4\nstart_date = \"2025-01-01\"\nend_date = \"2025-01-20\"\ninitial_balance = 500.0\n",
    )
    .unwrap();

    let config = Config::from_file(&config_path).unwrap();
    config.validate().unwrap();

    let strategy = CrossoverStrategy::new(config.short_window, config.long_window).unwrap();
    let all = prices(&wave(40));
    let p = select_date_range(&all, config.start_date, config.end_date_or(day(2030, 1, 1)));
    assert_eq!(p.len(), 20);

    let run = strategy.evaluate(&p, config.initial_balance).unwrap();
    assert_eq!(run.short_ma().window(), 2);
    assert_eq!(run.result().initial_balance(), 500.0);
}
