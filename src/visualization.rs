//! Visualization module for plotting prices, crossover signals and equity curves.

use chrono::NaiveDate;
use finance_tools::PriceSeries;
use log::warn;
use plotters::prelude::*;
use std::ops::Range;
use std::path::Path;

use backtesting::TradeSide;

use crate::strategy::StrategyRun;

const ROYAL_BLUE: RGBColor = RGBColor(65, 105, 225);
const SMA_ORANGE: RGBColor = RGBColor(255, 165, 0);
const SMA_PURPLE: RGBColor = RGBColor(128, 0, 128);
const DARK_ORANGE: RGBColor = RGBColor(255, 140, 0);
const BUY_GREEN: RGBColor = RGBColor(0, 128, 0);

type ChartResult = Result<(), Box<dyn std::error::Error>>;

fn date_label(dates: &[NaiveDate], index: usize) -> String {
    dates
        .get(index)
        .map(|d| d.format("%b-%d").to_string())
        .unwrap_or_default()
}

/// Y range covering all values with a 5% margin.
fn value_range<I: IntoIterator<Item = f64>>(values: I) -> Range<f64> {
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }
    let margin = if max > min { (max - min) * 0.05 } else { min.abs().max(1.0) * 0.05 };
    (min - margin)..(max + margin)
}

/// Chart of the closing price over the evaluation period.
pub fn plot_price_chart<P: AsRef<Path>>(
    prices: &PriceSeries,
    symbol: &str,
    output_path: P,
) -> ChartResult {
    let (Some(start), Some(end)) = (prices.first_date(), prices.last_date()) else {
        warn!("No prices, skipping price chart");
        return Ok(());
    };

    let dates: Vec<NaiveDate> = prices.dates().collect();
    let closes = prices.closes();

    let root = BitMapBackend::new(output_path.as_ref(), (1200, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let caption = format!(
        "{} Price: {} - {}",
        symbol,
        start.format("%b %-d, %Y"),
        end.format("%Y-%m-%d")
    );
    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 24).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(0usize..closes.len(), value_range(closes.iter().copied()))?;

    let x_fmt = |i: &usize| date_label(&dates, *i);
    chart
        .configure_mesh()
        .light_line_style(WHITE.mix(0.0))
        .bold_line_style(BLACK.mix(0.1))
        .x_labels(10)
        .x_label_formatter(&x_fmt)
        .y_desc("Price (USD)")
        .draw()?;

    chart.draw_series(LineSeries::new(
        closes.iter().enumerate().map(|(i, p)| (i, *p)),
        ROYAL_BLUE.stroke_width(2),
    ))?;

    root.present()?;
    Ok(())
}

/// Price, both moving averages and BUY/SELL markers.
///
/// BUY transitions are drawn as green upward triangles and SELL transitions
/// as red downward triangles, both placed on the short average.
pub fn plot_trading_signals<P: AsRef<Path>>(
    prices: &PriceSeries,
    run: &StrategyRun,
    output_path: P,
) -> ChartResult {
    if prices.is_empty() {
        warn!("No prices, skipping signal chart");
        return Ok(());
    }

    let dates: Vec<NaiveDate> = prices.dates().collect();
    let closes = prices.closes();
    let short = run.short_ma().values();
    let long = run.long_ma().values();

    let root = BitMapBackend::new(output_path.as_ref(), (1200, 700)).into_drawing_area();
    root.fill(&WHITE)?;

    let caption = format!(
        "Trading Signals: {}/{} SMA Crossover",
        run.short_ma().window(),
        run.long_ma().window()
    );
    let y_range = value_range(closes.iter().chain(&short).chain(&long).copied());
    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 24).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(0usize..closes.len(), y_range)?;

    let x_fmt = |i: &usize| date_label(&dates, *i);
    chart
        .configure_mesh()
        .light_line_style(WHITE.mix(0.0))
        .bold_line_style(BLACK.mix(0.1))
        .x_labels(10)
        .x_label_formatter(&x_fmt)
        .y_desc("Price (USD)")
        .draw()?;

    chart
        .draw_series(LineSeries::new(
            closes.iter().enumerate().map(|(i, p)| (i, *p)),
            ROYAL_BLUE.stroke_width(2),
        ))?
        .label("Closing Price")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], ROYAL_BLUE));

    chart
        .draw_series(LineSeries::new(
            short.iter().enumerate().map(|(i, v)| (i, *v)),
            SMA_ORANGE.mix(0.8).stroke_width(2),
        ))?
        .label(format!("{}-Day SMA", run.short_ma().window()))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], SMA_ORANGE));

    chart
        .draw_series(LineSeries::new(
            long.iter().enumerate().map(|(i, v)| (i, *v)),
            SMA_PURPLE.mix(0.8).stroke_width(2),
        ))?
        .label(format!("{}-Day SMA", run.long_ma().window()))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], SMA_PURPLE));

    let marker_at = |side: TradeSide| {
        run.transitions()
            .iter()
            .filter(move |t| t.side == side)
            .filter_map(|t| short.get(t.index).map(|v| (t.index, *v)))
            .collect::<Vec<_>>()
    };

    chart
        .draw_series(
            marker_at(TradeSide::Buy)
                .into_iter()
                .map(|c| TriangleMarker::new(c, 8, BUY_GREEN.filled())),
        )?
        .label("Buy Signal")
        .legend(|(x, y)| TriangleMarker::new((x, y), 8, BUY_GREEN.filled()));

    chart
        .draw_series(marker_at(TradeSide::Sell).into_iter().map(|c| {
            EmptyElement::at(c) + Polygon::new(vec![(0, 8), (-7, -5), (7, -5)], RED.filled())
        }))?
        .label("Sell Signal")
        .legend(|(x, y)| {
            EmptyElement::at((x, y)) + Polygon::new(vec![(0, 8), (-7, -5), (7, -5)], RED.filled())
        });

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Buy-and-hold against the crossover strategy, with trade dates marked.
pub fn plot_performance_comparison<P: AsRef<Path>>(run: &StrategyRun, output_path: P) -> ChartResult {
    let result = run.result();
    if result.is_empty() {
        warn!("Empty backtest, skipping performance chart");
        return Ok(());
    }

    let dates: Vec<NaiveDate> = result.dates().collect();
    let strategy = result.strategy_values();
    let baseline = result.baseline_values();

    let root = BitMapBackend::new(output_path.as_ref(), (1200, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let y_range = value_range(strategy.iter().chain(&baseline).copied());
    let (y_low, y_high) = (y_range.start, y_range.end);
    let mut chart = ChartBuilder::on(&root)
        .caption("Strategy Performance Comparison", ("sans-serif", 24).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(80)
        .build_cartesian_2d(0usize..dates.len(), y_range)?;

    let x_fmt = |i: &usize| date_label(&dates, *i);
    chart
        .configure_mesh()
        .light_line_style(WHITE.mix(0.0))
        .bold_line_style(BLACK.mix(0.1))
        .x_labels(10)
        .x_label_formatter(&x_fmt)
        .y_desc("Portfolio Value (USD)")
        .draw()?;

    // Trade markers first so the curves stay on top
    for (side, color) in [(TradeSide::Buy, BUY_GREEN), (TradeSide::Sell, RED)] {
        chart.draw_series(
            run.transitions()
                .iter()
                .filter(|t| t.side == side)
                .map(|t| {
                    PathElement::new(
                        vec![(t.index, y_low), (t.index, y_high)],
                        color.mix(0.3).stroke_width(1),
                    )
                }),
        )?;
    }

    chart
        .draw_series(LineSeries::new(
            baseline.iter().enumerate().map(|(i, v)| (i, *v)),
            BLUE.mix(0.8).stroke_width(2),
        ))?
        .label("Buy and Hold")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

    chart
        .draw_series(LineSeries::new(
            strategy.iter().enumerate().map(|(i, v)| (i, *v)),
            DARK_ORANGE.mix(0.8).stroke_width(2),
        ))?
        .label("Crossover Strategy")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], DARK_ORANGE));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}
