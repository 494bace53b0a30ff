use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::Parser;
use data_streamer::BybitClient;
use log::info;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "download_historical")]
#[command(about = "Download daily price history for one symbol from Bybit", long_about = None)]
struct Args {
    /// Symbol to download, e.g. BTCUSDT
    #[arg(short, long, default_value = "BTCUSDT")]
    symbol: String,

    /// Market category: spot or linear
    #[arg(short, long, default_value = "spot")]
    category: String,

    /// First day of the range (YYYY-MM-DD)
    #[arg(long, default_value = "2025-01-01")]
    start_date: NaiveDate,

    /// Last day of the range, inclusive (YYYY-MM-DD, default: today)
    #[arg(long)]
    end_date: Option<NaiveDate>,

    /// Directory the <SYMBOL>.TXT file is written to
    #[arg(short, long, default_value = "historical_data/daily")]
    output_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let end_date = args.end_date.unwrap_or_else(|| Utc::now().date_naive());

    println!("=== Bybit Daily History Downloader ===");
    println!(
        "Symbol: {} ({}) | Range: {} .. {}",
        args.symbol, args.category, args.start_date, end_date
    );

    let client = BybitClient::new();
    let klines = client
        .get_daily_klines(&args.category, &args.symbol, args.start_date, end_date)
        .await
        .with_context(|| format!("Failed to download {}", args.symbol))?;

    fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("Cannot create {}", args.output_dir.display()))?;

    let file_path = args.output_dir.join(format!("{}.TXT", args.symbol));
    let mut file = File::create(&file_path)
        .with_context(|| format!("Cannot create {}", file_path.display()))?;

    for line in klines.iter().filter_map(|k| k.to_line()) {
        writeln!(file, "{}", line)?;
    }

    info!("Saved: {}", file_path.display());
    println!(" ✓ {} bars written to {}", klines.len(), file_path.display());

    Ok(())
}
