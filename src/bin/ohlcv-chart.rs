use std::{fs, path::PathBuf};

use clap::Parser;
use eyre::WrapErr;
use ohlcv_series::{
    analysis::{analyze_gaps, duplicate_times},
    indicators::{ALMA_OFFSET, ALMA_SIGMA},
    loader::{merge_bars, FileSource},
    series::ChartData,
    session::{regular_hours, SessionHours},
    MalformedRowPolicy, NormalizerConfig, TimeSeriesNormalizer,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Turn OHLCV CSV files into candlestick + volume chart data (JSON).
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// CSV files with timestamp,open,high,low,close,volume columns
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// UTC offset the timestamps are written in
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    utc_offset_hours: i32,

    /// Drop malformed rows instead of failing
    #[arg(long)]
    skip_malformed: bool,

    /// Keep only 09:30-15:55 bars (in the timestamps' offset)
    #[arg(long)]
    regular_hours: bool,

    /// Add an RSI line with this interval (14 is the usual choice)
    #[arg(long)]
    rsi: Option<usize>,

    /// Add an ALMA line over closes with this window (usually 20)
    #[arg(long)]
    alma: Option<usize>,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long)]
    pretty: bool,
}

/// Loads, normalizes and serializes; nothing is written unless this succeeds.
fn run(cli: &Cli) -> eyre::Result<String> {
    let policy = if cli.skip_malformed {
        MalformedRowPolicy::Skip
    } else {
        MalformedRowPolicy::Abort
    };
    let config = NormalizerConfig::default()
        .with_offset_hours(cli.utc_offset_hours)?
        .with_policy(policy);
    let offset = config.offset();
    let normalizer = TimeSeriesNormalizer::new(config);

    let sources = cli.files.iter().map(FileSource::new).collect::<Vec<_>>();
    let mut bars = merge_bars(&sources, &normalizer)?;

    if cli.regular_hours {
        bars = regular_hours(&bars, SessionHours::default(), offset);
    }

    let duplicates = duplicate_times(&bars);
    if !duplicates.is_empty() {
        warn!(count = duplicates.len(), first = duplicates[0], "duplicate bar times");
    }

    if let Some(report) = analyze_gaps(&bars) {
        info!(
            bars = bars.len(),
            interval = report.interval,
            gaps = report.gaps,
            missing = report.missing_bars,
            "loaded series"
        );
    }

    let mut data = ChartData::from_bars(&bars);
    if let Some(interval) = cli.rsi {
        data = data.with_rsi(&bars, interval);
    }
    if let Some(window) = cli.alma {
        data = data.with_alma(&bars, window, ALMA_OFFSET, ALMA_SIGMA);
    }

    let json = if cli.pretty {
        data.to_json_pretty()?
    } else {
        data.to_json()?
    };

    Ok(json)
}

fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ohlcv_series=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json = run(&cli)?;

    match &cli.output {
        Some(path) => {
            fs::write(path, json).wrap_err_with(|| format!("writing {}", path.display()))?
        }
        None => println!("{json}"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use ohlcv_series::series::ChartData;

    use super::{run, Cli};

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("ohlcv-chart").chain(args.iter().copied()))
    }

    #[test]
    fn unittest_run_sample() -> eyre::Result<()> {
        let json = run(&cli(&["./data/SPY_5min_sample.csv", "--regular-hours", "--rsi", "3"]))?;
        let data: ChartData = serde_json::from_str(&json)?;

        assert_eq!(data.candles.len(), 9);
        assert_eq!(data.volume.len(), 9);
        assert!(!data.rsi.is_empty());
        assert!(data.alma.is_empty());

        Ok(())
    }

    #[test]
    fn unittest_run_aborts_on_malformed_row() {
        let err = run(&cli(&["./data/SPY_5min_malformed.csv"])).unwrap_err();

        assert!(format!("{err:?}").contains("abc"));
    }

    #[test]
    fn unittest_run_skips_malformed_row_when_asked() -> eyre::Result<()> {
        let json = run(&cli(&[
            "./data/SPY_5min_malformed.csv",
            "--skip-malformed",
            "--utc-offset-hours",
            "-5",
        ]))?;
        let data: ChartData = serde_json::from_str(&json)?;

        assert_eq!(
            data.candles.iter().map(|c| c.time).collect::<Vec<_>>(),
            vec![1704206100, 1704206400]
        );

        Ok(())
    }
}
