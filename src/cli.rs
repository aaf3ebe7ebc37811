//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::{CsvAdapter, write_prices};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::adapters::synthetic_adapter::SyntheticAdapter;
use crate::adapters::text_report_adapter::TextReportAdapter;
use crate::domain::allocation::{run_allocation, validate_weights};
use crate::domain::backtest::run_backtest_with;
use crate::domain::config_validation::{
    BacktestSettings, STRATEGY_SECTION, build_allocation, build_backtest_settings,
    build_strategy_config,
};
use crate::domain::error::QuantError;
use crate::domain::metrics::Metrics;
use crate::domain::price::PriceSeries;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::PriceSource;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "quantlab", about = "Signal-driven single-asset backtester")]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Json,
    Text,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Backtest the [strategy] section of a config file
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// CSV with date and close columns; defaults to <data_dir>/<code>.csv
        #[arg(long)]
        prices: Option<PathBuf>,
        #[arg(long)]
        code: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, value_enum, default_value = "json")]
        format: ReportFormat,
    },
    /// Run every [strategy.<id>] sleeve with its capital weight
    Compare {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        prices: Option<PathBuf>,
        #[arg(long)]
        code: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, value_enum, default_value = "json")]
        format: ReportFormat,
    },
    /// Validate strategy definitions without running them
    Validate {
        #[arg(short, long)]
        strategy: PathBuf,
    },
    /// Write a seeded synthetic price series as CSV
    Generate {
        #[arg(long, default_value = "SYNTH")]
        code: String,
        #[arg(long)]
        start: NaiveDate,
        #[arg(long, default_value_t = 250)]
        days: usize,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[arg(long, default_value_t = 100.0)]
        start_price: f64,
        #[arg(long, default_value_t = 0.02)]
        volatility: f64,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        drift: f64,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Backtest {
            config,
            prices,
            code,
            output,
            format,
        } => run_backtest(&config, prices.as_deref(), code.as_deref(), output.as_deref(), format),
        Command::Compare {
            config,
            prices,
            code,
            output,
            format,
        } => run_compare(&config, prices.as_deref(), code.as_deref(), output.as_deref(), format),
        Command::Validate { strategy } => run_validate(&strategy),
        Command::Generate {
            code,
            start,
            days,
            seed,
            start_price,
            volatility,
            drift,
            output,
        } => {
            let generator = SyntheticAdapter::new(seed)
                .with_start_price(start_price)
                .with_volatility(volatility)
                .with_drift(drift);
            run_generate(&generator, &code, start, days, output.as_deref())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, QuantError> {
    eprintln!("Loading config from {}", path.display());
    FileConfigAdapter::from_file(path)
}

/// Prices from `--prices` when given, otherwise `<data_dir>/<code>.csv`,
/// restricted to the configured date range.
pub fn load_prices(
    settings: &BacktestSettings,
    prices_path: Option<&Path>,
    code_override: Option<&str>,
) -> Result<(String, PriceSeries), QuantError> {
    let code = code_override
        .map(str::to_string)
        .or_else(|| settings.code.clone());

    let (code, source) = match (prices_path, code) {
        (Some(path), code) => {
            let code = code.unwrap_or_else(|| {
                path.file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default()
            });
            (code, CsvAdapter::from_file(path.to_path_buf()))
        }
        (None, Some(code)) => (code, CsvAdapter::new(settings.data_dir.clone())),
        (None, None) => {
            return Err(QuantError::ConfigMissing {
                section: "backtest".to_string(),
                key: "code".to_string(),
            });
        }
    };

    let series = source.fetch_prices(&code, settings.start_date, settings.end_date)?;
    Ok((code, series))
}

fn reporter(format: ReportFormat) -> Box<dyn ReportPort> {
    match format {
        ReportFormat::Json => Box::new(JsonReportAdapter),
        ReportFormat::Text => Box::new(TextReportAdapter),
    }
}

/// Run `emit` against the output file, or stdout when none is given.
fn with_output<F>(output: Option<&Path>, emit: F) -> Result<(), QuantError>
where
    F: FnOnce(&mut dyn Write) -> Result<(), QuantError>,
{
    match output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            emit(&mut writer)?;
            writer.flush()?;
            eprintln!("Report written to: {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            emit(&mut lock)?;
            lock.flush()?;
        }
    }
    Ok(())
}

fn print_summary(metrics: &Metrics) {
    eprintln!("Total Return:     {:.2}%", metrics.total_return_pct);
    eprintln!("Annualized:       {:.2}%", metrics.annual_return_pct);
    eprintln!("Benchmark:        {:.2}%", metrics.benchmark_return_pct);
    eprintln!("Sharpe Ratio:     {:.2}", metrics.sharpe_ratio);
    eprintln!("Max Drawdown:     {:.2}%", metrics.max_drawdown_pct);
    eprintln!("Total Trades:     {}", metrics.trade_count);
    eprintln!("Win Rate:         {:.1}%", metrics.win_rate_pct);
    if metrics.profit_factor.is_infinite() {
        eprintln!("Profit Factor:    inf");
    } else {
        eprintln!("Profit Factor:    {:.2}", metrics.profit_factor);
    }
}

fn run_backtest(
    config_path: &Path,
    prices_path: Option<&Path>,
    code_override: Option<&str>,
    output: Option<&Path>,
    format: ReportFormat,
) -> Result<(), QuantError> {
    let adapter = load_config(config_path)?;
    let settings = build_backtest_settings(&adapter)?;
    let strategy = build_strategy_config(&adapter, STRATEGY_SECTION)?;
    eprintln!("Loading strategy: {} [{}]", strategy.name, strategy.kind);

    let (code, prices) = load_prices(&settings, prices_path, code_override)?;
    eprintln!("Running backtest: {} on {}, {} bars", strategy.name, code, prices.len());

    let result = run_backtest_with(
        prices.points(),
        &strategy,
        settings.initial_capital,
        &settings.options,
    )?;

    eprintln!("\n=== Results ===");
    print_summary(&result.metrics);
    eprintln!();

    let report = reporter(format);
    with_output(output, |out| report.write(&result, &strategy, out))
}

fn run_compare(
    config_path: &Path,
    prices_path: Option<&Path>,
    code_override: Option<&str>,
    output: Option<&Path>,
    format: ReportFormat,
) -> Result<(), QuantError> {
    let adapter = load_config(config_path)?;
    let settings = build_backtest_settings(&adapter)?;
    let slots = build_allocation(&adapter)?;
    validate_weights(&slots)?;

    let (code, prices) = load_prices(&settings, prices_path, code_override)?;
    eprintln!("Comparing {} strategies on {}, {} bars", slots.len(), code, prices.len());

    let result = run_allocation(
        prices.points(),
        &slots,
        settings.initial_capital,
        &settings.options,
    )?;

    eprintln!("\n=== Per-Strategy Summary ===");
    for sleeve in &result.sleeves {
        let m = &sleeve.result.metrics;
        eprintln!(
            "  {} ({:.1}%):  {:.2}% return, {} trades, {:.1}% win rate, {:.2}% max drawdown",
            sleeve.strategy.name,
            sleeve.weight_pct,
            m.total_return_pct,
            m.trade_count,
            m.win_rate_pct,
            m.max_drawdown_pct,
        );
    }
    eprintln!("\n=== Combined ===");
    print_summary(&result.combined.metrics);
    eprintln!();

    let report = reporter(format);
    with_output(output, |out| report.write_allocation(&result, out))
}

fn run_validate(strategy_path: &Path) -> Result<(), QuantError> {
    eprintln!("Validating strategy: {}", strategy_path.display());
    let adapter = load_config(strategy_path)?;

    let has_single = adapter.sections().iter().any(|s| s == STRATEGY_SECTION);
    let has_sleeves = adapter
        .sections()
        .iter()
        .any(|s| s.starts_with("strategy."));

    if !has_single && !has_sleeves {
        return Err(QuantError::ConfigMissing {
            section: STRATEGY_SECTION.to_string(),
            key: "kind".to_string(),
        });
    }

    if has_single {
        let strategy = build_strategy_config(&adapter, STRATEGY_SECTION)?;
        eprintln!(
            "\n  {}: {} (needs at least {} bars)",
            strategy.name,
            strategy.kind,
            strategy.kind.minimum_bars()
        );
    }

    if has_sleeves {
        let slots = build_allocation(&adapter)?;
        for slot in &slots {
            eprintln!(
                "  {}: {} weight {:.1}% (needs at least {} bars)",
                slot.config.name,
                slot.config.kind,
                slot.weight_pct,
                slot.config.kind.minimum_bars()
            );
        }
        validate_weights(&slots)?;
    }

    eprintln!("\nStrategy configuration is valid.");
    Ok(())
}

fn run_generate(
    generator: &SyntheticAdapter,
    code: &str,
    start: NaiveDate,
    days: usize,
    output: Option<&Path>,
) -> Result<(), QuantError> {
    let series = generator.generate(start, days)?;

    match output {
        Some(path) => {
            let file = File::create(path)?;
            write_prices(BufWriter::new(file), series.points())?;
            eprintln!(
                "Generated {} prices for {} (seed {}) to {}",
                series.len(),
                code,
                generator.seed,
                path.display()
            );
        }
        None => {
            write_prices(io::stdout().lock(), series.points())?;
        }
    }
    Ok(())
}
