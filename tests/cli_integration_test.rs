//! CLI integration tests: config loading, price resolution and each
//! subcommand run against real files on disk.

mod common;

use clap::Parser;
use common::*;
use quantlab::adapters::csv_adapter::{read_prices, write_prices};
use quantlab::adapters::file_config_adapter::FileConfigAdapter;
use quantlab::adapters::synthetic_adapter::SyntheticAdapter;
use quantlab::cli::{self, Cli, Command, ReportFormat};
use quantlab::domain::config_validation::{
    STRATEGY_SECTION, build_allocation, build_backtest_settings, build_strategy_config,
};
use quantlab::domain::strategy::StrategyKind;
use quantlab::QuantError;
use std::fs::{self, File};
use std::path::Path;
use std::process::ExitCode;
use tempfile::TempDir;

const SINGLE_INI: &str = r#"
[backtest]
initial_capital = 100000
code = WAVE

[strategy]
name = Trend
kind = dual_moving_average
short_period = 5
long_period = 20
stop_loss = 8
"#;

const SLEEVES_INI: &str = r#"
[backtest]
initial_capital = 1000000
sizing = fractional

[strategy.trend]
kind = dual_moving_average
weight = 50

[strategy.grid]
kind = grid
grid_pct = 3
weight = 30

[strategy.macd]
kind = macd
weight = 20
"#;

fn write_csv(dir: &Path, name: &str, points: &[PricePoint]) -> std::path::PathBuf {
    let path = dir.join(name);
    write_prices(File::create(&path).unwrap(), points).unwrap();
    path
}

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("quantlab").chain(args.iter().copied())).unwrap()
}

mod config_loading {
    use super::*;

    #[test]
    fn single_strategy_from_file() {
        let ini = write_temp_file(SINGLE_INI);
        let adapter = cli::load_config(ini.path()).unwrap();

        let settings = build_backtest_settings(&adapter).unwrap();
        assert_eq!(settings.initial_capital, 100_000.0);
        assert_eq!(settings.code.as_deref(), Some("WAVE"));
        assert_eq!(settings.price_file("WAVE"), Path::new("data").join("WAVE.csv"));

        let strategy = build_strategy_config(&adapter, STRATEGY_SECTION).unwrap();
        assert_eq!(strategy.name, "Trend");
        assert_eq!(strategy.stop_loss_pct, 8.0);
        assert!(matches!(
            strategy.kind,
            StrategyKind::DualMovingAverage {
                short_period: 5,
                long_period: 20
            }
        ));
    }

    #[test]
    fn sleeves_in_section_order() {
        let adapter = FileConfigAdapter::from_string(SLEEVES_INI).unwrap();
        let slots = build_allocation(&adapter).unwrap();

        let names: Vec<&str> = slots.iter().map(|s| s.config.name.as_str()).collect();
        assert_eq!(names, ["grid", "macd", "trend"]);
        let total: f64 = slots.iter().map(|s| s.weight_pct).sum();
        assert_eq!(total, 100.0);
    }

    #[test]
    fn missing_config_file_is_parse_error() {
        let err = cli::load_config(Path::new("/nonexistent/quantlab.ini")).unwrap_err();
        assert!(matches!(err, QuantError::ConfigParse { .. }));
    }
}

mod price_loading {
    use super::*;

    #[test]
    fn explicit_prices_path_wins() {
        let dir = TempDir::new().unwrap();
        let csv = write_csv(dir.path(), "anything.csv", &wave(60));
        let adapter = FileConfigAdapter::from_string(SINGLE_INI).unwrap();
        let settings = build_backtest_settings(&adapter).unwrap();

        let (code, series) = cli::load_prices(&settings, Some(&csv), None).unwrap();
        assert_eq!(code, "WAVE");
        assert_eq!(series.len(), 60);
    }

    #[test]
    fn code_resolves_under_data_dir() {
        let dir = TempDir::new().unwrap();
        write_csv(dir.path(), "ABC.csv", &wave(90));
        let ini = format!(
            "[backtest]\ninitial_capital = 5000\ndata_dir = {}\nstart_date = 2024-01-15\nend_date = 2024-02-14\n",
            dir.path().display()
        );
        let adapter = FileConfigAdapter::from_string(&ini).unwrap();
        let settings = build_backtest_settings(&adapter).unwrap();

        let (code, series) = cli::load_prices(&settings, None, Some("ABC")).unwrap();
        assert_eq!(code, "ABC");
        assert_eq!(series.len(), 31);
        assert_eq!(series.first().unwrap().date, date(2024, 1, 15));
    }

    #[test]
    fn no_code_and_no_path_is_missing_key() {
        let adapter = FileConfigAdapter::from_string("[backtest]\ninitial_capital = 1\n").unwrap();
        let settings = build_backtest_settings(&adapter).unwrap();
        let err = cli::load_prices(&settings, None, None).unwrap_err();
        assert!(matches!(err, QuantError::ConfigMissing { ref key, .. } if key == "code"));
    }

    #[test]
    fn missing_csv_is_data_source_error() {
        let dir = TempDir::new().unwrap();
        let adapter = FileConfigAdapter::from_string(SINGLE_INI).unwrap();
        let settings = build_backtest_settings(&adapter).unwrap();
        let err =
            cli::load_prices(&settings, Some(&dir.path().join("absent.csv")), None).unwrap_err();
        assert!(matches!(err, QuantError::DataSource { .. }));
    }
}

mod commands {
    use super::*;

    #[test]
    fn backtest_writes_json_report() {
        let dir = TempDir::new().unwrap();
        let csv = write_csv(dir.path(), "WAVE.csv", &wave(150));
        let ini = write_temp_file(SINGLE_INI);
        let out = dir.path().join("report.json");

        let code = cli::run(parse(&[
            "backtest",
            "--config",
            ini.path().to_str().unwrap(),
            "--prices",
            csv.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
        ]));
        assert_eq!(code, ExitCode::SUCCESS);

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(json["strategy"]["name"], "Trend");
        assert_eq!(json["equityCurve"].as_array().unwrap().len(), 150);
        assert_eq!(
            json["metrics"]["tradeCount"].as_u64().unwrap() as usize,
            json["trades"].as_array().unwrap().len()
        );
    }

    #[test]
    fn backtest_text_format() {
        let dir = TempDir::new().unwrap();
        let csv = write_csv(dir.path(), "WAVE.csv", &wave(150));
        let ini = write_temp_file(SINGLE_INI);
        let out = dir.path().join("report.txt");

        let code = cli::run(parse(&[
            "backtest",
            "-c",
            ini.path().to_str().unwrap(),
            "--prices",
            csv.to_str().unwrap(),
            "--format",
            "text",
            "-o",
            out.to_str().unwrap(),
        ]));
        assert_eq!(code, ExitCode::SUCCESS);

        let text = fs::read_to_string(&out).unwrap();
        assert!(text.starts_with("=== Trend [DMA(5,20)] ==="));
        assert!(text.contains("Monthly Returns"));
    }

    #[test]
    fn backtest_too_few_bars_fails() {
        let dir = TempDir::new().unwrap();
        let csv = write_csv(dir.path(), "WAVE.csv", &wave(10));
        let ini = write_temp_file(SINGLE_INI);
        let out = dir.path().join("report.json");

        let code = cli::run(parse(&[
            "backtest",
            "-c",
            ini.path().to_str().unwrap(),
            "--prices",
            csv.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
        ]));
        assert_eq!(code, ExitCode::from(5));
        assert!(!out.exists());
    }

    #[test]
    fn compare_writes_allocation_report() {
        let dir = TempDir::new().unwrap();
        let csv = write_csv(dir.path(), "WAVE.csv", &wave(150));
        let ini = write_temp_file(SLEEVES_INI);
        let out = dir.path().join("compare.json");

        let code = cli::run(parse(&[
            "compare",
            "-c",
            ini.path().to_str().unwrap(),
            "--prices",
            csv.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
        ]));
        assert_eq!(code, ExitCode::SUCCESS);

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        let sleeves = json["sleeves"].as_array().unwrap();
        assert_eq!(sleeves.len(), 3);
        assert_eq!(sleeves[0]["weightPct"], 30.0);
        assert_eq!(sleeves[0]["capital"], 300_000.0);
        assert_eq!(json["combined"]["equityCurve"].as_array().unwrap().len(), 150);
    }

    #[test]
    fn validate_accepts_good_and_rejects_bad() {
        let good = write_temp_file(SINGLE_INI);
        let code = cli::run(parse(&["validate", "--strategy", good.path().to_str().unwrap()]));
        assert_eq!(code, ExitCode::SUCCESS);

        let sleeves = write_temp_file(SLEEVES_INI);
        let code = cli::run(parse(&["validate", "-s", sleeves.path().to_str().unwrap()]));
        assert_eq!(code, ExitCode::SUCCESS);

        let bad = write_temp_file("[strategy]\nkind = dual_moving_average\nshort_period = 30\n");
        let code = cli::run(parse(&["validate", "-s", bad.path().to_str().unwrap()]));
        assert_eq!(code, ExitCode::from(4));

        let unweighted = write_temp_file("[strategy.a]\nkind = grid\ngrid_pct = 2\nweight = 40\n");
        let code = cli::run(parse(&["validate", "-s", unweighted.path().to_str().unwrap()]));
        assert_eq!(code, ExitCode::from(4));
    }

    #[test]
    fn validate_without_strategy_section_fails() {
        let ini = write_temp_file("[backtest]\ninitial_capital = 1000\n");
        let code = cli::run(parse(&["validate", "-s", ini.path().to_str().unwrap()]));
        assert_eq!(code, ExitCode::from(2));
    }

    #[test]
    fn generate_round_trips_through_csv() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("synth.csv");

        let code = cli::run(parse(&[
            "generate",
            "--start",
            "2025-01-06",
            "--days",
            "40",
            "--seed",
            "7",
            "--drift",
            "-0.001",
            "-o",
            out.to_str().unwrap(),
        ]));
        assert_eq!(code, ExitCode::SUCCESS);

        let read = read_prices(File::open(&out).unwrap(), &out).unwrap();
        let expected = SyntheticAdapter::new(7)
            .with_drift(-0.001)
            .generate(date(2025, 1, 6), 40)
            .unwrap();
        assert_eq!(read.as_slice(), expected.points());
    }

    #[test]
    fn generate_rejects_bad_volatility() {
        let cli = parse(&["generate", "--start", "2025-01-06", "--volatility", "1.5"]);
        assert!(matches!(cli.command, Command::Generate { .. }));
        assert_eq!(cli::run(cli), ExitCode::from(4));
    }

    #[test]
    fn generate_rejects_drift_that_would_go_negative() {
        let cli = parse(&[
            "generate",
            "--start",
            "2025-01-06",
            "--drift",
            "-0.9",
            "--volatility",
            "0.5",
        ]);
        assert_eq!(cli::run(cli), ExitCode::from(4));
    }

    #[test]
    fn format_flag_parses() {
        let cli = parse(&["backtest", "-c", "x.ini", "--format", "text"]);
        match cli.command {
            Command::Backtest { format, .. } => assert_eq!(format, ReportFormat::Text),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
