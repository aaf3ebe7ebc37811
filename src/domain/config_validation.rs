//! Turn INI sections into validated run settings and strategy configs.
//!
//! Every key is checked before any price data is loaded: malformed or
//! missing values surface as `ConfigMissing`/`ConfigInvalid` naming the
//! section and key; domain rules (period ordering, ranges) come back from
//! the strategy's own validation as `InvalidConfiguration`.

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::domain::allocation::AllocationSlot;
use crate::domain::backtest::{DEFAULT_RISK_FREE_RATE, EngineOptions};
use crate::domain::error::QuantError;
use crate::domain::execution::Sizing;
use crate::domain::indicator::WarmupPolicy;
use crate::domain::strategy::{StrategyConfig, StrategyKind};
use crate::ports::config_port::ConfigPort;

pub const BACKTEST_SECTION: &str = "backtest";
pub const STRATEGY_SECTION: &str = "strategy";
const SLEEVE_PREFIX: &str = "strategy.";

/// Settings from the `[backtest]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestSettings {
    pub initial_capital: f64,
    pub code: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub data_dir: PathBuf,
    pub options: EngineOptions,
}

impl BacktestSettings {
    /// Default CSV location for `code` under `data_dir`.
    pub fn price_file(&self, code: &str) -> PathBuf {
        self.data_dir.join(format!("{code}.csv"))
    }
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> QuantError {
    QuantError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn missing(section: &str, key: &str) -> QuantError {
    QuantError::ConfigMissing {
        section: section.to_string(),
        key: key.to_string(),
    }
}

fn read_f64(config: &dyn ConfigPort, section: &str, key: &str) -> Result<Option<f64>, QuantError> {
    config
        .get_double(section, key)
        .map_err(|e| invalid(section, key, e))
}

fn require_f64(config: &dyn ConfigPort, section: &str, key: &str) -> Result<f64, QuantError> {
    read_f64(config, section, key)?.ok_or_else(|| missing(section, key))
}

fn require_period(config: &dyn ConfigPort, section: &str, key: &str) -> Result<usize, QuantError> {
    read_period(config, section, key)?.ok_or_else(|| missing(section, key))
}

fn read_period(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<usize>, QuantError> {
    match config
        .get_int(section, key)
        .map_err(|e| invalid(section, key, e))?
    {
        None => Ok(None),
        Some(v) => usize::try_from(v)
            .map(Some)
            .map_err(|_| invalid(section, key, format!("{key} must be non-negative"))),
    }
}

fn read_date(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<NaiveDate>, QuantError> {
    config
        .get_string(section, key)
        .map(|s| {
            NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|_| {
                invalid(section, key, format!("invalid {key} format, expected YYYY-MM-DD"))
            })
        })
        .transpose()
}

pub fn build_backtest_settings(config: &dyn ConfigPort) -> Result<BacktestSettings, QuantError> {
    let section = BACKTEST_SECTION;

    let initial_capital = require_f64(config, section, "initial_capital")?;
    if !(initial_capital > 0.0) || !initial_capital.is_finite() {
        return Err(invalid(section, "initial_capital", "initial_capital must be positive"));
    }

    let risk_free_rate =
        read_f64(config, section, "risk_free_rate")?.unwrap_or(DEFAULT_RISK_FREE_RATE);
    if !(0.0..1.0).contains(&risk_free_rate) {
        return Err(invalid(section, "risk_free_rate", "risk_free_rate must be between 0 and 1"));
    }

    let start_date = read_date(config, section, "start_date")?;
    let end_date = read_date(config, section, "end_date")?;
    if let (Some(start), Some(end)) = (start_date, end_date) {
        if start > end {
            return Err(invalid(section, "start_date", "start_date must not be after end_date"));
        }
    }

    let sizing = match config.get_string(section, "sizing").as_deref() {
        None | Some("lots") => {
            let lot = read_period(config, section, "lot_size")?.unwrap_or(100);
            let lot = u32::try_from(lot)
                .ok()
                .filter(|l| *l > 0)
                .ok_or_else(|| invalid(section, "lot_size", "lot_size must be a positive integer"))?;
            Sizing::BoardLot(lot)
        }
        Some("fractional") => Sizing::Fractional,
        Some(other) => {
            return Err(invalid(
                section,
                "sizing",
                format!("unknown sizing '{other}', expected lots or fractional"),
            ));
        }
    };

    let warmup = match config.get_string(section, "warmup") {
        None => WarmupPolicy::default(),
        Some(s) => s
            .parse::<WarmupPolicy>()
            .map_err(|reason| invalid(section, "warmup", reason))?,
    };

    Ok(BacktestSettings {
        initial_capital,
        code: config.get_string(section, "code"),
        start_date,
        end_date,
        data_dir: config
            .get_string(section, "data_dir")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data")),
        options: EngineOptions {
            sizing,
            warmup,
            risk_free_rate,
        },
    })
}

fn build_kind(config: &dyn ConfigPort, section: &str) -> Result<StrategyKind, QuantError> {
    let kind = config
        .get_string(section, "kind")
        .ok_or_else(|| missing(section, "kind"))?;

    let kind = match kind.as_str() {
        "dual_moving_average" => StrategyKind::DualMovingAverage {
            short_period: read_period(config, section, "short_period")?.unwrap_or(5),
            long_period: read_period(config, section, "long_period")?.unwrap_or(20),
        },
        "momentum_breakout" => StrategyKind::MomentumBreakout {
            lookback: require_period(config, section, "lookback")?,
            threshold_pct: require_f64(config, section, "threshold")?,
        },
        "mean_reversion" => StrategyKind::MeanReversion {
            lookback: require_period(config, section, "lookback")?,
            threshold_pct: require_f64(config, section, "threshold")?,
        },
        "grid" => StrategyKind::Grid {
            grid_pct: require_f64(config, section, "grid_pct")?,
        },
        "rsi" => StrategyKind::Rsi {
            period: read_period(config, section, "period")?.unwrap_or(14),
            oversold: read_f64(config, section, "oversold")?.unwrap_or(30.0),
        },
        "macd" => StrategyKind::Macd {
            fast: read_period(config, section, "fast")?.unwrap_or(12),
            slow: read_period(config, section, "slow")?.unwrap_or(26),
            signal: read_period(config, section, "signal")?.unwrap_or(9),
        },
        other => {
            return Err(QuantError::invalid_config(
                "kind",
                format!(
                    "unknown strategy kind '{other}', expected one of: {}",
                    StrategyKind::NAMES.join(", ")
                ),
            ));
        }
    };
    Ok(kind)
}

/// Read one strategy from `section` and validate it.
pub fn build_strategy_config(
    config: &dyn ConfigPort,
    section: &str,
) -> Result<StrategyConfig, QuantError> {
    let kind = build_kind(config, section)?;
    let name = config
        .get_string(section, "name")
        .unwrap_or_else(|| section.strip_prefix(SLEEVE_PREFIX).unwrap_or(section).to_string());

    let strategy = StrategyConfig::new(name, kind)
        .with_position_size(read_f64(config, section, "position_size")?.unwrap_or(100.0))
        .with_stop_loss(read_f64(config, section, "stop_loss")?.unwrap_or(0.0))
        .with_take_profit(read_f64(config, section, "take_profit")?.unwrap_or(0.0));

    strategy.validate()?;
    Ok(strategy)
}

/// Every `[strategy.<id>]` section with its `weight`, in section order.
pub fn build_allocation(config: &dyn ConfigPort) -> Result<Vec<AllocationSlot>, QuantError> {
    let sleeves: Vec<String> = config
        .sections()
        .into_iter()
        .filter(|s| s.starts_with(SLEEVE_PREFIX))
        .collect();

    if sleeves.is_empty() {
        return Err(missing("strategy.<id>", "kind"));
    }

    sleeves
        .iter()
        .map(|section| {
            Ok(AllocationSlot {
                config: build_strategy_config(config, section)?,
                weight_pct: require_f64(config, section, "weight")?,
            })
        })
        .collect()
}
