//! Open position state and the trade ledger entries it produces.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A long holding. Exists only between a buy and the sell that closes it.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub shares: f64,
    /// Cash paid on entry.
    pub cost: f64,
}

impl Position {
    pub fn market_value(&self, price: f64) -> f64 {
        self.shares * price
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.market_value(price) - self.cost
    }

    /// Percent change of `price` against the entry price.
    pub fn unrealized_return_pct(&self, price: f64) -> f64 {
        (price - self.entry_price) / self.entry_price * 100.0
    }

    pub fn should_stop_loss(&self, price: f64, stop_loss_pct: f64) -> bool {
        if stop_loss_pct == 0.0 {
            return false;
        }
        self.unrealized_return_pct(price) <= -stop_loss_pct
    }

    pub fn should_take_profit(&self, price: f64, take_profit_pct: f64) -> bool {
        if take_profit_pct == 0.0 {
            return false;
        }
        self.unrealized_return_pct(price) >= take_profit_pct
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeAction {
    Buy,
    Sell,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRecord {
    pub date: NaiveDate,
    pub action: TradeAction,
    pub price: f64,
    pub quantity: f64,
    pub amount: f64,
    /// Realised profit, present on sells only.
    pub profit: Option<f64>,
    pub reason: String,
}

impl TradeRecord {
    pub fn is_sell(&self) -> bool {
        self.action == TradeAction::Sell
    }
}
