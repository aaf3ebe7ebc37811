//! Trade execution at the bar close.
//!
//! Long-only, full-or-none: an entry commits `position_size_pct` of cash and
//! an exit sells every share. No commission or slippage is modelled.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::account::Account;
use super::error::QuantError;
use super::position::{Position, TradeAction, TradeRecord};

/// How an allocation is turned into a share count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sizing {
    /// Whole lots of the given number of shares, rounded down.
    BoardLot(u32),
    /// Any fractional quantity; the full allocation is spent.
    Fractional,
}

impl Default for Sizing {
    fn default() -> Self {
        Sizing::BoardLot(100)
    }
}

impl Sizing {
    pub fn validate(&self) -> Result<(), QuantError> {
        match self {
            Sizing::BoardLot(0) => Err(QuantError::invalid_config(
                "lot_size",
                "lot_size must be at least 1",
            )),
            _ => Ok(()),
        }
    }

    /// Shares bought with `allocation` at `price`, or `None` if not even one
    /// lot is affordable.
    pub fn quantity(&self, allocation: f64, price: f64) -> Option<f64> {
        match *self {
            Sizing::BoardLot(lot) => {
                let lot = f64::from(lot);
                let lots = (allocation / price / lot).floor();
                (lots >= 1.0).then_some(lots * lot)
            }
            Sizing::Fractional => {
                let shares = allocation / price;
                (shares > 0.0).then_some(shares)
            }
        }
    }
}

/// Result of an entry attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryResult {
    Entered { quantity: f64, amount: f64 },
    InsufficientCapital,
}

/// Open a long position with `position_size_pct` of the account's cash.
pub fn enter_long(
    account: &mut Account,
    date: NaiveDate,
    price: f64,
    position_size_pct: f64,
    sizing: Sizing,
    reason: &str,
) -> EntryResult {
    let allocation = account.cash * position_size_pct / 100.0;
    let Some(quantity) = sizing.quantity(allocation, price) else {
        return EntryResult::InsufficientCapital;
    };

    let amount = match sizing {
        Sizing::Fractional => allocation,
        Sizing::BoardLot(_) => quantity * price,
    };
    if amount > account.cash {
        return EntryResult::InsufficientCapital;
    }

    account.cash -= amount;
    account.position = Some(Position {
        entry_date: date,
        entry_price: price,
        shares: quantity,
        cost: amount,
    });
    account.record_trade(TradeRecord {
        date,
        action: TradeAction::Buy,
        price,
        quantity,
        amount,
        profit: None,
        reason: reason.to_string(),
    });

    debug!(%date, price, quantity, amount, reason, "opened long");

    EntryResult::Entered { quantity, amount }
}

/// Close the open position at `price`. Returns the realised profit, or
/// `None` if the account was flat.
pub fn exit_long(account: &mut Account, date: NaiveDate, price: f64, reason: &str) -> Option<f64> {
    let position = account.position.take()?;
    let amount = position.market_value(price);
    let profit = amount - position.cost;

    account.cash += amount;
    account.record_trade(TradeRecord {
        date,
        action: TradeAction::Sell,
        price,
        quantity: position.shares,
        amount,
        profit: Some(profit),
        reason: reason.to_string(),
    });

    debug!(%date, price, quantity = position.shares, profit, reason, "closed long");

    Some(profit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn board_lot_rounds_down_to_whole_lots() {
        let sizing = Sizing::BoardLot(100);
        assert_eq!(sizing.quantity(10_000.0, 33.0), Some(300.0));
        assert_eq!(sizing.quantity(10_000.0, 100.0), Some(100.0));
        assert_eq!(sizing.quantity(10_000.0, 101.0), None);
    }

    #[test]
    fn fractional_spends_whole_allocation() {
        let sizing = Sizing::Fractional;
        let q = sizing.quantity(1_000.0, 40.0).unwrap();
        assert!((q - 25.0).abs() < 1e-12);
        assert_eq!(sizing.quantity(0.0, 40.0), None);
    }

    #[test]
    fn zero_lot_size_is_invalid() {
        assert!(Sizing::BoardLot(0).validate().is_err());
        assert!(Sizing::BoardLot(1).validate().is_ok());
        assert!(Sizing::Fractional.validate().is_ok());
    }

    #[test]
    fn default_sizing_is_hundred_share_lots() {
        assert_eq!(Sizing::default(), Sizing::BoardLot(100));
    }

    #[test]
    fn enter_long_deducts_cash_and_records_buy() {
        let mut account = Account::new(10_000.0);
        let result = enter_long(&mut account, date(2), 33.0, 100.0, Sizing::BoardLot(100), "golden cross");

        assert_eq!(
            result,
            EntryResult::Entered {
                quantity: 300.0,
                amount: 9_900.0
            }
        );
        assert!((account.cash - 100.0).abs() < 1e-9);
        let pos = account.position.as_ref().unwrap();
        assert_eq!(pos.shares, 300.0);
        assert_eq!(pos.entry_price, 33.0);
        assert_eq!(account.trades.len(), 1);
        assert_eq!(account.trades[0].action, TradeAction::Buy);
        assert_eq!(account.trades[0].profit, None);
    }

    #[test]
    fn enter_long_respects_position_size() {
        let mut account = Account::new(10_000.0);
        enter_long(&mut account, date(2), 10.0, 50.0, Sizing::BoardLot(100), "x");
        assert!((account.cash - 5_000.0).abs() < 1e-9);
        assert_eq!(account.position.as_ref().unwrap().shares, 500.0);
    }

    #[test]
    fn enter_long_insufficient_for_one_lot() {
        let mut account = Account::new(5_000.0);
        let result = enter_long(&mut account, date(2), 60.0, 100.0, Sizing::BoardLot(100), "x");
        assert_eq!(result, EntryResult::InsufficientCapital);
        assert!(account.is_flat());
        assert!(account.trades.is_empty());
        assert!((account.cash - 5_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn fractional_entry_leaves_exactly_zero_cash() {
        let mut account = Account::new(10_000.0);
        enter_long(&mut account, date(2), 37.0, 100.0, Sizing::Fractional, "x");
        assert_eq!(account.cash, 0.0);
    }

    #[test]
    fn exit_long_realises_profit() {
        let mut account = Account::new(10_000.0);
        enter_long(&mut account, date(2), 50.0, 100.0, Sizing::BoardLot(100), "buy");
        let profit = exit_long(&mut account, date(5), 55.0, "sell").unwrap();

        assert!((profit - 1_000.0).abs() < 1e-9);
        assert!((account.cash - 11_000.0).abs() < 1e-9);
        assert!(account.is_flat());
        let sell = &account.trades[1];
        assert_eq!(sell.action, TradeAction::Sell);
        assert_eq!(sell.quantity, 200.0);
        assert!((sell.amount - 11_000.0).abs() < 1e-9);
        assert_eq!(sell.profit, Some(profit));
        assert_eq!(sell.reason, "sell");
    }

    #[test]
    fn exit_long_when_flat_is_noop() {
        let mut account = Account::new(10_000.0);
        assert_eq!(exit_long(&mut account, date(5), 55.0, "sell"), None);
        assert!(account.trades.is_empty());
    }
}
