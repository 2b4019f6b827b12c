//! Per-instrument capital sleeve.

use super::position::{Position, Trade};

/// Capital assigned to one instrument partition.
///
/// The allocation is fixed from the initial balance when the sleeve is
/// created; the running balance only records cash flowing in and out.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub initial_balance: f64,
    pub allocation: f64,
    pub balance: f64,
}

impl Account {
    pub fn new(initial_balance: f64, position_size: f64) -> Self {
        Account {
            initial_balance,
            allocation: initial_balance * position_size,
            balance: initial_balance,
        }
    }

    pub fn debit_entry(&mut self, position: &Position) {
        self.balance -= position.cost();
    }

    pub fn credit_exit(&mut self, trade: &Trade) {
        self.balance += trade.proceeds();
    }

    pub fn realized_pnl(&self) -> f64 {
        self.balance - self.initial_balance
    }
}
