//! Income and expense totals derived from a list of transactions.

use serde::{Deserialize, Serialize};

use crate::{Transaction, TransactionType};

/// The summed amounts of a user's transactions, split by type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    /// The sum of all income amounts.
    pub income: f64,
    /// The sum of all expense amounts.
    pub expense: f64,
}

impl Totals {
    /// Income minus expenses.
    pub fn balance(&self) -> f64 {
        self.income - self.expense
    }
}

/// Sum the amounts of `transactions` by transaction type.
///
/// The totals are always computed from scratch, so callers should re-run this
/// whenever the list they display changes rather than patching old totals.
pub fn aggregate(transactions: &[Transaction]) -> Totals {
    transactions
        .iter()
        .fold(Totals::default(), |mut totals, transaction| {
            match transaction.transaction_type {
                TransactionType::Income => totals.income += transaction.amount,
                TransactionType::Expense => totals.expense += transaction.amount,
            }

            totals
        })
}
