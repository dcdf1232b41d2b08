//! Formatting of money amounts for display.

use numfmt::{Formatter, Precision};

use crate::{Transaction, TransactionType};

/// How money amounts are displayed.
///
/// Only the currency symbol is configurable. Amounts are always shown with
/// two decimal places and comma thousands separators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyFormat {
    symbol: String,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self::new("$")
    }
}

impl CurrencyFormat {
    /// Format amounts with `symbol`, e.g. `"$"` or `"₹"`.
    pub fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_owned(),
        }
    }

    /// The currency symbol.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Format `amount` rounded to the nearest cent, e.g. `$1,234.50` or `-$12.30`.
    pub fn format(&self, amount: f64) -> String {
        let cents = (amount.abs() * 100.0).round();

        if !cents.is_finite() {
            return format!("{}{amount}", self.symbol);
        }

        // Amounts that round to zero are shown without a sign.
        let prefix = if amount < 0.0 && cents > 0.0 {
            format!("-{}", self.symbol)
        } else {
            self.symbol.clone()
        };

        let whole = (cents / 100.0).trunc();
        let fraction = (cents - whole * 100.0) as u8;

        format!("{}.{fraction:02}", format_whole(&prefix, whole))
    }

    /// Format a transaction amount with the sign of its type, `+$50.00` for
    /// income and `-$50.00` for expenses.
    pub fn format_transaction(&self, transaction: &Transaction) -> String {
        match transaction.transaction_type {
            TransactionType::Income => format!("+{}", self.format(transaction.amount)),
            TransactionType::Expense => self.format(-transaction.amount),
        }
    }

    /// Format a goal's spending limit, e.g. `Limit: $500.00`.
    pub fn format_limit(&self, limit: f64) -> String {
        format!("Limit: {}", self.format(limit))
    }
}

/// Format a whole number of currency units with thousands separators.
fn format_whole(prefix: &str, whole: f64) -> String {
    if whole == 0.0 {
        // Zero is hardcoded as "0" by numfmt.
        return format!("{prefix}0");
    }

    let formatted = Formatter::currency(prefix)
        .map(|formatter| {
            formatter
                .precision(Precision::Decimals(0))
                .fmt_string(whole)
        })
        .map_err(|error| tracing::warn!("Could not use currency symbol {prefix:?}: {error:?}"))
        .ok();

    match formatted {
        // numfmt switches to scientific notation for very large numbers.
        Some(formatted) if is_grouped_integer(prefix, &formatted) => formatted,
        _ => format!("{prefix}{}", group_thousands(&format!("{whole:.0}"))),
    }
}

fn is_grouped_integer(prefix: &str, formatted: &str) -> bool {
    formatted
        .strip_prefix(prefix)
        .is_some_and(|digits| {
            !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit() || c == ',')
        })
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    grouped
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{Category, Transaction, TransactionType, UserId};

    use super::{CurrencyFormat, group_thousands};

    fn transaction(
        amount: f64,
        category: Category,
        transaction_type: TransactionType,
    ) -> Transaction {
        Transaction {
            id: 1,
            owner: UserId::new("alice"),
            title: "Test".to_owned(),
            amount,
            date: date!(2024 - 01 - 01),
            category,
            transaction_type,
        }
    }

    #[test]
    fn formats_with_two_decimals() {
        let format = CurrencyFormat::default();

        assert_eq!(format.format(50.0), "$50.00");
        assert_eq!(format.format(12.3), "$12.30");
        assert_eq!(format.format(0.0), "$0.00");
        assert_eq!(format.format(-12.3), "-$12.30");
    }

    #[test]
    fn symbol_is_configurable() {
        let format = CurrencyFormat::new("₹");

        assert_eq!(format.symbol(), "₹");
        assert_eq!(format.format_limit(500.0), "Limit: ₹500.00");
    }

    #[test]
    fn transaction_sign_follows_type() {
        let format = CurrencyFormat::default();

        assert_eq!(
            format.format_transaction(&transaction(
                3000.0,
                Category::Salary,
                TransactionType::Income
            )),
            "+$3,000.00"
        );
        assert_eq!(
            format.format_transaction(&transaction(50.0, Category::Food, TransactionType::Expense)),
            "-$50.00"
        );
    }

    #[test]
    fn rounds_to_nearest_cent() {
        let format = CurrencyFormat::new("₹");

        assert_eq!(format.format(0.004), "₹0.00");
        assert_eq!(format.format(0.01), "₹0.01");
        assert_eq!(format.format(0.29), "₹0.29");
        assert_eq!(format.format(999.999), "₹1,000.00");
        assert_eq!(format.format(-0.004), "₹0.00");
    }

    #[test]
    fn very_large_amounts_are_not_scientific() {
        let format = CurrencyFormat::new("₹");

        assert_eq!(format.format(1e16), "₹10,000,000,000,000,000.00");
        assert_eq!(format.format(-1e16), "-₹10,000,000,000,000,000.00");
    }

    #[test]
    fn groups_digits_in_threes() {
        assert_eq!(group_thousands("1"), "1");
        assert_eq!(group_thousands("123"), "123");
        assert_eq!(group_thousands("1234"), "1,234");
        assert_eq!(group_thousands("1234567"), "1,234,567");
    }
}
