//! The transaction types and the closed category enumerations that belong to each type.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money that was earned.
    Income,
    /// Money that was spent. New transactions default to this type.
    #[default]
    Expense,
}

const EXPENSE_CATEGORIES: [Category; 7] = [
    Category::Food,
    Category::Transport,
    Category::Utilities,
    Category::Rent,
    Category::Shopping,
    Category::Entertainment,
    Category::Other,
];

const INCOME_CATEGORIES: [Category; 5] = [
    Category::Salary,
    Category::Bonus,
    Category::Gift,
    Category::Investment,
    Category::Other,
];

impl TransactionType {
    /// The categories a transaction of this type may use, in display order.
    pub fn categories(self) -> &'static [Category] {
        match self {
            TransactionType::Expense => &EXPENSE_CATEGORIES,
            TransactionType::Income => &INCOME_CATEGORIES,
        }
    }

    /// The category selected by default for this type.
    pub fn default_category(self) -> Category {
        self.categories()[0]
    }

    /// Whether `category` is valid for this type.
    pub fn allows(self, category: Category) -> bool {
        self.categories().contains(&category)
    }

    /// The lowercase name used on the wire and in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl FromStr for TransactionType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(ValidationError::UnknownTransactionType(other.to_owned())),
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A spending or earning category.
///
/// `Other` is shared by both transaction types, every other category belongs
/// to exactly one type. See [TransactionType::categories].
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Food,
    Transport,
    Utilities,
    Rent,
    Shopping,
    Entertainment,
    Salary,
    Bonus,
    Gift,
    Investment,
    Other,
}

impl Category {
    /// The category name used on the wire and in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Transport => "Transport",
            Category::Utilities => "Utilities",
            Category::Rent => "Rent",
            Category::Shopping => "Shopping",
            Category::Entertainment => "Entertainment",
            Category::Salary => "Salary",
            Category::Bonus => "Bonus",
            Category::Gift => "Gift",
            Category::Investment => "Investment",
            Category::Other => "Other",
        }
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EXPENSE_CATEGORIES
            .iter()
            .chain(INCOME_CATEGORIES.iter())
            .find(|category| category.as_str() == s)
            .copied()
            .ok_or_else(|| ValidationError::UnknownCategory(s.to_owned()))
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
