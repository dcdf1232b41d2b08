//! The state of the form for adding a transaction.

use serde::{Deserialize, Serialize};
use time::{Date, macros::format_description};

use crate::{Category, TransactionDraft, TransactionType, ValidationError};

/// The raw field values of the add transaction form.
///
/// Text fields hold exactly what the user typed. Nothing is parsed until
/// [TransactionForm::submit]. The category is always one of the categories
/// for the selected transaction type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionForm {
    /// The title text field.
    pub title: String,
    /// The amount text field.
    pub amount: String,
    /// The date field, formatted as `YYYY-MM-DD`.
    pub date: String,
    /// The selected transaction type.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// The selected category.
    pub category: Category,
}

impl Default for TransactionForm {
    fn default() -> Self {
        let transaction_type = TransactionType::default();

        Self {
            title: String::new(),
            amount: String::new(),
            date: String::new(),
            transaction_type,
            category: transaction_type.default_category(),
        }
    }
}

/// A user interaction with the add transaction form.
#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent {
    /// The title field was edited.
    TitleChanged(String),
    /// The amount field was edited.
    AmountChanged(String),
    /// The date field was edited.
    DateChanged(String),
    /// A different transaction type was selected.
    TypeChanged(TransactionType),
    /// A category was picked from the list for the current type.
    CategoryChanged(Category),
    /// The form was submitted or cancelled and should be cleared.
    Reset,
}

impl TransactionForm {
    /// Return the form state after `event`.
    ///
    /// Changing the transaction type resets the category to the first category
    /// of the new type, even if the old category is also valid for the new type.
    /// Picking a category that does not belong to the current type is ignored.
    pub fn apply(self, event: FormEvent) -> Self {
        match event {
            FormEvent::TitleChanged(title) => Self { title, ..self },
            FormEvent::AmountChanged(amount) => Self { amount, ..self },
            FormEvent::DateChanged(date) => Self { date, ..self },
            FormEvent::TypeChanged(transaction_type) if transaction_type == self.transaction_type => {
                self
            }
            FormEvent::TypeChanged(transaction_type) => Self {
                transaction_type,
                category: transaction_type.default_category(),
                ..self
            },
            FormEvent::CategoryChanged(category) if self.transaction_type.allows(category) => {
                Self { category, ..self }
            }
            FormEvent::CategoryChanged(category) => {
                tracing::warn!(
                    "Ignoring category {category} for {} transaction",
                    self.transaction_type
                );
                self
            }
            FormEvent::Reset => Self::default(),
        }
    }

    /// The categories that can currently be picked.
    pub fn category_options(&self) -> &'static [Category] {
        self.transaction_type.categories()
    }

    /// Parse the fields into a draft that can be sent to the transaction API.
    ///
    /// # Errors
    /// This function will return a:
    /// - [ValidationError::EmptyTitle] if the title is blank,
    /// - [ValidationError::InvalidAmount] if the amount is not a number zero or greater,
    /// - or [ValidationError::InvalidDate] if the date is not a `YYYY-MM-DD` date.
    pub fn submit(&self) -> Result<TransactionDraft, ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }

        let amount = self
            .amount
            .trim()
            .parse::<f64>()
            .map_err(|_| ValidationError::InvalidAmount(self.amount.clone()))?;

        let date = Date::parse(
            self.date.trim(),
            format_description!("[year]-[month]-[day]"),
        )
        .map_err(|_| ValidationError::InvalidDate(self.date.clone()))?;

        let draft = TransactionDraft {
            title: self.title.trim().to_owned(),
            amount,
            date,
            category: self.category.to_string(),
            transaction_type: self.transaction_type,
        };

        // Catch negative amounts and any other rule the server would reject.
        draft.clone().validate()?;

        Ok(draft)
    }
}
