//! State logic for a front end of the finance tracker.
//!
//! Nothing here renders anything. A UI binding owns a [TransactionsView] for
//! the list and totals, a [TransactionForm] for the add dialog and a
//! [GoalStore] for the spending goals, and draws whatever they hold.

mod api;
mod currency;
mod form;
mod goal;
mod session;
mod storage;
mod totals;

pub use api::{LocalTransactionApi, TransactionApi};
pub use currency::CurrencyFormat;
pub use form::{FormEvent, TransactionForm};
pub use goal::{Goal, GoalId, GoalStore, goals_key};
pub use session::TransactionsView;
pub use storage::{FileStorage, LocalStorage, MemoryStorage};
pub use totals::{Totals, aggregate};
