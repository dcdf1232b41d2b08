//! The transaction list and totals shown to a signed in user.

use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError,
    atomic::{AtomicBool, Ordering},
};

use crate::{
    Transaction, TransactionId, ValidationError,
    client::{FormEvent, Totals, TransactionApi, TransactionForm, aggregate},
};

#[derive(Debug, Default)]
struct ViewState {
    transactions: Vec<Transaction>,
    totals: Totals,
}

/// Holds the transactions and totals for one mounted view.
///
/// Every add or delete is followed by a full re-fetch of the list, and the
/// totals are recomputed from each fetched list. Nothing is applied
/// optimistically, so a failed request leaves the last fetched state in place.
///
/// Responses that arrive after [TransactionsView::unmount] are discarded.
#[derive(Debug, Clone)]
pub struct TransactionsView<A> {
    api: A,
    state: Arc<Mutex<ViewState>>,
    mounted: Arc<AtomicBool>,
}

impl<A: TransactionApi> TransactionsView<A> {
    /// Create a mounted view with an empty list. Call [TransactionsView::refresh]
    /// to load the user's transactions.
    pub fn new(api: A) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(ViewState::default())),
            mounted: Arc::new(AtomicBool::new(true)),
        }
    }

    /// The transactions from the last applied fetch.
    pub fn transactions(&self) -> Vec<Transaction> {
        self.lock_state().transactions.clone()
    }

    /// The totals of [TransactionsView::transactions].
    pub fn totals(&self) -> Totals {
        self.lock_state().totals
    }

    /// Whether results are still being applied.
    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::Acquire)
    }

    /// Stop applying results. Requests already in flight still complete.
    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::Release);
    }

    /// Fetch the list and replace the displayed transactions and totals.
    ///
    /// Errors are logged and the previous state is kept.
    pub async fn refresh(&self) {
        let transactions = match self.api.list().await {
            Ok(transactions) => transactions,
            Err(error) => {
                tracing::error!("Could not fetch transactions: {error}");
                return;
            }
        };

        if !self.is_mounted() {
            tracing::debug!(
                "Discarding {} transactions fetched after unmount",
                transactions.len()
            );
            return;
        }

        let mut state = self.lock_state();
        state.totals = aggregate(&transactions);
        state.transactions = transactions;
    }

    /// Submit `form` and re-fetch the list.
    ///
    /// The form is cleared if the transaction was created. A failed request is
    /// logged and still followed by a re-fetch.
    ///
    /// # Errors
    /// Returns a [ValidationError] without contacting the API if the form is
    /// invalid.
    pub async fn add_transaction(&self, form: &mut TransactionForm) -> Result<(), ValidationError> {
        let draft = form.submit()?;

        match self.api.create(draft).await {
            Ok(transaction) => {
                tracing::info!("Created transaction {}", transaction.id);
                *form = std::mem::take(form).apply(FormEvent::Reset);
            }
            Err(error) => tracing::error!("Could not create transaction: {error}"),
        }

        self.refresh().await;

        Ok(())
    }

    /// Delete the transaction `id` if `confirm` returns true, then re-fetch the list.
    ///
    /// A failed delete, e.g. of a transaction that is already gone, is logged
    /// and still followed by a re-fetch.
    pub async fn delete_transaction(&self, id: TransactionId, confirm: impl FnOnce() -> bool) {
        if !confirm() {
            tracing::debug!("Delete of transaction {id} was not confirmed");
            return;
        }

        match self.api.delete(id).await {
            Ok(()) => tracing::info!("Deleted transaction {id}"),
            Err(error) => tracing::error!("Could not delete transaction {id}: {error}"),
        }

        self.refresh().await;
    }

    fn lock_state(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    };

    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Category, Error, Transaction, TransactionDraft, TransactionId, TransactionType, UserId,
        ValidationError,
        client::{FormEvent, LocalTransactionApi, Totals, TransactionApi, TransactionForm},
        db::initialize,
    };

    use super::TransactionsView;

    /// Keeps transactions in memory and can be told to fail every mutation.
    #[derive(Debug, Default)]
    struct FakeApi {
        transactions: Mutex<Vec<Transaction>>,
        fail_mutations: AtomicBool,
        create_calls: AtomicUsize,
        list_calls: AtomicUsize,
    }

    impl TransactionApi for Arc<FakeApi> {
        async fn list(&self) -> Result<Vec<Transaction>, Error> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.transactions.lock().unwrap().clone())
        }

        async fn create(&self, draft: TransactionDraft) -> Result<Transaction, Error> {
            self.create_calls.fetch_add(1, Ordering::SeqCst);

            if self.fail_mutations.load(Ordering::SeqCst) {
                return Err(Error::RequestFailed("connection refused".to_owned()));
            }

            let mut transactions = self.transactions.lock().unwrap();
            let transaction = Transaction {
                id: transactions.len() as TransactionId + 1,
                owner: UserId::new("alice"),
                title: draft.title,
                amount: draft.amount,
                date: draft.date,
                category: draft.category.parse().unwrap(),
                transaction_type: draft.transaction_type,
            };
            transactions.push(transaction.clone());

            Ok(transaction)
        }

        async fn delete(&self, id: TransactionId) -> Result<(), Error> {
            if self.fail_mutations.load(Ordering::SeqCst) {
                return Err(Error::RequestFailed("connection refused".to_owned()));
            }

            let mut transactions = self.transactions.lock().unwrap();
            let count = transactions.len();
            transactions.retain(|transaction| transaction.id != id);

            if transactions.len() == count {
                Err(Error::DeleteMissingTransaction)
            } else {
                Ok(())
            }
        }
    }

    fn coffee_form() -> TransactionForm {
        TransactionForm::default()
            .apply(FormEvent::TitleChanged("Coffee".to_owned()))
            .apply(FormEvent::AmountChanged("50".to_owned()))
            .apply(FormEvent::DateChanged("2024-01-01".to_owned()))
    }

    #[tokio::test]
    async fn add_then_delete_end_to_end() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let api =
            LocalTransactionApi::new(Arc::new(Mutex::new(connection)), UserId::new("alice"));
        let view = TransactionsView::new(api);
        view.refresh().await;
        assert!(view.transactions().is_empty());

        let mut form = coffee_form();
        view.add_transaction(&mut form).await.unwrap();

        let transactions = view.transactions();
        assert_eq!(transactions.len(), 1);
        let coffee = &transactions[0];
        assert!(coffee.id > 0);
        assert_eq!(coffee.title, "Coffee");
        assert_eq!(coffee.amount, 50.0);
        assert_eq!(coffee.date, date!(2024 - 01 - 01));
        assert_eq!(coffee.category, Category::Food);
        assert_eq!(coffee.transaction_type, TransactionType::Expense);
        assert_eq!(
            view.totals(),
            Totals {
                income: 0.0,
                expense: 50.0
            }
        );
        assert_eq!(form, TransactionForm::default());

        view.delete_transaction(coffee.id, || true).await;

        assert!(view.transactions().is_empty());
        assert_eq!(
            view.totals(),
            Totals {
                income: 0.0,
                expense: 0.0
            }
        );
    }

    #[tokio::test]
    async fn invalid_form_is_not_sent() {
        let api = Arc::new(FakeApi::default());
        let view = TransactionsView::new(api.clone());
        let mut form = coffee_form().apply(FormEvent::AmountChanged("abc".to_owned()));

        let result = view.add_transaction(&mut form).await;

        assert_eq!(
            result,
            Err(ValidationError::InvalidAmount("abc".to_owned()))
        );
        assert_eq!(api.create_calls.load(Ordering::SeqCst), 0);
        assert_eq!(api.list_calls.load(Ordering::SeqCst), 0);
        assert_eq!(form.title, "Coffee");
    }

    #[tokio::test]
    async fn failed_create_keeps_state_and_still_refetches() {
        let api = Arc::new(FakeApi::default());
        let view = TransactionsView::new(api.clone());
        view.add_transaction(&mut coffee_form()).await.unwrap();
        api.fail_mutations.store(true, Ordering::SeqCst);
        let list_calls = api.list_calls.load(Ordering::SeqCst);
        let mut form = coffee_form();

        view.add_transaction(&mut form).await.unwrap();

        assert_eq!(api.list_calls.load(Ordering::SeqCst), list_calls + 1);
        assert_eq!(view.transactions().len(), 1);
        assert_eq!(view.totals().expense, 50.0);
        assert_eq!(form, coffee_form());
    }

    #[tokio::test]
    async fn failed_delete_still_refetches() {
        let api = Arc::new(FakeApi::default());
        let view = TransactionsView::new(api.clone());
        view.add_transaction(&mut coffee_form()).await.unwrap();
        let list_calls = api.list_calls.load(Ordering::SeqCst);

        view.delete_transaction(42, || true).await;

        assert_eq!(api.list_calls.load(Ordering::SeqCst), list_calls + 1);
        assert_eq!(view.transactions().len(), 1);
    }

    #[tokio::test]
    async fn unconfirmed_delete_does_nothing() {
        let api = Arc::new(FakeApi::default());
        let view = TransactionsView::new(api.clone());
        view.add_transaction(&mut coffee_form()).await.unwrap();
        let id = view.transactions()[0].id;
        let list_calls = api.list_calls.load(Ordering::SeqCst);

        view.delete_transaction(id, || false).await;

        assert_eq!(api.list_calls.load(Ordering::SeqCst), list_calls);
        assert_eq!(api.transactions.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn results_after_unmount_are_discarded() {
        let api = Arc::new(FakeApi::default());
        let view = TransactionsView::new(api.clone());

        let refresh = view.refresh();
        api.create(TransactionDraft {
            title: "Coffee".to_owned(),
            amount: 50.0,
            date: date!(2024 - 01 - 01),
            category: "Food".to_owned(),
            transaction_type: TransactionType::Expense,
        })
        .await
        .unwrap();
        view.unmount();
        refresh.await;

        assert!(!view.is_mounted());
        assert!(view.transactions().is_empty());
        assert_eq!(view.totals(), Totals::default());
    }

    #[tokio::test]
    async fn clones_share_state() {
        let api = Arc::new(FakeApi::default());
        let view = TransactionsView::new(api);
        let handle = view.clone();

        view.add_transaction(&mut coffee_form()).await.unwrap();
        handle.unmount();

        assert_eq!(handle.transactions().len(), 1);
        assert!(!view.is_mounted());
    }
}
