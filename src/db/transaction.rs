/*!
 * Unit of work
 *
 * Wraps one use case's repository calls in a single database transaction.
 */

use crate::errors::ServiceError;
use futures::future::BoxFuture;
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionError, TransactionTrait};
use std::sync::Arc;
use tracing::{debug, warn};

/// Transaction scope shared by the mutating services.
///
/// `execute` begins a transaction on the pool, hands the transaction to the
/// unit of work, commits on `Ok` and rolls back on `Err`. A dropped
/// transaction (panic, cancelled request) is rolled back by the driver.
#[derive(Debug, Clone)]
pub struct UnitOfWork {
    db: Arc<DatabaseConnection>,
}

impl UnitOfWork {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Runs `work` inside a transaction.
    ///
    /// ```rust,ignore
    /// let id = uow
    ///     .execute(move |txn| {
    ///         Box::pin(async move {
    ///             let promo = repo.insert(txn, model).await?;
    ///             Ok(promo.id)
    ///         })
    ///     })
    ///     .await?;
    /// ```
    pub async fn execute<F, T>(&self, work: F) -> Result<T, ServiceError>
    where
        F: for<'c> FnOnce(&'c DatabaseTransaction) -> BoxFuture<'c, Result<T, ServiceError>>
            + Send,
        T: Send,
    {
        debug!("Starting database transaction");
        let result = self.db.transaction::<_, T, ServiceError>(work).await;

        match result {
            Ok(value) => {
                debug!("Transaction committed");
                Ok(value)
            }
            Err(TransactionError::Transaction(err)) => {
                warn!(error = %err, "Transaction rolled back");
                Err(err)
            }
            Err(TransactionError::Connection(db_err)) => Err(ServiceError::from(db_err)),
        }
    }
}
