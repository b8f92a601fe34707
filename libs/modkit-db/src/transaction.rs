//! Scoped transactions.

use std::panic::AssertUnwindSafe;

use futures::future::BoxFuture;
use futures::FutureExt;
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use tracing::{debug, warn};

use crate::errors::RepoError;

/// Run `f` inside a fresh transaction.
///
/// Commits when `f` returns `Ok`, rolls back when it returns `Err` or panics.
/// The error produced by `f` is returned unchanged; a panic is resumed after
/// the rollback. Transactions are not nested: `f` receives the handle and
/// passes it explicitly to every repository call that must join the scope.
pub async fn with_transaction<T, E, F>(conn: &DatabaseConnection, f: F) -> Result<T, E>
where
    F: for<'c> FnOnce(&'c DatabaseTransaction) -> BoxFuture<'c, Result<T, E>>,
    E: From<RepoError>,
{
    let txn = conn.begin().await.map_err(RepoError::from)?;
    debug!("transaction started");

    let outcome = AssertUnwindSafe(f(&txn)).catch_unwind().await;

    match outcome {
        Ok(Ok(value)) => {
            txn.commit().await.map_err(RepoError::from)?;
            debug!("transaction committed");
            Ok(value)
        }
        Ok(Err(err)) => {
            if let Err(rollback_err) = txn.rollback().await {
                warn!(error = %rollback_err, "rollback failed");
            } else {
                debug!("transaction rolled back");
            }
            Err(err)
        }
        Err(panic) => {
            if let Err(rollback_err) = txn.rollback().await {
                warn!(error = %rollback_err, "rollback after panic failed");
            }
            std::panic::resume_unwind(panic)
        }
    }
}
