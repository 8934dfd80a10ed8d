//! Transactional boundaries for database operations.
//!
//! The ledger invariant is that a balance mutation and its payment row
//! commit or roll back together; every multi-statement repository operation
//! runs through the helper below.

use std::future::Future;
use std::pin::Pin;

use sqlx::{PgPool, Postgres, Transaction};

use crate::shared::error::AppError;

/// Execute a closure within a transaction.
///
/// Commits on success; the transaction is rolled back when dropped on error.
///
/// # Example
/// ```ignore
/// let payment = execute_in_transaction(&pool, |tx| Box::pin(async move {
///     sqlx::query("UPDATE users SET coin = coin + $2 WHERE id = $1")
///         .bind(user_id)
///         .bind(coin)
///         .execute(&mut **tx)
///         .await?;
///     insert_payment(tx, &payment).await
/// })).await?;
/// ```
pub async fn execute_in_transaction<F, T>(pool: &PgPool, f: F) -> Result<T, AppError>
where
    F: for<'c> FnOnce(
        &'c mut Transaction<'static, Postgres>,
    ) -> Pin<Box<dyn Future<Output = Result<T, AppError>> + Send + 'c>>,
{
    let mut tx = pool.begin().await.map_err(AppError::Database)?;

    match f(&mut tx).await {
        Ok(result) => {
            tx.commit().await.map_err(AppError::Database)?;
            Ok(result)
        }
        Err(e) => {
            // Dropping the transaction rolls it back
            let _ = tx.rollback().await;
            Err(e)
        }
    }
}
