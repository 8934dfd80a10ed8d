//! Payment Repository Implementation
//!
//! PostgreSQL implementation of the payment ledger. Every balance-mutating
//! operation runs in one transaction: the wallet update, the payment row,
//! and any side rows (hire order, hire_count) commit together.
//!
//! Non-negativity is enforced in SQL: debits are
//! `SET coin = coin - X WHERE id = $1 AND coin >= X` and a zero row count
//! aborts the transaction. Status transitions are likewise conditional on
//! the prior status, which makes gateway callback replays no-ops.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use crate::domain::{
    GatewaySettlement, HireOrder, Payment, PaymentRepository, PaymentStatus, PaymentType,
};
use crate::infrastructure::database::execute_in_transaction;
use crate::shared::error::AppError;

/// Columns selected for every payment query.
const PAYMENT_COLUMNS: &str = "id, user_id, game_player_id, coin, currency, payment_type, \
     method, status, vnp_txn_ref, description, start_time, end_time, created_at";

/// Database row representation matching the payments table schema.
#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: i64,
    user_id: i64,
    game_player_id: Option<i64>,
    coin: i64,
    currency: String,
    payment_type: String,
    method: String,
    status: String,
    vnp_txn_ref: Option<String>,
    description: Option<String>,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl PaymentRow {
    /// Convert database row to domain Payment entity.
    ///
    /// Unknown enum strings are a data corruption signal on a ledger table
    /// and surface as internal errors rather than being defaulted away.
    fn into_payment(self) -> Result<Payment, AppError> {
        let payment_type = PaymentType::from_str(&self.payment_type).ok_or_else(|| {
            AppError::Internal(format!("Unknown payment type '{}'", self.payment_type))
        })?;
        let method = crate::domain::PaymentMethod::from_str(&self.method)
            .ok_or_else(|| AppError::Internal(format!("Unknown payment method '{}'", self.method)))?;
        let status = PaymentStatus::from_str(&self.status)
            .ok_or_else(|| AppError::Internal(format!("Unknown payment status '{}'", self.status)))?;

        Ok(Payment {
            id: self.id,
            user_id: self.user_id,
            game_player_id: self.game_player_id,
            coin: self.coin,
            currency: self.currency,
            payment_type,
            method,
            status,
            vnp_txn_ref: self.vnp_txn_ref,
            description: self.description,
            start_time: self.start_time,
            end_time: self.end_time,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct HireOrderRow {
    id: i64,
    payment_id: i64,
    user_id: i64,
    game_player_id: i64,
    hours: i64,
    created_at: DateTime<Utc>,
}

impl HireOrderRow {
    fn into_order(self) -> HireOrder {
        HireOrder {
            id: self.id,
            payment_id: self.payment_id,
            user_id: self.user_id,
            game_player_id: self.game_player_id,
            hours: self.hours,
            created_at: self.created_at,
        }
    }
}

/// PostgreSQL payment ledger implementation.
#[derive(Clone)]
pub struct PgPaymentRepository {
    pool: PgPool,
}

impl PgPaymentRepository {
    /// Create a new PgPaymentRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Insert a ledger row inside an open transaction.
async fn insert_payment(
    tx: &mut Transaction<'static, Postgres>,
    payment: &Payment,
) -> Result<Payment, AppError> {
    let row = sqlx::query_as::<_, PaymentRow>(&format!(
        "INSERT INTO payments (user_id, game_player_id, coin, currency, payment_type, method, \
         status, vnp_txn_ref, description, start_time, end_time) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING {}",
        PAYMENT_COLUMNS
    ))
    .bind(payment.user_id)
    .bind(payment.game_player_id)
    .bind(payment.coin)
    .bind(&payment.currency)
    .bind(payment.payment_type.as_str())
    .bind(payment.method.as_str())
    .bind(payment.status.as_str())
    .bind(&payment.vnp_txn_ref)
    .bind(&payment.description)
    .bind(payment.start_time)
    .bind(payment.end_time)
    .fetch_one(&mut **tx)
    .await
    .map_err(AppError::Database)?;

    row.into_payment()
}

/// Unconditional wallet credit inside an open transaction.
async fn credit_user(
    tx: &mut Transaction<'static, Postgres>,
    user_id: i64,
    coin: i64,
) -> Result<(), AppError> {
    let result = sqlx::query("UPDATE users SET coin = coin + $2, updated_at = NOW() WHERE id = $1")
        .bind(user_id)
        .bind(coin)
        .execute(&mut **tx)
        .await
        .map_err(AppError::Database)?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "User with id {} not found",
            user_id
        )));
    }

    Ok(())
}

/// Conditional wallet debit inside an open transaction.
///
/// Zero rows affected means either the user is missing or the balance is
/// short; the distinction matters for the error the client sees.
async fn debit_user(
    tx: &mut Transaction<'static, Postgres>,
    user_id: i64,
    coin: i64,
) -> Result<(), AppError> {
    let result = sqlx::query(
        "UPDATE users SET coin = coin - $2, updated_at = NOW() WHERE id = $1 AND coin >= $2",
    )
    .bind(user_id)
    .bind(coin)
    .execute(&mut **tx)
    .await
    .map_err(AppError::Database)?;

    if result.rows_affected() == 0 {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                .bind(user_id)
                .fetch_one(&mut **tx)
                .await
                .map_err(AppError::Database)?;

        return Err(if exists {
            AppError::InsufficientBalance
        } else {
            AppError::NotFound(format!("User with id {} not found", user_id))
        });
    }

    Ok(())
}

#[async_trait]
impl PaymentRepository for PgPaymentRepository {
    async fn credit(&self, payment: &Payment) -> Result<Payment, AppError> {
        let payment = payment.clone();
        execute_in_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                credit_user(tx, payment.user_id, payment.coin).await?;
                insert_payment(tx, &payment).await
            })
        })
        .await
    }

    async fn debit(&self, payment: &Payment) -> Result<Payment, AppError> {
        let payment = payment.clone();
        execute_in_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                debit_user(tx, payment.user_id, payment.coin).await?;
                insert_payment(tx, &payment).await
            })
        })
        .await
    }

    async fn transfer(&self, payment: &Payment, to_user_id: i64) -> Result<Payment, AppError> {
        let payment = payment.clone();
        execute_in_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                debit_user(tx, payment.user_id, payment.coin).await?;
                credit_user(tx, to_user_id, payment.coin).await?;
                insert_payment(tx, &payment).await
            })
        })
        .await
    }

    async fn record_hire(
        &self,
        payment: &Payment,
        to_user_id: i64,
        hours: i64,
    ) -> Result<(Payment, HireOrder), AppError> {
        let payment = payment.clone();
        execute_in_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                let game_player_id = payment.game_player_id.ok_or_else(|| {
                    AppError::Internal("Hire payment without game_player_id".into())
                })?;

                debit_user(tx, payment.user_id, payment.coin).await?;
                credit_user(tx, to_user_id, payment.coin).await?;
                let created = insert_payment(tx, &payment).await?;

                let order = sqlx::query_as::<_, HireOrderRow>(
                    "INSERT INTO hire_orders (payment_id, user_id, game_player_id, hours) \
                     VALUES ($1, $2, $3, $4) \
                     RETURNING id, payment_id, user_id, game_player_id, hours, created_at",
                )
                .bind(created.id)
                .bind(created.user_id)
                .bind(game_player_id)
                .bind(hours)
                .fetch_one(&mut **tx)
                .await
                .map_err(AppError::Database)?;

                sqlx::query(
                    "UPDATE game_players SET hire_count = hire_count + 1, updated_at = NOW() \
                     WHERE id = $1",
                )
                .bind(game_player_id)
                .execute(&mut **tx)
                .await
                .map_err(AppError::Database)?;

                Ok((created, order.into_order()))
            })
        })
        .await
    }

    async fn create_pending(&self, payment: &Payment) -> Result<Payment, AppError> {
        let payment = payment.clone();
        execute_in_transaction(&self.pool, move |tx| {
            Box::pin(async move { insert_payment(tx, &payment).await })
        })
        .await
    }

    async fn settle_gateway(
        &self,
        txn_ref: &str,
        success: bool,
    ) -> Result<GatewaySettlement, AppError> {
        let txn_ref = txn_ref.to_string();
        execute_in_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                let new_status = if success {
                    PaymentStatus::Completed
                } else {
                    PaymentStatus::Failed
                };

                // The status precondition is the idempotency guard: a
                // replayed callback updates zero rows and credits nothing.
                let updated = sqlx::query_as::<_, PaymentRow>(&format!(
                    "UPDATE payments SET status = $2 \
                     WHERE vnp_txn_ref = $1 AND status = 'PENDING' RETURNING {}",
                    PAYMENT_COLUMNS
                ))
                .bind(&txn_ref)
                .bind(new_status.as_str())
                .fetch_optional(&mut **tx)
                .await
                .map_err(AppError::Database)?;

                match updated {
                    Some(row) => {
                        let payment = row.into_payment()?;
                        if success {
                            credit_user(tx, payment.user_id, payment.coin).await?;
                            Ok(GatewaySettlement::Credited(Box::new(payment)))
                        } else {
                            Ok(GatewaySettlement::Failed(Box::new(payment)))
                        }
                    }
                    None => {
                        let existing = sqlx::query_as::<_, PaymentRow>(&format!(
                            "SELECT {} FROM payments WHERE vnp_txn_ref = $1",
                            PAYMENT_COLUMNS
                        ))
                        .bind(&txn_ref)
                        .fetch_optional(&mut **tx)
                        .await
                        .map_err(AppError::Database)?;

                        match existing {
                            Some(row) => {
                                Ok(GatewaySettlement::AlreadySettled(Box::new(row.into_payment()?)))
                            }
                            None => Err(AppError::NotFound(format!(
                                "Payment with txn ref {} not found",
                                txn_ref
                            ))),
                        }
                    }
                }
            })
        })
        .await
    }

    async fn refund_hire(&self, payment_id: i64) -> Result<Payment, AppError> {
        execute_in_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                // Completed + Hire precondition makes the refund single-shot
                let updated = sqlx::query_as::<_, PaymentRow>(&format!(
                    "UPDATE payments SET status = 'REFUNDED' \
                     WHERE id = $1 AND status = 'COMPLETED' AND payment_type = 'HIRE' \
                     RETURNING {}",
                    PAYMENT_COLUMNS
                ))
                .bind(payment_id)
                .fetch_optional(&mut **tx)
                .await
                .map_err(AppError::Database)?;

                let original = match updated {
                    Some(row) => row.into_payment()?,
                    None => {
                        let exists = sqlx::query_scalar::<_, bool>(
                            "SELECT EXISTS(SELECT 1 FROM payments WHERE id = $1)",
                        )
                        .bind(payment_id)
                        .fetch_one(&mut **tx)
                        .await
                        .map_err(AppError::Database)?;

                        return Err(if exists {
                            AppError::Conflict("Payment is not a refundable hire".into())
                        } else {
                            AppError::NotFound(format!(
                                "Payment with id {} not found",
                                payment_id
                            ))
                        });
                    }
                };

                let game_player_id = original.game_player_id.ok_or_else(|| {
                    AppError::Internal("Hire payment without game_player_id".into())
                })?;

                let player_user_id = sqlx::query_scalar::<_, i64>(
                    "SELECT user_id FROM game_players WHERE id = $1",
                )
                .bind(game_player_id)
                .fetch_one(&mut **tx)
                .await
                .map_err(AppError::Database)?;

                // The player gives the coins back; if they already spent
                // them the refund fails and the hire stays COMPLETED.
                debit_user(tx, player_user_id, original.coin).await?;
                credit_user(tx, original.user_id, original.coin).await?;

                let refund = Payment {
                    user_id: original.user_id,
                    game_player_id: original.game_player_id,
                    coin: original.coin,
                    currency: "COIN".to_string(),
                    payment_type: PaymentType::Refund,
                    method: crate::domain::PaymentMethod::Wallet,
                    status: PaymentStatus::Completed,
                    description: Some(format!("Refund of payment {}", original.id)),
                    ..Payment::default()
                };

                insert_payment(tx, &refund).await
            })
        })
        .await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Payment>, AppError> {
        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {} FROM payments WHERE id = $1",
            PAYMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_payment()).transpose()
    }

    async fn find_by_txn_ref(&self, txn_ref: &str) -> Result<Option<Payment>, AppError> {
        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {} FROM payments WHERE vnp_txn_ref = $1",
            PAYMENT_COLUMNS
        ))
        .bind(txn_ref)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_payment()).transpose()
    }

    async fn find_by_user(&self, user_id: i64) -> Result<Vec<Payment>, AppError> {
        let rows = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {} FROM payments WHERE user_id = $1 ORDER BY created_at DESC",
            PAYMENT_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.into_payment()).collect()
    }

    async fn find_by_user_and_type(
        &self,
        user_id: i64,
        payment_type: PaymentType,
    ) -> Result<Vec<Payment>, AppError> {
        let rows = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {} FROM payments WHERE user_id = $1 AND payment_type = $2 \
             ORDER BY created_at DESC",
            PAYMENT_COLUMNS
        ))
        .bind(user_id)
        .bind(payment_type.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.into_payment()).collect()
    }

    async fn find_by_player_and_type(
        &self,
        game_player_id: i64,
        payment_type: PaymentType,
    ) -> Result<Vec<Payment>, AppError> {
        let rows = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {} FROM payments WHERE game_player_id = $1 AND payment_type = $2 \
             ORDER BY created_at DESC",
            PAYMENT_COLUMNS
        ))
        .bind(game_player_id)
        .bind(payment_type.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.into_payment()).collect()
    }

    async fn find_by_status(&self, status: PaymentStatus) -> Result<Vec<Payment>, AppError> {
        let rows = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {} FROM payments WHERE status = $1 ORDER BY created_at DESC",
            PAYMENT_COLUMNS
        ))
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.into_payment()).collect()
    }

    async fn find_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Payment>, AppError> {
        let rows = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {} FROM payments WHERE created_at >= $1 AND created_at < $2 \
             ORDER BY created_at DESC",
            PAYMENT_COLUMNS
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.into_payment()).collect()
    }

    async fn find_order_by_payment(
        &self,
        payment_id: i64,
    ) -> Result<Option<HireOrder>, AppError> {
        let row = sqlx::query_as::<_, HireOrderRow>(
            "SELECT id, payment_id, user_id, game_player_id, hours, created_at \
             FROM hire_orders WHERE payment_id = $1",
        )
        .bind(payment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_order()))
    }
}

#[cfg(test)]
mod tests {
    // Ledger behavior is covered by service-level tests with a mocked
    // repository and by integration tests against a real database.
}
