//! Payment ledger entities and repository trait.
//!
//! Every wallet mutation is recorded as a `Payment` row; the row and the
//! balance change commit in the same database transaction. Maps to the
//! `payments` and `hire_orders` tables.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// What kind of wallet movement a payment records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentType {
    Topup,
    Withdraw,
    Hire,
    Donate,
    Refund,
}

impl PaymentType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "TOPUP" => Some(Self::Topup),
            "WITHDRAW" => Some(Self::Withdraw),
            "HIRE" => Some(Self::Hire),
            "DONATE" => Some(Self::Donate),
            "REFUND" => Some(Self::Refund),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Topup => "TOPUP",
            Self::Withdraw => "WITHDRAW",
            Self::Hire => "HIRE",
            Self::Donate => "DONATE",
            Self::Refund => "REFUND",
        }
    }
}

/// How the money moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMethod {
    /// Direct wallet credit (admin/test top-up)
    Topup,
    /// Direct wallet debit
    Withdraw,
    /// Internal coin transfer (hire, donate, refund)
    Wallet,
    Vnpay,
    Momo,
    Zalopay,
    BankTransfer,
}

impl PaymentMethod {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "TOPUP" => Some(Self::Topup),
            "WITHDRAW" => Some(Self::Withdraw),
            "WALLET" => Some(Self::Wallet),
            "VNPAY" => Some(Self::Vnpay),
            "MOMO" => Some(Self::Momo),
            "ZALOPAY" => Some(Self::Zalopay),
            "BANK_TRANSFER" => Some(Self::BankTransfer),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Topup => "TOPUP",
            Self::Withdraw => "WITHDRAW",
            Self::Wallet => "WALLET",
            Self::Vnpay => "VNPAY",
            Self::Momo => "MOMO",
            Self::Zalopay => "ZALOPAY",
            Self::BankTransfer => "BANK_TRANSFER",
        }
    }
}

/// Payment lifecycle state.
///
/// Transitions are always conditional on the prior state:
/// Pending -> Completed | Failed, Completed -> Refunded. A transition whose
/// precondition no longer holds affects zero rows, which is what makes
/// gateway callback replays harmless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PENDING" => Some(Self::Pending),
            "COMPLETED" => Some(Self::Completed),
            "FAILED" => Some(Self::Failed),
            "REFUNDED" => Some(Self::Refunded),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::Refunded => "REFUNDED",
        }
    }
}

/// A ledger row.
///
/// `user_id` is the account whose wallet the payment is recorded against
/// (the hirer for hires, the donor for donations). `game_player_id` is set
/// for payments targeting a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub user_id: i64,
    pub game_player_id: Option<i64>,
    /// Amount in coins, always positive
    pub coin: i64,
    /// "COIN" for internal movements, "VND" for gateway top-ups
    pub currency: String,
    pub payment_type: PaymentType,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    /// Gateway transaction reference (VNPay vnp_TxnRef)
    pub vnp_txn_ref: Option<String>,
    pub description: Option<String>,
    /// Hire window start
    pub start_time: Option<DateTime<Utc>>,
    /// Hire window end
    pub end_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    /// Whether the hire window has finished (non-hire payments: true).
    pub fn hire_finished(&self) -> bool {
        match self.end_time {
            Some(end) => end <= Utc::now(),
            None => true,
        }
    }
}

impl Default for Payment {
    fn default() -> Self {
        Self {
            id: 0,
            user_id: 0,
            game_player_id: None,
            coin: 0,
            currency: "COIN".to_string(),
            payment_type: PaymentType::Topup,
            method: PaymentMethod::Topup,
            status: PaymentStatus::Completed,
            vnp_txn_ref: None,
            description: None,
            start_time: None,
            end_time: None,
            created_at: Utc::now(),
        }
    }
}

/// A hire contract backed by a Hire payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HireOrder {
    pub id: i64,
    pub payment_id: i64,
    /// The hiring user
    pub user_id: i64,
    pub game_player_id: i64,
    pub hours: i64,
    pub created_at: DateTime<Utc>,
}

/// Result of reconciling a gateway callback against the ledger.
#[derive(Debug, Clone)]
pub enum GatewaySettlement {
    /// The payment transitioned Pending -> Completed and the wallet was credited
    Credited(Box<Payment>),
    /// The payment transitioned Pending -> Failed
    Failed(Box<Payment>),
    /// The payment had already left Pending; nothing was mutated
    AlreadySettled(Box<Payment>),
}

/// Repository trait for the payment ledger.
///
/// The balance-mutating operations are deliberately coarse: each one is a
/// single atomic unit (balance update + ledger rows) so that no caller can
/// observe or create a state where the wallet and the ledger disagree.
/// Debits are conditional on sufficient balance and surface
/// `AppError::InsufficientBalance` when the account would go negative.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    // ------------------------------------------------------------------
    // Atomic ledger operations
    // ------------------------------------------------------------------

    /// Credit `payment.coin` to `payment.user_id` and record the payment.
    async fn credit(&self, payment: &Payment) -> Result<Payment, AppError>;

    /// Debit `payment.coin` from `payment.user_id` and record the payment.
    async fn debit(&self, payment: &Payment) -> Result<Payment, AppError>;

    /// Move `payment.coin` from `payment.user_id` to `to_user_id` and record
    /// the payment (hire and donate transfers).
    async fn transfer(&self, payment: &Payment, to_user_id: i64) -> Result<Payment, AppError>;

    /// Hire transfer plus the order row and listing hire_count bump.
    async fn record_hire(
        &self,
        payment: &Payment,
        to_user_id: i64,
        hours: i64,
    ) -> Result<(Payment, HireOrder), AppError>;

    /// Record a Pending gateway top-up awaiting the callback.
    async fn create_pending(&self, payment: &Payment) -> Result<Payment, AppError>;

    /// Reconcile a verified gateway callback.
    ///
    /// On success the Pending -> Completed transition and the wallet credit
    /// happen in one transaction; a payment already out of Pending is
    /// returned as `AlreadySettled` with no mutation.
    async fn settle_gateway(
        &self,
        txn_ref: &str,
        success: bool,
    ) -> Result<GatewaySettlement, AppError>;

    /// Refund a completed hire: flip Completed -> Refunded exactly once,
    /// debit the player and credit the hirer, recording a Refund payment.
    async fn refund_hire(&self, payment_id: i64) -> Result<Payment, AppError>;

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    async fn find_by_id(&self, id: i64) -> Result<Option<Payment>, AppError>;

    async fn find_by_txn_ref(&self, txn_ref: &str) -> Result<Option<Payment>, AppError>;

    async fn find_by_user(&self, user_id: i64) -> Result<Vec<Payment>, AppError>;

    async fn find_by_user_and_type(
        &self,
        user_id: i64,
        payment_type: PaymentType,
    ) -> Result<Vec<Payment>, AppError>;

    async fn find_by_player_and_type(
        &self,
        game_player_id: i64,
        payment_type: PaymentType,
    ) -> Result<Vec<Payment>, AppError>;

    async fn find_by_status(&self, status: PaymentStatus) -> Result<Vec<Payment>, AppError>;

    async fn find_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Payment>, AppError>;

    async fn find_order_by_payment(&self, payment_id: i64)
        -> Result<Option<HireOrder>, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use test_case::test_case;

    #[test_case(PaymentType::Topup; "topup")]
    #[test_case(PaymentType::Withdraw; "withdraw")]
    #[test_case(PaymentType::Hire; "hire")]
    #[test_case(PaymentType::Donate; "donate")]
    #[test_case(PaymentType::Refund; "refund")]
    fn test_payment_type_roundtrip(t: PaymentType) {
        assert_eq!(PaymentType::from_str(t.as_str()), Some(t));
    }

    #[test]
    fn test_payment_type_rejects_unknown() {
        assert_eq!(PaymentType::from_str("gift"), None);
    }

    #[test]
    fn test_payment_method_roundtrip() {
        for m in [
            PaymentMethod::Topup,
            PaymentMethod::Withdraw,
            PaymentMethod::Wallet,
            PaymentMethod::Vnpay,
            PaymentMethod::Momo,
            PaymentMethod::Zalopay,
            PaymentMethod::BankTransfer,
        ] {
            assert_eq!(PaymentMethod::from_str(m.as_str()), Some(m));
        }
    }

    #[test]
    fn test_payment_status_roundtrip() {
        for s in [
            PaymentStatus::Pending,
            PaymentStatus::Completed,
            PaymentStatus::Failed,
            PaymentStatus::Refunded,
        ] {
            assert_eq!(PaymentStatus::from_str(s.as_str()), Some(s));
        }
        assert_eq!(PaymentStatus::from_str("pending"), Some(PaymentStatus::Pending));
    }

    #[test]
    fn test_hire_finished() {
        let mut payment = Payment::default();
        assert!(payment.hire_finished());

        payment.end_time = Some(Utc::now() + Duration::hours(1));
        assert!(!payment.hire_finished());

        payment.end_time = Some(Utc::now() - Duration::hours(1));
        assert!(payment.hire_finished());
    }

    #[test]
    fn test_status_serializes_uppercase() {
        let json = serde_json::to_string(&PaymentStatus::Completed).unwrap();
        assert_eq!(json, "\"COMPLETED\"");
    }
}
