//! Wallet Service
//!
//! The ledger orchestrator: top-ups, withdrawals, hires, donations,
//! refunds, and gateway reconciliation. Balance arithmetic itself lives in
//! the payment repository's atomic operations; this service owns the
//! business rules around them (who may move coins where) and the
//! notification fan-out.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::config::BankTransferSettings;
use crate::domain::{
    GamePlayer, GamePlayerRepository, GatewaySettlement, HireOrder, Payment, PaymentMethod,
    PaymentRepository, PaymentStatus, PaymentType, User, UserRepository,
};
use crate::infrastructure::gateway::{self, VnPayGateway};
use crate::infrastructure::metrics;
use crate::shared::error::AppError;

use super::NotificationService;

/// VNPay's "transaction approved" response code.
const VNP_RESPONSE_SUCCESS: &str = "00";

/// Wallet service trait
#[async_trait]
pub trait WalletService: Send + Sync {
    /// Current coin balance of a user.
    async fn balance(&self, user_id: i64) -> Result<i64, WalletError>;

    /// Direct wallet credit (no gateway round-trip).
    async fn top_up(&self, user_id: i64, coin: i64) -> Result<Payment, WalletError>;

    /// Direct wallet debit. The caller must hold the Player role.
    async fn withdraw(&self, user_id: i64, coin: i64) -> Result<Payment, WalletError>;

    /// Hire a player-companion for a number of hours.
    async fn hire(
        &self,
        hirer_id: i64,
        game_player_id: i64,
        hours: i64,
    ) -> Result<(Payment, HireOrder), WalletError>;

    /// Donate coins to a player listing.
    async fn donate(
        &self,
        donor_id: i64,
        game_player_id: i64,
        coin: i64,
    ) -> Result<Payment, WalletError>;

    /// Refund a completed hire (admin operation).
    async fn refund(&self, payment_id: i64) -> Result<Payment, WalletError>;

    /// Create a pending VNPay top-up and the redirect URL for it.
    async fn create_vnpay_topup(
        &self,
        user_id: i64,
        amount: i64,
        order_info: &str,
        client_ip: &str,
    ) -> Result<VnPayCheckout, WalletError>;

    /// Reconcile a VNPay return callback against the ledger.
    async fn vnpay_return(
        &self,
        params: HashMap<String, String>,
    ) -> Result<VnPayReturn, WalletError>;

    /// Deposit instructions for QR wallets and bank transfer.
    async fn deposit_instructions(
        &self,
        user_id: i64,
        coin: i64,
        method: &str,
    ) -> Result<DepositInstructions, WalletError>;

    async fn topup_history(&self, user_id: i64) -> Result<Vec<Payment>, WalletError>;

    /// Hires made by a user.
    async fn hire_history(&self, user_id: i64) -> Result<Vec<Payment>, WalletError>;

    /// Hires received by a listing.
    async fn player_hire_history(&self, game_player_id: i64)
        -> Result<Vec<Payment>, WalletError>;

    async fn user_payments(&self, user_id: i64) -> Result<Vec<Payment>, WalletError>;

    async fn payments_by_status(
        &self,
        status: PaymentStatus,
    ) -> Result<Vec<Payment>, WalletError>;

    async fn payments_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Payment>, WalletError>;
}

/// Result of creating a VNPay checkout.
#[derive(Debug, Clone)]
pub struct VnPayCheckout {
    pub payment_url: String,
    pub txn_ref: String,
    pub payment_id: i64,
}

/// Result of reconciling a VNPay return callback.
#[derive(Debug, Clone)]
pub struct VnPayReturn {
    pub payment: Payment,
    /// Whether this call credited the wallet (false for failures and replays)
    pub credited: bool,
    /// Whether the payment had already been settled by an earlier callback
    pub already_settled: bool,
}

/// Deposit instructions returned by the deposit endpoint.
#[derive(Debug, Clone)]
pub enum DepositInstructions {
    /// Scan-to-pay QR payload (base64) for a mobile wallet
    Qr {
        method: PaymentMethod,
        qr_code: String,
        txn_id: String,
    },
    /// Manual bank transfer details
    Bank {
        instructions: gateway::BankInstructions,
        txn_id: String,
    },
}

/// Wallet service errors
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("User not found")]
    UserNotFound,

    #[error("Payment not found")]
    PaymentNotFound,

    #[error("Listing not found")]
    ListingNotFound,

    #[error("Listing is not accepting hires")]
    ListingUnavailable,

    #[error("Cannot target your own listing")]
    SelfTarget,

    #[error("Coin amount must be positive")]
    InvalidAmount,

    #[error("Insufficient coin balance")]
    InsufficientBalance,

    #[error("Payment is not a refundable hire")]
    NotRefundable,

    #[error("Invalid gateway signature")]
    InvalidSignature,

    #[error("Malformed gateway callback: {0}")]
    MalformedCallback(String),

    #[error("Unsupported payment method: {0}")]
    UnknownMethod(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AppError> for WalletError {
    fn from(e: AppError) -> Self {
        match e {
            AppError::InsufficientBalance => WalletError::InsufficientBalance,
            AppError::NotFound(msg) if msg.starts_with("User") => WalletError::UserNotFound,
            AppError::NotFound(_) => WalletError::PaymentNotFound,
            AppError::Conflict(_) => WalletError::NotRefundable,
            e => WalletError::Internal(e.to_string()),
        }
    }
}

/// WalletService implementation
pub struct WalletServiceImpl<P, U, G, N>
where
    P: PaymentRepository,
    U: UserRepository,
    G: GamePlayerRepository,
    N: NotificationService,
{
    payment_repo: Arc<P>,
    user_repo: Arc<U>,
    player_repo: Arc<G>,
    notifications: Arc<N>,
    vnpay: VnPayGateway,
    bank: BankTransferSettings,
}

impl<P, U, G, N> WalletServiceImpl<P, U, G, N>
where
    P: PaymentRepository,
    U: UserRepository,
    G: GamePlayerRepository,
    N: NotificationService,
{
    pub fn new(
        payment_repo: Arc<P>,
        user_repo: Arc<U>,
        player_repo: Arc<G>,
        notifications: Arc<N>,
        vnpay: VnPayGateway,
        bank: BankTransferSettings,
    ) -> Self {
        Self {
            payment_repo,
            user_repo,
            player_repo,
            notifications,
            vnpay,
            bank,
        }
    }

    async fn require_user(&self, user_id: i64) -> Result<User, WalletError> {
        self.user_repo
            .find_by_id(user_id)
            .await
            .map_err(|e| WalletError::Internal(e.to_string()))?
            .ok_or(WalletError::UserNotFound)
    }

    async fn require_listing(&self, game_player_id: i64) -> Result<GamePlayer, WalletError> {
        self.player_repo
            .find_by_id(game_player_id)
            .await
            .map_err(|e| WalletError::Internal(e.to_string()))?
            .ok_or(WalletError::ListingNotFound)
    }

    /// Gateway transaction reference: millisecond timestamp with a short
    /// random suffix against same-millisecond collisions.
    fn new_txn_ref(&self) -> String {
        let suffix: u16 = rand::rng().random_range(0..1000);
        format!("{}{:03}", Utc::now().timestamp_millis(), suffix)
    }

    async fn notify_quietly(
        &self,
        user_id: i64,
        title: &str,
        message: &str,
        kind: &str,
        action_url: Option<String>,
        ref_id: Option<String>,
    ) {
        if let Err(e) = self
            .notifications
            .notify(user_id, title, message, kind, action_url, ref_id)
            .await
        {
            tracing::warn!(user_id, kind, "Failed to create notification: {}", e);
        }
    }
}

#[async_trait]
impl<P, U, G, N> WalletService for WalletServiceImpl<P, U, G, N>
where
    P: PaymentRepository + 'static,
    U: UserRepository + 'static,
    G: GamePlayerRepository + 'static,
    N: NotificationService + 'static,
{
    async fn balance(&self, user_id: i64) -> Result<i64, WalletError> {
        Ok(self.require_user(user_id).await?.coin)
    }

    async fn top_up(&self, user_id: i64, coin: i64) -> Result<Payment, WalletError> {
        if coin <= 0 {
            return Err(WalletError::InvalidAmount);
        }
        self.require_user(user_id).await?;

        let payment = Payment {
            user_id,
            coin,
            payment_type: PaymentType::Topup,
            method: PaymentMethod::Topup,
            status: PaymentStatus::Completed,
            ..Payment::default()
        };

        let created = self.payment_repo.credit(&payment).await?;
        metrics::record_payment("TOPUP", "COMPLETED", coin);

        self.notify_quietly(
            user_id,
            "Top-up successful",
            &format!("You added {} coins to your wallet.", coin),
            "topup",
            None,
            Some(created.id.to_string()),
        )
        .await;

        Ok(created)
    }

    async fn withdraw(&self, user_id: i64, coin: i64) -> Result<Payment, WalletError> {
        if coin <= 0 {
            return Err(WalletError::InvalidAmount);
        }

        let payment = Payment {
            user_id,
            coin,
            payment_type: PaymentType::Withdraw,
            method: PaymentMethod::Withdraw,
            status: PaymentStatus::Completed,
            ..Payment::default()
        };

        let created = self.payment_repo.debit(&payment).await?;
        metrics::record_payment("WITHDRAW", "COMPLETED", coin);

        self.notify_quietly(
            user_id,
            "Withdrawal successful",
            &format!("You withdrew {} coins from your wallet.", coin),
            "withdraw",
            None,
            Some(created.id.to_string()),
        )
        .await;

        Ok(created)
    }

    async fn hire(
        &self,
        hirer_id: i64,
        game_player_id: i64,
        hours: i64,
    ) -> Result<(Payment, HireOrder), WalletError> {
        if hours <= 0 {
            return Err(WalletError::InvalidAmount);
        }

        let hirer = self.require_user(hirer_id).await?;
        let listing = self.require_listing(game_player_id).await?;

        if listing.user_id == hirer_id {
            return Err(WalletError::SelfTarget);
        }
        if !listing.available {
            return Err(WalletError::ListingUnavailable);
        }

        let coin = listing
            .hourly_rate
            .checked_mul(hours)
            .ok_or(WalletError::InvalidAmount)?;

        let now = Utc::now();
        let payment = Payment {
            user_id: hirer_id,
            game_player_id: Some(game_player_id),
            coin,
            payment_type: PaymentType::Hire,
            method: PaymentMethod::Wallet,
            status: PaymentStatus::Completed,
            description: Some(format!("Hired {} for {} hours", listing.nickname, hours)),
            start_time: Some(now),
            end_time: Some(now + Duration::hours(hours)),
            ..Payment::default()
        };

        let (created, order) = self
            .payment_repo
            .record_hire(&payment, listing.user_id, hours)
            .await?;
        metrics::record_payment("HIRE", "COMPLETED", coin);

        self.notify_quietly(
            listing.user_id,
            "You have been hired!",
            &format!("{} hired you for {} hours.", hirer.display_name(), hours),
            "hire",
            Some(format!("/orders/{}", order.id)),
            Some(created.id.to_string()),
        )
        .await;

        Ok((created, order))
    }

    async fn donate(
        &self,
        donor_id: i64,
        game_player_id: i64,
        coin: i64,
    ) -> Result<Payment, WalletError> {
        if coin <= 0 {
            return Err(WalletError::InvalidAmount);
        }

        let donor = self.require_user(donor_id).await?;
        let listing = self.require_listing(game_player_id).await?;

        if listing.user_id == donor_id {
            return Err(WalletError::SelfTarget);
        }

        let payment = Payment {
            user_id: donor_id,
            game_player_id: Some(game_player_id),
            coin,
            payment_type: PaymentType::Donate,
            method: PaymentMethod::Wallet,
            status: PaymentStatus::Completed,
            description: Some(format!("Donation to {}", listing.nickname)),
            ..Payment::default()
        };

        let created = self.payment_repo.transfer(&payment, listing.user_id).await?;
        metrics::record_payment("DONATE", "COMPLETED", coin);

        self.notify_quietly(
            listing.user_id,
            "You received a donation",
            &format!("{} donated {} coins to you.", donor.display_name(), coin),
            "donate",
            None,
            Some(created.id.to_string()),
        )
        .await;

        Ok(created)
    }

    async fn refund(&self, payment_id: i64) -> Result<Payment, WalletError> {
        let original = self
            .payment_repo
            .find_by_id(payment_id)
            .await?
            .ok_or(WalletError::PaymentNotFound)?;

        let refund = self.payment_repo.refund_hire(payment_id).await?;
        metrics::record_payment("REFUND", "COMPLETED", refund.coin);

        self.notify_quietly(
            original.user_id,
            "Hire refunded",
            &format!("{} coins were returned to your wallet.", refund.coin),
            "refund",
            None,
            Some(refund.id.to_string()),
        )
        .await;

        if let Some(game_player_id) = original.game_player_id {
            if let Ok(listing) = self.require_listing(game_player_id).await {
                self.notify_quietly(
                    listing.user_id,
                    "Hire refunded",
                    &format!(
                        "A hire was refunded and {} coins were deducted from your wallet.",
                        refund.coin
                    ),
                    "refund",
                    None,
                    Some(refund.id.to_string()),
                )
                .await;
            }
        }

        Ok(refund)
    }

    async fn create_vnpay_topup(
        &self,
        user_id: i64,
        amount: i64,
        order_info: &str,
        client_ip: &str,
    ) -> Result<VnPayCheckout, WalletError> {
        if amount <= 0 {
            return Err(WalletError::InvalidAmount);
        }
        self.require_user(user_id).await?;

        let txn_ref = self.new_txn_ref();
        let payment_url = self
            .vnpay
            .build_payment_url(amount, order_info, client_ip, &txn_ref, Utc::now())
            .map_err(|e| WalletError::Internal(e.to_string()))?;

        let payment = Payment {
            user_id,
            coin: amount,
            currency: "VND".to_string(),
            payment_type: PaymentType::Topup,
            method: PaymentMethod::Vnpay,
            status: PaymentStatus::Pending,
            vnp_txn_ref: Some(txn_ref.clone()),
            description: Some(order_info.to_string()),
            ..Payment::default()
        };

        let created = self.payment_repo.create_pending(&payment).await?;
        metrics::record_payment("TOPUP", "PENDING", 0);

        tracing::info!(
            user_id,
            payment_id = created.id,
            txn_ref = %txn_ref,
            amount,
            "Created pending VNPay top-up"
        );

        Ok(VnPayCheckout {
            payment_url,
            txn_ref,
            payment_id: created.id,
        })
    }

    async fn vnpay_return(
        &self,
        params: HashMap<String, String>,
    ) -> Result<VnPayReturn, WalletError> {
        if !self.vnpay.verify_callback(&params) {
            return Err(WalletError::InvalidSignature);
        }

        let txn_ref = params
            .get("vnp_TxnRef")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| WalletError::MalformedCallback("missing vnp_TxnRef".into()))?;
        let response_code = params
            .get("vnp_ResponseCode")
            .ok_or_else(|| WalletError::MalformedCallback("missing vnp_ResponseCode".into()))?;

        let success = response_code == VNP_RESPONSE_SUCCESS;
        let settlement = self.payment_repo.settle_gateway(txn_ref, success).await?;

        match settlement {
            GatewaySettlement::Credited(payment) => {
                metrics::record_payment("TOPUP", "COMPLETED", payment.coin);
                self.notify_quietly(
                    payment.user_id,
                    "Top-up successful",
                    &format!("You added {} coins via VNPay.", payment.coin),
                    "topup_success",
                    None,
                    Some(payment.id.to_string()),
                )
                .await;

                Ok(VnPayReturn {
                    payment: *payment,
                    credited: true,
                    already_settled: false,
                })
            }
            GatewaySettlement::Failed(payment) => {
                metrics::record_payment("TOPUP", "FAILED", 0);
                self.notify_quietly(
                    payment.user_id,
                    "Top-up failed",
                    "The VNPay transaction failed. Please try again or contact support.",
                    "topup_failed",
                    None,
                    Some(payment.id.to_string()),
                )
                .await;

                Ok(VnPayReturn {
                    payment: *payment,
                    credited: false,
                    already_settled: false,
                })
            }
            GatewaySettlement::AlreadySettled(payment) => {
                // Replay: nothing was mutated and nobody is re-notified
                tracing::info!(
                    txn_ref = %txn_ref,
                    status = payment.status.as_str(),
                    "Ignoring replayed gateway callback"
                );

                Ok(VnPayReturn {
                    payment: *payment,
                    credited: false,
                    already_settled: true,
                })
            }
        }
    }

    async fn deposit_instructions(
        &self,
        user_id: i64,
        coin: i64,
        method: &str,
    ) -> Result<DepositInstructions, WalletError> {
        if coin <= 0 {
            return Err(WalletError::InvalidAmount);
        }
        self.require_user(user_id).await?;

        let txn_id = format!("TXN_{}", Utc::now().timestamp_millis());

        let wallet = match method.to_uppercase().as_str() {
            "MOMO" => Some(PaymentMethod::Momo),
            "VNPAY" => Some(PaymentMethod::Vnpay),
            "ZALOPAY" => Some(PaymentMethod::Zalopay),
            _ => None,
        };

        match (wallet, method.to_uppercase().as_str()) {
            (Some(method), _) => {
                let qr_code = gateway::build_wallet_qr(method, coin, user_id, &txn_id);
                Ok(DepositInstructions::Qr {
                    method,
                    qr_code,
                    txn_id,
                })
            }
            (None, "BANK_TRANSFER") => {
                let instructions = gateway::build_bank_instructions(&self.bank, user_id, &txn_id);
                Ok(DepositInstructions::Bank {
                    instructions,
                    txn_id,
                })
            }
            (None, other) => Err(WalletError::UnknownMethod(other.to_string())),
        }
    }

    async fn topup_history(&self, user_id: i64) -> Result<Vec<Payment>, WalletError> {
        Ok(self
            .payment_repo
            .find_by_user_and_type(user_id, PaymentType::Topup)
            .await?)
    }

    async fn hire_history(&self, user_id: i64) -> Result<Vec<Payment>, WalletError> {
        Ok(self
            .payment_repo
            .find_by_user_and_type(user_id, PaymentType::Hire)
            .await?)
    }

    async fn player_hire_history(
        &self,
        game_player_id: i64,
    ) -> Result<Vec<Payment>, WalletError> {
        Ok(self
            .payment_repo
            .find_by_player_and_type(game_player_id, PaymentType::Hire)
            .await?)
    }

    async fn user_payments(&self, user_id: i64) -> Result<Vec<Payment>, WalletError> {
        Ok(self.payment_repo.find_by_user(user_id).await?)
    }

    async fn payments_by_status(
        &self,
        status: PaymentStatus,
    ) -> Result<Vec<Payment>, WalletError> {
        Ok(self.payment_repo.find_by_status(status).await?)
    }

    async fn payments_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Payment>, WalletError> {
        Ok(self.payment_repo.find_by_date_range(start, end).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VnPaySettings;
    use crate::domain::{
        MockGamePlayerRepository, MockPaymentRepository, MockUserRepository,
    };
    use crate::application::services::notification_service::MockNotificationService;
    use mockall::predicate::eq;
    use std::collections::BTreeMap;

    fn vnpay_settings() -> VnPaySettings {
        VnPaySettings {
            tmn_code: "DEMOTMN1".to_string(),
            hash_secret: "TESTSECRET0123456789ABCDEF".to_string(),
            pay_url: "https://sandbox.vnpayment.vn/paymentv2/vpcpay.html".to_string(),
            return_url: "http://localhost:3000/api/v1/payments/vnpay-return".to_string(),
        }
    }

    fn bank_settings() -> BankTransferSettings {
        BankTransferSettings {
            account_number: "123456789".to_string(),
            bank_name: "ABC Bank".to_string(),
            account_owner: "GAMEBUDDY CO LTD".to_string(),
        }
    }

    fn test_user(id: i64, coin: i64) -> User {
        User {
            id,
            username: format!("user{}", id),
            email: format!("user{}@example.com", id),
            coin,
            ..User::default()
        }
    }

    fn test_listing(id: i64, user_id: i64, hourly_rate: i64) -> GamePlayer {
        GamePlayer {
            id,
            user_id,
            game_id: 1,
            nickname: format!("player{}", id),
            hourly_rate,
            ..GamePlayer::default()
        }
    }

    fn service(
        payments: MockPaymentRepository,
        users: MockUserRepository,
        players: MockGamePlayerRepository,
        notifications: MockNotificationService,
    ) -> WalletServiceImpl<
        MockPaymentRepository,
        MockUserRepository,
        MockGamePlayerRepository,
        MockNotificationService,
    > {
        WalletServiceImpl::new(
            Arc::new(payments),
            Arc::new(users),
            Arc::new(players),
            Arc::new(notifications),
            VnPayGateway::new(vnpay_settings()),
            bank_settings(),
        )
    }

    fn quiet_notifications() -> MockNotificationService {
        let mut notifications = MockNotificationService::new();
        notifications.expect_notify().returning(|user_id, title, message, kind, action, r| {
            Ok(crate::domain::Notification {
                id: 1,
                user_id,
                title: title.to_string(),
                message: message.to_string(),
                notification_type: kind.to_string(),
                action_url: action,
                ref_id: r,
                read: false,
                created_at: Utc::now(),
            })
        });
        notifications
    }

    #[tokio::test]
    async fn test_top_up_rejects_non_positive_amount() {
        let svc = service(
            MockPaymentRepository::new(),
            MockUserRepository::new(),
            MockGamePlayerRepository::new(),
            MockNotificationService::new(),
        );

        assert!(matches!(svc.top_up(1, 0).await, Err(WalletError::InvalidAmount)));
        assert!(matches!(svc.top_up(1, -5).await, Err(WalletError::InvalidAmount)));
    }

    #[tokio::test]
    async fn test_withdraw_surfaces_insufficient_balance() {
        let mut payments = MockPaymentRepository::new();
        payments
            .expect_debit()
            .returning(|_| Err(AppError::InsufficientBalance));

        let svc = service(
            payments,
            MockUserRepository::new(),
            MockGamePlayerRepository::new(),
            MockNotificationService::new(),
        );

        assert!(matches!(
            svc.withdraw(1, 100).await,
            Err(WalletError::InsufficientBalance)
        ));
    }

    #[tokio::test]
    async fn test_hire_charges_rate_times_hours_and_notifies_player() {
        let mut payments = MockPaymentRepository::new();
        payments
            .expect_record_hire()
            .withf(|payment, to_user_id, hours| {
                payment.coin == 150 && *to_user_id == 2 && *hours == 3
            })
            .returning(|payment, _, hours| {
                let created = Payment {
                    id: 77,
                    ..payment.clone()
                };
                let order = HireOrder {
                    id: 7,
                    payment_id: 77,
                    user_id: payment.user_id,
                    game_player_id: payment.game_player_id.unwrap(),
                    hours,
                    created_at: Utc::now(),
                };
                Ok((created, order))
            });

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .with(eq(1))
            .returning(|id| Ok(Some(test_user(id, 1000))));

        let mut players = MockGamePlayerRepository::new();
        players
            .expect_find_by_id()
            .with(eq(10))
            .returning(|id| Ok(Some(test_listing(id, 2, 50))));

        let svc = service(payments, users, players, quiet_notifications());

        let (payment, order) = svc.hire(1, 10, 3).await.unwrap();
        assert_eq!(payment.coin, 150);
        assert_eq!(payment.payment_type, PaymentType::Hire);
        assert_eq!(order.hours, 3);
        assert!(payment.end_time.unwrap() > payment.start_time.unwrap());
    }

    #[tokio::test]
    async fn test_hire_own_listing_is_rejected() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(|id| Ok(Some(test_user(id, 1000))));

        let mut players = MockGamePlayerRepository::new();
        // Listing owned by the same user who is hiring
        players
            .expect_find_by_id()
            .returning(|id| Ok(Some(test_listing(id, 1, 50))));

        let svc = service(
            MockPaymentRepository::new(),
            users,
            players,
            MockNotificationService::new(),
        );

        assert!(matches!(svc.hire(1, 10, 2).await, Err(WalletError::SelfTarget)));
    }

    #[tokio::test]
    async fn test_hire_unavailable_listing_is_rejected() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(|id| Ok(Some(test_user(id, 1000))));

        let mut players = MockGamePlayerRepository::new();
        players.expect_find_by_id().returning(|id| {
            let mut listing = test_listing(id, 2, 50);
            listing.available = false;
            Ok(Some(listing))
        });

        let svc = service(
            MockPaymentRepository::new(),
            users,
            players,
            MockNotificationService::new(),
        );

        assert!(matches!(
            svc.hire(1, 10, 2).await,
            Err(WalletError::ListingUnavailable)
        ));
    }

    fn signed_callback(txn_ref: &str, response_code: &str) -> HashMap<String, String> {
        // Build a callback signed the way the gateway would sign it
        let mut params = HashMap::new();
        params.insert("vnp_TxnRef".to_string(), txn_ref.to_string());
        params.insert("vnp_ResponseCode".to_string(), response_code.to_string());
        params.insert("vnp_Amount".to_string(), "5000000".to_string());

        let sorted: BTreeMap<&str, &str> = params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let hash_data = sorted
            .iter()
            .map(|(k, v)| {
                format!(
                    "{}={}",
                    k,
                    url::form_urlencoded::byte_serialize(v.as_bytes()).collect::<String>()
                )
            })
            .collect::<Vec<_>>()
            .join("&");

        use hmac::{Hmac, Mac};
        let mut mac =
            Hmac::<sha2::Sha512>::new_from_slice(vnpay_settings().hash_secret.as_bytes()).unwrap();
        mac.update(hash_data.as_bytes());
        params.insert(
            "vnp_SecureHash".to_string(),
            hex::encode(mac.finalize().into_bytes()),
        );
        params
    }

    #[tokio::test]
    async fn test_vnpay_return_rejects_bad_signature() {
        let svc = service(
            MockPaymentRepository::new(),
            MockUserRepository::new(),
            MockGamePlayerRepository::new(),
            MockNotificationService::new(),
        );

        let mut params =
            signed_callback("123", "00");
        params.insert("vnp_Amount".to_string(), "1".to_string());

        assert!(matches!(
            svc.vnpay_return(params).await,
            Err(WalletError::InvalidSignature)
        ));
    }

    #[tokio::test]
    async fn test_vnpay_return_credits_on_success_code() {
        let mut payments = MockPaymentRepository::new();
        payments
            .expect_settle_gateway()
            .withf(|txn_ref, success| txn_ref == "123" && *success)
            .returning(|_, _| {
                Ok(GatewaySettlement::Credited(Box::new(Payment {
                    id: 9,
                    user_id: 1,
                    coin: 50_000,
                    status: PaymentStatus::Completed,
                    ..Payment::default()
                })))
            });

        let svc = service(
            payments,
            MockUserRepository::new(),
            MockGamePlayerRepository::new(),
            quiet_notifications(),
        );

        let params = signed_callback("123", "00");
        let result = svc.vnpay_return(params).await.unwrap();
        assert!(result.credited);
        assert!(!result.already_settled);
    }

    #[tokio::test]
    async fn test_vnpay_return_marks_failed_on_error_code() {
        let mut payments = MockPaymentRepository::new();
        payments
            .expect_settle_gateway()
            .withf(|txn_ref, success| txn_ref == "123" && !*success)
            .returning(|_, _| {
                Ok(GatewaySettlement::Failed(Box::new(Payment {
                    id: 9,
                    user_id: 1,
                    coin: 50_000,
                    status: PaymentStatus::Failed,
                    ..Payment::default()
                })))
            });

        let svc = service(
            payments,
            MockUserRepository::new(),
            MockGamePlayerRepository::new(),
            quiet_notifications(),
        );

        let params = signed_callback("123", "24");
        let result = svc.vnpay_return(params).await.unwrap();
        assert!(!result.credited);
        assert!(!result.already_settled);
    }

    #[tokio::test]
    async fn test_vnpay_return_replay_does_not_recredit_or_notify() {
        let mut payments = MockPaymentRepository::new();
        payments.expect_settle_gateway().returning(|_, _| {
            Ok(GatewaySettlement::AlreadySettled(Box::new(Payment {
                id: 9,
                user_id: 1,
                coin: 50_000,
                status: PaymentStatus::Completed,
                ..Payment::default()
            })))
        });

        // No notify expectation: a replay must not notify
        let svc = service(
            payments,
            MockUserRepository::new(),
            MockGamePlayerRepository::new(),
            MockNotificationService::new(),
        );

        let params = signed_callback("123", "00");
        let result = svc.vnpay_return(params).await.unwrap();
        assert!(!result.credited);
        assert!(result.already_settled);
    }

    #[tokio::test]
    async fn test_deposit_unknown_method_is_rejected() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(|id| Ok(Some(test_user(id, 0))));

        let svc = service(
            MockPaymentRepository::new(),
            users,
            MockGamePlayerRepository::new(),
            MockNotificationService::new(),
        );

        assert!(matches!(
            svc.deposit_instructions(1, 100, "PAYPAL").await,
            Err(WalletError::UnknownMethod(_))
        ));
    }

    #[tokio::test]
    async fn test_deposit_bank_transfer_contains_reference() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(|id| Ok(Some(test_user(id, 0))));

        let svc = service(
            MockPaymentRepository::new(),
            users,
            MockGamePlayerRepository::new(),
            MockNotificationService::new(),
        );

        match svc.deposit_instructions(42, 100, "bank_transfer").await.unwrap() {
            DepositInstructions::Bank { instructions, txn_id } => {
                assert_eq!(
                    instructions.transfer_content,
                    format!("NAPTIEN_42_{}", txn_id)
                );
            }
            other => panic!("Expected bank instructions, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_refund_maps_conflict_to_not_refundable() {
        let mut payments = MockPaymentRepository::new();
        payments.expect_find_by_id().returning(|id| {
            Ok(Some(Payment {
                id,
                user_id: 1,
                coin: 100,
                payment_type: PaymentType::Topup,
                ..Payment::default()
            }))
        });
        payments
            .expect_refund_hire()
            .returning(|_| Err(AppError::Conflict("Payment is not a refundable hire".into())));

        let svc = service(
            payments,
            MockUserRepository::new(),
            MockGamePlayerRepository::new(),
            MockNotificationService::new(),
        );

        assert!(matches!(
            svc.refund(5).await,
            Err(WalletError::NotRefundable)
        ));
    }
}
