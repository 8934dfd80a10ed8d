//! Review Service
//!
//! Post-hire reviews: only the hirer may review, only after the hire
//! window ended, and only once per order.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::{PaymentRepository, PlayerReview, ReviewRepository};

/// Aggregated review listing for a player.
#[derive(Debug, Clone)]
pub struct PlayerReviews {
    pub reviews: Vec<PlayerReview>,
    pub average_rating: f64,
    pub review_count: i64,
}

/// Review service trait
#[async_trait]
pub trait ReviewService: Send + Sync {
    /// Review the player hired through `payment_id`.
    async fn review_hire(
        &self,
        reviewer_id: i64,
        payment_id: i64,
        rating: i32,
        comment: Option<String>,
    ) -> Result<PlayerReview, ReviewError>;

    /// All reviews of a listing with the aggregate rating.
    async fn player_reviews(&self, game_player_id: i64) -> Result<PlayerReviews, ReviewError>;
}

/// Review service errors
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("Payment not found")]
    PaymentNotFound,

    #[error("No hire order for this payment")]
    OrderNotFound,

    #[error("Only the hirer may review")]
    NotHirer,

    #[error("The hire has not finished yet")]
    HireNotFinished,

    #[error("This hire has already been reviewed")]
    AlreadyReviewed,

    #[error("Rating must be between 1 and 5")]
    InvalidRating,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// ReviewService implementation
pub struct ReviewServiceImpl<R, P>
where
    R: ReviewRepository,
    P: PaymentRepository,
{
    review_repo: Arc<R>,
    payment_repo: Arc<P>,
}

impl<R, P> ReviewServiceImpl<R, P>
where
    R: ReviewRepository,
    P: PaymentRepository,
{
    pub fn new(review_repo: Arc<R>, payment_repo: Arc<P>) -> Self {
        Self {
            review_repo,
            payment_repo,
        }
    }
}

#[async_trait]
impl<R, P> ReviewService for ReviewServiceImpl<R, P>
where
    R: ReviewRepository + 'static,
    P: PaymentRepository + 'static,
{
    async fn review_hire(
        &self,
        reviewer_id: i64,
        payment_id: i64,
        rating: i32,
        comment: Option<String>,
    ) -> Result<PlayerReview, ReviewError> {
        if !(1..=5).contains(&rating) {
            return Err(ReviewError::InvalidRating);
        }

        let payment = self
            .payment_repo
            .find_by_id(payment_id)
            .await
            .map_err(|e| ReviewError::Internal(e.to_string()))?
            .ok_or(ReviewError::PaymentNotFound)?;

        if payment.user_id != reviewer_id {
            return Err(ReviewError::NotHirer);
        }

        if !payment.hire_finished() {
            return Err(ReviewError::HireNotFinished);
        }

        let order = self
            .payment_repo
            .find_order_by_payment(payment_id)
            .await
            .map_err(|e| ReviewError::Internal(e.to_string()))?
            .ok_or(ReviewError::OrderNotFound)?;

        if self
            .review_repo
            .exists_by_order(order.id)
            .await
            .map_err(|e| ReviewError::Internal(e.to_string()))?
        {
            return Err(ReviewError::AlreadyReviewed);
        }

        let review = PlayerReview {
            id: 0,
            game_player_id: order.game_player_id,
            reviewer_id,
            order_id: order.id,
            rating,
            comment,
            created_at: Utc::now(),
        };

        self.review_repo.create(&review).await.map_err(|e| match e {
            crate::shared::error::AppError::Conflict(_) => ReviewError::AlreadyReviewed,
            e => ReviewError::Internal(e.to_string()),
        })
    }

    async fn player_reviews(&self, game_player_id: i64) -> Result<PlayerReviews, ReviewError> {
        let reviews = self
            .review_repo
            .find_by_player(game_player_id)
            .await
            .map_err(|e| ReviewError::Internal(e.to_string()))?;

        let average_rating = self
            .review_repo
            .average_rating(game_player_id)
            .await
            .map_err(|e| ReviewError::Internal(e.to_string()))?
            .unwrap_or(0.0);

        let review_count = reviews.len() as i64;

        Ok(PlayerReviews {
            reviews,
            average_rating,
            review_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        HireOrder, MockPaymentRepository, MockReviewRepository, Payment, PaymentType,
    };
    use chrono::Duration;

    fn hire_payment(id: i64, user_id: i64, finished: bool) -> Payment {
        let now = Utc::now();
        let shift = if finished {
            -Duration::hours(1)
        } else {
            Duration::hours(1)
        };
        Payment {
            id,
            user_id,
            game_player_id: Some(10),
            coin: 100,
            payment_type: PaymentType::Hire,
            start_time: Some(now - Duration::hours(2)),
            end_time: Some(now + shift),
            ..Payment::default()
        }
    }

    fn order_for(payment_id: i64) -> HireOrder {
        HireOrder {
            id: 5,
            payment_id,
            user_id: 1,
            game_player_id: 10,
            hours: 2,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_review_rejects_out_of_range_rating() {
        let svc = ReviewServiceImpl::new(
            Arc::new(MockReviewRepository::new()),
            Arc::new(MockPaymentRepository::new()),
        );

        assert!(matches!(
            svc.review_hire(1, 1, 0, None).await,
            Err(ReviewError::InvalidRating)
        ));
        assert!(matches!(
            svc.review_hire(1, 1, 6, None).await,
            Err(ReviewError::InvalidRating)
        ));
    }

    #[tokio::test]
    async fn test_review_rejects_non_hirer() {
        let mut payments = MockPaymentRepository::new();
        payments
            .expect_find_by_id()
            .returning(|id| Ok(Some(hire_payment(id, 1, true))));

        let svc = ReviewServiceImpl::new(Arc::new(MockReviewRepository::new()), Arc::new(payments));

        assert!(matches!(
            svc.review_hire(2, 7, 5, None).await,
            Err(ReviewError::NotHirer)
        ));
    }

    #[tokio::test]
    async fn test_review_rejects_unfinished_hire() {
        let mut payments = MockPaymentRepository::new();
        payments
            .expect_find_by_id()
            .returning(|id| Ok(Some(hire_payment(id, 1, false))));

        let svc = ReviewServiceImpl::new(Arc::new(MockReviewRepository::new()), Arc::new(payments));

        assert!(matches!(
            svc.review_hire(1, 7, 5, None).await,
            Err(ReviewError::HireNotFinished)
        ));
    }

    #[tokio::test]
    async fn test_review_rejects_duplicate() {
        let mut payments = MockPaymentRepository::new();
        payments
            .expect_find_by_id()
            .returning(|id| Ok(Some(hire_payment(id, 1, true))));
        payments
            .expect_find_order_by_payment()
            .returning(|payment_id| Ok(Some(order_for(payment_id))));

        let mut reviews = MockReviewRepository::new();
        reviews.expect_exists_by_order().returning(|_| Ok(true));

        let svc = ReviewServiceImpl::new(Arc::new(reviews), Arc::new(payments));

        assert!(matches!(
            svc.review_hire(1, 7, 5, None).await,
            Err(ReviewError::AlreadyReviewed)
        ));
    }

    #[tokio::test]
    async fn test_review_happy_path() {
        let mut payments = MockPaymentRepository::new();
        payments
            .expect_find_by_id()
            .returning(|id| Ok(Some(hire_payment(id, 1, true))));
        payments
            .expect_find_order_by_payment()
            .returning(|payment_id| Ok(Some(order_for(payment_id))));

        let mut reviews = MockReviewRepository::new();
        reviews.expect_exists_by_order().returning(|_| Ok(false));
        reviews.expect_create().returning(|review| {
            Ok(PlayerReview {
                id: 1,
                ..review.clone()
            })
        });

        let svc = ReviewServiceImpl::new(Arc::new(reviews), Arc::new(payments));

        let review = svc
            .review_hire(1, 7, 4, Some("great teammate".to_string()))
            .await
            .unwrap();
        assert_eq!(review.rating, 4);
        assert_eq!(review.order_id, 5);
        assert_eq!(review.game_player_id, 10);
    }
}
