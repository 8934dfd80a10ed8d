//! Repository Implementations
//!
//! PostgreSQL implementations of the domain repository traits.

mod follow_repository;
mod game_player_repository;
mod game_repository;
mod moment_repository;
mod notification_repository;
mod payment_repository;
mod report_repository;
mod review_repository;
mod session_repository;
mod user_repository;

pub use follow_repository::PgFollowRepository;
pub use game_player_repository::PgGamePlayerRepository;
pub use game_repository::PgGameRepository;
pub use moment_repository::PgMomentRepository;
pub use notification_repository::PgNotificationRepository;
pub use payment_repository::PgPaymentRepository;
pub use report_repository::PgReportRepository;
pub use review_repository::PgReviewRepository;
pub use session_repository::{PgPasswordResetTokenRepository, PgSessionRepository};
pub use user_repository::PgUserRepository;
