//! # Domain Entities
//!
//! Core domain entities representing the main business objects of the
//! hire-a-player marketplace. All entities map directly to their
//! corresponding database tables.
//!
//! ## Core Entities
//!
//! - **User**: Account with profile, roles, and the coin wallet balance
//! - **Game**: A game players can register listings for
//! - **GamePlayer**: A player-companion listing for a game
//! - **Payment**: Ledger row for every wallet mutation
//! - **HireOrder**: A hire contract backed by a Hire payment
//!
//! ## Supporting Entities
//!
//! - **Session**: Refresh-token sessions
//! - **PasswordResetToken**: Single-use reset tokens
//! - **PlayerReview**: Post-hire reviews
//! - **Moment** / **PlayerFollow**: Social feed
//! - **Report**: Abuse reports
//! - **Notification**: In-app notifications
//!
//! ## Repository Traits
//!
//! Each entity has an associated repository trait defining data access
//! operations. These traits are implemented in the infrastructure layer,
//! following the dependency inversion principle.

mod follow;
mod game;
mod game_player;
mod moment;
mod notification;
mod payment;
mod report;
mod review;
mod session;
mod user;

pub use user::{Role, User, UserRepository};

pub use game::{Game, GameRepository, GameStatus};

pub use game_player::{GamePlayer, GamePlayerRepository, PlayerStats, PlayerSummary};

pub use payment::{
    GatewaySettlement, HireOrder, Payment, PaymentMethod, PaymentRepository, PaymentStatus,
    PaymentType,
};

pub use review::{PlayerReview, ReviewRepository};

pub use moment::{
    Moment, MomentRepository, MomentStatus, MAX_MOMENT_CONTENT, MAX_MOMENT_IMAGES,
};

pub use follow::{FollowRepository, PlayerFollow};

pub use report::{Report, ReportRepository, ReportStatus};

pub use notification::{Notification, NotificationRepository};

pub use session::{PasswordResetToken, PasswordResetTokenRepository, Session, SessionRepository};

#[cfg(test)]
pub use game_player::MockGamePlayerRepository;
#[cfg(test)]
pub use payment::MockPaymentRepository;
#[cfg(test)]
pub use review::MockReviewRepository;
#[cfg(test)]
pub use user::MockUserRepository;
