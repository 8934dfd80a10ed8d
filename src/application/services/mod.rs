//! Application Services
//!
//! Business logic services orchestrating domain entities and repositories.

mod auth_service;
mod game_service;
mod moment_service;
mod notification_service;
mod player_service;
mod report_service;
mod review_service;
mod user_service;
mod wallet_service;

pub use auth_service::{AuthError, AuthService, AuthServiceImpl, AuthTokens, Claims};
pub use game_service::{GameError, GameService, GameServiceImpl, GameWithPlayerCount};
pub use moment_service::{MomentError, MomentService, MomentServiceImpl, NewMoment};
pub use notification_service::{
    NotificationError, NotificationService, NotificationServiceImpl,
};
pub use player_service::{NewListing, PlayerError, PlayerService, PlayerServiceImpl, UpdateListing};
pub use report_service::{NewReport, ReportError, ReportService, ReportServiceImpl};
pub use review_service::{PlayerReviews, ReviewError, ReviewService, ReviewServiceImpl};
pub use user_service::{UpdateProfileDto, UserError, UserService, UserServiceImpl};
pub use wallet_service::{
    DepositInstructions, VnPayCheckout, VnPayReturn, WalletError, WalletService, WalletServiceImpl,
};
