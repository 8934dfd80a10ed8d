//! Configuration Module
//!
//! Application settings loaded from files and environment variables.

mod settings;

pub use settings::{
    BankTransferSettings, CorsSettings, DatabaseSettings, JwtSettings, RateLimitSettings,
    RedisSettings, ServerSettings, Settings, SnowflakeSettings, VnPaySettings,
    MIN_JWT_SECRET_LENGTH,
};
