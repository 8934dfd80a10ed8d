//! External collaborators: payment gateways and push delivery.

pub mod push;
pub mod qr;
pub mod vnpay;

pub use push::{PushSender, TracingPushSender};
pub use qr::{build_bank_instructions, build_wallet_qr, BankInstructions};
pub use vnpay::VnPayGateway;
