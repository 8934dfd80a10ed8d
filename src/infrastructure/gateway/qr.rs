//! QR and bank-transfer deposit instructions.
//!
//! Mobile wallet deposits (MoMo, VNPay app, ZaloPay) are initiated by the
//! client scanning a QR payload; bank transfers use a static account plus a
//! reference string the reconciliation job matches on.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Serialize;

use crate::config::BankTransferSettings;
use crate::domain::PaymentMethod;

/// Payload version embedded in QR codes.
const QR_VERSION: &str = "1";

/// Bank transfer instructions returned to the client.
#[derive(Debug, Clone, Serialize)]
pub struct BankInstructions {
    pub bank_account: String,
    pub bank_name: String,
    pub bank_owner: String,
    /// Must be used verbatim as the transfer note
    pub transfer_content: String,
}

/// Build the base64 QR payload for a wallet deposit.
///
/// The payload is what the client renders as a QR image:
/// `GBQR|1|<METHOD>|<coin>|<user_id>|<txn_id>`.
pub fn build_wallet_qr(method: PaymentMethod, coin: i64, user_id: i64, txn_id: &str) -> String {
    let payload = format!(
        "GBQR|{}|{}|{}|{}|{}",
        QR_VERSION,
        method.as_str(),
        coin,
        user_id,
        txn_id
    );
    BASE64.encode(payload)
}

/// Build bank transfer instructions for a deposit.
pub fn build_bank_instructions(
    settings: &BankTransferSettings,
    user_id: i64,
    txn_id: &str,
) -> BankInstructions {
    BankInstructions {
        bank_account: settings.account_number.clone(),
        bank_name: settings.bank_name.clone(),
        bank_owner: settings.account_owner.clone(),
        transfer_content: format!("NAPTIEN_{}_{}", user_id, txn_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qr_payload_roundtrip() {
        let qr = build_wallet_qr(PaymentMethod::Momo, 500, 42, "TXN_1700000000000");
        let decoded = BASE64.decode(qr).unwrap();
        assert_eq!(
            String::from_utf8(decoded).unwrap(),
            "GBQR|1|MOMO|500|42|TXN_1700000000000"
        );
    }

    #[test]
    fn test_bank_transfer_content() {
        let settings = BankTransferSettings {
            account_number: "123456789".into(),
            bank_name: "ABC Bank".into(),
            account_owner: "GAMEBUDDY CO LTD".into(),
        };
        let instructions = build_bank_instructions(&settings, 42, "TXN_1");
        assert_eq!(instructions.transfer_content, "NAPTIEN_42_TXN_1");
        assert_eq!(instructions.bank_account, "123456789");
    }
}
