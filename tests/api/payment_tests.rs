//! Payment Gateway Tests
//!
//! End-to-end exercise of the VNPay URL construction / callback
//! verification pair and the deposit instruction builders, using the same
//! code paths the handlers run. Ledger mutations themselves are covered by
//! the service tests with mocked repositories.

use std::collections::HashMap;

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;

use gamebuddy_server::config::{BankTransferSettings, VnPaySettings};
use gamebuddy_server::domain::PaymentMethod;
use gamebuddy_server::infrastructure::gateway::{
    build_bank_instructions, build_wallet_qr, VnPayGateway,
};

fn gateway() -> VnPayGateway {
    VnPayGateway::new(VnPaySettings {
        tmn_code: "TESTTMN1".to_string(),
        hash_secret: "integration-test-secret-0123456789".to_string(),
        pay_url: "https://sandbox.vnpayment.vn/paymentv2/vpcpay.html".to_string(),
        return_url: "http://localhost:3000/api/v1/payments/vnpay-return".to_string(),
    })
}

/// Extract query parameters from a payment URL the way the gateway would
/// echo them back in the return redirect.
fn params_from_url(url: &str) -> HashMap<String, String> {
    let query = url.split_once('?').expect("URL has a query").1;
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

#[test]
fn test_payment_url_signature_survives_roundtrip() {
    let create_date = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let url = gateway()
        .build_payment_url(25_000, "Top up", "203.0.113.7", "1717243200000", create_date)
        .unwrap();

    // The gateway echoes the signed params back on the return URL; a
    // faithful echo must verify
    let params = params_from_url(&url);
    assert!(gateway().verify_callback(&params));
}

#[test]
fn test_tampered_echo_fails_verification() {
    let url = gateway()
        .build_payment_url(25_000, "Top up", "203.0.113.7", "1717243200001", Utc::now())
        .unwrap();

    let mut params = params_from_url(&url);
    // A man in the middle bumps the amount
    params.insert("vnp_Amount".to_string(), "99900000".to_string());

    assert!(!gateway().verify_callback(&params));
}

#[test]
fn test_payment_url_applies_amount_factor() {
    let url = gateway()
        .build_payment_url(25_000, "Top up", "203.0.113.7", "1717243200002", Utc::now())
        .unwrap();

    let params = params_from_url(&url);
    // VNPay amounts carry two implied decimal places
    assert_eq!(params.get("vnp_Amount").map(String::as_str), Some("2500000"));
    assert_eq!(params.get("vnp_CurrCode").map(String::as_str), Some("VND"));
    assert_eq!(params.get("vnp_Version").map(String::as_str), Some("2.1.0"));
}

#[test]
fn test_wallet_qr_payload_is_decodable() {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    let qr = build_wallet_qr(PaymentMethod::Zalopay, 750, 31337, "TXN_123");
    let payload = String::from_utf8(STANDARD.decode(qr).unwrap()).unwrap();

    assert_eq!(payload, "GBQR|1|ZALOPAY|750|31337|TXN_123");
}

#[test]
fn test_bank_instructions_embed_reference() {
    let settings = BankTransferSettings {
        account_number: "987654321".to_string(),
        bank_name: "Test Bank".to_string(),
        account_owner: "TEST OWNER".to_string(),
    };

    let instructions = build_bank_instructions(&settings, 7, "TXN_9");
    assert_eq!(instructions.bank_account, "987654321");
    assert_eq!(instructions.transfer_content, "NAPTIEN_7_TXN_9");
}
