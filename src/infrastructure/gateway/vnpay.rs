//! VNPay payment gateway client.
//!
//! Builds the hosted-checkout redirect URL and verifies return callbacks.
//! The gateway protocol: request parameters are sorted alphabetically by
//! key, values are form-url-encoded, the `k=v` pairs are joined with `&`,
//! and the whole string is signed with HMAC-SHA512 under the merchant
//! secret. The signature travels as `vnp_SecureHash` and must survive a
//! round trip through the user's browser untouched.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha512;
use url::form_urlencoded::byte_serialize;

use crate::config::VnPaySettings;
use crate::shared::error::AppError;

type HmacSha512 = Hmac<Sha512>;

/// Gateway API version sent with every request.
const VNP_VERSION: &str = "2.1.0";

/// Parameters stripped before verifying a callback signature.
const SIGNATURE_PARAMS: [&str; 2] = ["vnp_SecureHash", "vnp_SecureHashType"];

/// VNPay gateway client.
#[derive(Clone)]
pub struct VnPayGateway {
    settings: VnPaySettings,
}

impl VnPayGateway {
    pub fn new(settings: VnPaySettings) -> Self {
        Self { settings }
    }

    /// Build the hosted-checkout URL for a top-up.
    ///
    /// `amount` is in VND; the gateway expects the value multiplied by 100.
    /// `create_date` is passed in so callers control the clock.
    pub fn build_payment_url(
        &self,
        amount: i64,
        order_info: &str,
        client_ip: &str,
        txn_ref: &str,
        create_date: DateTime<Utc>,
    ) -> Result<String, AppError> {
        if amount <= 0 {
            return Err(AppError::BadRequest("Amount must be positive".into()));
        }

        let mut params: BTreeMap<&str, String> = BTreeMap::new();
        params.insert("vnp_Version", VNP_VERSION.to_string());
        params.insert("vnp_Command", "pay".to_string());
        params.insert("vnp_TmnCode", self.settings.tmn_code.clone());
        // Gateway amounts carry two implied decimal places
        params.insert("vnp_Amount", (amount * 100).to_string());
        params.insert("vnp_CurrCode", "VND".to_string());
        params.insert("vnp_TxnRef", txn_ref.to_string());
        params.insert("vnp_OrderInfo", order_info.to_string());
        params.insert("vnp_OrderType", "other".to_string());
        params.insert("vnp_Locale", "vn".to_string());
        params.insert("vnp_ReturnUrl", self.settings.return_url.clone());
        params.insert("vnp_IpAddr", client_ip.to_string());
        params.insert(
            "vnp_CreateDate",
            create_date.format("%Y%m%d%H%M%S").to_string(),
        );

        let hash_data = canonicalize(params.iter().map(|(k, v)| (*k, v.as_str())));
        let secure_hash = self.sign(&hash_data);

        // In the query string both key and value are encoded; keys here are
        // plain ASCII so the encoded query equals the hash data.
        let query: String = params
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        Ok(format!(
            "{}?{}&vnp_SecureHash={}",
            self.settings.pay_url, query, secure_hash
        ))
    }

    /// Verify the signature of a return/IPN callback.
    ///
    /// Strips the signature parameters, re-canonicalizes what is left and
    /// compares the recomputed mac case-insensitively against the received
    /// one. Returns false when the signature is absent.
    pub fn verify_callback(&self, params: &HashMap<String, String>) -> bool {
        let received = match params.get("vnp_SecureHash") {
            Some(h) if !h.is_empty() => h,
            _ => return false,
        };

        let filtered: BTreeMap<&str, &str> = params
            .iter()
            .filter(|(k, _)| !SIGNATURE_PARAMS.contains(&k.as_str()))
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();

        let hash_data = canonicalize(filtered.into_iter());
        let calculated = self.sign(&hash_data);

        calculated.eq_ignore_ascii_case(received)
    }

    /// Lowercase hex HMAC-SHA512 of `data` under the merchant secret.
    fn sign(&self, data: &str) -> String {
        let mut mac = HmacSha512::new_from_slice(self.settings.hash_secret.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(data.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

/// Join non-empty params as `key=encoded_value` pairs, `&`-separated.
/// The iterator must already be sorted by key.
fn canonicalize<'a>(params: impl Iterator<Item = (&'a str, &'a str)>) -> String {
    params
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| format!("{}={}", k, encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// x-www-form-urlencoded percent encoding (space becomes '+').
fn encode(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn gateway() -> VnPayGateway {
        VnPayGateway::new(VnPaySettings {
            tmn_code: "DEMOTMN1".to_string(),
            hash_secret: "TESTSECRET0123456789ABCDEF".to_string(),
            pay_url: "https://sandbox.vnpayment.vn/paymentv2/vpcpay.html".to_string(),
            return_url: "http://localhost:3000/api/v1/payments/vnpay-return".to_string(),
        })
    }

    #[test]
    fn test_encode_is_form_urlencoded() {
        assert_eq!(encode("Top up 50000 coins"), "Top+up+50000+coins");
        assert_eq!(encode("http://a/b"), "http%3A%2F%2Fa%2Fb");
        assert_eq!(encode("a-b_c.d"), "a-b_c.d");
    }

    #[test]
    fn test_sign_matches_known_vector() {
        // hmac-sha512("hello=world") under the test secret, computed with an
        // independent implementation
        let mac = gateway().sign("hello=world");
        assert_eq!(
            mac,
            "177d79af2b05f53471107e49dfa24ed9f6d1b6ffdda215de67fb16f71180bda4\
             cbbcfde137dbe87f02e6797a9d18cf1d9d89c107307b2bcf690477a659884a2e"
        );
    }

    #[test]
    fn test_payment_url_canonical_form() {
        let create_date = Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap();
        let url = gateway()
            .build_payment_url(
                50_000,
                "Top up 50000 coins",
                "127.0.0.1",
                "1700000000000",
                create_date,
            )
            .unwrap();

        // Params appear alphabetically and the amount carries the x100 factor
        assert!(url.starts_with(
            "https://sandbox.vnpayment.vn/paymentv2/vpcpay.html?vnp_Amount=5000000&vnp_Command=pay"
        ));
        assert!(url.contains("vnp_OrderInfo=Top+up+50000+coins"));
        assert!(url.contains(
            "vnp_ReturnUrl=http%3A%2F%2Flocalhost%3A3000%2Fapi%2Fv1%2Fpayments%2Fvnpay-return"
        ));
        // Signature computed with an independent implementation over the
        // sorted, encoded hash data
        assert!(url.ends_with(
            "&vnp_SecureHash=2f6b7b307b671c675e5291f63b74b4f644d54c8a732efb3a27f70a97e4609bbf\
             f810cfe64185b0666a834bdbd18a01cef60f076ee8a60abbf474420a665666aa"
        ));
    }

    #[test]
    fn test_rejects_non_positive_amount() {
        let result = gateway().build_payment_url(0, "x", "127.0.0.1", "1", Utc::now());
        assert!(result.is_err());
    }

    fn callback_params(gw: &VnPayGateway) -> HashMap<String, String> {
        let mut params = HashMap::new();
        params.insert("vnp_Amount".to_string(), "5000000".to_string());
        params.insert("vnp_TxnRef".to_string(), "1700000000000".to_string());
        params.insert("vnp_ResponseCode".to_string(), "00".to_string());
        params.insert("vnp_TmnCode".to_string(), "DEMOTMN1".to_string());

        let sorted: BTreeMap<&str, &str> = params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let mac = gw.sign(&canonicalize(sorted.into_iter()));
        params.insert("vnp_SecureHash".to_string(), mac);
        params
    }

    #[test]
    fn test_verify_accepts_valid_callback() {
        let gw = gateway();
        let params = callback_params(&gw);
        assert!(gw.verify_callback(&params));
    }

    #[test]
    fn test_verify_is_case_insensitive_on_mac() {
        let gw = gateway();
        let mut params = callback_params(&gw);
        let upper = params.get("vnp_SecureHash").unwrap().to_uppercase();
        params.insert("vnp_SecureHash".to_string(), upper);
        assert!(gw.verify_callback(&params));
    }

    #[test]
    fn test_verify_rejects_tampered_amount() {
        let gw = gateway();
        let mut params = callback_params(&gw);
        params.insert("vnp_Amount".to_string(), "9900000".to_string());
        assert!(!gw.verify_callback(&params));
    }

    #[test]
    fn test_verify_rejects_missing_signature() {
        let gw = gateway();
        let mut params = callback_params(&gw);
        params.remove("vnp_SecureHash");
        assert!(!gw.verify_callback(&params));
    }

    #[test]
    fn test_verify_ignores_hash_type_param() {
        let gw = gateway();
        let mut params = callback_params(&gw);
        // Gateways may append the hash type; it must not break verification
        params.insert("vnp_SecureHashType".to_string(), "HMACSHA512".to_string());
        assert!(gw.verify_callback(&params));
    }

    #[test]
    fn test_empty_values_are_skipped_in_hash_data() {
        let gw = gateway();
        let mut params = callback_params(&gw);
        // An empty param must not change the signature
        params.insert("vnp_BankCode".to_string(), String::new());
        assert!(gw.verify_callback(&params));
    }
}
