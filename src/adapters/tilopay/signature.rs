use {
    crate::domain::error::CheckoutError,
    axum::http::HeaderMap,
    hmac::{Hmac, Mac},
    sha2::Sha256,
};

type HmacSha256 = Hmac<Sha256>;

pub const SECRET_HEADER: &str = "x-tilopay-secret";
pub const HASH_HEADER: &str = "hash-tilopay";

/// How an inbound notification was authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureCheck {
    /// No secret configured: accepted without checking.
    Unconfigured,
    SharedSecret,
    Hmac,
}

/// Hex HMAC-SHA256 of `body` keyed with `secret`.
pub fn sign(secret: &str, body: &[u8]) -> Result<String, CheckoutError> {
    Ok(hex::encode(keyed(secret, body)?.finalize().into_bytes()))
}

fn keyed(secret: &str, body: &[u8]) -> Result<HmacSha256, CheckoutError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| CheckoutError::Auth(e.to_string()))?;
    mac.update(body);
    Ok(mac)
}

pub fn verify_headers(
    secret: Option<&str>,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<SignatureCheck, CheckoutError> {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    verify(secret, header(SECRET_HEADER), header(HASH_HEADER), body)
}

/// With a secret configured this fails closed: either the shared-secret
/// header matches, or the hash header carries a valid HMAC of the raw body.
pub fn verify(
    secret: Option<&str>,
    shared_secret: Option<&str>,
    hash: Option<&str>,
    body: &[u8],
) -> Result<SignatureCheck, CheckoutError> {
    let Some(secret) = secret.filter(|s| !s.is_empty()) else {
        tracing::warn!("webhook secret not configured, accepting notification unverified");
        return Ok(SignatureCheck::Unconfigured);
    };

    if let Some(provided) = shared_secret.filter(|s| !s.is_empty()) {
        if constant_time_eq(provided.as_bytes(), secret.as_bytes()) {
            return Ok(SignatureCheck::SharedSecret);
        }
    }

    if let Some(provided) = hash.map(str::trim).filter(|s| !s.is_empty()) {
        let provided = hex::decode(provided)
            .map_err(|_| CheckoutError::Auth("hash header is not hex".into()))?;
        return keyed(secret, body)?
            .verify_slice(&provided)
            .map(|()| SignatureCheck::Hmac)
            .map_err(|_| CheckoutError::Auth("hash mismatch".into()));
    }

    Err(CheckoutError::Auth("missing or invalid webhook credentials".into()))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
