//! Signed session cookie payloads.
//!
//! Token layout: `base64url(json) "." base64url(hmac_sha256(secret, base64url(json)))`.
//! Decoding never errors: anything that does not verify is treated as "no session".

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use crate::domain::models::session::Session;
use crate::error::AppError;

pub const SESSION_COOKIE: &str = "auth_session";
pub const SESSION_MAX_AGE_DAYS: i64 = 7;

type HmacSha256 = Hmac<Sha256>;

fn mac_for(secret: &str) -> HmacSha256 {
    <HmacSha256 as Mac>::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size")
}

pub fn encode(session: &Session, secret: &str) -> Result<String, AppError> {
    let payload = serde_json::to_vec(session)
        .map_err(|e| AppError::InternalWithMsg(format!("Failed to serialize session: {}", e)))?;
    let payload_b64 = URL_SAFE_NO_PAD.encode(payload);

    let mut mac = mac_for(secret);
    mac.update(payload_b64.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(format!("{}.{}", payload_b64, signature))
}

pub fn decode(token: Option<&str>, secret: &str) -> Option<Session> {
    let token = token?.trim();
    let (payload_b64, signature_b64) = token.split_once('.')?;
    if payload_b64.is_empty() || signature_b64.contains('.') {
        return None;
    }

    let signature = URL_SAFE_NO_PAD.decode(signature_b64).ok()?;
    let mut mac = mac_for(secret);
    mac.update(payload_b64.as_bytes());
    mac.verify_slice(&signature).ok()?;

    let payload = URL_SAFE_NO_PAD.decode(payload_b64).ok()?;
    serde_json::from_slice(&payload).ok()
}
