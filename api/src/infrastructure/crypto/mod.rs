use base64::Engine as _;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const B64: base64::engine::GeneralPurpose = base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// Fresh opaque session identifier (192 bits of randomness).
pub fn generate_session_id() -> String {
    let mut bytes = [0u8; 24];
    rand::thread_rng().fill_bytes(&mut bytes);
    B64.encode(bytes)
}

fn mac(secret: &str) -> HmacSha256 {
    // HMAC accepts keys of any length.
    HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac key of any length")
}

/// Cookie value `<id>.<signature>`.
pub fn sign_session_id(secret: &str, id: &str) -> String {
    let mut m = mac(secret);
    m.update(id.as_bytes());
    let sig = m.finalize().into_bytes();
    format!("{}.{}", id, B64.encode(sig))
}

/// Returns the session id when the signature checks out.
pub fn verify_session_cookie(secret: &str, value: &str) -> Option<String> {
    let (id, sig_b64) = value.rsplit_once('.')?;
    if id.is_empty() {
        return None;
    }
    let sig = B64.decode(sig_b64).ok()?;
    let mut m = mac(secret);
    m.update(id.as_bytes());
    m.verify_slice(&sig).ok()?;
    Some(id.to_string())
}
