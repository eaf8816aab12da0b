//! # Token Expiry Decoding
//!
//! Extracts the expiration instant embedded in an access token.
//!
//! ## What This Is Not
//! This is not JWT validation. The client never holds the signing key and
//! never trusts the token's claims for authorization; it only reads the
//! numeric `exp` claim to know when to schedule a renewal. A token the
//! client cannot decode is simply a token with an unknown expiry: the
//! scheduler arms no timer and the server remains the authority.
//!
//! ## Decoding
//! ```text
//! header.payload.signature
//!         │
//!         ▼
//! base64url-decode (padding tolerated)
//!         │
//!         ▼
//! JSON object ──► "exp" (seconds since epoch) ──► milliseconds
//! ```
//!
//! Every failure path returns `None` (fail open toward no-op, not crash).

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

/// Returns the token's `exp` claim as milliseconds since the Unix epoch,
/// or `None` when the expiry cannot be determined.
pub fn expiry_unix_millis(token: &str) -> Option<i64> {
    let mut segments = token.split('.');
    let _header = segments.next()?;
    let payload = segments.next()?;
    // Exactly three segments
    if segments.next().is_none() || token.split('.').count() != 3 {
        return None;
    }

    // Some issuers pad; strip before decoding with the no-pad engine
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;

    let exp = claims.get("exp")?;
    let exp_secs = exp
        .as_i64()
        .or_else(|| exp.as_f64().map(|f| f.trunc() as i64))?;

    exp_secs.checked_mul(1000)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    /// Builds an unsigned token with the given JSON payload.
    fn token_with_payload(payload: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.as_bytes());
        format!("{}.{}.signature", header, body)
    }

    #[test]
    fn test_decodes_numeric_exp() {
        let token = token_with_payload(r#"{"sub":"u1","exp":1750000000}"#);
        assert_eq!(expiry_unix_millis(&token), Some(1_750_000_000_000));
    }

    #[test]
    fn test_decodes_float_exp() {
        let token = token_with_payload(r#"{"exp":1750000000.75}"#);
        assert_eq!(expiry_unix_millis(&token), Some(1_750_000_000_000));
    }

    #[test]
    fn test_tolerates_padded_segment() {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none"}"#);
        let mut body = URL_SAFE_NO_PAD.encode(br#"{"exp":1750000000}"#);
        body.push('=');
        let token = format!("{}.{}.sig", header, body);
        assert_eq!(expiry_unix_millis(&token), Some(1_750_000_000_000));
    }

    #[test]
    fn test_missing_exp_is_none() {
        let token = token_with_payload(r#"{"sub":"u1"}"#);
        assert_eq!(expiry_unix_millis(&token), None);
    }

    #[test]
    fn test_non_numeric_exp_is_none() {
        let token = token_with_payload(r#"{"exp":"tomorrow"}"#);
        assert_eq!(expiry_unix_millis(&token), None);
    }

    #[test]
    fn test_non_json_payload_is_none() {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none"}"#);
        let body = URL_SAFE_NO_PAD.encode(b"not json at all");
        assert_eq!(expiry_unix_millis(&format!("{}.{}.sig", header, body)), None);
    }

    #[test]
    fn test_malformed_base64_is_none() {
        assert_eq!(expiry_unix_millis("aaa.!!!not-base64!!!.ccc"), None);
    }

    #[test]
    fn test_wrong_segment_count_is_none() {
        assert_eq!(expiry_unix_millis("only-one-segment"), None);
        assert_eq!(expiry_unix_millis("two.segments"), None);
        assert_eq!(expiry_unix_millis("a.b.c.d"), None);
        assert_eq!(expiry_unix_millis(""), None);
    }
}
