use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Decoded payload of the `accessToken` bearer credential
///
/// The backend issues a JWT-shaped `header.payload.signature` token. Only the
/// payload is read here; the signature is left to the backend, which checks it
/// on every API call. The edge only needs enough to route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Expiry, epoch seconds
    pub exp: i64,
    /// Whether the account has a paid subscription
    #[serde(alias = "isActive")]
    pub active: bool,
    /// Account identity reference
    pub id: String,
}

impl Credential {
    /// Decodes a bearer token into its payload
    ///
    /// Returns `None` for anything that is not a three-segment token whose middle
    /// segment is base64url JSON with `exp`, `active` and `id` of the right types.
    pub fn decode(token: &str) -> Option<Self> {
        let mut segments = token.trim().split('.');
        let (Some(_header), Some(payload), Some(_signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return None;
        };

        // Some issuers pad their base64url segments.
        let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    /// A credential is expired once `now` reaches its `exp`
    pub fn is_expired(&self, now: i64) -> bool {
        self.exp <= now
    }
}

#[cfg(test)]
pub(crate) fn encode_test_token(payload: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{header}.{body}.c2lnbmF0dXJl")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_valid_token() {
        let token = encode_test_token(&json!({
            "exp": 1_900_000_000,
            "active": true,
            "id": "acc_42",
            "iat": 1_800_000_000
        }));

        let credential = Credential::decode(&token).unwrap();
        assert_eq!(credential.exp, 1_900_000_000);
        assert!(credential.active);
        assert_eq!(credential.id, "acc_42");
    }

    #[test]
    fn test_decode_accepts_is_active_alias() {
        let token = encode_test_token(&json!({
            "exp": 1_900_000_000,
            "isActive": false,
            "id": "acc_7"
        }));

        let credential = Credential::decode(&token).unwrap();
        assert!(!credential.active);
    }

    #[test]
    fn test_decode_tolerates_padding() {
        let payload = base64::engine::general_purpose::URL_SAFE
            .encode(json!({"exp": 10, "active": true, "id": "a"}).to_string());
        let token = format!("h.{payload}.s");
        assert!(Credential::decode(&token).is_some());
    }

    #[test]
    fn test_decode_rejects_missing_fields() {
        let token = encode_test_token(&json!({"exp": 1_900_000_000, "id": "acc_42"}));
        assert_eq!(Credential::decode(&token), None);
    }

    #[test]
    fn test_decode_rejects_mistyped_fields() {
        let token = encode_test_token(&json!({
            "exp": "tomorrow",
            "active": true,
            "id": "acc_42"
        }));
        assert_eq!(Credential::decode(&token), None);

        let token = encode_test_token(&json!({"exp": 1, "active": "yes", "id": "acc_42"}));
        assert_eq!(Credential::decode(&token), None);
    }

    #[test]
    fn test_decode_rejects_malformed_tokens() {
        assert_eq!(Credential::decode(""), None);
        assert_eq!(Credential::decode("not-a-token"), None);
        assert_eq!(Credential::decode("a.b"), None);
        assert_eq!(Credential::decode("a.!!!.c"), None);
        assert_eq!(Credential::decode("a.b.c.d"), None);

        let not_json = URL_SAFE_NO_PAD.encode("hello");
        assert_eq!(Credential::decode(&format!("a.{not_json}.c")), None);
    }

    #[test]
    fn test_is_expired_boundary() {
        let credential = Credential {
            exp: 100,
            active: true,
            id: "a".to_string(),
        };
        assert!(!credential.is_expired(99));
        assert!(credential.is_expired(100));
        assert!(credential.is_expired(101));
    }
}
