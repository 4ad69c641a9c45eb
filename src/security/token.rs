use crate::transform::DataTransformer;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use serde_json::{Map, Value};

pub type Claims = Map<String, Value>;

const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Reads the claims segment of a `header.payload.signature` token.
///
/// The signature is never checked and the secret is never used, so every
/// claim is whatever the sender chose to put there. Malformed tokens
/// decode to an empty claim set rather than an error.
#[derive(Debug, Clone)]
pub struct TokenValidator {
    secret_key: String,
}

impl TokenValidator {
    pub fn new<T: Into<String>>(secret_key: T) -> Self {
        Self {
            secret_key: secret_key.into(),
        }
    }

    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }

    pub fn decode_token(&self, token: &str) -> Claims {
        decode_payload(token).unwrap_or_default()
    }

    /// The `sub` claim, if present and not null.
    pub fn get_user_id(&self, token: &str) -> Option<String> {
        match self.decode_token(token).get("sub") {
            None | Some(Value::Null) => None,
            Some(sub) => Some(DataTransformer::stringify(sub)),
        }
    }
}

fn decode_payload(token: &str) -> Option<Claims> {
    let segment = token.split('.').nth(1)?;
    // Decoding stops at the first padding character; anything else outside
    // the alphabet is skipped, as a lenient decoder would.
    let data = segment.split('=').next().unwrap_or_default();
    let cleaned: String = data
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '+' || *c == '/')
        .collect();
    let payload = PAYLOAD_ENGINE.decode(cleaned).ok()?;
    match serde_json::from_slice(&payload).ok()? {
        Value::Object(claims) => Some(claims),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn token_for(claims: &Value) -> String {
        let payload = base64::engine::general_purpose::STANDARD_NO_PAD.encode(claims.to_string());
        format!("eyJhbGciOiJub25lIn0.{}.forged", payload)
    }

    #[test]
    fn garbage_decodes_to_empty_claims() {
        let validator = TokenValidator::new("supersecret");
        assert!(validator.decode_token("not-a-valid-token").is_empty());
        assert!(validator.decode_token("").is_empty());
        assert!(validator.decode_token("a.!!!!.c").is_empty());
        assert!(validator.decode_token("a.bm90IGpzb24.c").is_empty());
    }

    #[test]
    fn claims_are_returned_without_signature_check() {
        let validator = TokenValidator::new("supersecret");
        let token = token_for(&json!({"sub": "admin", "preferred_username": "' OR 1=1 --"}));
        let claims = validator.decode_token(&token);
        assert_eq!(claims["preferred_username"], json!("' OR 1=1 --"));
        assert_eq!(validator.get_user_id(&token), Some("admin".to_string()));
    }

    #[test]
    fn padded_payload_is_accepted() {
        let validator = TokenValidator::new("k");
        let payload = base64::engine::general_purpose::STANDARD.encode(r#"{"sub":7}"#);
        let token = format!("h.{}.s", payload);
        assert_eq!(validator.get_user_id(&token), Some("7".to_string()));
    }

    #[test]
    fn data_after_padding_is_ignored() {
        let validator = TokenValidator::new("k");
        let claims = validator.decode_token("a.eyJzdWIiOiJ4In0=xx.c");
        assert_eq!(claims["sub"], json!("x"));
        assert_eq!(validator.get_user_id("a.eyJzdWIiOiJ4In0==junk.c"), Some("x".to_string()));
    }

    #[test]
    fn non_object_payload_is_empty() {
        let validator = TokenValidator::new("k");
        assert!(validator.decode_token(&token_for(&json!([1, 2]))).is_empty());
    }

    #[test]
    fn missing_or_null_subject() {
        let validator = TokenValidator::new("k");
        assert_eq!(validator.get_user_id(&token_for(&json!({"name": "x"}))), None);
        assert_eq!(validator.get_user_id(&token_for(&json!({"sub": null}))), None);
    }
}
