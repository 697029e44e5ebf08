use std::collections::HashMap;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use ed25519_dalek::{VerifyingKey, PUBLIC_KEY_LENGTH};
use serde::Deserialize;

use super::SignatureError;

/// Ed25519 public keys by key id.
pub type KeySet = HashMap<String, VerifyingKey>;

#[derive(Debug, Deserialize)]
struct Jwks {
    #[serde(default)]
    keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize)]
struct Jwk {
    #[serde(default)]
    kty: String,
    #[serde(default)]
    crv: String,
    #[serde(default)]
    x: String,
    #[serde(default)]
    kid: String,
}

/// Fetch a JWKS document and keep its Ed25519 keys.
pub async fn load_jwks(url: &str) -> Result<KeySet, SignatureError> {
    let resp = reqwest::get(url).await?;
    if resp.status() != reqwest::StatusCode::OK {
        return Err(SignatureError::JwksStatus(resp.status()));
    }
    let body = resp.bytes().await?;
    let keys = parse_jwks(&body)?;
    tracing::info!(%url, keys = keys.len(), "loaded signing keys");
    Ok(keys)
}

/// Keep `OKP`/`Ed25519` entries whose `x` is a base64url 32-byte key.
pub fn parse_jwks(body: &[u8]) -> Result<KeySet, SignatureError> {
    let jwks: Jwks = serde_json::from_slice(body)?;
    let mut keys = KeySet::new();

    for key in jwks.keys {
        if key.kty != "OKP" || key.crv != "Ed25519" {
            continue;
        }
        let raw = match URL_SAFE_NO_PAD.decode(key.x.trim_end_matches('=')) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(kid = %key.kid, error = %e, "skipping key with undecodable x");
                continue;
            }
        };
        let Ok(bytes) = <[u8; PUBLIC_KEY_LENGTH]>::try_from(raw.as_slice()) else {
            tracing::warn!(kid = %key.kid, len = raw.len(), "skipping key with invalid Ed25519 length");
            continue;
        };
        match VerifyingKey::from_bytes(&bytes) {
            Ok(verifying) => {
                tracing::debug!(kid = %key.kid, "loaded public key");
                keys.insert(key.kid, verifying);
            }
            Err(e) => tracing::warn!(kid = %key.kid, error = %e, "skipping invalid Ed25519 key"),
        }
    }

    if keys.is_empty() {
        return Err(SignatureError::NoKeys);
    }
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::SigningKey;
    use serde_json::json;

    fn encoded_public(seed: u8) -> String {
        let signing = SigningKey::from_bytes(&[seed; 32]);
        URL_SAFE_NO_PAD.encode(signing.verifying_key().as_bytes())
    }

    #[test]
    fn keeps_only_ed25519_keys() {
        let body = json!({
            "keys": [
                {"kty": "OKP", "crv": "Ed25519", "x": encoded_public(7), "kid": "k1"},
                {"kty": "OKP", "crv": "X25519", "x": encoded_public(8), "kid": "k2"},
                {"kty": "EC", "crv": "P-256", "x": "abc", "kid": "k3"},
                {"kty": "OKP", "crv": "Ed25519", "x": "c2hvcnQ", "kid": "short"},
                {"kty": "OKP", "crv": "Ed25519", "x": "!!!", "kid": "garbage"}
            ]
        });
        let keys = parse_jwks(body.to_string().as_bytes()).unwrap();
        assert_eq!(keys.len(), 1);
        assert!(keys.contains_key("k1"));
    }

    #[test]
    fn empty_set_is_an_error() {
        let err = parse_jwks(br#"{"keys": []}"#).unwrap_err();
        assert!(matches!(err, SignatureError::NoKeys));
    }

    #[tokio::test]
    async fn fetches_over_http() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/keys"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "keys": [{"kty": "OKP", "crv": "Ed25519", "x": encoded_public(9), "kid": "live"}]
            })))
            .mount(&server)
            .await;

        let keys = load_jwks(&format!("{}/keys", server.uri())).await.unwrap();
        assert!(keys.contains_key("live"));

        let err = load_jwks(&format!("{}/missing", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, SignatureError::JwksStatus(_)));
    }
}
