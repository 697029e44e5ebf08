use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Method, Request, StatusCode, Uri};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::Router;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use ed25519_dalek::{Signature, Verifier};
use tower_http::trace::TraceLayer;

use super::canonical::canonical_request;
use super::jwks::KeySet;
use super::{SignatureError, HEADER_KID, HEADER_REQUEST_ID, HEADER_SIG, HEADER_TIMESTAMP};

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

/// Check the `X-Auth-Sig` of a request against the key named by `X-Auth-Kid`.
///
/// Returns the key id on success.
pub fn verify_request(
    method: &Method,
    uri: &Uri,
    headers: &HeaderMap,
    keys: &KeySet,
) -> Result<String, SignatureError> {
    let kid = header(headers, HEADER_KID).ok_or(SignatureError::MissingKid)?;
    let key = keys
        .get(kid)
        .ok_or_else(|| SignatureError::UnknownKid(kid.to_string()))?;
    let encoded = header(headers, HEADER_SIG).ok_or(SignatureError::MissingSignature)?;
    let raw = STANDARD.decode(encoded)?;
    let signature = Signature::from_slice(&raw).map_err(|_| SignatureError::Mismatch)?;

    let canonical = canonical_request(method, uri, headers);
    key.verify(canonical.as_bytes(), &signature)
        .map_err(|_| SignatureError::Mismatch)?;
    Ok(kid.to_string())
}

/// Middleware rejecting unsigned or badly signed requests with 401.
pub async fn verify_signature(
    State(keys): State<Arc<KeySet>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    match verify_request(req.method(), req.uri(), req.headers(), &keys) {
        Ok(kid) => {
            tracing::info!(
                %kid,
                timestamp = header(req.headers(), HEADER_TIMESTAMP).unwrap_or(""),
                request_id = header(req.headers(), HEADER_REQUEST_ID).unwrap_or(""),
                "signature verified"
            );
            next.run(req).await
        }
        Err(e) => {
            let kid = header(req.headers(), HEADER_KID).unwrap_or("");
            tracing::warn!(%kid, error = %e, "signature verification failed");
            (StatusCode::UNAUTHORIZED, format!("Unauthorized: {e}")).into_response()
        }
    }
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap) -> String {
    let mut out = String::from("Hello! Your request signature was verified successfully.\n");
    out.push_str(&format!("Method: {method}\n"));
    out.push_str(&format!("Path: {}\n", uri.path()));
    for (label, name) in [
        ("X-Auth-Kid", HEADER_KID),
        ("X-Auth-Timestamp", HEADER_TIMESTAMP),
        ("X-Auth-Request-Id", HEADER_REQUEST_ID),
    ] {
        out.push_str(&format!("{label}: {}\n", header(&headers, name).unwrap_or("")));
    }
    out
}

/// Every path answers with an echo of the verified request.
pub fn build_verify_router(keys: KeySet) -> Router {
    let keys = Arc::new(keys);
    Router::new()
        .fallback(echo)
        .layer(middleware::from_fn_with_state(keys, verify_signature))
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use ed25519_dalek::{Signer, SigningKey};
    use tower::ServiceExt;

    fn keys() -> (SigningKey, KeySet) {
        let signing = SigningKey::from_bytes(&[7u8; 32]);
        let mut keys = KeySet::new();
        keys.insert("k1".to_string(), signing.verifying_key());
        (signing, keys)
    }

    fn signed_request(signing: &SigningKey, tamper_path: bool) -> Request<Body> {
        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("app.example.com"));
        headers.insert(HEADER_KID, HeaderValue::from_static("k1"));
        headers.insert(HEADER_TIMESTAMP, HeaderValue::from_static("1700000000"));
        headers.insert(HEADER_REQUEST_ID, HeaderValue::from_static("req-42"));
        headers.insert("x-auth-email", HeaderValue::from_static("ops@example.com"));

        let signed_uri: Uri = "/admin?page=2".parse().unwrap();
        let canonical = canonical_request(&Method::GET, &signed_uri, &headers);
        let sig = STANDARD.encode(signing.sign(canonical.as_bytes()).to_bytes());
        headers.insert(HEADER_SIG, HeaderValue::from_str(&sig).unwrap());

        let sent_uri = if tamper_path { "/other?page=2" } else { "/admin?page=2" };
        let mut req = Request::builder()
            .method(Method::GET)
            .uri(sent_uri)
            .body(Body::empty())
            .unwrap();
        *req.headers_mut() = headers;
        req
    }

    #[test]
    fn valid_signature_yields_kid() {
        let (signing, keys) = keys();
        let req = signed_request(&signing, false);
        let kid = verify_request(req.method(), req.uri(), req.headers(), &keys).unwrap();
        assert_eq!(kid, "k1");
    }

    #[test]
    fn rejects_missing_and_unknown_kid() {
        let (signing, keys) = keys();
        let mut req = signed_request(&signing, false);
        req.headers_mut()
            .insert(HEADER_KID, HeaderValue::from_static("k9"));
        assert!(matches!(
            verify_request(req.method(), req.uri(), req.headers(), &keys),
            Err(SignatureError::UnknownKid(k)) if k == "k9"
        ));

        req.headers_mut().remove(HEADER_KID);
        assert!(matches!(
            verify_request(req.method(), req.uri(), req.headers(), &keys),
            Err(SignatureError::MissingKid)
        ));
    }

    #[test]
    fn rejects_bad_signatures() {
        let (signing, keys) = keys();
        let req = signed_request(&signing, true);
        assert!(matches!(
            verify_request(req.method(), req.uri(), req.headers(), &keys),
            Err(SignatureError::Mismatch)
        ));

        let mut req = signed_request(&signing, false);
        req.headers_mut()
            .insert(HEADER_SIG, HeaderValue::from_static("%%%"));
        assert!(matches!(
            verify_request(req.method(), req.uri(), req.headers(), &keys),
            Err(SignatureError::SignatureEncoding(_))
        ));

        req.headers_mut().remove(HEADER_SIG);
        assert!(matches!(
            verify_request(req.method(), req.uri(), req.headers(), &keys),
            Err(SignatureError::MissingSignature)
        ));
    }

    #[tokio::test]
    async fn router_echoes_verified_requests() {
        let (signing, keys) = keys();
        let app = build_verify_router(keys);

        let resp = app
            .clone()
            .oneshot(signed_request(&signing, false))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("Path: /admin"));
        assert!(text.contains("X-Auth-Request-Id: req-42"));

        let resp = app
            .oneshot(signed_request(&signing, true))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"Unauthorized: signature verification failed");
    }
}
