use http::{HeaderMap, HeaderValue};
use jsonwebtoken::{encode, EncodingKey, Header};
use pack_auth::{AuthOptions, JwtOptions, TenantResolver};
use serde_json::{json, Value};

const SECRET: &str = "test-secret-for-pack-auth";

fn now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

fn sign(claims: Value, secret: &str) -> String {
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

fn resolver() -> TenantResolver {
    TenantResolver::from_options(
        AuthOptions::default().with_jwt(JwtOptions::default().with_secret(SECRET)),
    )
}

fn headers(value: &str) -> HeaderMap {
    let mut h = HeaderMap::new();
    h.insert("authorization", HeaderValue::from_str(value).unwrap());
    h
}

fn claims(tenant: Option<&str>, exp: i64) -> Value {
    let mut c = json!({"id": 7, "username": "ada", "email": "ada@example.com", "iat": now(), "exp": exp});
    if let Some(t) = tenant {
        c["tenant_id"] = json!(t);
    }
    c
}

#[test]
fn valid_bearer_token_resolves_to_its_tenant() {
    let token = sign(claims(Some("tenant-a"), now() + 600), SECRET);
    let ctx = resolver().resolve(&headers(&format!("Bearer {token}"))).unwrap();
    assert_eq!(ctx.tenant_id.as_str(), "tenant-a");
    assert_eq!(ctx.subject_id.as_deref(), Some("7"));
    assert_eq!(ctx.email.as_deref(), Some("ada@example.com"));

    // JWT scheme and a bare token are accepted too.
    assert!(resolver().resolve(&headers(&format!("jwt {token}"))).is_some());
    assert!(resolver().resolve(&headers(&token)).is_some());
}

#[test]
fn unknown_scheme_and_missing_header_yield_nothing() {
    let token = sign(claims(Some("tenant-a"), now() + 600), SECRET);
    assert!(resolver().resolve(&headers(&format!("Basic {token}"))).is_none());
    assert!(resolver().resolve(&HeaderMap::new()).is_none());
}

#[test]
fn forged_signature_is_rejected() {
    let forged = sign(claims(Some("tenant-a"), now() + 600), "some-other-secret-value");
    assert!(resolver().resolve(&headers(&format!("Bearer {forged}"))).is_none());
}

#[test]
fn expired_token_is_rejected() {
    let expired = sign(claims(Some("tenant-a"), now() - 3600), SECRET);
    assert!(resolver().resolve(&headers(&format!("Bearer {expired}"))).is_none());
}

#[test]
fn missing_tenant_claim_is_rejected() {
    let token = sign(claims(None, now() + 600), SECRET);
    assert!(resolver().resolve(&headers(&format!("Bearer {token}"))).is_none());
}

#[test]
fn resolver_without_secret_fails_closed() {
    let token = sign(claims(Some("tenant-a"), now() + 600), SECRET);
    let open = TenantResolver::from_options(AuthOptions::default());
    assert!(open.resolve(&headers(&format!("Bearer {token}"))).is_none());
}
