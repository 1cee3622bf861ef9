use super::*;

#[test]
fn token_pair_uses_backend_field_names() {
    let pair: TokenPair = serde_json::from_str(r#"{"accessToken":"a","refreshToken":"r"}"#).unwrap();
    assert_eq!(pair, TokenPair::new("a", Some("r".into())));

    let json = serde_json::to_value(TokenPair::new("a", None)).unwrap();
    assert_eq!(json, serde_json::json!({ "accessToken": "a" }));
}

#[test]
fn token_pair_debug_redacts_secrets() {
    let rendered = format!("{:?}", TokenPair::new("secret-access", Some("secret-refresh".into())));
    assert!(!rendered.contains("secret-access"));
    assert!(!rendered.contains("secret-refresh"));
    assert!(rendered.contains("redacted"));
}

#[test]
fn identity_name_is_optional() {
    let identity: Identity = serde_json::from_str(r#"{"email":"p@u.ac.kr","providerId":"123"}"#).unwrap();
    assert_eq!(identity.name, None);
    assert_eq!(identity.provider_id, "123");
}
