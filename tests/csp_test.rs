//! Content-Security-Policy through the Tower layer, including nonces

use axum::{Extension, Router, routing::get};
use hardhat::csp::{
    ContentSecurityPolicyConfig, CspNonce, DirectiveValue, Directives, NonceSource, Source,
    build_csp_nonce_layer,
};
use hardhat::testing;
use hardhat::{HelmetConfig, HelmetError, HelmetLayer, build_helmet_layer};
use serde_json::json;

async fn page(Extension(nonce): Extension<CspNonce>) -> String {
    format!("<script nonce=\"{}\"></script>", nonce)
}

fn nonce_config() -> HelmetConfig {
    HelmetConfig::builder()
        .content_security_policy(
            ContentSecurityPolicyConfig::builder()
                .use_defaults(false)
                .directives(
                    Directives::new()
                        .directive("defaultSrc", ["'self'"])
                        .with_value(
                            "scriptSrc",
                            DirectiveValue::Sources(vec![Source::from("'self'"), NonceSource::source()]),
                        ),
                )
                .build(),
        )
        .build()
}

#[tokio::test]
async fn test_nonce_reaches_header_and_handler() {
    let layer = build_helmet_layer(&nonce_config()).unwrap().unwrap();
    // Nonce layer must run first, so it is added last
    let app = Router::new()
        .route("/", get(page))
        .layer(layer)
        .layer(build_csp_nonce_layer());

    let response = testing::get(app, "/").execute().await.assert_ok();
    let header = response.header("content-security-policy").unwrap();
    let body = response.body_string().await;

    let nonce = header
        .strip_prefix("default-src 'self';script-src 'self' 'nonce-")
        .and_then(|rest| rest.strip_suffix('\''))
        .unwrap();
    assert_eq!(nonce.len(), 32);
    assert_eq!(body, format!("<script nonce=\"{}\"></script>", nonce));
}

#[tokio::test]
async fn test_existing_nonce_is_kept() {
    let layer = build_helmet_layer(&nonce_config()).unwrap().unwrap();
    let app = Router::new()
        .route("/", get(|| async { "ok" }))
        .layer(layer)
        .layer(build_csp_nonce_layer());

    let nonce = CspNonce::generate();
    testing::get(app, "/")
        .extension(nonce.clone())
        .execute()
        .await
        .assert_header(
            "content-security-policy",
            &format!("default-src 'self';script-src 'self' 'nonce-{}'", nonce),
        );
}

#[tokio::test]
async fn test_missing_nonce_layer_leaves_clean_policy() {
    let layer = build_helmet_layer(&nonce_config()).unwrap().unwrap();
    let app = Router::new().route("/", get(|| async { "ok" })).layer(layer);

    testing::get(app, "/")
        .execute()
        .await
        .assert_ok()
        .assert_header("content-security-policy", "default-src 'self';script-src 'self'");
}

#[tokio::test]
async fn test_report_only_from_json() {
    let config = HelmetConfig::from_value(json!({
        "contentSecurityPolicy": {
            "reportOnly": true,
            "directives": {
                "defaultSrc": ["'self'"],
                "reportUri": "/csp-violations",
                "upgradeInsecureRequests": null
            }
        }
    }))
    .unwrap();
    let app = Router::new()
        .route("/", get(|| async { "ok" }))
        .layer(build_helmet_layer(&config).unwrap().unwrap());

    let response = testing::get(app, "/")
        .execute()
        .await
        .assert_ok()
        .assert_header_absent("content-security-policy");
    let policy = response.header("content-security-policy-report-only").unwrap();
    assert!(policy.starts_with("default-src 'self';report-uri /csp-violations;base-uri 'self'"));
    assert!(!policy.contains("upgrade-insecure-requests"));
}

#[tokio::test]
async fn test_invalid_dynamic_value_fails_the_request() {
    let config = ContentSecurityPolicyConfig::builder()
        .directive(
            "script-src",
            DirectiveValue::Sources(vec![Source::from_fn(|req, _res| {
                format!("https://{}", req.uri.path().trim_start_matches('/'))
            })]),
        )
        .build();
    let csp = hardhat::csp::build_content_security_policy(&config).unwrap();
    let app = Router::new()
        .route("/{*path}", get(|| async { "ok" }))
        .layer(HelmetLayer::new(csp));

    testing::get(app.clone(), "/cdn.example.com")
        .execute()
        .await
        .assert_ok();

    let response = testing::get(app, "/a.com,b.com")
        .execute()
        .await
        .assert_server_error()
        .assert_header_absent("content-security-policy");
    let body: serde_json::Value = response.json().await;
    assert_eq!(body["error"], "Internal server error");
}

#[test]
fn test_construction_errors_name_the_value() {
    let cases = [
        (json!({ "directives": { "script src": ["'self'"] } }), "invalid directive name \"script src\""),
        (
            json!({ "directives": { "defaultSrc": ["'self'"], "default-src": ["'self'"] } }),
            "duplicate directive \"default-src\"",
        ),
        (
            json!({ "directives": { "script-src": ["'self'", "self"] } }),
            "invalid directive value for \"script-src\": \"self\"",
        ),
        (
            json!({ "directives": { "img-src": ["https://a.com;"] } }),
            "invalid directive value for \"img-src\": \"https://a.com;\"",
        ),
        (json!({ "useDefaults": false, "directives": { "img-src": ["*"] } }), "needs a default-src"),
    ];

    for (csp, expected) in cases {
        let config = HelmetConfig::from_value(json!({ "contentSecurityPolicy": csp })).unwrap();
        let err = build_helmet_layer(&config).err().unwrap();
        assert!(matches!(err, HelmetError::InvalidOption { .. }));
        assert!(err.to_string().contains(expected), "{} does not mention {}", err, expected);
    }
}
