use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use serde_json::{Value, json};
use tower::ServiceExt;

use checkout_payments::{
    FulfillmentStore, LineItem, MemoryFulfillmentStore, MockPaymentProvider, PaymentsConfig,
    SessionDetails, WebhookVerifier,
};
use checkout_server::{AppState, AuthConfig, TokenVerifier, router};

const WEBHOOK_SECRET: &str = "whsec_test";
const JWT_SECRET: &str = "jwt-test-secret";

struct Harness {
    app: Router,
    provider: Arc<MockPaymentProvider>,
    purchases: Arc<MemoryFulfillmentStore>,
}

fn auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: JWT_SECRET.into(),
        issuer: None,
        audience: None,
    }
}

fn harness_with(provider: MockPaymentProvider) -> Harness {
    let config = PaymentsConfig::from_lookup(|key| match key {
        "STRIPE_SECRET_KEY" => Some("sk_test_123".into()),
        "STRIPE_WEBHOOK_SECRET" => Some(WEBHOOK_SECRET.into()),
        "CHECKOUT_PRICES" => Some("price_123:Pro plan".into()),
        "APP_BASE_URL" => Some("https://shop.example".into()),
        _ => None,
    })
    .unwrap();

    let provider = Arc::new(provider);
    let purchases = Arc::new(MemoryFulfillmentStore::new());
    let state = AppState::new(
        config,
        provider.clone(),
        purchases.clone(),
        TokenVerifier::new(&auth_config()),
    );

    Harness {
        app: router(state),
        provider,
        purchases,
    }
}

fn harness() -> Harness {
    harness_with(MockPaymentProvider::new())
}

fn bearer(uid: &str) -> String {
    let token = TokenVerifier::new(&auth_config())
        .issue(uid, chrono::Duration::minutes(5))
        .unwrap();
    format!("Bearer {token}")
}

fn callable(path: &str, uid: Option<&str>, body: Value) -> Request<Body> {
    let mut request = Request::builder()
        .method(Method::POST)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(uid) = uid {
        request = request.header(header::AUTHORIZATION, bearer(uid));
    }
    request.body(Body::from(body.to_string())).unwrap()
}

fn webhook(body: &[u8], signature: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/webhook/stripe")
        .header(header::CONTENT_TYPE, "application/json")
        .header("stripe-signature", signature)
        .body(Body::from(body.to_vec()))
        .unwrap()
}

fn sign(body: &[u8]) -> String {
    WebhookVerifier::new(WEBHOOK_SECRET, Duration::from_secs(300))
        .signature_header(chrono::Utc::now().timestamp(), body)
}

fn completed_event(session_id: &str) -> Vec<u8> {
    json!({
        "id": "evt_1",
        "type": "checkout.session.completed",
        "created": 1_700_000_000,
        "livemode": false,
        "data": { "object": {
            "id": session_id,
            "payment_status": "paid",
            "metadata": { "uid": "u1" }
        } }
    })
    .to_string()
    .into_bytes()
}

fn paid_session(id: &str, line_items: Vec<LineItem>) -> SessionDetails {
    SessionDetails {
        id: id.into(),
        status: Some("complete".into()),
        payment_status: Some("paid".into()),
        payment_intent: Some("pi_123".into()),
        metadata: HashMap::from([("uid".to_string(), "u1".to_string())]),
        line_items: Some(line_items),
        ..Default::default()
    }
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_health_and_prices() {
    let h = harness();

    let health = send(&h.app, Request::get("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(health.status(), StatusCode::OK);
    assert_eq!(body_json(health).await["provider"], "mock");

    let prices = send(&h.app, Request::get("/api/prices").body(Body::empty()).unwrap()).await;
    assert_eq!(
        body_json(prices).await,
        json!({ "prices": [{ "priceId": "price_123", "label": "Pro plan" }] })
    );
}

#[tokio::test]
async fn test_create_session_requires_auth() {
    let h = harness();

    let response = send(
        &h.app,
        callable("/api/createCheckoutSession", None, json!({ "data": { "priceId": "price_123" } })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await,
        json!({ "error": {
            "code": "unauthenticated",
            "message": "You must be authenticated to create a checkout session."
        } })
    );
    assert_eq!(h.provider.call_count().await, 0);
}

#[tokio::test]
async fn test_garbage_body_still_checks_auth_first() {
    let h = harness();
    let request = Request::post("/api/createCheckoutSession")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = send(&h.app, request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_session_rejects_bad_prices() {
    let h = harness();

    let unknown = send(
        &h.app,
        callable("/api/createCheckoutSession", Some("u1"), json!({ "data": { "priceId": "price_999" } })),
    )
    .await;
    assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(unknown).await["error"]["message"],
        "PriceId in request does not exist."
    );

    let missing = send(
        &h.app,
        callable("/api/createCheckoutSession", Some("u1"), json!({ "data": {} })),
    )
    .await;
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(missing).await["error"]["code"],
        "invalid-argument"
    );

    assert_eq!(h.provider.call_count().await, 0);
}

#[tokio::test]
async fn test_create_session_returns_hosted_url() {
    let h = harness_with(MockPaymentProvider::new().with_session_id("cs_test_abc"));

    let response = send(
        &h.app,
        callable("/api/createCheckoutSession", Some("u1"), json!({ "data": { "priceId": "price_123" } })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({ "result": {
            "success": true,
            "sessionId": "cs_test_abc",
            "url": "https://pay.example/cs_test_abc"
        } })
    );

    let created = h.provider.created_sessions().await;
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].metadata.get("uid").map(String::as_str), Some("u1"));
    assert_eq!(
        created[0].success_url,
        "https://shop.example/success?session_id={CHECKOUT_SESSION_ID}"
    );
}

#[tokio::test]
async fn test_provider_failure_is_internal() {
    let h = harness();
    h.provider.fail_with("api key expired").await;

    let response = send(
        &h.app,
        callable("/api/createCheckoutSession", Some("u1"), json!({ "data": { "priceId": "price_123" } })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await["error"],
        json!({
            "code": "internal",
            "message": "An error occurred while attempting to create a checkout session."
        })
    );
}

#[tokio::test]
async fn test_get_session() {
    let h = harness();
    h.provider
        .insert_session(paid_session("cs_test_abc", Vec::new()))
        .await;

    let owner = send(
        &h.app,
        callable("/api/getSession", Some("u1"), json!({ "data": { "sessionId": "cs_test_abc" } })),
    )
    .await;
    assert_eq!(owner.status(), StatusCode::OK);
    let body = body_json(owner).await;
    assert_eq!(body["result"]["success"], true);
    assert_eq!(body["result"]["session"]["payment_intent"], "pi_123");

    let stranger = send(
        &h.app,
        callable("/api/getSession", Some("u2"), json!({ "data": { "sessionId": "cs_test_abc" } })),
    )
    .await;
    assert_eq!(stranger.status(), StatusCode::FORBIDDEN);

    let missing = send(&h.app, callable("/api/getSession", Some("u1"), json!({ "data": {} }))).await;
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(missing).await["error"]["message"], "Missing session ID.");

    let anonymous = send(
        &h.app,
        callable("/api/getSession", None, json!({ "data": { "sessionId": "cs_test_abc" } })),
    )
    .await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_webhook_rejects_bad_signature() {
    let h = harness();
    let body = completed_event("cs_test_abc");
    let forged = WebhookVerifier::new("whsec_other", Duration::from_secs(300))
        .signature_header(chrono::Utc::now().timestamp(), &body);

    let response = send(&h.app, webhook(&body, &forged)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.starts_with("Webhook Error:"));
    assert_eq!(h.provider.call_count().await, 0);
    assert!(h.purchases.is_empty().await);
}

#[tokio::test]
async fn test_webhook_rejects_tampered_body() {
    let h = harness();
    h.provider
        .insert_session(paid_session(
            "cs_test_other",
            vec![LineItem {
                price_id: Some("price_123".into()),
                quantity: Some(1),
            }],
        ))
        .await;
    let signed_body = completed_event("cs_test_abc");
    let signature = sign(&signed_body);
    let tampered = completed_event("cs_test_other");

    let response = send(&h.app, webhook(&tampered, &signature)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(
        body_text(response).await,
        "Webhook Error: No signatures found matching the expected signature for payload"
    );
    assert_eq!(h.provider.call_count().await, 0);
    assert!(h.purchases.is_empty().await);
}

#[tokio::test]
async fn test_webhook_acknowledges_other_event_types() {
    let h = harness();
    let body = json!({
        "id": "evt_2",
        "type": "customer.created",
        "data": { "object": { "id": "cus_1" } }
    })
    .to_string()
    .into_bytes();

    let response = send(&h.app, webhook(&body, &sign(&body))).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "received": true }));
    assert_eq!(h.provider.call_count().await, 0);
    assert!(h.purchases.is_empty().await);
}

#[tokio::test]
async fn test_webhook_without_line_items_writes_nothing() {
    let h = harness();
    h.provider
        .insert_session(paid_session("cs_test_empty", Vec::new()))
        .await;
    let body = completed_event("cs_test_empty");

    let response = send(&h.app, webhook(&body, &sign(&body))).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "received": true }));
    assert!(h.purchases.is_empty().await);
}

#[tokio::test]
async fn test_webhook_fulfills_once() {
    let h = harness();
    h.provider
        .insert_session(paid_session(
            "cs_test_abc",
            vec![LineItem {
                price_id: Some("price_123".into()),
                quantity: Some(1),
            }],
        ))
        .await;
    let body = completed_event("cs_test_abc");

    for _ in 0..2 {
        let response = send(&h.app, webhook(&body, &sign(&body))).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(h.purchases.len().await, 1);
    let record = h.purchases.get("cs_test_abc").await.unwrap().unwrap();
    assert_eq!(record.user_id, "u1");
    assert_eq!(record.price_id, "price_123");
}

#[tokio::test]
async fn test_webhook_methods() {
    let h = harness();

    let preflight = send(
        &h.app,
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/webhook/stripe")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(preflight.status(), StatusCode::OK);
    assert_eq!(
        preflight.headers()[header::ACCESS_CONTROL_ALLOW_HEADERS],
        "Content-Type, Stripe-Signature"
    );

    let get = send(&h.app, Request::get("/webhook/stripe").body(Body::empty()).unwrap()).await;
    assert_eq!(get.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(get.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");

    let unsigned = send(
        &h.app,
        Request::post("/webhook/stripe")
            .body(Body::from(completed_event("cs_test_abc")))
            .unwrap(),
    )
    .await;
    assert_eq!(unsigned.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_text(unsigned).await,
        "Webhook Error: No stripe-signature header value was provided."
    );
}
