//! HTTP Handlers

use axum::{
    Json,
    body::Bytes,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use checkout_payments::{
    CheckoutResponse, CreateCheckoutRequest, ErrorCode, GetSessionRequest, PriceEntry,
    SessionResponse, WebhookOutcome,
};

use crate::auth::Caller;
use crate::callable::{CallableError, CallableRequest, CallableResponse, ErrorBody, callable_data};
use crate::state::AppState;

const STRIPE_SIGNATURE: &str = "stripe-signature";

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub provider: String,
    pub prices: usize,
}

#[derive(Serialize)]
pub struct PricesResponse {
    pub prices: Vec<PriceEntry>,
}

#[derive(Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

/// Health check
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        provider: state.provider_name.clone(),
        prices: state.config.prices.len(),
    })
}

/// Prices the pricing page may offer
pub async fn list_prices(State(state): State<AppState>) -> Json<PricesResponse> {
    Json(PricesResponse {
        prices: state.config.prices.entries().to_vec(),
    })
}

/// `createCheckoutSession` callable
pub async fn create_checkout_session(
    State(state): State<AppState>,
    Caller(caller): Caller,
    payload: Result<Json<CallableRequest<CreateCheckoutRequest>>, JsonRejection>,
) -> Result<Json<CallableResponse<CheckoutResponse>>, CallableError> {
    let request = callable_data(payload);
    let response = state
        .checkout
        .create_session(caller.as_ref(), request)
        .await?;

    Ok(Json(CallableResponse::new(response)))
}

/// `getSession` callable
pub async fn get_session(
    State(state): State<AppState>,
    Caller(caller): Caller,
    payload: Result<Json<CallableRequest<GetSessionRequest>>, JsonRejection>,
) -> Result<Json<CallableResponse<SessionResponse>>, CallableError> {
    let request = callable_data(payload);
    let response = state.sessions.get_session(caller.as_ref(), request).await?;

    Ok(Json(CallableResponse::new(response)))
}

/// Stripe webhook endpoint
///
/// Acknowledges every verified event with 200 so Stripe stops retrying;
/// fulfillment problems are logged, not surfaced. Every response carries
/// the webhook CORS headers.
pub async fn stripe_webhook(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if method == Method::OPTIONS {
        return (StatusCode::OK, webhook_cors_headers()).into_response();
    }

    if method != Method::POST {
        return (
            StatusCode::METHOD_NOT_ALLOWED,
            webhook_cors_headers(),
            Json(ErrorBody::new(
                ErrorCode::InvalidArgument,
                format!("Method {method} not allowed"),
            )),
        )
            .into_response();
    }

    let signature = headers
        .get(STRIPE_SIGNATURE)
        .and_then(|v| v.to_str().ok());

    let event = match state.webhooks.construct_event(&body, signature) {
        Ok(event) => event,
        Err(e) => {
            tracing::error!(error = %e, "Webhook signature verification failed");
            return (
                StatusCode::BAD_REQUEST,
                webhook_cors_headers(),
                format!("Webhook Error: {}", e.message()),
            )
                .into_response();
        }
    };

    match state.webhooks.dispatch(&event).await {
        WebhookOutcome::Fulfillment(report) => {
            tracing::debug!(event_id = %event.id, report = ?report, "Webhook handled");
        }
        WebhookOutcome::Ignored { .. } => {}
    }

    (
        StatusCode::OK,
        webhook_cors_headers(),
        Json(WebhookAck { received: true }),
    )
        .into_response()
}

fn webhook_cors_headers() -> [(header::HeaderName, HeaderValue); 2] {
    [
        (
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ),
        (
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type, Stripe-Signature"),
        ),
    ]
}
