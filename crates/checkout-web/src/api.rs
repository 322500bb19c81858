//! API Client
//!
//! Callables take `{"data": ...}` and answer `{"result": ...}` or
//! `{"error": {"code", "message"}}`.

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::state::SessionView;

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceEntry {
    pub price_id: String,
    pub label: String,
}

#[derive(Debug, Deserialize)]
struct PricesResponse {
    prices: Vec<PriceEntry>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub session_id: String,
    pub url: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SessionResponse {
    pub session: SessionView,
}

#[derive(Serialize)]
struct CallableRequest<T> {
    data: T,
}

#[derive(Deserialize)]
struct CallableResponse<T> {
    result: T,
}

/// Backend base URL; reqwest needs absolute URLs in the browser
fn origin() -> String {
    web_sys::window()
        .and_then(|w| w.location().origin().ok())
        .unwrap_or_else(|| "http://localhost:3000".into())
}

async fn call<Req, Res>(name: &str, token: &str, data: Req) -> Result<Res, String>
where
    Req: Serialize,
    Res: DeserializeOwned,
{
    let response = reqwest::Client::new()
        .post(format!("{}/api/{name}", origin()))
        .bearer_auth(token)
        .json(&CallableRequest { data })
        .send()
        .await
        .map_err(|e| e.to_string())?;

    if response.status().is_success() {
        let body: CallableResponse<Res> = response.json().await.map_err(|e| e.to_string())?;
        Ok(body.result)
    } else {
        let status = response.status();
        let data: serde_json::Value = response.json().await.unwrap_or_default();
        let code = data["error"]["code"].as_str().unwrap_or("internal");
        let message = data["error"]["message"].as_str().unwrap_or("Request failed");
        Err(format!("{name} failed ({status}, {code}): {message}"))
    }
}

/// Prices offered on the pricing page
pub async fn list_prices() -> Result<Vec<PriceEntry>, String> {
    let response = reqwest::Client::new()
        .get(format!("{}/api/prices", origin()))
        .send()
        .await
        .map_err(|e| e.to_string())?;

    if !response.status().is_success() {
        return Err(format!("Failed to load prices ({})", response.status()));
    }
    let body: PricesResponse = response.json().await.map_err(|e| e.to_string())?;
    Ok(body.prices)
}

/// Create a Stripe checkout session for `price_id`
pub async fn create_checkout_session(token: &str, price_id: &str) -> Result<CheckoutResponse, String> {
    call(
        "createCheckoutSession",
        token,
        serde_json::json!({ "priceId": price_id }),
    )
    .await
}

/// Fetch a finished session for the confirmation page
pub async fn get_session(token: &str, session_id: &str) -> Result<SessionResponse, String> {
    call(
        "getSession",
        token,
        serde_json::json!({ "sessionId": session_id }),
    )
    .await
}
