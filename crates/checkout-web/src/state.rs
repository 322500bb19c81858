//! Page state machines
//!
//! Kept free of Leptos so the decisions can be tested natively.

use serde::Deserialize;

/// Checkout button lifecycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CheckoutPhase {
    #[default]
    Idle,
    /// Waiting for the backend to create a session
    Loading,
    /// Browser is leaving for the hosted payment page
    Redirecting,
}

impl CheckoutPhase {
    /// Button must not accept clicks
    pub const fn is_busy(self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// Phase once the backend answered
    pub const fn after_response<T, E>(result: &Result<T, E>) -> Self {
        match result {
            Ok(_) => Self::Redirecting,
            Err(_) => Self::Idle,
        }
    }
}

/// What a click on the checkout button should do
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckoutAction {
    SignIn,
    CreateSession,
}

/// Decide the click's effect; `None` while a request is in flight
pub const fn on_activate(phase: CheckoutPhase, signed_in: bool) -> Option<CheckoutAction> {
    if phase.is_busy() {
        None
    } else if signed_in {
        Some(CheckoutAction::CreateSession)
    } else {
        Some(CheckoutAction::SignIn)
    }
}

/// Next step for the confirmation page
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfirmationStep {
    /// Auth state not known yet
    WaitForAuth,
    RedirectToSignIn,
    /// No `session_id` in the URL
    MissingSessionId,
    Fetch(String),
    /// Request already sent
    Done,
}

pub fn confirmation_step(
    auth_loading: bool,
    signed_in: bool,
    session_id: Option<&str>,
    requested: bool,
) -> ConfirmationStep {
    if auth_loading {
        return ConfirmationStep::WaitForAuth;
    }
    if !signed_in {
        return ConfirmationStep::RedirectToSignIn;
    }
    if requested {
        return ConfirmationStep::Done;
    }
    match session_id.map(str::trim).filter(|s| !s.is_empty()) {
        Some(id) => ConfirmationStep::Fetch(id.to_string()),
        None => ConfirmationStep::MissingSessionId,
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct CustomerView {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// The parts of a checkout session the confirmation page shows
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct SessionView {
    pub id: String,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub amount_total: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub customer_details: Option<CustomerView>,
    #[serde(default)]
    pub payment_intent: Option<String>,
}

/// Confirmation shown after payment
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    pub customer_name: String,
    pub payment_id: String,
    pub amount: Option<String>,
}

impl Receipt {
    pub fn from_session(session: &SessionView) -> Self {
        let customer = session.customer_details.as_ref();
        let customer_name = customer
            .and_then(|c| c.name.clone().or_else(|| c.email.clone()))
            .unwrap_or_else(|| "customer".into());

        Self {
            customer_name,
            payment_id: session
                .payment_intent
                .clone()
                .unwrap_or_else(|| session.id.clone()),
            amount: session
                .amount_total
                .zip(session.currency.as_deref())
                .map(|(minor, currency)| format_amount(minor, currency)),
        }
    }
}

/// Currencies Stripe charges in whole units
const ZERO_DECIMAL_CURRENCIES: &[&str] = &[
    "bif", "clp", "djf", "gnf", "jpy", "kmf", "krw", "mga", "pyg", "rwf", "ugx", "vnd", "vuv",
    "xaf", "xof", "xpf",
];

/// `1999, "usd"` → `"19.99 USD"`, `500, "jpy"` → `"500 JPY"`
pub fn format_amount(minor: i64, currency: &str) -> String {
    let code = currency.to_uppercase();
    if ZERO_DECIMAL_CURRENCIES.contains(&currency.to_ascii_lowercase().as_str()) {
        return format!("{minor} {code}");
    }

    let sign = if minor < 0 { "-" } else { "" };
    let minor = minor.unsigned_abs();
    format!("{sign}{}.{:02} {code}", minor / 100, minor % 100)
}
