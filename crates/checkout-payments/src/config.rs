//! Payments configuration
//!
//! Secrets and the price allow-list come from the environment, never from
//! the client.

use std::time::Duration;

use serde::Serialize;

use crate::error::{PaymentError, Result};

const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_TOLERANCE_SECS: u64 = 300;

/// Placeholder Stripe substitutes with the real session id on redirect
pub const CHECKOUT_SESSION_ID_PLACEHOLDER: &str = "{CHECKOUT_SESSION_ID}";

/// Runtime configuration for the checkout services
#[derive(Clone, Debug)]
pub struct PaymentsConfig {
    /// Stripe secret API key
    pub secret_key: String,

    /// Webhook signing secret (`whsec_...`)
    pub webhook_secret: String,

    /// Prices a client may ask to buy
    pub prices: PriceAllowList,

    /// Where Stripe sends the browser after payment
    pub success_url: String,

    /// Where Stripe sends the browser if the user backs out
    pub cancel_url: String,

    /// Maximum accepted age of a webhook signature
    pub webhook_tolerance: Duration,

    /// Only the purchaser may read a session's details
    pub require_session_owner: bool,
}

impl PaymentsConfig {
    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| PaymentError::Config(format!("{key} not set")))
        };

        let secret_key = required("STRIPE_SECRET_KEY")?;
        let webhook_secret = required("STRIPE_WEBHOOK_SECRET")?;

        let prices = PriceAllowList::parse(&lookup("CHECKOUT_PRICES").unwrap_or_default());
        if prices.is_empty() {
            tracing::warn!("CHECKOUT_PRICES is empty - every checkout request will be rejected");
        }

        let base_url = lookup("APP_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let base_url = base_url.trim_end_matches('/');

        let webhook_tolerance = match lookup("WEBHOOK_TOLERANCE_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                PaymentError::Config(format!("WEBHOOK_TOLERANCE_SECS is not a number: {raw}"))
            })?,
            None => DEFAULT_TOLERANCE_SECS,
        };

        let require_session_owner = match lookup("REQUIRE_SESSION_OWNER") {
            Some(raw) => parse_flag(&raw).ok_or_else(|| {
                PaymentError::Config(format!("REQUIRE_SESSION_OWNER is not a boolean: {raw}"))
            })?,
            None => true,
        };

        Ok(Self {
            secret_key,
            webhook_secret,
            prices,
            success_url: format!("{base_url}/success?session_id={CHECKOUT_SESSION_ID_PLACEHOLDER}"),
            cancel_url: format!("{base_url}/cancel"),
            webhook_tolerance: Duration::from_secs(webhook_tolerance),
            require_session_owner,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// One purchasable price
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceEntry {
    pub price_id: String,
    pub label: String,
}

/// Server-side allow-list of Stripe price ids, in configured order
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PriceAllowList {
    entries: Vec<PriceEntry>,
}

impl PriceAllowList {
    /// Parse `price_a:Label A,price_b` (label defaults to the id)
    pub fn parse(raw: &str) -> Self {
        let mut list = Self::default();
        for item in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let (id, label) = match item.split_once(':') {
                Some((id, label)) => (id.trim(), label.trim()),
                None => (item, item),
            };
            if id.is_empty() {
                continue;
            }
            list.insert(id, if label.is_empty() { id } else { label });
        }
        list
    }

    /// Add a price; duplicates are ignored
    pub fn insert(&mut self, price_id: impl Into<String>, label: impl Into<String>) {
        let price_id = price_id.into();
        if !self.contains(&price_id) {
            self.entries.push(PriceEntry {
                price_id,
                label: label.into(),
            });
        }
    }

    pub fn contains(&self, price_id: &str) -> bool {
        self.entries.iter().any(|e| e.price_id == price_id)
    }

    pub fn entries(&self) -> &[PriceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = PaymentsConfig::from_lookup(lookup(&[
            ("STRIPE_SECRET_KEY", "sk_test_1"),
            ("STRIPE_WEBHOOK_SECRET", "whsec_1"),
        ]))
        .unwrap();

        assert!(config.prices.is_empty());
        assert_eq!(
            config.success_url,
            "http://localhost:3000/success?session_id={CHECKOUT_SESSION_ID}"
        );
        assert_eq!(config.cancel_url, "http://localhost:3000/cancel");
        assert_eq!(config.webhook_tolerance, Duration::from_secs(300));
        assert!(config.require_session_owner);
    }

    #[test]
    fn test_missing_secret_is_config_error() {
        let err = PaymentsConfig::from_lookup(lookup(&[("STRIPE_WEBHOOK_SECRET", "whsec_1")]))
            .unwrap_err();
        assert_eq!(err, PaymentError::Config("STRIPE_SECRET_KEY not set".into()));
    }

    #[test]
    fn test_overrides() {
        let config = PaymentsConfig::from_lookup(lookup(&[
            ("STRIPE_SECRET_KEY", "sk_test_1"),
            ("STRIPE_WEBHOOK_SECRET", "whsec_1"),
            ("APP_BASE_URL", "https://shop.example/"),
            ("WEBHOOK_TOLERANCE_SECS", "60"),
            ("REQUIRE_SESSION_OWNER", "off"),
            ("CHECKOUT_PRICES", "price_123:Starter pack, price_456"),
        ]))
        .unwrap();

        assert_eq!(config.cancel_url, "https://shop.example/cancel");
        assert_eq!(config.webhook_tolerance, Duration::from_secs(60));
        assert!(!config.require_session_owner);
        assert_eq!(config.prices.len(), 2);
        assert_eq!(config.prices.entries()[0].label, "Starter pack");
        assert_eq!(config.prices.entries()[1].label, "price_456");
    }

    #[test]
    fn test_bad_tolerance_rejected() {
        let result = PaymentsConfig::from_lookup(lookup(&[
            ("STRIPE_SECRET_KEY", "sk_test_1"),
            ("STRIPE_WEBHOOK_SECRET", "whsec_1"),
            ("WEBHOOK_TOLERANCE_SECS", "five minutes"),
        ]));
        assert!(matches!(result, Err(PaymentError::Config(_))));
    }

    #[test]
    fn test_allow_list_ignores_blanks_and_duplicates() {
        let list = PriceAllowList::parse(" price_a , ,price_a:Again,:orphan,price_b:B ");
        assert_eq!(list.len(), 2);
        assert!(list.contains("price_a"));
        assert!(list.contains("price_b"));
        assert!(!list.contains("price_c"));
    }
}
