//! Success Page
//!
//! Stripe redirects here with `?session_id=...` after payment.

use leptos::prelude::*;
use leptos_router::{
    NavigateOptions,
    hooks::{use_navigate, use_query_map},
};

use crate::api;
use crate::auth::use_auth;
use crate::state::{ConfirmationStep, Receipt, confirmation_step};

#[component]
pub fn SuccessPage() -> impl IntoView {
    let auth = use_auth();
    let query = use_query_map();
    let navigate = use_navigate();
    let (receipt, set_receipt) = signal(None::<Receipt>);
    // One fetch per page view, no retries
    let requested = StoredValue::new(false);

    Effect::new(move |_| {
        let session_id = query.with(|q| q.get("session_id"));
        let step = confirmation_step(
            auth.is_loading(),
            auth.is_signed_in(),
            session_id.as_deref(),
            requested.get_value(),
        );

        match step {
            ConfirmationStep::WaitForAuth | ConfirmationStep::Done => {}
            ConfirmationStep::RedirectToSignIn => {
                navigate("/sign-in", NavigateOptions::default());
            }
            ConfirmationStep::MissingSessionId => {
                leptos::logging::warn!("No session_id in URL");
            }
            ConfirmationStep::Fetch(id) => {
                let Some(token) = auth.token_untracked() else {
                    return;
                };
                requested.set_value(true);
                leptos::task::spawn_local(async move {
                    match api::get_session(&token, &id).await {
                        Ok(response) => {
                            set_receipt.set(Some(Receipt::from_session(&response.session)));
                        }
                        Err(e) => leptos::logging::error!("Could not load session {id}: {e}"),
                    }
                });
            }
        }
    });

    view! {
        <div class="success">
            {move || match receipt.get() {
                None => view! { <p class="loading">"Loading..."</p> }.into_any(),
                Some(receipt) => view! {
                    <h1>"Thanks for your purchase!"</h1>
                    <p>"Thank you, " {receipt.customer_name}"."</p>
                    {receipt.amount.map(|amount| view! { <p>"Amount paid: " {amount}</p> })}
                    <p class="payment-id">"Payment ID: " <code>{receipt.payment_id}</code></p>
                    <a href="/" class="btn">"Back to pricing"</a>
                }
                .into_any(),
            }}
        </div>
    }
}
