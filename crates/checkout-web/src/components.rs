//! UI Components

use leptos::prelude::*;
use leptos_router::{NavigateOptions, hooks::use_navigate};

use crate::api;
use crate::auth::use_auth;
use crate::state::{CheckoutAction, CheckoutPhase, on_activate};

/// Leave the app for an external page
pub fn redirect_to(url: &str) -> bool {
    web_sys::window().is_some_and(|w| w.location().set_href(url).is_ok())
}

#[component]
pub fn NavBar() -> impl IntoView {
    let auth = use_auth();

    view! {
        <nav class="navbar">
            <a href="/" class="brand">"Store"</a>
            <Show
                when=move || auth.is_signed_in()
                fallback=|| view! { <a href="/sign-in">"Sign in"</a> }
            >
                <button class="btn btn-link" on:click=move |_| auth.sign_out()>
                    "Sign out"
                </button>
            </Show>
        </nav>
    }
}

/// Starts Stripe Checkout for one price
#[component]
pub fn CheckoutButton(
    #[prop(into)] price_id: String,
    #[prop(into)] label: String,
) -> impl IntoView {
    let auth = use_auth();
    let navigate = use_navigate();
    let (phase, set_phase) = signal(CheckoutPhase::Idle);

    let on_click = move |_| {
        match on_activate(phase.get_untracked(), auth.token_untracked().is_some()) {
            None => {}
            Some(CheckoutAction::SignIn) => {
                leptos::logging::log!("Not signed in, redirecting to sign-in");
                navigate("/sign-in", NavigateOptions::default());
            }
            Some(CheckoutAction::CreateSession) => {
                let Some(token) = auth.token_untracked() else {
                    return;
                };
                let price_id = price_id.clone();
                set_phase.set(CheckoutPhase::Loading);

                leptos::task::spawn_local(async move {
                    let result = api::create_checkout_session(&token, &price_id).await;
                    set_phase.set(CheckoutPhase::after_response(&result));

                    match result {
                        Ok(session) => {
                            leptos::logging::log!("Redirecting to checkout {}", session.session_id);
                            if !redirect_to(&session.url) {
                                set_phase.set(CheckoutPhase::Idle);
                            }
                        }
                        Err(e) => leptos::logging::error!("Checkout failed: {e}"),
                    }
                });
            }
        }
    };

    view! {
        <button
            class="btn btn-primary"
            disabled=move || phase.get().is_busy()
            on:click=on_click
        >
            {move || match phase.get() {
                CheckoutPhase::Idle => label.clone(),
                CheckoutPhase::Loading => "Loading...".to_string(),
                CheckoutPhase::Redirecting => "Redirecting...".to_string(),
            }}
        </button>
    }
}
