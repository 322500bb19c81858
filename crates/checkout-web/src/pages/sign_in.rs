//! Sign-in Page
//!
//! Accepts an ID token issued by the identity provider.

use leptos::prelude::*;
use leptos_router::{NavigateOptions, hooks::use_navigate};

use crate::auth::use_auth;

#[component]
pub fn SignInPage() -> impl IntoView {
    let auth = use_auth();
    let navigate = use_navigate();
    let (token, set_token) = signal(String::new());

    let submit = move |_| {
        let value = token.get_untracked().trim().to_string();
        if value.is_empty() {
            return;
        }
        auth.sign_in(value);
        navigate("/", NavigateOptions::default());
    };

    view! {
        <div class="sign-in">
            <h1>"Sign in"</h1>
            <div class="field">
                <label>"ID token"</label>
                <textarea
                    rows="4"
                    prop:value=move || token.get()
                    on:input=move |ev| set_token.set(event_target_value(&ev))
                />
            </div>
            <button class="btn btn-primary" on:click=submit>"Continue"</button>
        </div>
    }
}
