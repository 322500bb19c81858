//! Sign-in state
//!
//! The identity provider hands the browser an ID token; it is kept in
//! `localStorage` and sent as a bearer token on every callable request.

use leptos::prelude::*;

const TOKEN_KEY: &str = "checkout.idToken";

#[derive(Clone, Copy)]
pub struct AuthContext {
    token: RwSignal<Option<String>>,
    /// True until the stored token has been read
    is_loading: RwSignal<bool>,
}

impl AuthContext {
    /// Create the context, provide it to the tree and restore any stored token
    pub fn provide() -> Self {
        let ctx = Self {
            token: RwSignal::new(None),
            is_loading: RwSignal::new(true),
        };
        provide_context(ctx);

        Effect::new(move |_| {
            ctx.token.set(storage().and_then(|s| s.get_item(TOKEN_KEY).ok().flatten()));
            ctx.is_loading.set(false);
        });

        ctx
    }

    pub fn token_untracked(&self) -> Option<String> {
        self.token.get_untracked()
    }

    pub fn is_signed_in(&self) -> bool {
        self.token.with(Option::is_some)
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading.get()
    }

    pub fn sign_in(&self, token: String) {
        if let Some(storage) = storage() {
            storage_write("persist", storage.set_item(TOKEN_KEY, &token));
        }
        self.token.set(Some(token));
    }

    pub fn sign_out(&self) {
        if let Some(storage) = storage() {
            storage_write("clear", storage.remove_item(TOKEN_KEY));
        }
        self.token.set(None);
    }
}

pub fn use_auth() -> AuthContext {
    expect_context::<AuthContext>()
}

fn storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

/// Log a failed `localStorage` write; the in-memory state still changes
fn storage_write<E: std::fmt::Debug>(action: &str, result: Result<(), E>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            leptos::logging::warn!("Could not {action} ID token: {e:?}");
            false
        }
    }
}
