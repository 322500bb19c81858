//! Main App Component

use leptos::prelude::*;
use leptos_router::{components::*, path};

use crate::auth::AuthContext;
use crate::components::NavBar;
use crate::pages::{CancelPage, PricingPage, SignInPage, SuccessPage};

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    AuthContext::provide();

    view! {
        <Router>
            <NavBar />
            <main class="app">
                <Routes fallback=|| view! { <p>"Page not found"</p> }>
                    <Route path=path!("/") view=PricingPage />
                    <Route path=path!("/success") view=SuccessPage />
                    <Route path=path!("/cancel") view=CancelPage />
                    <Route path=path!("/sign-in") view=SignInPage />
                </Routes>
            </main>
        </Router>
    }
}
