//! Cancel Page

use leptos::prelude::*;

#[component]
pub fn CancelPage() -> impl IntoView {
    view! {
        <div class="cancel">
            <h1>"Checkout cancelled"</h1>
            <p>"You have not been charged."</p>
            <a href="/" class="btn">"Back to pricing"</a>
        </div>
    }
}
