//! Pricing Page

use leptos::prelude::*;

use crate::api::{self, PriceEntry};
use crate::components::CheckoutButton;

#[component]
pub fn PricingPage() -> impl IntoView {
    let (prices, set_prices) = signal(Vec::<PriceEntry>::new());
    let (loading, set_loading) = signal(true);

    leptos::task::spawn_local(async move {
        match api::list_prices().await {
            Ok(list) => set_prices.set(list),
            Err(e) => leptos::logging::error!("Could not load prices: {e}"),
        }
        set_loading.set(false);
    });

    view! {
        <div class="pricing">
            <h1>"Pricing"</h1>

            <Show
                when=move || !loading.get()
                fallback=|| view! { <p class="loading">"Loading prices..."</p> }
            >
                <div class="plans">
                    <For
                        each=move || prices.get()
                        key=|entry| entry.price_id.clone()
                        children=move |entry| view! {
                            <div class="plan">
                                <h2>{entry.label.clone()}</h2>
                                <CheckoutButton price_id=entry.price_id label="Buy now" />
                            </div>
                        }
                    />
                </div>
                <Show when=move || prices.with(Vec::is_empty)>
                    <p>"Nothing for sale right now."</p>
                </Show>
            </Show>
        </div>
    }
}
