//! Checkout Web Frontend
//!
//! Leptos-based WASM frontend: pricing page, checkout button and the
//! post-payment confirmation page.

mod api;
mod app;
mod auth;
mod components;
mod pages;
pub mod state;

pub use app::App;

use wasm_bindgen::prelude::*;

/// WASM entry point
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    leptos::mount::mount_to_body(App);
}
