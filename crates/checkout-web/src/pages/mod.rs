//! Page Components

mod cancel;
mod pricing;
mod sign_in;
mod success;

pub use cancel::CancelPage;
pub use pricing::PricingPage;
pub use sign_in::SignInPage;
pub use success::SuccessPage;
