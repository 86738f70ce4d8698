// Accounts: identity sync and onboarding profile.
// Completing onboarding also makes sure the chosen industry has an insight.

pub mod handlers;
pub mod onboarding;
pub mod store;
