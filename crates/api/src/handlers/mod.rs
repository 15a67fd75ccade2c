pub mod candidates;
pub mod onboarding;
