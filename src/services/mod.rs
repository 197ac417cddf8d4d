pub mod auth;
pub mod email;
pub mod email_verification;
pub mod rate_limit;
pub mod verification_issue;

pub use email::{EmailDelivery, EmailService};
pub use email_verification::{EmailVerificationService, VerificationOutcome};
pub use rate_limit::EmailRateLimiter;
pub use verification_issue::{ResendResult, VerificationIssuer};
