pub mod listing;
#[cfg(test)]
pub(crate) mod memory;
pub mod session;
pub mod user;
pub mod verification_store;
pub mod verification_token;

pub use listing::ListingRepository;
pub use session::SessionRepository;
pub use user::{NewUser, UserDeletion, UserRepository};
pub use verification_store::{PgVerificationStore, VerificationStore, VerificationUnitOfWork};
pub use verification_token::VerificationTokenRepository;
