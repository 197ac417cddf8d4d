pub mod agreement;
pub mod session;
pub mod user;
pub mod verification_token;

pub use agreement::Agreement;
pub use session::SessionWithUser;
pub use user::User;
pub use verification_token::VerificationToken;
