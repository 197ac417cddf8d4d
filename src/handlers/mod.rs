pub mod debug;
pub mod health;
pub mod launch_status;
pub mod verification_request;
pub mod verify_email;

pub use debug::{debug_cookies, debug_session};
pub use health::health_check;
pub use launch_status::launch_status;
pub use verification_request::{request_verification_email, resend_verification};
pub use verify_email::verify_email;
