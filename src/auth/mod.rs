pub mod extractors;
pub mod middleware;
pub mod password;
pub mod session;

pub use extractors::CurrentUser;
pub use middleware::SessionGate;
pub use password::{hash_password, verify_password};
pub use session::{clear_session_cookie, issue_token, session_cookie, verify_token, Claims};
