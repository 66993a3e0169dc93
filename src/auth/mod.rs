pub mod admin;
pub mod sessions;
pub mod token;

pub use admin::{check_password, clear_session_cookie, session_cookie, session_token};
pub use sessions::{create_admin_session, is_valid_session, revoke_session};
