mod middleware;
mod password;
mod session;

pub use middleware::{AuthError, RequireSession, RequireUser};
pub use password::PasswordManager;
pub use session::{
    SESSION_COOKIE, SESSION_TTL_SECS, SessionClaims, SessionKeys, build_session_cookie,
    clear_session_cookie, session_from_cookies,
};
