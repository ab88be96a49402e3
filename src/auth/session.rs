use crate::error::AppError;
use actix_web::cookie::{Cookie, SameSite};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Name of the cookie holding the signed session token.
pub const SESSION_COOKIE: &str = "session";

/// How long a session token stays valid after login.
pub const SESSION_TTL_HOURS: i64 = 24;

/// Claims carried by the session token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Id of the logged-in user.
    pub sub: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
}

/// Signs a session token for `user_id` with `secret`, valid for 24 hours.
pub fn issue_token(user_id: i64, secret: &str) -> Result<String, AppError> {
    let expiration = chrono::Utc::now()
        .checked_add_signed(chrono::Duration::hours(SESSION_TTL_HOURS))
        .ok_or_else(|| AppError::InternalServerError("Session expiry out of range".into()))?
        .timestamp() as usize;

    let claims = Claims {
        sub: user_id,
        exp: expiration,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}

/// Checks the token's signature and expiry and returns its claims.
///
/// Returns `AppError::Unauthorized` if the token is malformed, was signed with a
/// different key, or has expired.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid session: {}", e)))
}

/// The cookie that logs the browser in.
pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish()
}

/// A cookie that overwrites and expires the session cookie.
pub fn clear_session_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(SESSION_COOKIE, "").path("/").finish();
    cookie.make_removal();
    cookie
}
