//! Cross-site request forgery protection for the HTML forms.
//!
//! Each browser holds a signed token in the `csrf_token` cookie, and every
//! rendered form repeats it in a hidden `csrf_token` field. A submission is
//! accepted only when the field carries a valid token equal to the cookie's.
//! A third-party page can make the browser send the cookie but cannot read it
//! to fill in the field.

use actix_web::{
    cookie::{Cookie, SameSite},
    dev::Payload,
    web, Error as ActixError, FromRequest, HttpRequest, HttpResponseBuilder,
};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

/// Name of both the cookie and the hidden form field.
pub const CSRF_COOKIE: &str = "csrf_token";

pub const CSRF_TTL_HOURS: i64 = 24;

pub const MISSING_TOKEN: &str = "The CSRF token is missing.";
pub const MISSING_SESSION_TOKEN: &str = "The CSRF session token is missing.";
pub const EXPIRED_TOKEN: &str = "The CSRF token has expired.";
pub const INVALID_TOKEN: &str = "The CSRF token is invalid.";
pub const TOKENS_DO_NOT_MATCH: &str = "The CSRF tokens do not match.";

#[derive(Debug, Serialize, Deserialize)]
struct CsrfClaims {
    nonce: Uuid,
    exp: usize,
}

fn sign(secret: &str) -> Result<String, AppError> {
    let expiration = chrono::Utc::now()
        .checked_add_signed(chrono::Duration::hours(CSRF_TTL_HOURS))
        .ok_or_else(|| AppError::InternalServerError("CSRF expiry out of range".into()))?
        .timestamp() as usize;

    let claims = CsrfClaims {
        nonce: Uuid::new_v4(),
        exp: expiration,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}

/// Checks a token's signature and expiry. The error is the message shown
/// next to the form.
fn verify(token: &str, secret: &str) -> Result<(), &'static str> {
    decode::<CsrfClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|_| ())
    .map_err(|err| match err.kind() {
        ErrorKind::ExpiredSignature => EXPIRED_TOKEN,
        _ => INVALID_TOKEN,
    })
}

/// The CSRF token bound to this browser.
#[derive(Debug, Clone)]
pub struct CsrfToken {
    token: String,
    /// Minted for this request because the browser had no valid cookie yet.
    fresh: bool,
    secret: String,
}

impl CsrfToken {
    /// A new token that still has to be sent to the browser.
    pub fn mint(secret: &str) -> Result<Self, AppError> {
        Ok(CsrfToken {
            token: sign(secret)?,
            fresh: true,
            secret: secret.to_string(),
        })
    }

    /// The token from a request cookie, if it was signed with `secret` and has
    /// not expired.
    pub fn from_cookie(value: &str, secret: &str) -> Option<Self> {
        verify(value, secret).ok()?;
        Some(CsrfToken {
            token: value.to_string(),
            fresh: false,
            secret: secret.to_string(),
        })
    }

    pub fn from_request_cookie(req: &HttpRequest) -> Result<Self, AppError> {
        let state = req
            .app_data::<web::Data<AppState>>()
            .ok_or_else(|| AppError::InternalServerError("AppState is not registered".into()))?;
        let secret = &state.config.secret_key;

        match req
            .cookie(CSRF_COOKIE)
            .and_then(|cookie| CsrfToken::from_cookie(cookie.value(), secret))
        {
            Some(token) => Ok(token),
            None => CsrfToken::mint(secret),
        }
    }

    /// Value for the hidden form field.
    pub fn value(&self) -> &str {
        &self.token
    }

    /// Accepts `submitted` only if it is a valid token equal to the cookie's.
    pub fn check(&self, submitted: &str) -> Result<(), &'static str> {
        if submitted.is_empty() {
            return Err(MISSING_TOKEN);
        }
        verify(submitted, &self.secret)?;
        if self.fresh {
            return Err(MISSING_SESSION_TOKEN);
        }
        if submitted != self.token {
            return Err(TOKENS_DO_NOT_MATCH);
        }
        Ok(())
    }

    /// Sends the cookie when this request minted the token.
    pub fn apply(&self, response: &mut HttpResponseBuilder) {
        if self.fresh {
            response.cookie(
                Cookie::build(CSRF_COOKIE, self.token.clone())
                    .path("/")
                    .http_only(true)
                    .same_site(SameSite::Lax)
                    .finish(),
            );
        }
    }
}

impl FromRequest for CsrfToken {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(CsrfToken::from_request_cookie(req).map_err(Into::into))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::HttpResponse;

    const SECRET: &str = "csrf-test-secret";

    fn established() -> CsrfToken {
        let minted = CsrfToken::mint(SECRET).unwrap();
        CsrfToken::from_cookie(minted.value(), SECRET).unwrap()
    }

    #[test]
    fn test_matching_token_is_accepted() {
        let token = established();
        assert_eq!(token.check(&token.value().to_string()), Ok(()));
    }

    #[test]
    fn test_rejection_reasons() {
        let token = established();
        let other = CsrfToken::mint(SECRET).unwrap();
        let foreign = CsrfToken::mint("some-other-secret").unwrap();

        let test_cases = vec![
            ("", MISSING_TOKEN, "empty field"),
            ("garbage", INVALID_TOKEN, "malformed token"),
            (foreign.value(), INVALID_TOKEN, "token signed with another key"),
            (other.value(), TOKENS_DO_NOT_MATCH, "token for another browser"),
        ];

        for (submitted, expected, description) in test_cases {
            assert_eq!(token.check(submitted), Err(expected), "Test case failed: {}", description);
        }
    }

    #[test]
    fn test_fresh_token_has_no_session_counterpart() {
        let fresh = CsrfToken::mint(SECRET).unwrap();
        assert_eq!(fresh.check(&fresh.value().to_string()), Err(MISSING_SESSION_TOKEN));
    }

    #[test]
    fn test_expired_token_is_reported() {
        let expired = encode(
            &Header::default(),
            &CsrfClaims {
                nonce: Uuid::new_v4(),
                exp: (chrono::Utc::now().timestamp() - 7200) as usize,
            },
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(CsrfToken::from_cookie(&expired, SECRET).is_none());
        assert_eq!(established().check(&expired), Err(EXPIRED_TOKEN));
    }

    #[test]
    fn test_cookie_is_only_sent_for_fresh_tokens() {
        let mut response = HttpResponse::Ok();
        CsrfToken::mint(SECRET).unwrap().apply(&mut response);
        let response = response.finish();
        let cookie = response
            .cookies()
            .find(|cookie| cookie.name() == CSRF_COOKIE)
            .expect("csrf cookie");
        assert_eq!(cookie.http_only(), Some(true));

        let mut response = HttpResponse::Ok();
        established().apply(&mut response);
        assert_eq!(response.finish().cookies().count(), 0);
    }
}
