use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use serde::Serialize;
use std::future::{ready, Ready};

use crate::error::AppError;
use crate::models::User;

/// The logged-in user, as resolved by `SessionGate` for this request.
///
/// Handlers on gated routes take this as an argument instead of reading any
/// ambient "current user". If the gate did not run (a wiring mistake), the
/// extractor fails with `AppError::Unauthorized`.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub id: i64,
    pub email: String,
    pub name: String,
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        CurrentUser {
            id: user.id,
            email: user.email,
            name: user.name,
        }
    }
}

impl FromRequest for CurrentUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<CurrentUser>().cloned() {
            Some(user) => ready(Ok(user)),
            None => {
                let err = AppError::Unauthorized(
                    "No session user on this request. Is SessionGate active?".to_string(),
                );
                ready(Err(err.into()))
            }
        }
    }
}
