//! One-shot messages carried across a redirect.
//!
//! A handler that redirects with a message stores the message's stable code in
//! the `flash` cookie. The next page that renders reads it through the
//! [`IncomingFlash`] extractor, shows the text, and expires the cookie.

use actix_web::{
    cookie::{Cookie, SameSite},
    dev::Payload,
    http::header,
    FromRequest, HttpRequest, HttpResponse, HttpResponseBuilder,
};
use std::convert::Infallible;
use std::future::{ready, Ready};

pub const FLASH_COOKIE: &str = "flash";

/// Every message the application can flash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    UnknownEmail,
    WrongPassword,
    AlreadyRegistered,
    LoginRequired,
}

impl Flash {
    const ALL: [Flash; 4] = [
        Flash::UnknownEmail,
        Flash::WrongPassword,
        Flash::AlreadyRegistered,
        Flash::LoginRequired,
    ];

    /// Cookie-safe identifier.
    pub fn code(self) -> &'static str {
        match self {
            Flash::UnknownEmail => "unknown_email",
            Flash::WrongPassword => "wrong_password",
            Flash::AlreadyRegistered => "already_registered",
            Flash::LoginRequired => "login_required",
        }
    }

    pub fn from_code(code: &str) -> Option<Flash> {
        Flash::ALL.into_iter().find(|flash| flash.code() == code)
    }

    pub fn message(self) -> &'static str {
        match self {
            Flash::UnknownEmail => "That email does not exist, please try again.",
            Flash::WrongPassword => "Password incorrect, please try again.",
            Flash::AlreadyRegistered => "You've already signed up with that email, log in instead!",
            Flash::LoginRequired => "You need to login or register to continue.",
        }
    }

    fn cookie(self) -> Cookie<'static> {
        Cookie::build(FLASH_COOKIE, self.code())
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .finish()
    }
}

/// A 302 redirect to `location`.
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// A 302 redirect to `location` that shows `flash` on the next page.
pub fn redirect_with(flash: Flash, location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .cookie(flash.cookie())
        .finish()
}

/// The flash message pending for this request, if any.
#[derive(Debug, Clone, Copy, Default)]
pub struct IncomingFlash(pub Option<Flash>);

impl IncomingFlash {
    pub fn from_request_cookie(req: &HttpRequest) -> Self {
        IncomingFlash(
            req.cookie(FLASH_COOKIE)
                .and_then(|cookie| Flash::from_code(cookie.value())),
        )
    }

    pub fn messages(&self) -> Vec<&'static str> {
        self.0.iter().map(|flash| flash.message()).collect()
    }

    /// Expires the flash cookie once its message has been shown.
    pub fn consume(&self, response: &mut HttpResponseBuilder) {
        if self.0.is_some() {
            let mut removal = Cookie::build(FLASH_COOKIE, "").path("/").finish();
            removal.make_removal();
            response.cookie(removal);
        }
    }
}

impl FromRequest for IncomingFlash {
    type Error = Infallible;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(IncomingFlash::from_request_cookie(req)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test as actix_test;

    #[test]
    fn test_codes_round_trip_and_unknown_codes_are_ignored() {
        for flash in Flash::ALL {
            assert_eq!(Flash::from_code(flash.code()), Some(flash));
        }
        assert_eq!(Flash::from_code("<script>"), None);
    }

    #[test]
    fn test_redirect_with_sets_cookie() {
        let response = redirect_with(Flash::WrongPassword, "/");
        assert_eq!(response.status(), 302);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");

        let cookie = response
            .cookies()
            .find(|cookie| cookie.name() == FLASH_COOKIE)
            .expect("flash cookie");
        assert_eq!(cookie.value(), "wrong_password");
    }

    #[test]
    fn test_incoming_flash_reads_cookie() {
        let req = actix_test::TestRequest::default()
            .cookie(Cookie::new(FLASH_COOKIE, "login_required"))
            .to_http_request();

        let incoming = IncomingFlash::from_request_cookie(&req);
        assert_eq!(incoming.0, Some(Flash::LoginRequired));
        assert_eq!(
            incoming.messages(),
            vec!["You need to login or register to continue."]
        );

        let req = actix_test::TestRequest::default().to_http_request();
        assert!(IncomingFlash::from_request_cookie(&req).messages().is_empty());
    }
}
