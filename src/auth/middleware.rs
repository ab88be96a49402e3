use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;

use crate::auth::extractors::CurrentUser;
use crate::auth::session::{verify_token, SESSION_COOKIE};
use crate::error::AppError;
use crate::flash::{redirect_with, Flash};
use crate::models::User;
use crate::state::AppState;

/// Paths reachable without a session.
const PUBLIC_PATHS: [&str; 4] = ["/", "/register", "/logout", "/health"];

pub fn is_public(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path)
}

/// Requires a valid session on every non-public route.
///
/// A request with a valid session cookie gets its `CurrentUser` inserted into
/// the request extensions. Anything else is redirected to the login page with
/// a flash message, and the wrapped handler never runs. Paths that match no
/// route fall through to the default 404 without a flash.
pub struct SessionGate;

impl<S, B> Transform<S, ServiceRequest> for SessionGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = SessionGateService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionGateService {
            service: Rc::new(service),
        }))
    }
}

pub struct SessionGateService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for SessionGateService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            if is_public(req.path()) {
                let res = service.call(req).await?;
                return Ok(res.map_into_left_body());
            }

            let user = resolve_session_user(&req).await?;

            match user {
                Some(user) => {
                    req.extensions_mut().insert(user);
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                None if !is_routed(&req) => {
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                None => {
                    log::info!("Unauthenticated request to {} redirected to login", req.path());
                    let response = redirect_with(Flash::LoginRequired, "/");
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}

fn is_routed(req: &ServiceRequest) -> bool {
    req.resource_map().has_resource(req.path())
}

/// Decodes the session cookie and loads its user.
///
/// A missing cookie, a bad or expired token, or a user that no longer exists
/// all resolve to `None`.
async fn resolve_session_user(req: &ServiceRequest) -> Result<Option<CurrentUser>, AppError> {
    let Some(state) = req.app_data::<web::Data<AppState>>() else {
        return Err(AppError::InternalServerError(
            "AppState is not registered".into(),
        ));
    };

    let Some(cookie) = req.cookie(SESSION_COOKIE) else {
        return Ok(None);
    };

    let claims = match verify_token(cookie.value(), &state.config.secret_key) {
        Ok(claims) => claims,
        Err(err) => {
            log::debug!("Rejected session cookie: {}", err);
            return Ok(None);
        }
    };

    let user = User::find_by_id(&state.pool, claims.sub).await?;
    Ok(user.map(CurrentUser::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_paths() {
        assert!(is_public("/"));
        assert!(is_public("/register"));
        assert!(is_public("/logout"));
        assert!(is_public("/health"));

        assert!(!is_public("/user"));
        assert!(!is_public("/add_list"));
        assert!(!is_public("/delete_list/1"));
        assert!(!is_public("/list/1"));
        assert!(!is_public("/1/add_task"));
        assert!(!is_public("/delete_task/1"));
        assert!(!is_public("/complete/1"));
    }
}
