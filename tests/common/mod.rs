#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::header;
use actix_web::middleware::Logger;
use actix_web::{test, web, App};
use tasklists::{auth::SessionGate, db, routes, AppState, Config};

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        secret_key: "integration-test-secret".to_string(),
        server_port: 5000,
        server_host: "127.0.0.1".to_string(),
        bcrypt_cost: 4,
    }
}

/// Fresh in-memory database with the schema applied.
pub async fn test_state() -> web::Data<AppState> {
    let config = test_config();
    let pool = db::init(&config.database_url)
        .await
        .expect("Failed to open in-memory test DB");
    web::Data::new(AppState::new(pool, config))
}

/// The application exactly as `main` assembles it.
pub async fn init_app(
    state: web::Data<AppState>,
) -> impl Service<actix_http::Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>
{
    test::init_service(
        App::new()
            .app_data(state)
            .wrap(SessionGate)
            .wrap(Logger::default())
            .configure(routes::config),
    )
    .await
}

pub fn location<B>(resp: &ServiceResponse<B>) -> String {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

pub fn response_cookie<B>(resp: &ServiceResponse<B>, name: &str) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.into_owned())
}

/// The live session cookie set by a response, ignoring removal cookies.
pub fn session_from<B>(resp: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    response_cookie(resp, "session").filter(|cookie| !cookie.value().is_empty())
}

pub fn flash_code<B>(resp: &ServiceResponse<B>) -> Option<String> {
    response_cookie(resp, "flash")
        .filter(|cookie| !cookie.value().is_empty())
        .map(|cookie| cookie.value().to_string())
}

pub async fn count(state: &web::Data<AppState>, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(&state.pool)
        .await
        .expect("count query")
}

pub async fn register<S, B>(app: &S, email: &str, password: &str, name: &str) -> ServiceResponse<B>
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    post_form(app, "/register", &[("email", email), ("password", password), ("name", name)], None).await
}

pub async fn login<S, B>(app: &S, email: &str, password: &str) -> ServiceResponse<B>
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    post_form(app, "/", &[("email", email), ("password", password)], None).await
}

/// Registers an account and returns its session cookie.
pub async fn signed_in<S, B>(app: &S, email: &str, name: &str) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let resp = register(app, email, "pw", name).await;
    session_from(&resp).expect("registration should log the user in")
}

pub async fn get<S, B>(app: &S, uri: &str, session: Option<&Cookie<'static>>) -> ServiceResponse<B>
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let mut req = test::TestRequest::get().uri(uri);
    if let Some(cookie) = session {
        req = req.cookie(cookie.clone());
    }
    test::call_service(app, req.to_request()).await
}

/// The CSRF cookie a browser receives when it first opens the login page.
pub async fn csrf_cookie<S, B>(app: &S) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let resp = get(app, "/", None).await;
    response_cookie(&resp, "csrf_token").expect("login page should set a CSRF cookie")
}

/// Posts `form` exactly as given, with `cookies` attached.
pub async fn post_raw<S, B>(
    app: &S,
    uri: &str,
    form: &[(&str, &str)],
    cookies: &[Cookie<'static>],
) -> ServiceResponse<B>
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let mut req = test::TestRequest::post().uri(uri).set_form(form);
    for cookie in cookies {
        req = req.cookie(cookie.clone());
    }
    test::call_service(app, req.to_request()).await
}

/// Posts `form` the way the rendered page would, with a valid CSRF token.
pub async fn post_form<S, B>(
    app: &S,
    uri: &str,
    form: &[(&str, &str)],
    session: Option<&Cookie<'static>>,
) -> ServiceResponse<B>
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let csrf = csrf_cookie(app).await;
    let mut fields = form.to_vec();
    fields.push(("csrf_token", csrf.value()));

    let mut cookies = vec![csrf.clone()];
    cookies.extend(session.cloned());
    post_raw(app, uri, &fields, &cookies).await
}

pub async fn body_text<B: MessageBody>(resp: ServiceResponse<B>) -> String {
    let bytes = test::read_body(resp).await;
    String::from_utf8_lossy(&bytes).into_owned()
}
