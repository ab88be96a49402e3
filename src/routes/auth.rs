use crate::{
    auth::{clear_session_cookie, hash_password, issue_token, session_cookie, verify_password},
    csrf::CsrfToken,
    error::AppError,
    flash::{redirect_with, Flash, IncomingFlash},
    forms::{self, FormErrors, LoginForm, RegisterForm},
    models::User,
    state::AppState,
    views,
};
use actix_web::{get, http::header, post, web, HttpResponse};
use tera::Context;

fn login_page(
    flash: &IncomingFlash,
    csrf: &CsrfToken,
    form: &LoginForm,
    errors: &FormErrors,
) -> Result<HttpResponse, AppError> {
    let mut context = Context::new();
    context.insert("form", form);
    context.insert("errors", errors);
    views::form_page(flash, csrf, "index.html", context)
}

fn register_page(
    flash: &IncomingFlash,
    csrf: &CsrfToken,
    form: &RegisterForm,
    errors: &FormErrors,
) -> Result<HttpResponse, AppError> {
    let mut context = Context::new();
    context.insert("form", form);
    context.insert("errors", errors);
    views::form_page(flash, csrf, "register.html", context)
}

/// Logs `user_id` in and sends the browser to its lists.
fn start_session(state: &AppState, user_id: i64) -> Result<HttpResponse, AppError> {
    let token = issue_token(user_id, &state.config.secret_key)?;
    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, "/user"))
        .cookie(session_cookie(token))
        .finish())
}

/// Login form (also the home page).
#[get("/")]
pub async fn show_login(flash: IncomingFlash, csrf: CsrfToken) -> Result<HttpResponse, AppError> {
    login_page(&flash, &csrf, &LoginForm::default(), &FormErrors::default())
}

/// Authenticates the submitted credentials.
///
/// An unknown email and a wrong password redirect back to `/` with different
/// flash messages and no session. Success sets the session cookie and
/// redirects to `/user`.
#[post("/")]
pub async fn login(
    state: web::Data<AppState>,
    flash: IncomingFlash,
    csrf: CsrfToken,
    form: web::Form<LoginForm>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();
    if let Err(errors) = forms::check(&form, &csrf) {
        return login_page(&flash, &csrf, &form, &errors);
    }

    let Some(user) = User::find_by_email(&state.pool, &form.email).await? else {
        log::info!("Login failed: no account for the submitted email");
        return Ok(redirect_with(Flash::UnknownEmail, "/"));
    };

    if !verify_password(&form.password, &user.password_hash)? {
        log::warn!("Login failed: wrong password for user {}", user.id);
        return Ok(redirect_with(Flash::WrongPassword, "/"));
    }

    log::info!("User {} logged in", user.id);
    start_session(&state, user.id)
}

#[get("/register")]
pub async fn show_register(flash: IncomingFlash, csrf: CsrfToken) -> Result<HttpResponse, AppError> {
    register_page(&flash, &csrf, &RegisterForm::default(), &FormErrors::default())
}

/// Creates an account and logs it in.
///
/// An email that is already registered redirects to the login page with a
/// flash message and creates nothing.
#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    flash: IncomingFlash,
    csrf: CsrfToken,
    form: web::Form<RegisterForm>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();
    if let Err(errors) = forms::check(&form, &csrf) {
        return register_page(&flash, &csrf, &form, &errors);
    }

    if User::find_by_email(&state.pool, &form.email).await?.is_some() {
        log::info!("Registration refused: email already registered");
        return Ok(redirect_with(Flash::AlreadyRegistered, "/"));
    }

    let password_hash = hash_password(&form.password, state.config.bcrypt_cost)?;

    let user = match User::create(&state.pool, &form.email, &form.name, &password_hash).await {
        Ok(user) => user,
        // Lost a race with a concurrent registration for the same email.
        Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
            return Ok(redirect_with(Flash::AlreadyRegistered, "/"));
        }
        Err(err) => return Err(err.into()),
    };

    log::info!("Registered user {}", user.id);
    start_session(&state, user.id)
}

/// Clears the session whether or not one exists.
#[get("/logout")]
pub async fn logout() -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, "/"))
        .cookie(clear_session_cookie())
        .finish()
}
