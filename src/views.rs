//! Page rendering.
//!
//! Templates are compiled into the binary and parsed once. Tera escapes every
//! variable in `.html` templates, so user text can be inserted as-is.

use actix_web::{
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use lazy_static::lazy_static;
use tera::{Context, Tera};

use crate::csrf::CsrfToken;
use crate::error::AppError;
use crate::flash::IncomingFlash;

lazy_static! {
    static ref TEMPLATES: Tera = {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("base.html", include_str!("../templates/base.html")),
            ("index.html", include_str!("../templates/index.html")),
            ("register.html", include_str!("../templates/register.html")),
            ("lists.html", include_str!("../templates/lists.html")),
            ("add_list.html", include_str!("../templates/add_list.html")),
            ("tasks.html", include_str!("../templates/tasks.html")),
            ("add_task.html", include_str!("../templates/add_task.html")),
            ("error.html", include_str!("../templates/error.html")),
        ])
        .expect("embedded templates must parse");
        tera
    };
}

pub fn render(template: &str, context: &Context) -> Result<String, AppError> {
    Ok(TEMPLATES.render(template, context)?)
}

/// Renders a full page with any pending flash message, then clears the flash.
pub fn page(flash: &IncomingFlash, template: &str, context: Context) -> Result<HttpResponse, AppError> {
    respond(flash, None, template, context)
}

/// Like [`page`], for pages holding a form: adds the `csrf_token` hidden field
/// value and sets the CSRF cookie if the browser has none yet.
pub fn form_page(
    flash: &IncomingFlash,
    csrf: &CsrfToken,
    template: &str,
    context: Context,
) -> Result<HttpResponse, AppError> {
    respond(flash, Some(csrf), template, context)
}

fn respond(
    flash: &IncomingFlash,
    csrf: Option<&CsrfToken>,
    template: &str,
    mut context: Context,
) -> Result<HttpResponse, AppError> {
    context.insert("messages", &flash.messages());
    if let Some(csrf) = csrf {
        context.insert("csrf_token", csrf.value());
    }
    let body = render(template, &context)?;

    let mut response = HttpResponse::Ok();
    flash.consume(&mut response);
    if let Some(csrf) = csrf {
        csrf.apply(&mut response);
    }
    Ok(response.content_type(ContentType::html()).body(body))
}

/// HTML body for an error response. Falls back to plain text so that an
/// error page can always be produced.
pub fn error_page(status: StatusCode, message: &str) -> String {
    let mut context = Context::new();
    context.insert("status", &status.as_u16());
    context.insert("reason", status.canonical_reason().unwrap_or("Error"));
    context.insert("message", message);
    context.insert("messages", &Vec::<String>::new());

    render("error.html", &context).unwrap_or_else(|err| {
        log::error!("Failed to render error page: {}", err);
        format!("{} {}", status.as_u16(), message)
    })
}
