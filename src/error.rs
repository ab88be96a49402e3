//!
//! # Custom Error Handling
//!
//! This module defines `AppError`, the error type returned by handlers and by the
//! persistence layer. User mistakes (bad credentials, duplicate emails, invalid
//! forms) never reach this type: they are reported through flash messages and
//! inline form errors. `AppError` covers what is left: missing records, broken
//! configuration and infrastructure failures.
//!
//! `AppError` implements `actix_web::error::ResponseError` so a handler can return
//! it directly and the browser receives an HTML error page with a matching status.

use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use std::fmt;

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Access denied (HTTP 401).
    Unauthorized(String),
    /// The requested list or task does not exist (HTTP 404).
    NotFound(String),
    /// An unexpected server-side error (HTTP 500).
    InternalServerError(String),
    /// Wraps errors from `sqlx` (HTTP 500). The message is logged, never rendered.
    DatabaseError(String),
    /// Missing or malformed environment configuration.
    Configuration(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::Configuration(msg) => write!(f, "Configuration Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// The text shown to the browser. Internal details stay in the log.
    fn public_message(&self) -> &str {
        match self {
            AppError::Unauthorized(msg) | AppError::NotFound(msg) => msg,
            AppError::InternalServerError(_)
            | AppError::DatabaseError(_)
            | AppError::Configuration(_) => "Something went wrong on our side.",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InternalServerError(_)
            | AppError::DatabaseError(_)
            | AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{}", self);
        }
        HttpResponse::build(status)
            .content_type(ContentType::html())
            .body(crate::views::error_page(status, self.public_message()))
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `RowNotFound` becomes `NotFound`; everything else is a `DatabaseError`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(error: sqlx::migrate::MigrateError) -> AppError {
        AppError::DatabaseError(format!("Migration failed: {}", error))
    }
}

/// Template lookups and rendering failures are server bugs.
impl From<tera::Error> for AppError {
    fn from(error: tera::Error) -> AppError {
        AppError::InternalServerError(format!("Template error: {:?}", error))
    }
}

/// Token encoding failures. Decoding failures are handled by the session
/// gate, which treats them as "not logged in".
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        AppError::InternalServerError(format!("Session token error: {}", error))
    }
}
