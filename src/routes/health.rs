use crate::state::AppState;
use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

/// Liveness probe. Public; reports whether the database answers.
#[get("/health")]
pub async fn health(state: web::Data<AppState>) -> impl Responder {
    let database_ok = sqlx::query("SELECT 1").execute(&state.pool).await.is_ok();

    let body = json!({
        "status": if database_ok { "ok" } else { "degraded" },
        "database": database_ok,
        "timestamp": Utc::now()
    });

    if database_ok {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}
