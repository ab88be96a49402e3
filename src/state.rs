use crate::config::Config;
use sqlx::AnyPool;

/// Everything a handler needs, injected through `web::Data<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub pool: AnyPool,
    pub config: Config,
}

impl AppState {
    pub fn new(pool: AnyPool, config: Config) -> Self {
        Self { pool, config }
    }
}
