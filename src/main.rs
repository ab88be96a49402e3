use actix_web::{middleware::Logger, web, App, HttpServer};
use std::io;
use tasklists::{auth::SessionGate, db, routes, AppState, Config};

fn startup_error(err: tasklists::AppError) -> io::Error {
    log::error!("{}", err);
    io::Error::new(io::ErrorKind::Other, err)
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(startup_error)?;
    let pool = db::init(&config.database_url).await.map_err(startup_error)?;

    let bind_addr = (config.server_host.clone(), config.server_port);
    log::info!("Starting tasklists server at {}", config.server_url());

    let state = web::Data::new(AppState::new(pool, config));

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(SessionGate)
            .wrap(Logger::default())
            .configure(routes::config)
    })
    .bind(bind_addr)?
    .run()
    .await
}
