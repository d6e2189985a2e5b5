use actix_web::{middleware::Logger, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use std::io;

use contactbook::{config::Config, routes, AppState, MIGRATOR};

fn to_io_error<E: std::fmt::Display>(e: E) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(to_io_error)?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .map_err(|e| to_io_error(format!("Failed to connect to database: {}", e)))?;

    if config.run_migrations {
        log::info!("Applying database migrations");
        MIGRATOR.run(&pool).await.map_err(to_io_error)?;
    }

    let state = AppState::new(pool, &config).map_err(to_io_error)?;

    log::info!("Starting Contactbook server at {}", config.server_url());
    let server_config = config.clone();
    HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .wrap(routes::cors(&server_config))
            .wrap(Logger::default())
            .configure(move |cfg| state.configure(cfg))
            .configure(routes::configure_app)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
