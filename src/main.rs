// src/main.rs

use std::io;

use actix_cors::Cors;
use actix_web::{http, middleware::Logger, web, App, HttpServer};
use env_logger::Env;
use log::{error, info, warn};

use kanban_board::actions::TaskActions;
use kanban_board::app_state::AppState;
use kanban_board::config::Config;
use kanban_board::gateway;
use kanban_board::routes::configure_routes;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(|e| {
        error!("Invalid configuration: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;
    let store = gateway::connect(&config).await.map_err(|e| {
        error!("Failed to connect to the store: {}", e);
        io::Error::new(io::ErrorKind::Other, e)
    })?;
    let actions = TaskActions::new(store);

    let bind_address = config.bind_address.clone();
    let frontend_origin = config.frontend_origin.clone();
    info!("Server running at http://{}", bind_address);
    info!("Store backend: {:?}", config.store_backend);
    info!("Allowed CORS Origin: {}", frontend_origin);
    if config.debug_routes {
        warn!("Debug routes are enabled");
    }

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&frontend_origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "OPTIONS"])
            .allowed_headers(vec![http::header::CONTENT_TYPE, http::header::ACCEPT])
            .max_age(3600);

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(web::Data::new(AppState {
                actions: actions.clone(),
                config: config.clone(),
            }))
            .configure(configure_routes)
    })
    .bind(bind_address)?
    .run()
    .await
}
