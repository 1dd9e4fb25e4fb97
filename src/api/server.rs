use crate::api::error::json_error_handler;
use crate::api::routes::{self, AppState};
use crate::config::toml_config::ServiceConfig;
use crate::inference::ModelStore;
use actix_web::{middleware, web, App, HttpServer};

const MAX_BODY_BYTES: usize = 256 * 1024;

pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(MAX_BODY_BYTES)
        .error_handler(json_error_handler)
}

pub async fn run(config: &ServiceConfig, store: ModelStore) -> std::io::Result<()> {
    let state = web::Data::new(AppState::new(store, config.server.max_batch_size));
    let (host, port) = config.bind_address();

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(json_config())
            .wrap(middleware::Logger::default())
            .configure(routes::configure)
    });

    if let Some(workers) = config.server.workers {
        server = server.workers(workers);
    }

    tracing::info!("Listening on http://{}:{}", host, port);
    server.bind((host, port))?.run().await
}
