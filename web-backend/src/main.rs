use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod state;
mod supervisor;

use api::create_api_router;
use state::AppState;

async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[actix_web::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scout_web=debug,scout_core=debug,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Initialize state
    let state = AppState::new().await?;

    // Start the server
    let bind_address =
        std::env::var("SCOUT_BIND").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
    tracing::info!("Scout scan service listening on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(tracing_actix_web::TracingLogger::default())
            .wrap(Cors::permissive())
            // API routes
            .service(create_api_router())
            // Health check
            .route("/health", web::get().to(health_check))
    })
    .bind(bind_address.as_str())?
    .run()
    .await?;

    Ok(())
}
