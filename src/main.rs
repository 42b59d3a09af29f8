use crate::config::database::DatabaseTrait;
use crate::config::{database, parameter};
use crate::handler::health_handler;
use std::sync::Arc;
use tracing::{error, info};

mod config;
mod dto;
mod entity;
mod error;
mod handler;
mod middleware;
mod repository;
mod response;
mod routes;
mod service;
mod state;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber for structured logging
    tracing_subscriber::fmt::init();

    info!("Starting cajpro-auth session service...");

    // Configuration resolves once, before the listener opens; nothing
    // downstream lazily re-checks environment state.
    parameter::init();
    info!("Configuration initialized");

    crate::config::logging::init();
    info!("Logging configuration initialized");

    health_handler::init_start_time();

    let connection = match database::Database::init().await {
        Ok(conn) => {
            info!("Database connection established successfully");
            conn
        }
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return Err(Box::new(e) as Box<dyn std::error::Error>);
        }
    };

    let server_address = parameter::get("SERVER_ADDRESS");
    let server_port = parameter::get("SERVER_PORT");
    let host = format!("{}:{}", server_address, server_port);
    info!("Server will bind to: {}", host);

    let listener = match tokio::net::TcpListener::bind(&host).await {
        Ok(listener) => {
            info!("Server successfully bound to {}", host);
            listener
        }
        Err(e) => {
            error!("Failed to bind to {}: {}", host, e);
            return Err(e.into());
        }
    };

    // Routes fail fast on a missing or undersized JWT secret.
    let app = match routes::root::routes(Arc::new(connection)) {
        Ok(router) => router,
        Err(e) => {
            error!("Failed to initialize routes: {}", e);
            return Err(Box::new(e) as Box<dyn std::error::Error>);
        }
    };

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received shutdown signal, initiating graceful shutdown...");
                let _ = shutdown_tx.send(());
            }
            Err(err) => {
                error!("Unable to listen for shutdown signal: {}", err);
            }
        }
    });

    info!("Server starting...");
    match axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_rx.await.ok();
        })
        .await
    {
        Ok(_) => {
            info!("Server shutdown gracefully");
            Ok(())
        }
        Err(e) => {
            error!("Server error: {}", e);
            Err(Box::new(e) as Box<dyn std::error::Error>)
        }
    }
}
