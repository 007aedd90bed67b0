//! Documentation of the KOC Connect directory service.
//!
//! KOCs (content creators) and Brands register through two forms and browse each
//! other through two filterable listings. There is no matching, messaging or
//! payment; contacting someone goes through an admin who does not exist yet.
//!
//!
//!
//! # General Infrastructure
//! - Records live in a hosted Postgres exposed through PostgREST
//! - This server validates registrations, inserts them, and serves the listings
//! - Without `STORE_URL` the server keeps records in memory, which is enough for
//!   local work and for the tests
//!
//!
//!
//! # Routes
//!
//! | Method | Path | |
//! |---|---|---|
//! | GET | `/` | landing payload |
//! | GET | `/kocs?search=&industry=` | KOC cards |
//! | GET | `/brands?search=&industry=` | Brand cards |
//! | GET | `/register?type=koc` | form defaults and choices for a tab |
//! | POST | `/register?type=koc` | submit a KOC form (`type=brand` for Brands) |
//! | POST | `/kocs/{id}/contact` | admin contact placeholder |
//! | POST | `/brands/{id}/contact` | admin contact placeholder |
//!
//! `industry` is one of the 14 catalog labels or `all`.
//!
//!
//!
//! # Notes
//!
//! ## Numeric inputs
//! Number fields are read the way a browser number input hands them over. Junk
//! falls back to a default rather than failing: 0 for counts, 1 for job days,
//! unset for money. Negative numbers still fail validation.
//!
//! ## Feedback
//! Each flow emits [`notify::Notice`]s. Responses carry them in a `notices` array
//! so a frontend can show them as toasts.
//!
//!
//!
//! # Setup
//!
//! ```sh
//! STORE_URL=https://<project>.supabase.co STORE_KEY=<anon key> RUST_LOG=info cargo run -p kocconnect
//! ```
//!
//! `STORE_KEY` may also be mounted as the Docker secret `/run/secrets/STORE_KEY`.
//!
//! Smoke test a running server.
//! ```sh
//! cargo run -p tester -- --url http://localhost:1111
//! ```
use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{get, post},
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

pub mod catalog;
pub mod config;
pub mod database;
pub mod display;
pub mod error;
pub mod models;
pub mod notify;
pub mod register;
pub mod routes;
pub mod schema;
pub mod search;
pub mod state;
pub mod utils;

#[cfg(test)]
mod fixtures;

use config::Config;
use error::AppError;
use routes::{
    brands_handler, contact_handler, home_handler, kocs_handler, register_handler,
    register_page_handler,
};
use state::State;

pub fn app(state: Arc<State>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/", get(home_handler))
        .route("/kocs", get(kocs_handler))
        .route("/brands", get(brands_handler))
        .route("/kocs/{id}/contact", post(contact_handler))
        .route("/brands/{id}/contact", post(contact_handler))
        .route("/register", get(register_page_handler).post(register_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn start_server() -> Result<(), AppError> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let config = Config::load()?;
    let state = State::new(config)?;

    info!("Starting server...");

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address)
        .await
        .map_err(|e| AppError::InternalError(Box::new(e)))?;
    info!("Server running on {address}");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::InternalError(Box::new(e)))?;

    info!("Server shut down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
