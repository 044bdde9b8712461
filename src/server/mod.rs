//! JSON HTTP API over the article store
//!
//! Every `/api` response body is wrapped in an [`Envelope`]. Store calls are
//! synchronous SQLite work and run on tokio's blocking pool behind a mutex.

mod auth;
mod handlers;

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::middleware;
use axum::routing::get;
use axum::Router;
use parking_lot::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::core::store::ArticleStore;
use crate::core::Config;

pub use handlers::Envelope;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<ArticleStore>>,
    api_token: Option<Arc<str>>,
}

impl AppState {
    pub fn new(store: ArticleStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            api_token: None,
        }
    }

    /// Require `Authorization: Bearer <token>` on every `/api` route
    pub fn with_api_token(mut self, token: Option<&str>) -> Self {
        self.api_token = token.map(Arc::from);
        self
    }
}

/// Build the axum router with all routes
pub fn router(state: AppState, cors: CorsLayer) -> Router {
    let api = Router::new()
        .route(
            "/api/articles",
            get(handlers::list_articles).post(handlers::create_article),
        )
        .route("/api/articles/categories", get(handlers::article_categories))
        .route(
            "/api/articles/bicycle-categories",
            get(handlers::bicycle_categories),
        )
        .route("/api/articles/materials", get(handlers::materials))
        .route(
            "/api/articles/:id",
            get(handlers::get_article)
                .put(handlers::update_article)
                .delete(handlers::delete_article),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_token,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(api)
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .fallback(handlers::no_route)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Create the CORS layer from the configured origins
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers([header::LOCATION]);

    if origins.iter().any(|o| o == "*") {
        return cors.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    cors.allow_origin(parsed)
}

/// Run the HTTP API until Ctrl-C
pub async fn serve(store: ArticleStore, config: &Config, bind: &str) -> std::io::Result<()> {
    let state = AppState::new(store).with_api_token(config.api_token());
    let app = router(state, cors_layer(&config.cors_origins()));

    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!(addr = %listener.local_addr()?, "article API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("article API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C; shut down by killing the process");
        std::future::pending::<()>().await;
    }
}
