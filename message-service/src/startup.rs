//! Application startup and lifecycle management.

use crate::config::{MessageConfig, StoreBackend};
use crate::handlers;
use crate::services::{InMemoryMessageStore, MessageStore, MongoDb, MongoMessageStore};
use axum::{body::Body, middleware::from_fn, routing::get, Router};
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware,
    tracing::{http_request_span, request_id_middleware},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

/// Shared application state. The store handle lives for the whole process.
#[derive(Clone)]
pub struct AppState {
    pub config: MessageConfig,
    pub store: Arc<dyn MessageStore>,
}

async fn route_not_found() -> AppError {
    AppError::NotFound(anyhow::anyhow!("Not found"))
}

pub fn build_router(state: AppState) -> Router {
    let collection = get(handlers::list_messages)
        .post(handlers::create_message)
        .put(handlers::update_without_id)
        .delete(handlers::delete_without_id)
        // `get` would otherwise answer HEAD too.
        .head(handlers::method_not_allowed)
        .fallback(handlers::method_not_allowed);

    let item = get(handlers::get_message)
        .post(handlers::create_message)
        .put(handlers::update_message)
        .delete(handlers::delete_message)
        .head(handlers::method_not_allowed)
        .fallback(handlers::method_not_allowed);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route("/messages", collection.clone())
        .route("/messages/", collection)
        .route("/messages/:id", item)
        .fallback(route_not_found)
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(http_request_span::<Body>))
        // Outermost so the trace span already sees the request id.
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Connects the configured store and binds the listener.
    pub async fn build(config: MessageConfig) -> Result<Self, AppError> {
        let store: Arc<dyn MessageStore> = match config.store.backend {
            StoreBackend::MongoDb => {
                let mongo = config.store.mongodb.as_ref().ok_or_else(|| {
                    AppError::ConfigError(anyhow::anyhow!(
                        "MongoDB settings are required for the mongodb store backend"
                    ))
                })?;

                let db = MongoDb::connect(&mongo.uri, &mongo.database)
                    .await
                    .map_err(|e| {
                        tracing::error!("Failed to connect to MongoDB: {}", e);
                        e
                    })?;

                tracing::info!(collection = %mongo.collection, "Using MongoDB message store");
                Arc::new(MongoMessageStore::new(db, &mongo.collection))
            }
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory message store; messages are not persisted");
                Arc::new(InMemoryMessageStore::new())
            }
        };

        Self::build_with_store(config, store).await
    }

    /// Binds the listener around an already constructed store.
    pub async fn build_with_store(
        config: MessageConfig,
        store: Arc<dyn MessageStore>,
    ) -> Result<Self, AppError> {
        let state = AppState {
            config: config.clone(),
            store,
        };

        // Port 0 picks a random port (tests).
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        Ok(Self {
            port,
            listener,
            router: build_router(state),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};
    use tower::util::ServiceExt;

    fn router() -> Router {
        build_router(AppState {
            config: MessageConfig::in_memory(0),
            store: Arc::new(InMemoryMessageStore::new()),
        })
    }

    async fn status_of(method: &str, uri: &str) -> StatusCode {
        router()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn list_accepts_both_collection_paths() {
        assert_eq!(status_of("GET", "/messages").await, StatusCode::OK);
        assert_eq!(status_of("GET", "/messages/").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn update_and_delete_require_id() {
        assert_eq!(status_of("PUT", "/messages/").await, StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of("DELETE", "/messages/").await,
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn unsupported_methods_are_rejected() {
        assert_eq!(
            status_of("PATCH", "/messages/").await,
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            status_of("PATCH", "/messages/507f1f77bcf86cd799439011").await,
            StatusCode::METHOD_NOT_ALLOWED
        );
    }

    #[tokio::test]
    async fn head_is_rejected_on_message_routes() {
        for uri in ["/messages", "/messages/", "/messages/507f1f77bcf86cd799439011"] {
            assert_eq!(
                status_of("HEAD", uri).await,
                StatusCode::METHOD_NOT_ALLOWED,
                "HEAD {}",
                uri
            );
        }
    }

    #[tokio::test]
    async fn invalid_id_is_bad_request() {
        for method in ["GET", "PUT", "DELETE"] {
            assert_eq!(
                status_of(method, "/messages/not-an-id").await,
                StatusCode::BAD_REQUEST,
                "{} with invalid id",
                method
            );
        }
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        assert_eq!(status_of("GET", "/nope").await, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn responses_carry_request_id() {
        let response = router()
            .oneshot(
                Request::builder()
                    .uri("/messages/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.headers().contains_key("x-request-id"));
    }
}
