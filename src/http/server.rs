//! HTTP server for the ladder API, health checks and Prometheus metrics

use crate::http::handlers::{
    dashboard_handler, delete_match, delete_player, edit_match, edit_player, health_handler,
    leaderboard_handler, list_matches, list_players, metrics_handler, ready_handler,
    register_player, root_handler, submit_match, submit_resolved_match,
};
use crate::service::AppState;
use anyhow::{Context, Result};
use axum::{
    routing::{get, post, put},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    /// Port to bind the server to
    pub port: u16,
    /// Host to bind to (typically "0.0.0.0" for all interfaces)
    pub host: String,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
        }
    }
}

/// Build the router with every ladder endpoint
pub fn create_router(app: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/metrics", get(metrics_handler))
        .route("/leaderboard", get(leaderboard_handler))
        .route("/dashboard", get(dashboard_handler))
        .route("/players", get(list_players).post(register_player))
        .route("/players/{id}", put(edit_player).delete(delete_player))
        .route("/matches", get(list_matches).post(submit_match))
        .route("/matches/resolved", post(submit_resolved_match))
        .route("/matches/{id}", put(edit_match).delete(delete_match))
        .with_state(app)
}

pub struct HttpServer {
    config: HttpServerConfig,
    app: Arc<AppState>,
    shutdown_tx: broadcast::Sender<()>,
}

impl HttpServer {
    pub fn new(config: HttpServerConfig, app: Arc<AppState>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            config,
            app,
            shutdown_tx,
        }
    }

    /// Serve until [`HttpServer::stop`] is called
    pub async fn start(&self) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .context("Invalid HTTP server address")?;

        let router = create_router(self.app.clone());
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;

        info!("HTTP server listening on http://{}", addr);

        let mut shutdown_rx = self.shutdown_tx.subscribe();
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
                info!("HTTP server shutdown signal received");
            })
            .await?;

        info!("HTTP server stopped");
        Ok(())
    }

    pub fn stop(&self) {
        info!("Stopping HTTP server...");
        if let Err(e) = self.shutdown_tx.send(()) {
            warn!("Failed to send shutdown signal to HTTP server: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt; // for oneshot

    async fn app() -> Arc<AppState> {
        let app = Arc::new(AppState::new(AppConfig::default()).await.unwrap());
        app.start().await.unwrap();
        app
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_root_endpoint() {
        let router = create_router(app().await);
        let response = router
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["service"], "pong-ladder");
    }

    #[tokio::test]
    async fn test_health_and_metrics() {
        let router = create_router(app().await);

        let response = router
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers().get("content-type").unwrap();
        assert!(content_type.to_str().unwrap().contains("text/plain"));
    }

    #[tokio::test]
    async fn test_health_unavailable_before_start() {
        let app = Arc::new(AppState::new(AppConfig::default()).await.unwrap());
        let response = create_router(app)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_player_routes() {
        let router = create_router(app().await);
        let alice = serde_json::json!({
            "fullName": "Alice",
            "nicknames": ["Ali"],
            "category": "Elite"
        });

        let response = router
            .clone()
            .oneshot(json_request("POST", "/players", alice.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let id = body_json(response).await["id"].as_str().unwrap().to_string();

        let response = router
            .clone()
            .oneshot(json_request("POST", "/players", alice))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(response).await["error"], "duplicate_player");

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/players/{}", id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = router
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/players/{}", id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_match_routes() {
        let app = app().await;
        let router = create_router(app.clone());
        for (name, nick) in [("Alice Smith", "Ali"), ("Bob Jones", "Bobby")] {
            let response = router
                .clone()
                .oneshot(json_request(
                    "POST",
                    "/players",
                    serde_json::json!({ "fullName": name, "nicknames": [nick], "category": "Senior" }),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response = router
            .clone()
            .oneshot(json_request(
                "POST",
                "/matches",
                serde_json::json!({ "text": "Ali 3 x 1 Bobby on 2024-01-01" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let recorded = body_json(response).await;
        assert_eq!(recorded["player1"], "Alice Smith");
        let match_id = recorded["id"].as_str().unwrap().to_string();

        let response = router
            .clone()
            .oneshot(json_request(
                "POST",
                "/matches",
                serde_json::json!({ "text": "Ali 3 x 1 Nobody" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "unresolved_players");

        let response = router
            .clone()
            .oneshot(json_request(
                "PUT",
                &format!("/matches/{}", match_id),
                serde_json::json!({ "text": "Bobby 3 x 2 Ali" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let replaced = body_json(response).await;
        assert_ne!(replaced["id"], recorded["id"]);

        let response = router
            .clone()
            .oneshot(Request::builder().uri("/matches").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let matches = body_json(response).await;
        assert_eq!(matches.as_array().unwrap().len(), 1);

        let response = router
            .clone()
            .oneshot(Request::builder().uri("/leaderboard").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let board = body_json(response).await;
        assert_eq!(board["version"], app.store().snapshot().await.unwrap().version);
        assert_eq!(board["rankings"][0]["name"], "Bob Jones");
        assert_eq!(board["rankings"][0]["rating"], 1216);

        let response = router
            .oneshot(Request::builder().uri("/dashboard").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["totalMatches"], 1);
    }

    #[tokio::test]
    async fn test_leaderboard_reflects_write_without_background_task() {
        // not started, so only the request path can bring the table up to date
        let app = Arc::new(AppState::new(AppConfig::default()).await.unwrap());
        let router = create_router(app.clone());
        for (name, nick) in [("Alice", "Ali"), ("Bob", "Bobby")] {
            let response = router
                .clone()
                .oneshot(json_request(
                    "POST",
                    "/players",
                    serde_json::json!({ "fullName": name, "nicknames": [nick], "category": "Senior" }),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }
        let response = router
            .clone()
            .oneshot(json_request(
                "POST",
                "/matches",
                serde_json::json!({ "text": "Alice 3 x 1 Bob" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = router
            .oneshot(Request::builder().uri("/leaderboard").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let board = body_json(response).await;
        assert_eq!(board["version"], 3);
        assert_eq!(board["rankings"][0]["name"], "Alice");
        assert_eq!(board["rankings"][0]["rating"], 1216);
        assert_eq!(board["rankings"][1]["rating"], 1184);
        assert_eq!(app.leaderboard().latest().version, 3);
    }

    #[tokio::test]
    async fn test_malformed_bodies_use_error_shape() {
        let router = create_router(app().await);

        let response = router
            .clone()
            .oneshot(json_request(
                "POST",
                "/matches",
                serde_json::json!({ "wrong": "field" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "invalid_request");
        assert!(body["message"].as_str().unwrap().contains("text"));

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/players")
                    .body(Body::from("not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "invalid_request");
    }

    #[tokio::test]
    async fn test_404_handling() {
        let router = create_router(app().await);
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/nonexistent")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_http_server_config() {
        let config = HttpServerConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "0.0.0.0");
    }
}
