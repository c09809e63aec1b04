//! The feed HTTP server: RSS/Atom/JSON syndication plus
//! a paginated homepage and a health endpoint, all backed by the store
//! and cached in an in-memory TTL cache by `(name, format)`.

mod handlers;
mod render;
mod state;

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

pub use state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::homepage))
        .route("/feed.rss", get(handlers::rss_feed))
        .route("/feed.atom", get(handlers::atom_feed))
        .route("/feed.json", get(handlers::json_feed))
        .route("/health", get(handlers::health))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods([Method::GET]),
        )
        .layer(SetResponseHeaderLayer::overriding(
            header::HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(CompressionLayer::new().gzip(true))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            }),
        )
}

/// Binds and serves the router on `port`, running until the process is
/// told to shut down.
pub async fn serve(state: Arc<AppState>, port: u16) -> anyhow::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(port, "feed server listening");
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use courier_cache::TtlCache;
    use courier_store::Store;
    use courier_types::FeedEntry;
    use std::time::Duration;
    use tower::ServiceExt;

    async fn test_state() -> Arc<AppState> {
        let store = Store::connect("sqlite::memory:").await.unwrap();
        store.migrate().await.unwrap();
        store
            .feed
            .insert_entry(&FeedEntry {
                id: "1".to_string(),
                title: "Hello".to_string(),
                link: "https://example.invalid/1".to_string(),
                description: "desc".to_string(),
                content: "<p>desc</p>".to_string(),
                author: None,
                source: "hn".to_string(),
                image_url: None,
                published_at: Utc::now(),
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        Arc::new(AppState {
            name: "courier".to_string(),
            home_url: "https://example.invalid".to_string(),
            store: Arc::new(store),
            cache: Arc::new(TtlCache::new(Duration::from_secs(3600))),
            feed_size: 200,
            max_items: 50,
            per_page: 20,
            bot_state: None,
        })
    }

    #[tokio::test]
    async fn rss_feed_includes_the_entry_title() {
        let state = test_state().await;
        let app = router(state);
        let response = app
            .oneshot(axum::http::Request::builder().uri("/feed.rss").body(axum::body::Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&body).contains("Hello"));
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let state = test_state().await;
        let app = router(state);
        let response = app
            .oneshot(axum::http::Request::builder().uri("/health").body(axum::body::Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
    }
}
