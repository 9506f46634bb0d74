//! `/metrics` and `/health` served through a real router.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use std::sync::Arc;
use telemetry::registry::MetricRegistry;
use telemetry::routes::ops_routes;
use tower::ServiceExt;

fn registry() -> Arc<MetricRegistry> {
    let registry = Arc::new(MetricRegistry::new());
    registry
        .register_counter("price_ticks_total", "Total number of price ticks generated", &[])
        .unwrap();
    registry
}

async fn get(router: axum::Router, uri: &str) -> (StatusCode, String, Option<String>) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get("content-type")
        .map(|v| v.to_str().unwrap().to_string());
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap(), content_type)
}

#[tokio::test]
async fn test_health_is_constant() {
    let router: axum::Router = ops_routes(registry());
    let (status, body, _) = get(router, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"status":"ok"}"#);
}

#[tokio::test]
async fn test_metrics_exposition() {
    let registry = registry();
    registry.counter("price_ticks_total", &[]).unwrap().inc_by(3);

    let router: axum::Router = ops_routes(Arc::clone(&registry));
    let (status, body, content_type) = get(router, "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/plain"));
    assert!(body.contains("# HELP price_ticks_total Total number of price ticks generated"));
    assert!(body.contains("price_ticks_total 3"));
}
