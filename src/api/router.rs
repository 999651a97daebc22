//! API router.
//!
//! Returns a composable `Router` with the assistant's endpoints nested
//! under `/api/`, plus the index route at `/`. CORS is wide open: the
//! frontend is served from a different origin in every deployment we run.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;

pub fn api_router(ctx: ApiContext) -> Router {
    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/detect-disease", post(endpoints::detect::detect))
        .route("/remedies", get(endpoints::remedies::remedies))
        .route("/yield-tips", get(endpoints::yield_tips::tips))
        .route("/crop-calendar", get(endpoints::calendar::calendar))
        .route("/weather", get(endpoints::weather::forecast))
        .route("/weather/advice", get(endpoints::weather::advice))
        .route("/weather/locations", get(endpoints::weather::locations))
        .route("/market-prices", get(endpoints::market::prices))
        .route("/market-prices/trends", get(endpoints::market::trends))
        .route("/market-prices/markets", get(endpoints::market::markets))
        .route("/analyses", get(endpoints::analyses::recent))
        .route("/languages", get(endpoints::languages::list))
        .with_state(ctx);

    Router::new()
        .route("/", get(endpoints::home::index))
        .nest("/api", api)
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::gateway::market::MarketGateway;
    use crate::gateway::weather::WeatherGateway;
    use crate::pipeline::classify::MockClassifier;
    use crate::store;

    /// Context with offline gateways (closed local port forces the demo
    /// fallback) and an in-memory store.
    fn test_context() -> ApiContext {
        ApiContext::new(
            Arc::new(MockClassifier),
            WeatherGateway::new("http://127.0.0.1:1", "demo_key", 1),
            MarketGateway::new("http://127.0.0.1:1", "demo_key", 1),
            store::open_memory_store().unwrap(),
        )
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn response_json(response: axum::http::Response<Body>) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 1 << 20)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn sample_jpeg() -> Vec<u8> {
        let img = image::RgbImage::from_fn(200, 200, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 120])
        });
        let mut cursor = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut cursor, image::ImageOutputFormat::Jpeg(85))
            .unwrap();
        cursor.into_inner()
    }

    fn tiny_jpeg() -> Vec<u8> {
        let img = image::RgbImage::from_fn(50, 50, |x, y| {
            image::Rgb([(x * 5) as u8, (y * 5) as u8, 120])
        });
        let mut cursor = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut cursor, image::ImageOutputFormat::Jpeg(85))
            .unwrap();
        cursor.into_inner()
    }

    const BOUNDARY: &str = "krishi-test-boundary";

    fn detect_request(image: Option<&[u8]>) -> Request<Body> {
        let mut body = Vec::new();
        if let Some(bytes) = image {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; \
                     filename=\"leaf.jpg\"\r\nContent-Type: image/jpeg\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"location\"\r\n\r\n\
                 Mumbai\r\n--{BOUNDARY}--\r\n"
            )
            .as_bytes(),
        );

        Request::builder()
            .method("POST")
            .uri("/api/detect-disease")
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    // ── Index and health ──

    #[tokio::test]
    async fn index_lists_endpoints() {
        let app = api_router(test_context());
        let response = app.oneshot(get_request("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["message"], "Crop Health & Agriculture Assistant API");
        assert_eq!(json["endpoints"]["disease_detection"], "/api/detect-disease");
    }

    #[tokio::test]
    async fn health_reports_healthy() {
        let app = api_router(test_context());
        let response = app.oneshot(get_request("/api/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["status"], "healthy");
        assert!(json["timestamp"].is_string());
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let app = api_router(test_context());
        let response = app.oneshot(get_request("/api/nonexistent")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    // ── Detection ──

    #[tokio::test]
    async fn detect_requires_image_field() {
        let app = api_router(test_context());
        let response = app.oneshot(detect_request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = response_json(response).await;
        assert_eq!(json["error"]["message"], "No image provided");
    }

    #[tokio::test]
    async fn detect_rejects_undecodable_bytes() {
        let app = api_router(test_context());
        let response = app
            .oneshot(detect_request(Some(b"not an image at all")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn detect_rejects_too_small_image() {
        let app = api_router(test_context());
        let response = app
            .oneshot(detect_request(Some(&tiny_jpeg())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "IMAGE_REJECTED");
    }

    #[tokio::test]
    async fn detect_classifies_and_persists() {
        let ctx = test_context();
        let app = api_router(ctx.clone());
        let response = app
            .oneshot(detect_request(Some(&sample_jpeg())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["success"], true);
        assert!(json["result"]["crop_type"].is_string());
        assert!(json["result"]["disease"].is_string());
        let confidence = json["result"]["confidence"].as_f64().unwrap();
        assert!((0.7..0.95).contains(&confidence));
        assert!(!json["analysis_id"].as_str().unwrap().is_empty());

        let conn = ctx.lock_db().unwrap();
        assert_eq!(store::count_analyses(&conn).unwrap(), 1);
        let history = store::recent_analyses(&conn, 10).unwrap();
        assert_eq!(history[0].user_location, "Mumbai");
    }

    // ── Knowledge lookups ──

    #[tokio::test]
    async fn remedies_hit_returns_advice_lists() {
        let app = api_router(test_context());
        let response = app
            .oneshot(get_request("/api/remedies?disease=early_blight&crop=tomato"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["remedies"]["crop"], "tomato");
        assert_eq!(json["remedies"]["disease_key"], "early_blight");
        assert!(!json["remedies"]["remedies"].as_array().unwrap().is_empty());
        assert!(!json["remedies"]["additional_tips"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn remedies_miss_still_answers_200_with_fallback() {
        let app = api_router(test_context());
        let response = app
            .oneshot(get_request("/api/remedies?disease=space_mold&crop=moonflower"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["remedies"]["code"], "CROP_NOT_FOUND");
        assert!(!json["remedies"]["suggestions"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn yield_tips_default_crop_is_tomato() {
        let app = api_router(test_context());
        let response = app.oneshot(get_request("/api/yield-tips")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["tips"]["crop"], "tomato");
        assert!(!json["tips"]["best_practices"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn calendar_unknown_location_falls_back_to_india() {
        let app = api_router(test_context());
        let response = app
            .oneshot(get_request("/api/crop-calendar?crop=tomato&location=Atlantis"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["calendar"]["crop"], "tomato");
        assert!(json["calendar"]["calendar"]["sowing_time"].is_array());
        assert!(!json["calendar"]["seasonal_advice"].as_array().unwrap().is_empty());
    }

    // ── Gateways ──

    #[tokio::test]
    async fn weather_serves_demo_data_offline() {
        let app = api_router(test_context());
        let response = app
            .oneshot(get_request("/api/weather?location=Delhi"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["location"], "Delhi");
        assert_eq!(json["weather"]["source"], "Demo Data");
        assert!(json["weather"]["data"]["current"]["temp"].is_number());
    }

    #[tokio::test]
    async fn weather_locations_listed() {
        let app = api_router(test_context());
        let response = app
            .oneshot(get_request("/api/weather/locations"))
            .await
            .unwrap();
        let json = response_json(response).await;
        let locations = json["locations"].as_array().unwrap();
        assert!(locations.iter().any(|l| l == "Mumbai"));
    }

    #[tokio::test]
    async fn market_prices_served_and_snapshotted() {
        let ctx = test_context();
        let app = api_router(ctx.clone());
        let response = app
            .oneshot(get_request("/api/market-prices?crop=onion"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["prices"]["crop"], "onion");
        assert_eq!(json["prices"]["prices"].as_array().unwrap().len(), 5);

        let conn = ctx.lock_db().unwrap();
        let snaps = store::snapshots_for_crop(&conn, "onion", 10).unwrap();
        assert_eq!(snaps.len(), 5);
    }

    #[tokio::test]
    async fn market_trends_cover_period() {
        let app = api_router(test_context());
        let response = app
            .oneshot(get_request("/api/market-prices/trends?crop=potato&days=5"))
            .await
            .unwrap();
        let json = response_json(response).await;
        assert_eq!(json["trends"]["trends"].as_array().unwrap().len(), 5);
        assert_eq!(json["trends"]["period"], "5 days");
    }

    // ── Misc ──

    #[tokio::test]
    async fn languages_include_hindi() {
        let app = api_router(test_context());
        let response = app.oneshot(get_request("/api/languages")).await.unwrap();
        let json = response_json(response).await;
        let languages = json["languages"].as_array().unwrap();
        assert_eq!(languages.len(), 6);
        assert!(languages.iter().any(|l| l["code"] == "hi"));
    }

    #[tokio::test]
    async fn analyses_empty_history() {
        let app = api_router(test_context());
        let response = app.oneshot(get_request("/api/analyses")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["count"], 0);
        assert!(json["analyses"].as_array().unwrap().is_empty());
    }
}
