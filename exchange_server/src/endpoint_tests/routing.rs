use actix_web::{
    http::{Method, StatusCode},
    test::TestRequest,
    web::ServiceConfig,
};
use serde_json::json;

use super::helpers::send_request;
use crate::routes::HealthRoute;

fn configure(cfg: &mut ServiceConfig) {
    cfg.service(HealthRoute::new());
}

#[actix_web::test]
async fn health_check() {
    let res = send_request(TestRequest::get().uri("/health"), configure).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.header("Access-Control-Allow-Origin"), Some("*"));
}

#[actix_web::test]
async fn unknown_routes() {
    let res = send_request(TestRequest::get().uri("/api/nothing-here"), configure).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.json(), json!({"error": "No route for GET /api/nothing-here"}));
    assert_eq!(res.header("Access-Control-Allow-Origin"), Some("*"));

    let res = send_request(TestRequest::delete().uri("/health"), configure).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn preflight_requests() {
    for path in ["/api/orders", "/health", "/anything"] {
        let req = TestRequest::default()
            .method(Method::OPTIONS)
            .uri(path)
            .insert_header(("Origin", "https://t.me"))
            .insert_header(("Access-Control-Request-Method", "POST"));
        let res = send_request(req, configure).await;
        assert_eq!(res.status, StatusCode::OK, "{path}");
        assert_eq!(res.header("Access-Control-Allow-Origin"), Some("*"));
        assert_eq!(res.header("Access-Control-Allow-Methods"), Some("GET, POST, PUT, OPTIONS"));
        let allowed = res.header("Access-Control-Allow-Headers").unwrap();
        assert!(allowed.contains("Content-Type"));
        assert!(allowed.contains("X-Admin-Key"));
        assert_eq!(res.header("Access-Control-Max-Age"), Some("86400"));
        assert!(res.body.is_empty());
    }
}
