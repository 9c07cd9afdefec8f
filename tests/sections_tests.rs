mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    routing,
    Router,
};
use boursetracker::{
    controllers::{home_controller, indices_controller, predictions_controller},
    routes,
};
use common::*;
use tower::ServiceExt;

#[tokio::test]
async fn projection_of_linear_series_is_exact() {
    let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
    let app = test_app(StubMarket::default().with("MC.PA", &closes));
    let router = Router::new()
        .route("/predictions/run", routing::get(predictions_controller::get_projection))
        .with_state(app.state.clone());

    let body = response_body_string(
        router
            .oneshot(get("/predictions/run?symbol=MC.PA&degree=1&horizon=5", &app.session))
            .await
            .unwrap(),
    )
    .await;

    assert!(body.contains("degree 1, 5 days ahead, fitted on 30 closes"));
    assert!(body.contains("€134.00"));
    assert!(body.contains("1.00"));
}

#[tokio::test]
async fn projection_rejects_bad_parameters() {
    let app = test_app(StubMarket::default().with("MC.PA", &[1.0, 2.0]));
    let router = Router::new()
        .route("/predictions/run", routing::get(predictions_controller::get_projection))
        .with_state(app.state.clone());

    let body = response_body_string(
        router
            .clone()
            .oneshot(get("/predictions/run?symbol=MC.PA&degree=9", &app.session))
            .await
            .unwrap(),
    )
    .await;
    assert!(body.contains("Degree must be between 1 and 5."));

    let body = response_body_string(
        router
            .oneshot(get("/predictions/run?symbol=MC.PA&degree=2", &app.session))
            .await
            .unwrap(),
    )
    .await;
    assert!(body.contains("Not enough data"));
}

#[tokio::test]
async fn indices_degrade_independently() {
    let app = test_app(StubMarket::default().with("^FCHI", &[7000.0, 7070.0]));
    let router = Router::new()
        .route("/indices/compare", routing::get(indices_controller::get_indices_compare))
        .with_state(app.state.clone());

    let body = response_body_string(
        router
            .oneshot(get("/indices/compare?period=5d", &app.session))
            .await
            .unwrap(),
    )
    .await;

    assert!(body.contains("CAC 40"));
    assert!(body.contains("7070.00"));
    assert!(body.contains("+1.00%"));
    assert_eq!(body.matches("No data").count(), 5);
}

#[tokio::test]
async fn market_status_partial_shows_both_clocks() {
    let app = test_app(StubMarket::default());
    let router = Router::new()
        .route("/market-status", routing::get(home_controller::get_market_status))
        .with_state(app.state.clone());

    let body = response_body_string(router.oneshot(get("/market-status", &app.session)).await.unwrap()).await;
    assert!(body.contains("Paris"));
    assert!(body.contains("New York"));
}

#[tokio::test]
async fn app_issues_session_cookie_once() {
    let app = test_app(StubMarket::default());
    let router = routes::app(app.state.clone());

    let res = router
        .clone()
        .oneshot(Request::builder().uri("/alerts").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let cookie = res.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
    assert!(cookie.starts_with("bourse_session="));
    assert!(cookie.contains("HttpOnly"));

    let pair = cookie.split(';').next().unwrap().to_string();
    let res = router
        .oneshot(
            Request::builder()
                .uri("/alerts")
                .header(header::COOKIE, pair)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(res.headers().get(header::SET_COOKIE).is_none());
    assert_eq!(app.state.sessions.len(), 1);
}

#[tokio::test]
async fn health_and_not_found_do_not_start_sessions() {
    let app = test_app(StubMarket::default());
    let router = routes::app(app.state.clone());

    for _ in 0..50 {
        let res = router
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().get(header::SET_COOKIE).is_none());
        assert_eq!(response_body_string(res).await, "ok");
    }

    let res = router
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert!(res.headers().get(header::SET_COOKIE).is_none());

    assert!(app.state.sessions.is_empty());
}

#[tokio::test]
async fn unknown_path_renders_not_found_page() {
    let app = test_app(StubMarket::default());

    let res = routes::app(app.state.clone())
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let body = response_body_string(res).await;
    assert!(body.contains("404"));
    assert!(body.contains("<!doctype html>"));
}

#[tokio::test]
async fn every_section_page_renders() {
    let app = test_app(StubMarket::default().with("MC.PA", &[1.0, 2.0]));
    let router = routes::app(app.state.clone());

    for path in ["/", "/portfolio", "/alerts", "/notifications", "/export", "/predictions", "/indices"] {
        let res = router
            .clone()
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK, "{path}");
        let body = response_body_string(res).await;
        assert!(body.contains("BourseTracker"), "{path}");
    }
}
