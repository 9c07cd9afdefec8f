mod common;

use axum::{
    http::StatusCode,
    routing::{self, post},
    Router,
};
use boursetracker::controllers::portfolio_controller;
use common::*;
use tower::ServiceExt;

fn router(app: &TestApp) -> Router {
    Router::new()
        .route(
            "/portfolio",
            routing::get(portfolio_controller::get_portfolio_page).post(portfolio_controller::post_add_position),
        )
        .route("/portfolio/positions", routing::get(portfolio_controller::get_portfolio_positions))
        .route("/portfolio/clear", post(portfolio_controller::post_clear_portfolio))
        .with_state(app.state.clone())
}

#[tokio::test]
async fn lots_are_aggregated_at_current_price() {
    let app = test_app(StubMarket::default().with("MC.PA", &[118.0, 120.0]));

    let res = router(&app)
        .oneshot(post_form("/portfolio", "symbol=MC.PA&shares=2&buy_price=100", &app.session))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(hx_trigger(&res), "portfolioUpdated");

    let res = router(&app)
        .oneshot(post_form("/portfolio", "symbol=mc.pa&shares=1&buy_price=50", &app.session))
        .await
        .unwrap();
    let body = response_body_string(res).await;

    assert!(body.contains("€250.00"));
    assert!(body.contains("€360.00"));
    assert!(body.contains("€110.00"));
    assert!(body.contains("44.00%"));
    assert_eq!(app.session.lock().await.portfolio["MC.PA"].len(), 2);
}

#[tokio::test]
async fn non_positive_shares_are_rejected() {
    let app = test_app(StubMarket::default());

    let res = router(&app)
        .oneshot(post_form("/portfolio", "symbol=MC.PA&shares=0&buy_price=100", &app.session))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(hx_trigger(&res), "");

    let body = response_body_string(res).await;
    assert!(body.contains("Number of shares must be greater than zero."));
    assert!(app.session.lock().await.portfolio.is_empty());
}

#[tokio::test]
async fn unparseable_price_is_rejected() {
    let app = test_app(StubMarket::default());

    let body = response_body_string(
        router(&app)
            .oneshot(post_form("/portfolio", "symbol=MC.PA&shares=1&buy_price=abc", &app.session))
            .await
            .unwrap(),
    )
    .await;
    assert!(body.contains("Buy price must be a number."));
}

#[tokio::test]
async fn legacy_symbol_is_stored_under_replacement() {
    let app = test_app(StubMarket::default().with("TTE.PA", &[60.0]));

    let body = response_body_string(
        router(&app)
            .oneshot(post_form("/portfolio", "symbol=TOTF.PA&shares=10&buy_price=55", &app.session))
            .await
            .unwrap(),
    )
    .await;
    assert!(body.contains("TOTF.PA → TTE.PA"));
    assert!(app.session.lock().await.portfolio.contains_key("TTE.PA"));
}

#[tokio::test]
async fn delisted_symbol_cannot_be_bought() {
    let app = test_app(StubMarket::default());

    let body = response_body_string(
        router(&app)
            .oneshot(post_form("/portfolio", "symbol=EDF.PA&shares=1&buy_price=10", &app.session))
            .await
            .unwrap(),
    )
    .await;
    assert!(body.contains("no longer listed"));
    assert!(app.session.lock().await.portfolio.is_empty());
}

#[tokio::test]
async fn missing_price_shows_na() {
    let app = test_app(StubMarket::default());
    router(&app)
        .oneshot(post_form("/portfolio", "symbol=AAPL&shares=1&buy_price=150", &app.session))
        .await
        .unwrap();

    let body = response_body_string(
        router(&app)
            .oneshot(get("/portfolio/positions", &app.session))
            .await
            .unwrap(),
    )
    .await;
    assert!(body.contains("N/A"));
    assert!(body.contains("$150.00"));
}

#[tokio::test]
async fn clear_empties_the_portfolio() {
    let app = test_app(StubMarket::default().with("MC.PA", &[100.0]));
    router(&app)
        .oneshot(post_form("/portfolio", "symbol=MC.PA&shares=1&buy_price=90", &app.session))
        .await
        .unwrap();

    let body = response_body_string(
        router(&app)
            .oneshot(post_form("/portfolio/clear", "", &app.session))
            .await
            .unwrap(),
    )
    .await;
    assert!(body.contains("Portfolio cleared"));
    assert!(body.contains("No positions yet."));
    assert!(app.session.lock().await.portfolio.is_empty());
}
