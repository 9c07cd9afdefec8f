mod common;

use axum::{
    http::StatusCode,
    routing::{self, post},
    Router,
};
use boursetracker::{controllers::alerts_controller, models::Condition, services::alerts_service};
use common::*;
use tower::ServiceExt;

fn router(app: &TestApp) -> Router {
    Router::new()
        .route(
            "/alerts",
            routing::get(alerts_controller::get_alerts_page).post(alerts_controller::post_create_alert),
        )
        .route("/alerts/list", routing::get(alerts_controller::get_alerts_list))
        .route("/alerts/:id/delete", post(alerts_controller::post_delete_alert))
        .with_state(app.state.clone())
}

#[tokio::test]
async fn create_alert_adds_to_book_and_triggers_refresh() {
    let app = test_app(StubMarket::default());

    let res = router(&app)
        .oneshot(post_form(
            "/alerts",
            "symbol=mc.pa&condition=above&target_price=800&one_time=on",
            &app.session,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(hx_trigger(&res), "alertsUpdated");

    let body = response_body_string(res).await;
    assert!(body.contains("Alert set: MC.PA above €800.00"));
    assert!(body.contains("one-time"));

    let s = app.session.lock().await;
    assert_eq!(s.alerts.len(), 1);
    let alert = &s.alerts.as_slice()[0];
    assert_eq!(alert.symbol, "MC.PA");
    assert_eq!(alert.condition, Condition::Above);
    assert!(alert.one_time);
}

#[tokio::test]
async fn unchecked_box_makes_alert_persistent() {
    let app = test_app(StubMarket::default());

    router(&app)
        .oneshot(post_form("/alerts", "symbol=AAPL&condition=below&target_price=150", &app.session))
        .await
        .unwrap();

    let s = app.session.lock().await;
    assert!(!s.alerts.as_slice()[0].one_time);
}

#[tokio::test]
async fn non_positive_target_is_rejected() {
    let app = test_app(StubMarket::default());

    let res = router(&app)
        .oneshot(post_form("/alerts", "symbol=MC.PA&condition=above&target_price=-5", &app.session))
        .await
        .unwrap();
    assert_eq!(hx_trigger(&res), "");

    let body = response_body_string(res).await;
    assert!(body.contains("Please enter a valid target price."));
    assert!(app.session.lock().await.alerts.is_empty());
}

#[tokio::test]
async fn unknown_condition_is_rejected() {
    let app = test_app(StubMarket::default());

    let body = response_body_string(
        router(&app)
            .oneshot(post_form("/alerts", "symbol=MC.PA&condition=sideways&target_price=5", &app.session))
            .await
            .unwrap(),
    )
    .await;
    assert!(body.contains("Condition must be above or below."));
}

#[tokio::test]
async fn delete_removes_by_id() {
    let app = test_app(StubMarket::default());
    let id = {
        let mut s = app.session.lock().await;
        alerts_service::create_alert(&mut s, "OR.PA", Condition::Below, 300.0, false)
            .unwrap()
            .id
    };

    let res = router(&app)
        .oneshot(post_form(&format!("/alerts/{id}/delete"), "", &app.session))
        .await
        .unwrap();
    assert_eq!(hx_trigger(&res), "alertsUpdated");

    let body = response_body_string(res).await;
    assert!(body.contains("Alert deleted"));
    assert!(body.contains("No active alerts."));
    assert!(app.session.lock().await.alerts.is_empty());
}

#[tokio::test]
async fn delete_of_unknown_id_reports_not_found() {
    let app = test_app(StubMarket::default());

    let body = response_body_string(
        router(&app)
            .oneshot(post_form("/alerts/not-a-uuid/delete", "", &app.session))
            .await
            .unwrap(),
    )
    .await;
    assert!(body.contains("Alert not found"));
}

#[tokio::test]
async fn list_groups_by_symbol() {
    let app = test_app(StubMarket::default());
    {
        let mut s = app.session.lock().await;
        alerts_service::create_alert(&mut s, "OR.PA", Condition::Below, 300.0, false).unwrap();
        alerts_service::create_alert(&mut s, "AI.PA", Condition::Above, 200.0, true).unwrap();
        alerts_service::create_alert(&mut s, "OR.PA", Condition::Above, 400.0, true).unwrap();
    }

    let body = response_body_string(
        router(&app)
            .oneshot(get("/alerts/list", &app.session))
            .await
            .unwrap(),
    )
    .await;

    let ai = body.find("AI.PA").unwrap();
    let or = body.find("OR.PA").unwrap();
    assert!(ai < or);
    assert_eq!(body.matches("card-header").count(), 2);
}
