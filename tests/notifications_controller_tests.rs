mod common;

use axum::{
    routing::{self, post},
    Router,
};
use boursetracker::{controllers::notifications_controller, models::Notification};
use chrono::{Duration, Utc};
use common::*;
use tower::ServiceExt;

fn router(app: &TestApp) -> Router {
    Router::new()
        .route("/notifications", routing::get(notifications_controller::get_notifications_page))
        .route("/notifications/email", post(notifications_controller::post_email_settings))
        .route("/notifications/test", post(notifications_controller::post_test_email))
        .route("/notifications/history", routing::get(notifications_controller::get_notification_history))
        .with_state(app.state.clone())
}

const VALID: &str =
    "enabled=on&smtp_host=smtp.example.com&smtp_port=2525&account=me%40example.com&secret=pw";

#[tokio::test]
async fn invalid_account_is_not_saved() {
    let app = test_app(StubMarket::default());

    let body = response_body_string(
        router(&app)
            .oneshot(post_form(
                "/notifications/email",
                "enabled=on&smtp_host=smtp.gmail.com&smtp_port=587&account=nope&secret=pw",
                &app.session,
            ))
            .await
            .unwrap(),
    )
    .await;

    assert!(body.contains("Please enter a valid email address."));
    assert!(!app.session.lock().await.email.enabled);
}

#[tokio::test]
async fn valid_settings_are_saved_and_test_mail_is_sent() {
    let app = test_app(StubMarket::default());

    let body = response_body_string(
        router(&app)
            .oneshot(post_form("/notifications/email", VALID, &app.session))
            .await
            .unwrap(),
    )
    .await;
    assert!(body.contains("Email settings saved"));

    {
        let s = app.session.lock().await;
        assert!(s.email.enabled);
        assert_eq!(s.email.smtp_host, "smtp.example.com");
        assert_eq!(s.email.smtp_port, 2525);
    }

    let body = response_body_string(
        router(&app)
            .oneshot(post_form("/notifications/test", "", &app.session))
            .await
            .unwrap(),
    )
    .await;
    assert!(body.contains("Test email queued for me@example.com"));
    assert_eq!(app.outbox.sent().len(), 1);
}

#[tokio::test]
async fn blank_secret_keeps_saved_one() {
    let app = test_app(StubMarket::default());
    router(&app)
        .oneshot(post_form("/notifications/email", VALID, &app.session))
        .await
        .unwrap();

    router(&app)
        .oneshot(post_form(
            "/notifications/email",
            "enabled=on&smtp_host=smtp.example.com&smtp_port=587&account=me%40example.com&secret=",
            &app.session,
        ))
        .await
        .unwrap();

    let s = app.session.lock().await;
    assert_eq!(s.email.secret, "pw");
    assert_eq!(s.email.smtp_port, 587);
}

#[tokio::test]
async fn test_mail_refused_while_disabled() {
    let app = test_app(StubMarket::default());

    let body = response_body_string(
        router(&app)
            .oneshot(post_form("/notifications/test", "", &app.session))
            .await
            .unwrap(),
    )
    .await;
    assert!(body.contains("enable email notifications first"));
    assert!(app.outbox.sent().is_empty());
}

#[tokio::test]
async fn history_lists_newest_first() {
    let app = test_app(StubMarket::default());
    {
        let mut s = app.session.lock().await;
        let now = Utc::now();
        for (i, sym) in ["OR.PA", "AI.PA"].iter().enumerate() {
            s.notifications.push(Notification {
                symbol: sym.to_string(),
                message: format!("Alert triggered for {sym}"),
                price: 100.0,
                emailed: i == 1,
                at: now + Duration::seconds(i as i64),
            });
        }
    }

    let body = response_body_string(
        router(&app)
            .oneshot(get("/notifications/history", &app.session))
            .await
            .unwrap(),
    )
    .await;

    let ai = body.find("AI.PA").unwrap();
    let or = body.find("OR.PA").unwrap();
    assert!(ai < or);
    assert_eq!(body.matches("emailed").count(), 1);
}

#[tokio::test]
async fn page_renders_form_and_history() {
    let app = test_app(StubMarket::default());

    let body = response_body_string(
        router(&app)
            .oneshot(htmx_get("/notifications", &app.session))
            .await
            .unwrap(),
    )
    .await;
    assert!(body.contains("smtp.gmail.com"));
    assert!(body.contains("587"));
    assert!(body.contains("No alert has fired yet."));
}
