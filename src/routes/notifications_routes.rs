use axum::{Router, routing::{get, post}};

use crate::{AppState, controllers::notifications_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/notifications", get(notifications_controller::get_notifications_page))
        .route("/notifications/email", post(notifications_controller::post_email_settings))
        .route("/notifications/test", post(notifications_controller::post_test_email))
        .route("/notifications/history", get(notifications_controller::get_notification_history))
}
