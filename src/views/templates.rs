use handlebars::Handlebars;
use std::sync::Arc;

pub type Hbs = Arc<Handlebars<'static>>;

const TEMPLATES: &[(&str, &str)] = &[
    // Layout + pages
    ("layouts/base", include_str!("../../templates/layouts/base.hbs")),
    ("pages/dashboard", include_str!("../../templates/pages/dashboard.hbs")),
    ("pages/portfolio", include_str!("../../templates/pages/portfolio.hbs")),
    ("pages/alerts", include_str!("../../templates/pages/alerts.hbs")),
    ("pages/notifications", include_str!("../../templates/pages/notifications.hbs")),
    ("pages/export", include_str!("../../templates/pages/export.hbs")),
    ("pages/predictions", include_str!("../../templates/pages/predictions.hbs")),
    ("pages/indices", include_str!("../../templates/pages/indices.hbs")),
    ("pages/not_found", include_str!("../../templates/pages/not_found.hbs")),
    // Partial endpoints
    ("partials/dashboard_panel", include_str!("../../templates/partials/dashboard_panel.hbs")),
    ("partials/watchlist", include_str!("../../templates/partials/watchlist.hbs")),
    ("partials/market_status", include_str!("../../templates/partials/market_status.hbs")),
    ("partials/portfolio_positions", include_str!("../../templates/partials/portfolio_positions.hbs")),
    ("partials/alerts_list", include_str!("../../templates/partials/alerts_list.hbs")),
    ("partials/email_form", include_str!("../../templates/partials/email_form.hbs")),
    ("partials/notification_history", include_str!("../../templates/partials/notification_history.hbs")),
    ("partials/projection", include_str!("../../templates/partials/projection.hbs")),
    ("partials/indices_table", include_str!("../../templates/partials/indices_table.hbs")),
    ("partials/export_preview", include_str!("../../templates/partials/export_preview.hbs")),
];

const PARTIALS: &[(&str, &str)] = &[
    ("navbar", include_str!("../../templates/partials/navbar.hbs")),
    ("messages", include_str!("../../templates/partials/messages.hbs")),
    ("market_status", include_str!("../../templates/partials/market_status.hbs")),
    ("footer", include_str!("../../templates/partials/footer.hbs")),
];

pub fn build_handlebars() -> Hbs {
    let mut hb = Handlebars::new();
    hb.set_strict_mode(false);

    for (name, src) in TEMPLATES {
        hb.register_template_string(name, *src)
            .unwrap_or_else(|e| panic!("template {name}: {e}"));
    }

    for (name, src) in PARTIALS {
        hb.register_partial(name, *src)
            .unwrap_or_else(|e| panic!("partial {name}: {e}"));
    }

    Arc::new(hb)
}
