use std::collections::BTreeMap;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{Condition, Notification, PriceAlert, Session},
    session::SessionHandle,
    AppState,
};

use super::{exchange::format_currency, mailer, market_clock::PARIS_TZ};

/// Alerts on `symbol` that fire at `price`, in input order. Pure.
pub fn evaluate(alerts: &[PriceAlert], symbol: &str, price: f64) -> Vec<PriceAlert> {
    alerts
        .iter()
        .filter(|a| a.symbol == symbol && a.is_hit(price))
        .cloned()
        .collect()
}

/// Evaluate against the session's book, then drop the one-shot alerts that
/// fired. Each alert is visited once per call.
pub fn fire(session: &mut Session, symbol: &str, price: f64) -> Vec<PriceAlert> {
    let fired = evaluate(session.alerts.as_slice(), symbol, price);
    for alert in fired.iter().filter(|a| a.one_time) {
        session.alerts.remove(alert.id);
    }
    fired
}

pub fn create_alert(
    session: &mut Session,
    symbol: &str,
    condition: Condition,
    target_price: f64,
    one_time: bool,
) -> Result<PriceAlert, AppError> {
    let alert = PriceAlert::new(symbol, condition, target_price, one_time)?;
    session.alerts.add(alert.clone());
    tracing::info!(
        "alert created: {} {} {}",
        alert.symbol,
        alert.condition.as_str(),
        alert.target_price
    );
    Ok(alert)
}

pub fn delete_alert(session: &mut Session, id: Uuid) -> bool {
    session.alerts.remove(id)
}

/// Active alerts by symbol, newest first within each group.
pub fn list_grouped(session: &Session) -> BTreeMap<String, Vec<PriceAlert>> {
    let mut map: BTreeMap<String, Vec<PriceAlert>> = BTreeMap::new();
    for a in session.alerts.as_slice().iter().rev() {
        map.entry(a.symbol.clone()).or_default().push(a.clone());
    }
    map
}

pub fn alert_subject(symbol: &str) -> String {
    format!("Price alert - {symbol}")
}

pub fn alert_body(alert: &PriceAlert, price: f64) -> String {
    let now = Utc::now().with_timezone(&PARIS_TZ);
    format!(
        "<h2>Price alert triggered</h2>\
         <p><b>Symbol:</b> {sym}</p>\
         <p><b>Current price:</b> {price}</p>\
         <p><b>Condition:</b> {cond} {target}</p>\
         <p><b>Date:</b> {date} (Paris time)</p>",
        sym = alert.symbol,
        price = format_currency(price, &alert.symbol),
        cond = alert.condition.as_str(),
        target = format_currency(alert.target_price, &alert.symbol),
        date = now.format("%Y-%m-%d %H:%M:%S"),
    )
}

/// Run the session's alerts against a fresh price: record a notification for
/// each hit, email it when enabled, and retire one-shot alerts.
pub async fn process_price(
    state: &AppState,
    session: &SessionHandle,
    symbol: &str,
    price: f64,
) -> Vec<Notification> {
    if !price.is_finite() || price <= 0.0 {
        return Vec::new();
    }

    let (fired, email) = {
        let mut s = session.lock().await;
        (fire(&mut s, symbol, price), s.email.clone())
    };

    if fired.is_empty() {
        return Vec::new();
    }

    let mut notes = Vec::with_capacity(fired.len());
    for alert in &fired {
        tracing::info!(
            "alert fired: {} {} {} at {}",
            alert.symbol,
            alert.condition.as_str(),
            alert.target_price,
            price
        );

        let emailed = mailer::send_email_alert(
            state.mailer.as_ref(),
            &email,
            &alert_subject(symbol),
            &alert_body(alert, price),
            &email.account,
        )
        .await;

        notes.push(Notification {
            symbol: symbol.to_string(),
            message: format!(
                "Alert triggered for {} at {} ({} {})",
                symbol,
                format_currency(price, symbol),
                alert.condition.as_str(),
                format_currency(alert.target_price, symbol),
            ),
            price,
            emailed,
            at: Utc::now(),
        });
    }

    session.lock().await.notifications.extend(notes.iter().cloned());
    notes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert(symbol: &str, condition: Condition, target: f64, one_time: bool) -> PriceAlert {
        PriceAlert::new(symbol, condition, target, one_time).unwrap()
    }

    #[test]
    fn evaluate_matches_symbol_and_direction() {
        let alerts = vec![
            alert("AAPL", Condition::Above, 100.0, false),
            alert("AAPL", Condition::Below, 90.0, false),
            alert("MC.PA", Condition::Above, 1.0, false),
        ];
        assert!(evaluate(&alerts, "AAPL", 95.0).is_empty());

        let hit = evaluate(&alerts, "AAPL", 100.0);
        assert_eq!(hit.len(), 1);
        assert_eq!(hit[0].condition, Condition::Above);

        let hit = evaluate(&alerts, "AAPL", 90.0);
        assert_eq!(hit.len(), 1);
        assert_eq!(hit[0].condition, Condition::Below);
    }

    #[test]
    fn evaluate_keeps_input_order() {
        let alerts = vec![
            alert("AAPL", Condition::Below, 200.0, false),
            alert("AAPL", Condition::Above, 50.0, false),
        ];
        let hit = evaluate(&alerts, "AAPL", 100.0);
        assert_eq!(hit.iter().map(|a| a.id).collect::<Vec<_>>(), vec![alerts[0].id, alerts[1].id]);
    }

    #[test]
    fn persistent_alert_fires_every_time_one_shot_once() {
        let mut session = Session::new("MC.PA");
        let persistent = create_alert(&mut session, "AAPL", Condition::Above, 90.0, false).unwrap();
        let one_shot = create_alert(&mut session, "AAPL", Condition::Below, 100.0, true).unwrap();

        let first = fire(&mut session, "AAPL", 95.0);
        assert_eq!(first.iter().map(|a| a.id).collect::<Vec<_>>(), vec![persistent.id, one_shot.id]);

        let second = fire(&mut session, "AAPL", 95.0);
        assert_eq!(second.iter().map(|a| a.id).collect::<Vec<_>>(), vec![persistent.id]);
        assert_eq!(session.alerts.len(), 1);
    }

    #[test]
    fn one_shot_that_misses_stays_active() {
        let mut session = Session::new("MC.PA");
        create_alert(&mut session, "AAPL", Condition::Above, 100.0, true).unwrap();
        assert!(fire(&mut session, "AAPL", 95.0).is_empty());
        assert_eq!(session.alerts.len(), 1);
    }

    #[test]
    fn create_rejects_non_positive_target() {
        let mut session = Session::new("MC.PA");
        let err = create_alert(&mut session, "AAPL", Condition::Above, 0.0, false);
        assert!(matches!(err, Err(AppError::InvalidInput(_))));
        assert!(session.alerts.is_empty());
    }

    #[test]
    fn grouped_listing_and_delete() {
        let mut session = Session::new("MC.PA");
        let a = create_alert(&mut session, "MC.PA", Condition::Above, 800.0, false).unwrap();
        create_alert(&mut session, "AAPL", Condition::Below, 150.0, false).unwrap();

        let groups = list_grouped(&session);
        assert_eq!(groups.keys().cloned().collect::<Vec<_>>(), vec!["AAPL", "MC.PA"]);

        assert!(delete_alert(&mut session, a.id));
        assert!(!delete_alert(&mut session, a.id));
        assert!(!list_grouped(&session).contains_key("MC.PA"));
    }
}
