use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use uuid::Uuid;

use crate::{models::Session, AppState};

/// One browser session. Handlers lock it briefly and never across a
/// provider call.
pub type SessionHandle = Arc<tokio::sync::Mutex<Session>>;

struct Entry {
    handle: SessionHandle,
    last_seen: Instant,
}

/// In-memory sessions keyed by the id stored in the session cookie.
/// Sessions unused for `idle_ttl` are dropped when a new one is created.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<Uuid, Entry>>>,
    default_symbol: String,
    idle_ttl: Duration,
}

impl SessionStore {
    pub fn new(default_symbol: &str, idle_ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            default_symbol: default_symbol.to_string(),
            idle_ttl,
        }
    }

    pub fn get(&self, id: Uuid) -> Option<SessionHandle> {
        let mut map = self.sessions.lock().ok()?;
        let entry = map.get_mut(&id)?;
        if entry.last_seen.elapsed() >= self.idle_ttl {
            map.remove(&id);
            return None;
        }
        entry.last_seen = Instant::now();
        Some(entry.handle.clone())
    }

    pub fn create(&self) -> (Uuid, SessionHandle) {
        let id = Uuid::new_v4();
        let handle = new_handle(&self.default_symbol);
        if let Ok(mut map) = self.sessions.lock() {
            let before = map.len();
            map.retain(|_, e| e.last_seen.elapsed() < self.idle_ttl);
            if map.len() < before {
                tracing::debug!("expired {} idle sessions", before - map.len());
            }
            map.insert(
                id,
                Entry {
                    handle: handle.clone(),
                    last_seen: Instant::now(),
                },
            );
        }
        tracing::debug!("session created: {}", id);
        (id, handle)
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn new_handle(default_symbol: &str) -> SessionHandle {
    Arc::new(tokio::sync::Mutex::new(Session::new(default_symbol)))
}

/// Finds the caller's session (or starts one) and stores its handle in the
/// request extensions.
pub async fn attach_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let cookie_name = state.settings.session_cookie_name.as_str();

    let existing = jar
        .get(cookie_name)
        .and_then(|c| Uuid::parse_str(c.value()).ok())
        .and_then(|id| state.sessions.get(id));

    if let Some(handle) = existing {
        req.extensions_mut().insert(handle);
        return next.run(req).await;
    }

    let (id, handle) = state.sessions.create();
    req.extensions_mut().insert(handle);
    let res = next.run(req).await;

    let cookie = Cookie::build((cookie_name.to_string(), id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);

    (jar.add(cookie), res).into_response()
}
