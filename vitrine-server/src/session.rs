//! Minimal in-memory session table behind a random-token cookie. Tokens
//! are opaque and unguessable, so no signing is involved; sessions expire
//! after 24 hours and vanish on restart, which is acceptable for a small
//! admin panel.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use rand::Rng;
use rand::distributions::Alphanumeric;
use vitrine_core::User;

pub const SESSION_COOKIE: &str = "vitrine_session";
const SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);
const TOKEN_LEN: usize = 32;

#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user_id: u64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    expires_at: Instant,
}

pub struct SessionTable {
    sessions: RwLock<HashMap<String, Session>>,
}

impl Default for SessionTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionTable {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Start a session for a verified user; returns the cookie token.
    pub fn create(&self, user: &User) -> String {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LEN)
            .map(char::from)
            .collect();
        let session = Session {
            token: token.clone(),
            user_id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            expires_at: Instant::now() + SESSION_TTL,
        };
        self.sessions
            .write()
            .expect("session table poisoned")
            .insert(token.clone(), session);
        token
    }

    /// Look up the session for a request, if its cookie names a live one.
    /// Expired sessions are dropped on sight.
    pub fn authenticate(&self, headers: &HeaderMap) -> Option<Session> {
        let token = session_token(headers)?;
        let mut sessions = self.sessions.write().expect("session table poisoned");
        match sessions.get(&token) {
            Some(s) if s.expires_at > Instant::now() => Some(s.clone()),
            Some(_) => {
                sessions.remove(&token);
                None
            }
            None => None,
        }
    }

    pub fn destroy(&self, headers: &HeaderMap) {
        if let Some(token) = session_token(headers) {
            self.sessions
                .write()
                .expect("session table poisoned")
                .remove(&token);
        }
    }
}

/// Extract the session token from the request's Cookie header.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

/// Set-Cookie value establishing a session.
pub fn session_cookie(token: &str) -> String {
    format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_TTL.as_secs()
    )
}

/// Set-Cookie value clearing the session on logout.
pub fn clear_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}
