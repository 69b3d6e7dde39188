use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::Request;
use axum::http::{HeaderValue, Method, header};
use axum::response::Response;
use chrono::Utc;
use parking_lot::Mutex;
use uuid::Uuid;

use super::{Flow, RequestMeta, Stage};
use crate::application::ports::session_store::{SessionData, SessionRecord, SessionStore};
use crate::domain::users::Role;
use crate::infrastructure::crypto;
use crate::presentation::http::error::ApiError;

pub const SESSION_COOKIE: &str = "sid";

#[derive(Debug)]
struct SessionState {
    id: String,
    data: SessionData,
    is_new: bool,
    modified: bool,
    destroyed: bool,
    /// Set when the id was regenerated; the old record is deleted on save.
    replaced: Option<String>,
}

/// Session attached to a request. Shared between the handler (through request
/// extensions) and the session stage, which persists it once the response exists.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    inner: Arc<Mutex<SessionState>>,
}

impl SessionHandle {
    fn new(id: String, data: SessionData, is_new: bool) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionState {
                id,
                data,
                is_new,
                modified: false,
                destroyed: false,
                replaced: None,
            })),
        }
    }

    pub fn id(&self) -> String {
        self.inner.lock().id.clone()
    }

    pub fn data(&self) -> SessionData {
        self.inner.lock().data.clone()
    }

    pub fn is_new(&self) -> bool {
        self.inner.lock().is_new
    }

    /// Records the logged-in principal and rotates the session id.
    pub fn login(&self, user_id: Uuid, role: Role) {
        let mut s = self.inner.lock();
        if !s.is_new && s.replaced.is_none() {
            s.replaced = Some(s.id.clone());
        }
        s.id = crypto::generate_session_id();
        s.data.user_id = Some(user_id);
        s.data.role = Some(role);
        s.modified = true;
    }

    pub fn insert(&self, key: &str, value: serde_json::Value) {
        let mut s = self.inner.lock();
        s.data.extra.insert(key.to_string(), value);
        s.modified = true;
    }

    pub fn destroy(&self) {
        self.inner.lock().destroyed = true;
    }
}

/// Resolves the session from the signed `sid` cookie, creating one when the
/// client has none, and saves it after the handler ran.
pub struct SessionAttach {
    store: Arc<dyn SessionStore>,
    secret: String,
    ttl: chrono::Duration,
    secure: bool,
}

impl SessionAttach {
    pub fn new(store: Arc<dyn SessionStore>, secret: String, ttl_secs: i64, secure: bool) -> Self {
        Self {
            store,
            secret,
            ttl: chrono::Duration::seconds(ttl_secs.max(1)),
            secure,
        }
    }

    fn cookie_id(&self, req: &Request) -> Option<String> {
        let header = req.headers().get(header::COOKIE)?.to_str().ok()?;
        let raw = get_cookie(header, SESSION_COOKIE)?;
        crypto::verify_session_cookie(&self.secret, &raw)
    }

    // Browser-session cookie: expiry is enforced by the store TTL only.
    fn set_cookie(&self, id: &str) -> String {
        let secure_attr = if self.secure { "; Secure" } else { "" };
        format!(
            "{}={}; HttpOnly{}; Path=/; SameSite=Lax",
            SESSION_COOKIE,
            crypto::sign_session_id(&self.secret, id),
            secure_attr,
        )
    }

    fn clear_cookie(&self) -> String {
        let secure_attr = if self.secure { "; Secure" } else { "" };
        format!(
            "{}=; HttpOnly{}; Path=/; Max-Age=0; SameSite=Lax",
            SESSION_COOKIE, secure_attr
        )
    }

    async fn save(&self, handle: &SessionHandle) -> anyhow::Result<Option<String>> {
        let (id, data, is_new, modified, destroyed, replaced) = {
            let mut s = handle.inner.lock();
            (
                s.id.clone(),
                s.data.clone(),
                s.is_new,
                s.modified,
                s.destroyed,
                s.replaced.take(),
            )
        };
        if let Some(old) = &replaced {
            self.store.delete(old).await?;
        }
        if destroyed {
            self.store.delete(&id).await?;
            return Ok(if is_new && replaced.is_none() {
                None
            } else {
                Some(self.clear_cookie())
            });
        }
        let expires_at = Utc::now() + self.ttl;
        if is_new || modified {
            self.store
                .set(&SessionRecord {
                    id: id.clone(),
                    data,
                    expires_at,
                })
                .await?;
        } else {
            self.store.touch(&id, expires_at).await?;
        }
        Ok(if is_new || replaced.is_some() || modified {
            Some(self.set_cookie(&id))
        } else {
            None
        })
    }
}

fn is_preflight(req: &Request) -> bool {
    req.method() == Method::OPTIONS
        && req
            .headers()
            .contains_key(header::ACCESS_CONTROL_REQUEST_METHOD)
}

#[async_trait]
impl Stage for SessionAttach {
    fn name(&self) -> &'static str {
        "session"
    }

    async fn before(&self, req: &mut Request, meta: &mut RequestMeta) -> Flow {
        if is_preflight(req) {
            return Flow::Continue;
        }
        let existing = match self.cookie_id(req) {
            Some(id) => match self.store.get(&id).await {
                Ok(found) => found.filter(|r| !r.is_expired(Utc::now())),
                Err(e) => {
                    return Flow::Fail(ApiError::Internal(e.context("session_store_get")));
                }
            },
            None => None,
        };
        let handle = match existing {
            Some(record) => SessionHandle::new(record.id, record.data, false),
            None => SessionHandle::new(crypto::generate_session_id(), SessionData::default(), true),
        };
        req.extensions_mut().insert(handle.clone());
        meta.locals.insert(handle);
        Flow::Continue
    }

    async fn after(&self, meta: &RequestMeta, resp: &mut Response) {
        let Some(handle) = meta.locals.get::<SessionHandle>() else {
            return;
        };
        match self.save(handle).await {
            Ok(Some(cookie)) => match HeaderValue::from_str(&cookie) {
                Ok(v) => {
                    resp.headers_mut().append(header::SET_COOKIE, v);
                }
                Err(e) => tracing::error!(error = ?e, "session_cookie_invalid"),
            },
            Ok(None) => {}
            Err(e) => {
                // The response is already built; the client keeps its old cookie.
                tracing::error!(error = ?e, request_id = %meta.request_id, "session_store_save_failed");
            }
        }
    }
}

pub(crate) fn get_cookie(cookie_header: &str, name: &str) -> Option<String> {
    for part in cookie_header.split(';') {
        let kv = part.trim();
        if let Some((k, v)) = kv.split_once('=') {
            if k.trim() == name {
                return Some(v.trim().to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attach(secure: bool) -> SessionAttach {
        SessionAttach::new(
            Arc::new(crate::infrastructure::memory::MemorySessionStore::default()),
            "test-secret".into(),
            3600,
            secure,
        )
    }

    #[test]
    fn session_cookie_has_no_client_expiry() {
        let cookie = attach(false).set_cookie("abc");
        assert!(cookie.starts_with("sid=abc."));
        assert!(cookie.contains("HttpOnly"));
        assert!(!cookie.contains("Max-Age"));
        assert!(!cookie.contains("Expires"));
        assert!(!cookie.contains("Secure"));
        assert!(attach(true).set_cookie("abc").contains("; Secure"));
    }

    #[test]
    fn finds_named_cookie() {
        assert_eq!(
            get_cookie("theme=dark; sid=abc.def; x=1", "sid").as_deref(),
            Some("abc.def")
        );
        assert_eq!(get_cookie("theme=dark", "sid"), None);
    }

    #[test]
    fn login_rotates_existing_session_id() {
        let handle = SessionHandle::new("old".into(), SessionData::default(), false);
        handle.login(Uuid::new_v4(), Role::User);
        assert_ne!(handle.id(), "old");
        assert_eq!(handle.inner.lock().replaced.as_deref(), Some("old"));
        assert!(handle.data().user_id.is_some());
    }
}
