use async_trait::async_trait;
use axum::extract::Request;
use axum::http::header;

use super::{Flow, RequestMeta, Stage};
use crate::bootstrap::config::Config;
use crate::presentation::http::error::ApiError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginPolicy {
    Exact(String),
    /// Development only: any origin is accepted.
    Any,
    /// No origin is accepted; requests without an `Origin` header still pass.
    Deny,
}

impl OriginPolicy {
    pub fn from_config(cfg: &Config) -> Self {
        match cfg.frontend_url.as_deref() {
            Some(origin) => OriginPolicy::Exact(origin.trim_end_matches('/').to_string()),
            None if cfg.is_production => OriginPolicy::Deny,
            None => OriginPolicy::Any,
        }
    }

    pub fn allows(&self, origin: &str) -> bool {
        match self {
            OriginPolicy::Exact(allowed) => allowed == origin.trim_end_matches('/'),
            OriginPolicy::Any => true,
            OriginPolicy::Deny => false,
        }
    }
}

/// Rejects cross-origin requests from anything but the configured frontend.
/// Requests without an `Origin` header are not cross-origin and pass.
pub struct CorsGuard {
    policy: OriginPolicy,
}

impl CorsGuard {
    pub fn new(policy: OriginPolicy) -> Self {
        Self { policy }
    }
}

#[async_trait]
impl Stage for CorsGuard {
    fn name(&self) -> &'static str {
        "cors"
    }

    async fn before(&self, req: &mut Request, meta: &mut RequestMeta) -> Flow {
        let Some(origin) = req.headers().get(header::ORIGIN) else {
            return Flow::Continue;
        };
        match origin.to_str() {
            Ok(o) if self.policy.allows(o) => Flow::Continue,
            other => {
                tracing::warn!(
                    request_id = %meta.request_id,
                    origin = other.unwrap_or("<invalid>"),
                    "cors_origin_rejected"
                );
                Flow::Fail(ApiError::CorsRejected)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_policy_ignores_trailing_slash() {
        let policy = OriginPolicy::Exact("http://localhost:3000".into());
        assert!(policy.allows("http://localhost:3000"));
        assert!(policy.allows("http://localhost:3000/"));
        assert!(!policy.allows("http://evil.example"));
    }

    #[test]
    fn production_without_frontend_denies() {
        let mut cfg = Config::for_tests();
        cfg.frontend_url = None;
        cfg.is_production = true;
        assert_eq!(OriginPolicy::from_config(&cfg), OriginPolicy::Deny);
        cfg.is_production = false;
        assert_eq!(OriginPolicy::from_config(&cfg), OriginPolicy::Any);
    }
}
