//! Ordered request pipeline.
//!
//! Each [`Stage`] inspects the in-flight request and returns a [`Flow`]. The
//! driver walks the stages in order and stops at the first one that does not
//! return [`Flow::Continue`]. Once a response exists (from the handler or
//! from a stage that stopped the chain) the `after` hooks of the stages that
//! ran are invoked in reverse order.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use axum::extract::{Request, State};
use axum::http::{Extensions, Method};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::bootstrap::app_context::AppContext;
use crate::presentation::http::error::ApiError;

mod body;
mod cors;
mod logging;
mod session;

pub use body::{BodyError, BodyParser, MAX_BODY_BYTES, ParsedBody};
pub use cors::{CorsGuard, OriginPolicy};
pub use logging::{AccessLog, RequestId, RequestLogger};
pub use session::{SESSION_COOKIE, SessionAttach, SessionHandle};

pub enum Flow {
    Continue,
    Respond(Response),
    Fail(ApiError),
}

/// Per-request data visible to every stage, including after the request body
/// has been handed to the router.
pub struct RequestMeta {
    pub request_id: Uuid,
    pub method: Method,
    pub path: String,
    pub started: Instant,
    /// Stage-private values that must survive until `after`.
    pub locals: Extensions,
}

impl RequestMeta {
    fn from_request(req: &Request) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            method: req.method().clone(),
            path: req.uri().path().to_string(),
            started: Instant::now(),
            locals: Extensions::new(),
        }
    }
}

#[async_trait]
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    async fn before(&self, req: &mut Request, meta: &mut RequestMeta) -> Flow;

    async fn after(&self, _meta: &RequestMeta, _resp: &mut Response) {}
}

#[derive(Clone, Default)]
pub struct Pipeline {
    stages: Vec<Arc<dyn Stage>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    /// Body parsing, request logging, origin check, session, access log.
    /// The origin check runs before the session so rejected origins never
    /// touch the session store.
    pub fn standard(ctx: &AppContext) -> Self {
        let policy = OriginPolicy::from_config(&ctx.cfg);
        Self::new()
            .stage(BodyParser::new(MAX_BODY_BYTES))
            .stage(RequestLogger)
            .stage(CorsGuard::new(policy))
            .stage(SessionAttach::new(
                ctx.session_store(),
                ctx.cfg.session_secret.clone(),
                ctx.cfg.session_ttl_secs,
                ctx.cfg.secure_cookies(),
            ))
            .stage(AccessLog)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub async fn run(&self, mut req: Request, next: Next) -> Response {
        let mut meta = RequestMeta::from_request(&req);
        let mut ran = 0;
        let mut early: Option<Response> = None;

        for stage in &self.stages {
            ran += 1;
            match stage.before(&mut req, &mut meta).await {
                Flow::Continue => {}
                Flow::Respond(resp) => {
                    tracing::debug!(stage = stage.name(), request_id = %meta.request_id, "pipeline_responded");
                    early = Some(resp);
                    break;
                }
                Flow::Fail(err) => {
                    tracing::debug!(stage = stage.name(), request_id = %meta.request_id, error = %err, "pipeline_halted");
                    early = Some(err.into_response());
                    break;
                }
            }
        }

        let mut resp = match early {
            Some(resp) => resp,
            None => next.run(req).await,
        };

        for stage in self.stages[..ran].iter().rev() {
            stage.after(&meta, &mut resp).await;
        }
        resp
    }
}

/// Axum middleware entry point (`from_fn_with_state`).
pub async fn drive(State(pipeline): State<Arc<Pipeline>>, req: Request, next: Next) -> Response {
    pipeline.run(req, next).await
}
