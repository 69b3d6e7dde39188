use async_trait::async_trait;
use axum::extract::Request;
use axum::response::Response;
use uuid::Uuid;

use super::{Flow, RequestMeta, Stage};

#[derive(Debug, Clone, Copy)]
pub struct RequestId(pub Uuid);

/// Records request metadata as soon as the request enters the pipeline.
pub struct RequestLogger;

#[async_trait]
impl Stage for RequestLogger {
    fn name(&self) -> &'static str {
        "request_logger"
    }

    async fn before(&self, req: &mut Request, meta: &mut RequestMeta) -> Flow {
        req.extensions_mut().insert(RequestId(meta.request_id));
        let user_agent = req
            .headers()
            .get(axum::http::header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");
        tracing::info!(
            request_id = %meta.request_id,
            method = %meta.method,
            path = %meta.path,
            user_agent,
            "request_received"
        );
        Flow::Continue
    }
}

/// Short human-readable line per completed request: `GET /books 200 3.2 ms`.
pub struct AccessLog;

#[async_trait]
impl Stage for AccessLog {
    fn name(&self) -> &'static str {
        "access_log"
    }

    async fn before(&self, _req: &mut Request, _meta: &mut RequestMeta) -> Flow {
        Flow::Continue
    }

    async fn after(&self, meta: &RequestMeta, resp: &mut Response) {
        let elapsed_ms = meta.started.elapsed().as_secs_f64() * 1000.0;
        tracing::info!(
            request_id = %meta.request_id,
            "{} {} {} {:.1} ms",
            meta.method,
            meta.path,
            resp.status().as_u16(),
            elapsed_ms
        );
    }
}
