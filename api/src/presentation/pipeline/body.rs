use async_trait::async_trait;
use axum::body::Body;
use axum::extract::Request;
use axum::http::header;

use super::{Flow, RequestMeta, Stage};
use crate::presentation::http::error::ApiError;

pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// JSON body parsed by [`BodyParser`], available to later stages and handlers.
#[derive(Debug, Clone)]
pub struct ParsedBody(pub serde_json::Value);

/// Why a JSON body could not be parsed. Recorded instead of failing so that
/// the origin and session checks decide first; raised when a handler reads
/// the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyError {
    TooLarge,
    Malformed,
}

impl From<BodyError> for ApiError {
    fn from(err: BodyError) -> Self {
        match err {
            BodyError::TooLarge => ApiError::PayloadTooLarge,
            BodyError::Malformed => ApiError::InvalidJson,
        }
    }
}

pub struct BodyParser {
    limit: usize,
}

impl BodyParser {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }
}

fn is_json(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| {
            let mime = ct.split(';').next().unwrap_or("").trim();
            mime.eq_ignore_ascii_case("application/json") || mime.ends_with("+json")
        })
        .unwrap_or(false)
}

#[async_trait]
impl Stage for BodyParser {
    fn name(&self) -> &'static str {
        "body_parser"
    }

    async fn before(&self, req: &mut Request, _meta: &mut RequestMeta) -> Flow {
        if !is_json(req) {
            return Flow::Continue;
        }
        let declared = req
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<usize>().ok());
        // Declared oversize bodies are never buffered.
        if declared.is_some_and(|len| len > self.limit) {
            req.extensions_mut().insert(BodyError::TooLarge);
            return Flow::Continue;
        }

        let body = std::mem::take(req.body_mut());
        let bytes = match axum::body::to_bytes(body, self.limit).await {
            Ok(b) => b,
            Err(_) => {
                req.extensions_mut().insert(BodyError::TooLarge);
                return Flow::Continue;
            }
        };
        if !bytes.is_empty() {
            match serde_json::from_slice::<serde_json::Value>(&bytes) {
                Ok(value) => {
                    req.extensions_mut().insert(ParsedBody(value));
                }
                Err(_) => {
                    req.extensions_mut().insert(BodyError::Malformed);
                }
            }
        }
        *req.body_mut() = Body::from(bytes);
        Flow::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;
    use std::time::Instant;

    fn meta() -> RequestMeta {
        RequestMeta {
            request_id: uuid::Uuid::new_v4(),
            method: Method::POST,
            path: "/".into(),
            started: Instant::now(),
            locals: Default::default(),
        }
    }

    fn json(body: &'static str) -> Request {
        axum::http::Request::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn valid_json_is_parsed_and_body_kept() {
        let mut req = json(r#"{"a":1}"#);
        let flow = BodyParser::new(MAX_BODY_BYTES).before(&mut req, &mut meta()).await;
        assert!(matches!(flow, Flow::Continue));
        assert_eq!(req.extensions().get::<ParsedBody>().unwrap().0["a"], 1);
        let bytes = axum::body::to_bytes(req.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], br#"{"a":1}"#);
    }

    #[tokio::test]
    async fn malformed_json_is_recorded_not_failed() {
        let mut req = json("{not json");
        let flow = BodyParser::new(MAX_BODY_BYTES).before(&mut req, &mut meta()).await;
        assert!(matches!(flow, Flow::Continue));
        assert_eq!(req.extensions().get::<BodyError>(), Some(&BodyError::Malformed));
        assert!(req.extensions().get::<ParsedBody>().is_none());
    }

    #[tokio::test]
    async fn oversize_body_is_recorded() {
        let mut req = json("[1, 2, 3, 4, 5, 6, 7, 8]");
        let flow = BodyParser::new(4).before(&mut req, &mut meta()).await;
        assert!(matches!(flow, Flow::Continue));
        assert_eq!(req.extensions().get::<BodyError>(), Some(&BodyError::TooLarge));
    }
}
