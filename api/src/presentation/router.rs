//! Assembles the HTTP surface: resource groups mounted under their prefixes,
//! each behind its access gate, wrapped in the request pipeline.

use std::sync::Arc;

use axum::extract::MatchedPath;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::response::{IntoResponse, Response};
use axum::Router;
use http::HeaderValue;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::bootstrap::app_context::AppContext;
use crate::bootstrap::config::Config;
use crate::presentation::docs::ApiDoc;
use crate::presentation::http::error::ApiError;
use crate::presentation::http::{admin, auth, books, gate, health, orders, reviews};
use crate::presentation::pipeline::{self, Pipeline};
use crate::presentation::ws;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Open,
    Authenticated,
    Admin,
}

/// A resource group and where it is mounted.
pub struct GroupBinding {
    pub prefix: &'static str,
    pub gate: Gate,
    pub router: Router,
}

impl GroupBinding {
    pub fn new(prefix: &'static str, gate: Gate, router: Router) -> Self {
        Self {
            prefix,
            gate,
            router,
        }
    }
}

/// Every group the bookstore serves. Routes inside an open group may still
/// require a login through the `Principal` extractor.
pub fn groups(ctx: &AppContext) -> Vec<GroupBinding> {
    vec![
        GroupBinding::new("/", Gate::Open, health::routes()),
        GroupBinding::new("/auth", Gate::Open, auth::routes(ctx.clone())),
        GroupBinding::new("/books", Gate::Open, books::routes(ctx.clone())),
        GroupBinding::new("/reviews", Gate::Open, reviews::routes(ctx.clone())),
        GroupBinding::new("/orders", Gate::Authenticated, orders::routes(ctx.clone())),
        GroupBinding::new("/admin", Gate::Admin, admin::routes(ctx.clone())),
        GroupBinding::new("/", Gate::Open, ws::routes(ctx.clone())),
    ]
}

/// Mounts the groups in order. A `/` prefix merges at the root.
pub fn compose(bindings: Vec<GroupBinding>) -> Router {
    bindings.into_iter().fold(Router::new(), |app, binding| {
        let router = match binding.gate {
            Gate::Open => binding.router,
            Gate::Authenticated => binding
                .router
                .route_layer(from_fn(gate::require_authenticated)),
            Gate::Admin => binding.router.route_layer(from_fn(gate::require_admin)),
        };
        tracing::debug!(prefix = binding.prefix, gate = ?binding.gate, "router_group_mounted");
        if binding.prefix == "/" {
            app.merge(router)
        } else {
            app.nest(binding.prefix, router)
        }
    })
}

pub fn build(ctx: &AppContext) -> Router {
    build_with(ctx, Pipeline::standard(ctx), groups(ctx))
}

pub fn build_with(ctx: &AppContext, pipeline: Pipeline, bindings: Vec<GroupBinding>) -> Router {
    tracing::info!(stages = ?pipeline.names(), "pipeline_configured");
    compose(bindings)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .fallback(not_found)
        .layer(cors_layer(&ctx.cfg))
        .layer(from_fn_with_state(Arc::new(pipeline), pipeline::drive))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &http::Request<_>| {
                let method = req.method().clone();
                let uri = req.uri().clone();
                let matched = req
                    .extensions()
                    .get::<MatchedPath>()
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_default();
                tracing::info_span!("http", %method, %uri, matched_path = %matched)
            }),
        )
}

async fn not_found() -> Response {
    ApiError::NotFound.into_response()
}

// Disallowed origins are already rejected by the pipeline; this layer only
// answers preflights and decorates allowed responses.
fn cors_layer(cfg: &Config) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([
            http::Method::GET,
            http::Method::POST,
            http::Method::PUT,
            http::Method::DELETE,
            http::Method::PATCH,
            http::Method::OPTIONS,
        ])
        .allow_headers([http::header::CONTENT_TYPE, http::header::AUTHORIZATION]);
    match cfg.frontend_url.as_deref().map(HeaderValue::from_str) {
        Some(Ok(origin)) => base.allow_origin(origin).allow_credentials(true),
        Some(Err(_)) | None if cfg.is_production => base.allow_origin(AllowOrigin::exact(
            HeaderValue::from_static("http://invalid"),
        )),
        _ => base
            .allow_origin(AllowOrigin::mirror_request())
            .allow_credentials(true),
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::extract::Request;
    use axum::http::{StatusCode, header};
    use tower::ServiceExt;

    use super::*;
    use crate::application::ports::event_bus::{EventBus, EventHandler, ORDER_PLACED};
    use crate::application::subscribers;
    use crate::bootstrap::app_context::AppServices;
    use crate::infrastructure::events::InProcessEventBus;
    use crate::infrastructure::memory::{
        MemoryBookRepository, MemoryOrderRepository, MemoryReviewRepository,
        MemorySessionStore, MemoryUserRepository, Recorder,
    };
    use crate::infrastructure::realtime::RealtimeChannel;
    use crate::presentation::pipeline::{Flow, RequestMeta, SESSION_COOKIE, Stage};

    struct Harness {
        ctx: AppContext,
        recorder: Arc<Recorder>,
        sessions: Arc<MemorySessionStore>,
    }

    fn harness() -> Harness {
        let bus = Arc::new(InProcessEventBus::new());
        let realtime = RealtimeChannel::new(16);
        subscribers::register_builtin(bus.as_ref(), Arc::new(realtime.clone()));
        let recorder = Arc::new(Recorder::new("recorder"));
        bus.subscribe(ORDER_PLACED, recorder.clone() as Arc<dyn EventHandler>);
        let sessions = Arc::new(MemorySessionStore::default());
        let services = AppServices::new(
            Arc::new(MemoryUserRepository::default()),
            Arc::new(MemoryBookRepository::default()),
            Arc::new(MemoryReviewRepository::default()),
            Arc::new(MemoryOrderRepository::default()),
            sessions.clone(),
            bus,
            realtime,
        );
        Harness {
            ctx: AppContext::new(Config::for_tests(), services),
            recorder,
            sessions,
        }
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value, cookie: Option<&str>) -> Request {
        let mut builder = http::Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(c) = cookie {
            builder = builder.header(header::COOKIE, c);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get(uri: &str, cookie: Option<&str>) -> Request {
        let mut builder = http::Request::builder().uri(uri);
        if let Some(c) = cookie {
            builder = builder.header(header::COOKIE, c);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn session_cookie(resp: &Response) -> String {
        let raw = resp
            .headers()
            .get(header::SET_COOKIE)
            .expect("set-cookie")
            .to_str()
            .unwrap();
        raw.split(';').next().unwrap().to_string()
    }

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn login_as(app: &Router, email: &str) -> String {
        let resp = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/auth/register",
                serde_json::json!({ "email": email, "name": "Reader", "password": "correct horse" }),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let resp = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/auth/login",
                serde_json::json!({ "email": email, "password": "correct horse" }),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        session_cookie(&resp)
    }

    #[tokio::test]
    async fn home_route_greets() {
        let h = harness();
        let app = build(&h.ctx);
        let resp = app.oneshot(get("/", None)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], health::HOME_GREETING.as_bytes());
    }

    #[tokio::test]
    async fn first_visit_gets_session_cookie() {
        let h = harness();
        let app = build(&h.ctx);
        let resp = app.oneshot(get("/books", None)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(session_cookie(&resp).starts_with(&format!("{SESSION_COOKIE}=")));
        assert_eq!(h.sessions.len(), 1);
    }

    #[tokio::test]
    async fn foreign_origin_is_rejected_before_session() {
        let h = harness();
        let app = build(&h.ctx);
        let req = http::Request::builder()
            .method("POST")
            .uri("/orders")
            .header(header::ORIGIN, "http://evil.example")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_json(resp).await["error"], "cors_rejected");
        assert_eq!(h.sessions.len(), 0);
    }

    #[tokio::test]
    async fn allowed_origin_gets_cors_headers() {
        let h = harness();
        let app = build(&h.ctx);
        let req = http::Request::builder()
            .uri("/books")
            .header(header::ORIGIN, "http://localhost:3000")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "http://localhost:3000"
        );
    }

    #[tokio::test]
    async fn orders_require_login() {
        let h = harness();
        let app = build(&h.ctx);
        let resp = app.oneshot(get("/orders", None)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn anonymous_order_never_reaches_the_handler() {
        let h = harness();
        let book = h
            .ctx
            .book_repo()
            .create_book("Dune", "Herbert", 1299)
            .await
            .unwrap();
        let app = build(&h.ctx);
        let resp = app
            .oneshot(json_request(
                "POST",
                "/orders",
                serde_json::json!({ "items": [{ "book_id": book.id, "quantity": 1 }] }),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(h.recorder.events().is_empty());
        assert!(h.ctx.order_repo().list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn foreign_origin_order_is_rejected_before_the_gate() {
        let h = harness();
        let book = h
            .ctx
            .book_repo()
            .create_book("Dune", "Herbert", 1299)
            .await
            .unwrap();
        let app = build(&h.ctx);
        let cookie = login_as(&app, "reader@example.com").await;

        let mut req = json_request(
            "POST",
            "/orders",
            serde_json::json!({ "items": [{ "book_id": book.id, "quantity": 1 }] }),
            Some(&cookie),
        );
        req.headers_mut()
            .insert(header::ORIGIN, HeaderValue::from_static("http://evil.example"));
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_json(resp).await["error"], "cors_rejected");
        assert!(h.recorder.events().is_empty());
        assert!(h.ctx.order_repo().list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn foreign_origin_wins_over_a_malformed_body() {
        let h = harness();
        let app = build(&h.ctx);
        let req = http::Request::builder()
            .method("POST")
            .uri("/orders")
            .header(header::ORIGIN, "http://evil.example")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_json(resp).await["error"], "cors_rejected");
        assert_eq!(h.sessions.len(), 0);
    }

    #[tokio::test]
    async fn foreign_origin_wins_over_an_oversize_body() {
        let h = harness();
        let app = build(&h.ctx);
        let req = http::Request::builder()
            .method("POST")
            .uri("/orders")
            .header(header::ORIGIN, "http://evil.example")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::CONTENT_LENGTH, (pipeline::MAX_BODY_BYTES + 1).to_string())
            .body(Body::from(vec![b' '; pipeline::MAX_BODY_BYTES + 1]))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn oversize_body_is_rejected_when_read() {
        let h = harness();
        let app = build(&h.ctx);
        let req = http::Request::builder()
            .method("POST")
            .uri("/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::CONTENT_LENGTH, (pipeline::MAX_BODY_BYTES + 1).to_string())
            .body(Body::from(vec![b' '; pipeline::MAX_BODY_BYTES + 1]))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn admin_requires_admin_role() {
        let h = harness();
        let app = build(&h.ctx);

        let anon = app.clone().oneshot(get("/admin/orders", None)).await.unwrap();
        assert_eq!(anon.status(), StatusCode::FORBIDDEN);

        let anon_write = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/admin/books",
                serde_json::json!({ "title": "Emma", "author": "Austen", "price_cents": 900 }),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(anon_write.status(), StatusCode::FORBIDDEN);
        assert!(h.ctx.book_repo().list_books().await.unwrap().is_empty());

        let cookie = login_as(&app, "reader@example.com").await;
        let user = app
            .clone()
            .oneshot(get("/admin/orders", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(user.status(), StatusCode::FORBIDDEN);

        let cookie = login_as(&app, "admin@example.com").await;
        let admin = app
            .oneshot(get("/admin/users", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(admin.status(), StatusCode::OK);
        let users = body_json(admin).await;
        assert_eq!(users.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn placing_an_order_publishes_order_placed() {
        let h = harness();
        let book = h
            .ctx
            .book_repo()
            .create_book("Dune", "Herbert", 1299)
            .await
            .unwrap();
        let app = build(&h.ctx);
        let cookie = login_as(&app, "reader@example.com").await;

        let resp = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/orders",
                serde_json::json!({ "items": [{ "book_id": book.id, "quantity": 2 }] }),
                Some(&cookie),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let order = body_json(resp).await;
        assert_eq!(order["status"], "placed");

        let seen = h.recorder.events();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].name, ORDER_PLACED);
        assert_eq!(seen[0].payload["id"], order["id"]);

        let mine = app.oneshot(get("/orders", Some(&cookie))).await.unwrap();
        assert_eq!(body_json(mine).await.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn malformed_json_is_rejected() {
        let h = harness();
        let app = build(&h.ctx);
        let req = http::Request::builder()
            .method("POST")
            .uri("/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["error"], "invalid_json");
    }

    #[tokio::test]
    async fn logout_clears_the_session() {
        let h = harness();
        let app = build(&h.ctx);
        let cookie = login_as(&app, "reader@example.com").await;
        let resp = app
            .clone()
            .oneshot(json_request("POST", "/auth/logout", serde_json::json!({}), Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        let cleared = resp.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cleared.contains("Max-Age=0"));

        let me = app.oneshot(get("/auth/me", Some(&cookie))).await.unwrap();
        assert_eq!(me.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_paths_fall_through_to_not_found() {
        let h = harness();
        let app = build(&h.ctx);
        let resp = app.oneshot(get("/nope", None)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(resp).await["error"], "not_found");
    }

    struct Maintenance;

    #[async_trait]
    impl Stage for Maintenance {
        fn name(&self) -> &'static str {
            "maintenance"
        }

        async fn before(&self, _req: &mut Request, _meta: &mut RequestMeta) -> Flow {
            Flow::Respond((StatusCode::SERVICE_UNAVAILABLE, "down for maintenance").into_response())
        }
    }

    #[tokio::test]
    async fn a_stage_can_answer_without_the_router() {
        let h = harness();
        let app = build_with(&h.ctx, Pipeline::new().stage(Maintenance), groups(&h.ctx));
        let resp = app.oneshot(get("/", None)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn standard_pipeline_order() {
        let h = harness();
        assert_eq!(
            Pipeline::standard(&h.ctx).names(),
            vec!["body_parser", "request_logger", "cors", "session", "access_log"]
        );
    }
}
