// src/routes/mod.rs
pub mod chat;

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use crate::services::rate_limiter::RateDecision;
use crate::state::SharedState;
use axum::{
    Router,
    extract::{ConnectInfo, DefaultBodyLimit, Request, State},
    http::{HeaderName, HeaderValue, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chat::chat_handler;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

pub const RATE_LIMIT_MESSAGE: &str =
    "Too many requests from this IP, please try again after 15 minutes.";

/// Room for the text field and multipart framing on top of the file cap.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

const X_RATELIMIT_LIMIT: &str = "x-ratelimit-limit";
const X_RATELIMIT_REMAINING: &str = "x-ratelimit-remaining";

const SECURITY_HEADERS: &[(&str, &str)] = &[
    (
        "content-security-policy",
        "default-src 'self';base-uri 'self';font-src 'self' https: data:;form-action 'self';\
         frame-ancestors 'self';img-src 'self' data:;object-src 'none';script-src 'self';\
         script-src-attr 'none';style-src 'self' https: 'unsafe-inline'",
    ),
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "same-origin"),
    ("origin-agent-cluster", "?1"),
    ("referrer-policy", "no-referrer"),
    ("strict-transport-security", "max-age=15552000; includeSubDomains"),
    ("x-content-type-options", "nosniff"),
    ("x-dns-prefetch-control", "off"),
    ("x-download-options", "noopen"),
    ("x-frame-options", "SAMEORIGIN"),
    ("x-permitted-cross-domain-policies", "none"),
    ("x-xss-protection", "0"),
];

pub fn create_router(state: SharedState) -> Router {
    let body_limit = state.uploads.max_bytes() + MULTIPART_OVERHEAD;

    let api_routes = Router::new()
        .route("/chat", post(chat_handler))
        .layer(DefaultBodyLimit::max(body_limit));

    let router = Router::new()
        .nest("/api", api_routes)
        .route("/health", get(|| async { "OK" }))
        .fallback_service(ServeDir::new("public"))
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit_middleware))
        .with_state(state);

    with_security_headers(router)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn with_security_headers(router: Router) -> Router {
    SECURITY_HEADERS.iter().fold(router, |router, &(name, value)| {
        router.layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        ))
    })
}

async fn rate_limit_middleware(
    State(state): State<SharedState>,
    req: Request,
    next: Next,
) -> Response {
    let ip = client_ip(&req);

    match state.limiter.check(ip).await {
        RateDecision::Allowed { remaining } => {
            let mut response = next.run(req).await;
            let headers = response.headers_mut();
            headers.insert(
                HeaderName::from_static(X_RATELIMIT_LIMIT),
                HeaderValue::from(state.limiter.max_requests()),
            );
            headers.insert(
                HeaderName::from_static(X_RATELIMIT_REMAINING),
                HeaderValue::from(remaining),
            );
            response
        }
        RateDecision::Limited { retry_after } => {
            tracing::warn!(%ip, "rate limit exceeded");
            let seconds = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
            (
                StatusCode::TOO_MANY_REQUESTS,
                [(header::RETRY_AFTER, seconds.to_string())],
                RATE_LIMIT_MESSAGE,
            )
                .into_response()
        }
    }
}

// Requests that did not come through a socket (tests) share one bucket.
fn client_ip(req: &Request) -> IpAddr {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}
