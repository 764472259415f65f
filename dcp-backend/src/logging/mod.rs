// src/logging/mod.rs

use axum::{
    body::Body,
    http::{HeaderValue, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use uuid::Uuid;

#[macro_export]
macro_rules! log_with_context {
    ($level:expr, $msg:expr $(, $($key:expr => $value:expr),* $(,)?)?) => {
        match $level {
            tracing::Level::ERROR => {
                tracing::error!(
                    message = $msg
                    $(, $($key = ?$value,)*)?
                );
            }
            tracing::Level::WARN => {
                tracing::warn!(
                    message = $msg
                    $(, $($key = ?$value,)*)?
                );
            }
            tracing::Level::INFO => {
                tracing::info!(
                    message = $msg
                    $(, $($key = ?$value,)*)?
                );
            }
            tracing::Level::DEBUG => {
                tracing::debug!(
                    message = $msg
                    $(, $($key = ?$value,)*)?
                );
            }
            _ => {}
        }
    };
}

/// tracing-subscriber の初期化（RUST_LOG が未設定ならデフォルトフィルタ）
pub fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let _ = tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dcp_backend=info,tower_http=info".into()),
        )
        .with(fmt::layer())
        .try_init();
}

/// リクエストIDヘッダー（受信時に存在すれば引き継ぐ）
pub const REQUEST_ID_HEADER: &str = "x-request-id";

tokio::task_local! {
    static CURRENT_REQUEST_ID: String;
}

/// 処理中リクエストのID（ミドルウェア外では None）
pub fn current_request_id() -> Option<String> {
    CURRENT_REQUEST_ID.try_with(Clone::clone).ok()
}

// 監視用パスは DEBUG でのみ記録する
const QUIET_PATHS: &[&str] = &["/health"];

#[derive(Clone, Debug)]
pub struct RequestContext {
    pub request_id: String,
    pub path: String,
    pub method: String,
}

impl RequestContext {
    fn from_request(req: &Request<Body>) -> Self {
        let request_id = req
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty() && value.len() <= 128)
            .map_or_else(|| Uuid::new_v4().to_string(), str::to_string);

        Self {
            request_id,
            path: req.uri().path().to_string(),
            method: req.method().to_string(),
        }
    }

    fn is_quiet(&self) -> bool {
        QUIET_PATHS.contains(&self.path.as_str())
    }
}

fn completion_level(status: StatusCode, quiet: bool) -> tracing::Level {
    if status.is_server_error() {
        tracing::Level::ERROR
    } else if status.is_client_error() {
        tracing::Level::WARN
    } else if quiet {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    }
}

pub async fn logging_middleware(req: Request<Body>, next: Next) -> Response {
    let Some(context) = req.extensions().get::<RequestContext>().cloned() else {
        return next.run(req).await;
    };
    let start = Instant::now();

    log_with_context!(
        tracing::Level::DEBUG,
        "Request started",
        "request_id" => &context.request_id,
        "method" => &context.method,
        "path" => &context.path,
    );

    let response = next.run(req).await;
    let status = response.status();

    log_with_context!(
        completion_level(status, context.is_quiet()),
        "Request completed",
        "request_id" => &context.request_id,
        "method" => &context.method,
        "path" => &context.path,
        "status" => status.as_u16(),
        "duration_ms" => start.elapsed().as_millis(),
    );

    response
}

/// リクエストIDを付与し、レスポンスヘッダーにも返す
pub async fn inject_request_context(mut req: Request<Body>, next: Next) -> Response {
    let context = RequestContext::from_request(&req);
    let request_id = context.request_id.clone();
    let header_value = HeaderValue::from_str(&request_id).ok();

    req.extensions_mut().insert(context);
    let mut response = CURRENT_REQUEST_ID.scope(request_id, next.run(req)).await;

    if let Some(value) = header_value {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_is_propagated_from_header() {
        let req = Request::builder()
            .uri("/api/public/stats")
            .header(REQUEST_ID_HEADER, "abc-123")
            .body(Body::empty())
            .unwrap();
        let context = RequestContext::from_request(&req);
        assert_eq!(context.request_id, "abc-123");
        assert_eq!(context.method, "GET");
        assert!(!context.is_quiet());
    }

    #[test]
    fn test_request_id_generated_when_missing() {
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let context = RequestContext::from_request(&req);
        assert!(Uuid::parse_str(&context.request_id).is_ok());
        assert!(context.is_quiet());
    }

    #[tokio::test]
    async fn test_current_request_id_scope() {
        assert!(current_request_id().is_none());
        let id = CURRENT_REQUEST_ID
            .scope("req-1".to_string(), async { current_request_id() })
            .await;
        assert_eq!(id.as_deref(), Some("req-1"));
    }

    #[test]
    fn test_completion_level() {
        assert_eq!(
            completion_level(StatusCode::INTERNAL_SERVER_ERROR, false),
            tracing::Level::ERROR
        );
        assert_eq!(completion_level(StatusCode::NOT_FOUND, true), tracing::Level::WARN);
        assert_eq!(completion_level(StatusCode::OK, true), tracing::Level::DEBUG);
        assert_eq!(completion_level(StatusCode::OK, false), tracing::Level::INFO);
    }
}
