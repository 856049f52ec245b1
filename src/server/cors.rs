//! CORS policy applied ahead of routing

use axum::extract::Request;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_REQUEST_METHOD, AUTHORIZATION, CONTENT_TYPE,
};
use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Methods browsers may use cross-origin
pub const ALLOWED_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::OPTIONS,
];

/// `X-Requested-With`, which `http` has no constant for
const X_REQUESTED_WITH: HeaderName = HeaderName::from_static("x-requested-with");

/// Build the CORS layer for an exact list of origins
pub fn cors_layer(allowed_origins: &[String]) -> anyhow::Result<CorsLayer> {
    let origins = allowed_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|e| anyhow::anyhow!("invalid CORS origin {:?}: {}", origin, e))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(ALLOWED_METHODS)
        .allow_headers([CONTENT_TYPE, AUTHORIZATION, X_REQUESTED_WITH])
        .allow_credentials(true))
}

/// Finish what the CORS layer leaves open: preflights answer 204, and
/// responses to origins outside the list carry no `access-control-*` headers.
///
/// Must sit outside the [`CorsLayer`].
pub async fn finalize_cors_response(request: Request, next: Next) -> Response {
    let is_preflight = request.method() == Method::OPTIONS
        && request.headers().contains_key(ACCESS_CONTROL_REQUEST_METHOD);

    let mut response = next.run(request).await;

    if !response.headers().contains_key(ACCESS_CONTROL_ALLOW_ORIGIN) {
        let cors_headers: Vec<HeaderName> = response
            .headers()
            .keys()
            .filter(|name| name.as_str().starts_with("access-control-"))
            .cloned()
            .collect();
        for name in cors_headers {
            response.headers_mut().remove(name);
        }
    }

    if is_preflight && response.status() == StatusCode::OK {
        *response.status_mut() = StatusCode::NO_CONTENT;
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::header::ORIGIN;
    use axum::http::Request;
    use axum::routing::{get, post};
    use axum::{middleware, Router};
    use tower::ServiceExt;

    fn app() -> Router {
        let origins = vec![
            "https://localhost:3000".to_string(),
            "http://localhost:3000".to_string(),
        ];
        Router::new()
            .route("/", get(|| async { "ok" }))
            .route("/translate", post(|| async { "ok" }))
            .layer(cors_layer(&origins).unwrap())
            .layer(middleware::from_fn(finalize_cors_response))
    }

    fn preflight(origin: &str) -> Request<Body> {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/translate")
            .header(ORIGIN, origin)
            .header(ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header("access-control-request-headers", "Content-Type")
            .body(Body::empty())
            .unwrap()
    }

    fn header<'a>(response: &'a Response, name: &str) -> Option<&'a str> {
        response.headers().get(name).and_then(|v| v.to_str().ok())
    }

    #[tokio::test]
    async fn test_preflight_from_allowed_origin() {
        let response = app()
            .oneshot(preflight("https://localhost:3000"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            header(&response, "access-control-allow-origin"),
            Some("https://localhost:3000")
        );
        assert!(header(&response, "access-control-allow-methods")
            .unwrap()
            .contains("POST"));
        assert!(header(&response, "access-control-allow-headers")
            .unwrap()
            .to_ascii_lowercase()
            .contains("content-type"));
        assert_eq!(
            header(&response, "access-control-allow-credentials"),
            Some("true")
        );
    }

    #[tokio::test]
    async fn test_preflight_from_unknown_origin_has_no_cors_headers() {
        let response = app()
            .oneshot(preflight("https://evil.example"))
            .await
            .unwrap();

        assert!(response.status().is_success());
        assert!(response
            .headers()
            .keys()
            .all(|name| !name.as_str().starts_with("access-control-")));
    }

    #[tokio::test]
    async fn test_actual_request_echoes_origin() {
        let request = Request::builder()
            .uri("/")
            .header(ORIGIN, "http://localhost:3000")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            header(&response, "access-control-allow-origin"),
            Some("http://localhost:3000")
        );
    }

    #[test]
    fn test_invalid_origin_is_rejected() {
        assert!(cors_layer(&["bad\norigin".to_string()]).is_err());
    }
}
