use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use std::env;
use std::sync::OnceLock;

/// Security header values for a pure-JSON API.
const NOSNIFF: &str = "nosniff";
const DENY: &str = "DENY";
const HSTS_VALUE: &str = "max-age=31536000; includeSubDomains";
const CSP_API_VALUE: &str = "default-src 'none'; frame-ancestors 'none'";
const REFERRER_POLICY_VALUE: &str = "strict-origin-when-cross-origin";

/// HSTS only makes sense behind TLS, so it is gated on production mode.
fn hsts_enabled() -> bool {
    static HSTS: OnceLock<bool> = OnceLock::new();
    *HSTS.get_or_init(|| {
        let is_production = env::var("RUST_ENV")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);
        if is_production {
            tracing::info!("Security: HSTS header enabled (production mode)");
        } else {
            tracing::info!("Security: HSTS header disabled (development mode)");
        }
        is_production
    })
}

/// Middleware stamping the standard security headers on every response.
pub async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert("x-content-type-options", HeaderValue::from_static(NOSNIFF));
    headers.insert("x-frame-options", HeaderValue::from_static(DENY));
    headers.insert(
        "content-security-policy",
        HeaderValue::from_static(CSP_API_VALUE),
    );
    headers.insert(
        "referrer-policy",
        HeaderValue::from_static(REFERRER_POLICY_VALUE),
    );
    if hsts_enabled() {
        headers.insert(
            "strict-transport-security",
            HeaderValue::from_static(HSTS_VALUE),
        );
    }

    response
}
