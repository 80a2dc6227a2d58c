use axum::{
    body::Body,
    extract::Request,
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

const CONTENT_SECURITY_POLICY: &str = "default-src 'self';base-uri 'self';font-src 'self' https: data:;\
form-action 'self';frame-ancestors 'self';img-src 'self' data: https:;object-src 'none';\
script-src 'self';script-src-attr 'none';style-src 'self' https: 'unsafe-inline'";

pub async fn security_headers(req: Request, next: Next) -> Response {
    // Reject TRACE and TRACK (proxy disclosure)
    let method = req.method();
    if method == "TRACE" || method == "TRACK" {
        return (StatusCode::METHOD_NOT_ALLOWED, Body::empty()).into_response();
    }

    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        header::HeaderValue::from_static(CONTENT_SECURITY_POLICY),
    );

    headers.insert(
        header::HeaderName::from_static("cross-origin-opener-policy"),
        header::HeaderValue::from_static("same-origin"),
    );

    // Images are linked from the bucket, but API responses stay same-origin.
    headers.insert(
        header::HeaderName::from_static("cross-origin-resource-policy"),
        header::HeaderValue::from_static("same-origin"),
    );

    headers.insert(
        header::HeaderName::from_static("origin-agent-cluster"),
        header::HeaderValue::from_static("?1"),
    );

    headers.insert(
        header::REFERRER_POLICY,
        header::HeaderValue::from_static("no-referrer"),
    );

    // HSTS: 180 days, include subdomains
    headers.insert(
        header::STRICT_TRANSPORT_SECURITY,
        header::HeaderValue::from_static("max-age=15552000; includeSubDomains"),
    );

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        header::HeaderValue::from_static("nosniff"),
    );

    headers.insert(
        header::X_DNS_PREFETCH_CONTROL,
        header::HeaderValue::from_static("off"),
    );

    headers.insert(
        header::HeaderName::from_static("x-download-options"),
        header::HeaderValue::from_static("noopen"),
    );

    headers.insert(
        header::X_FRAME_OPTIONS,
        header::HeaderValue::from_static("SAMEORIGIN"),
    );

    headers.insert(
        header::HeaderName::from_static("x-permitted-cross-domain-policies"),
        header::HeaderValue::from_static("none"),
    );

    headers.insert(
        header::X_XSS_PROTECTION,
        header::HeaderValue::from_static("0"),
    );

    headers.remove(header::SERVER);
    headers.remove(header::HeaderName::from_static("x-powered-by"));

    response
}
