use axum::http::HeaderValue;
use axum::{extract::Request, middleware::Next, response::Response};

/// Response headers for an API that serves client personal data.
///
/// Inspection payloads carry names, documents and phone numbers, so nothing is
/// cached by browsers or intermediaries.
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    headers.insert(
        "X-Content-Type-Options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert("Referrer-Policy", HeaderValue::from_static("no-referrer"));
    headers.insert("Cache-Control", HeaderValue::from_static("no-store"));

    response
}
