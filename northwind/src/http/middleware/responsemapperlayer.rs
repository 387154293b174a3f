pub async fn response_mapper_layer(
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let response = next.run(request).await;
    match response.status() {
        s if s == axum::http::StatusCode::UNPROCESSABLE_ENTITY
            || s == axum::http::StatusCode::UNSUPPORTED_MEDIA_TYPE =>
        {
            let (mut parts, body) = response.into_parts();
            let body = match axum::body::to_bytes(body, usize::MAX).await {
                Ok(body) => body,
                Err(_) => {
                    return axum::response::Response::from_parts(
                        parts,
                        axum::body::Body::empty(),
                    );
                }
            };
            let new_body = serde_json::json!({
                "message": String::from_utf8_lossy(&body).to_string(),
            })
            .to_string();
            parts.headers.insert(
                axum::http::header::CONTENT_TYPE,
                axum::http::HeaderValue::from_static("application/json"),
            );
            parts.headers.insert(
                axum::http::header::CONTENT_LENGTH,
                axum::http::HeaderValue::from(new_body.len()),
            );

            axum::response::Response::from_parts(
                parts,
                axum::body::Body::from(new_body),
            )
        }
        _ => response,
    }
}
