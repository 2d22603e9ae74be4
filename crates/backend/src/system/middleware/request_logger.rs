use axum::body::to_bytes;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;

use crate::shared::format::format_number;

/// ANSI colour of the timestamp: cyan for success, yellow for client errors, red otherwise
fn status_color(status: StatusCode) -> &'static str {
    if status.is_success() {
        "36"
    } else if status.is_client_error() {
        "33"
    } else {
        "31"
    }
}

/// Middleware для логирования HTTP запросов
///
/// Prints one line per request to stdout: UTC time, duration, response size,
/// status, method and path.
pub async fn request_logger(req: Request<Body>, next: Next) -> Response {
    let start = std::time::Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();

    let response = next.run(req).await;
    let (parts, body) = response.into_parts();

    // Читаем тело ответа, чтобы узнать реальный размер
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(b) => b,
        Err(e) => {
            tracing::error!("Failed to read response body for {} {}: {}", method, uri.path(), e);
            println!(
                "\x1b[31m{}\x1b[0m | {:>5}ms | {:>12} | {} {:>6} {}",
                Utc::now().format("%H:%M:%S"),
                start.elapsed().as_millis(),
                "error",
                parts.status.as_u16(),
                method,
                uri.path()
            );
            return Response::from_parts(parts, Body::default());
        }
    };

    println!(
        "\x1b[{}m{}\x1b[0m | {:>5}ms | {:>12} | {} {:>6} {}",
        status_color(parts.status),
        Utc::now().format("%H:%M:%S"),
        start.elapsed().as_millis(),
        format_number(bytes.len()),
        parts.status.as_u16(),
        method,
        uri.path()
    );

    Response::from_parts(parts, Body::from(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_color() {
        assert_eq!(status_color(StatusCode::OK), "36");
        assert_eq!(status_color(StatusCode::UNPROCESSABLE_ENTITY), "33");
        assert_eq!(status_color(StatusCode::INTERNAL_SERVER_ERROR), "31");
    }
}
