use axum::{body::Body, extract::Request, middleware::Next, response::Response};

use super::{jwt, revocation};
use crate::shared::data::db::get_connection;
use crate::shared::error::AppError;

/// Bearer token from the `Authorization` header
pub fn bearer_token(req: &Request<Body>) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Middleware that requires a valid, unrevoked JWT
pub async fn require_auth(mut req: Request<Body>, next: Next) -> Result<Response, AppError> {
    let token = bearer_token(&req)
        .ok_or_else(|| AppError::Unauthorized("Authentication required".into()))?;

    let claims = jwt::validate_token(token).map_err(|e| {
        tracing::debug!("Rejected token: {:#}", e);
        AppError::Unauthorized("Invalid or expired token".into())
    })?;

    if revocation::is_revoked(get_connection(), &claims.jti).await? {
        return Err(AppError::Unauthorized("Token has been revoked".into()));
    }

    // Add claims to request extensions for use in handlers
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(auth: Option<&str>) -> Request<Body> {
        let mut builder = axum::http::Request::builder().uri("/policies");
        if let Some(value) = auth {
            builder = builder.header("Authorization", value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token(&request(Some("Bearer abc.def.ghi"))), Some("abc.def.ghi"));
        assert_eq!(bearer_token(&request(Some("Basic YWRtaW4="))), None);
        assert_eq!(bearer_token(&request(Some("Bearer "))), None);
        assert_eq!(bearer_token(&request(None)), None);
    }
}
