use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::database::users;
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated identity resolved from a bearer token, injected into the
/// request extensions. The sole input handlers use for authorization
/// decisions; handlers never re-decode tokens.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub is_admin: bool,
}

impl AuthUser {
    /// Gate for admin-only endpoints.
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin {
            Ok(())
        } else {
            Err(ApiError::forbidden(
                "Not enough permissions. Admin access required.",
            ))
        }
    }
}

/// Bearer-token authentication middleware.
///
/// Validates the token and re-resolves its subject against the users table,
/// so a signed token whose user has since been deleted is rejected here
/// rather than honored until expiry.
pub async fn jwt_auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&headers).map_err(ApiError::unauthorized)?;

    let claims = state
        .tokens
        .validate(&token)
        .map_err(|e| ApiError::unauthorized(e.to_string()))?;

    let user = users::find_by_username(&state.pool, &claims.sub)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Could not validate credentials"))?;

    request.extensions_mut().insert(AuthUser {
        id: user.id,
        username: user.username,
        is_admin: user.is_admin,
    });

    Ok(next.run(request).await)
}

/// Extract the token from an `Authorization: Bearer <token>` header.
fn extract_bearer_token(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty bearer token".to_string());
        }
        Ok(token.to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        let headers = headers_with("Bearer abc.def.ghi");
        assert_eq!(extract_bearer_token(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn missing_header_is_rejected() {
        assert!(extract_bearer_token(&HeaderMap::new()).is_err());
    }

    #[test]
    fn non_bearer_scheme_is_rejected() {
        let headers = headers_with("Basic dXNlcjpwYXNz");
        assert!(extract_bearer_token(&headers).is_err());
    }

    #[test]
    fn empty_token_is_rejected() {
        let headers = headers_with("Bearer   ");
        assert!(extract_bearer_token(&headers).is_err());
    }

    #[test]
    fn require_admin_gates_on_role() {
        let admin = AuthUser {
            id: Uuid::new_v4(),
            username: "root".to_string(),
            is_admin: true,
        };
        let regular = AuthUser {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            is_admin: false,
        };
        assert!(admin.require_admin().is_ok());
        assert!(regular.require_admin().is_err());
    }
}
