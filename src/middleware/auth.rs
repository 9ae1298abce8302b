use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::models::user::ROLE_ADMIN;
use crate::utils::token::{decode_session_token, token_from_cookie_header, Claims};

fn reject(status: StatusCode, code: &str) -> Response {
    (status, Json(json!({ "error": code }))).into_response()
}

/// Reads the session from the `session` cookie, falling back to a bearer
/// token for non-browser clients.
fn authenticate(req: &Request) -> Result<Claims, Response> {
    let headers = req.headers();
    let from_cookie = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(token_from_cookie_header);

    let token = match from_cookie {
        Some(token) => token,
        None => {
            let Some(auth_header) = headers.get(header::AUTHORIZATION) else {
                return Err(reject(StatusCode::UNAUTHORIZED, "missing_session"));
            };
            let Ok(auth_str) = auth_header.to_str() else {
                return Err(reject(StatusCode::UNAUTHORIZED, "bad_authorization"));
            };
            let Some(token) = auth_str.strip_prefix("Bearer ") else {
                return Err(reject(StatusCode::UNAUTHORIZED, "unsupported_scheme"));
            };
            token
        }
    };

    let config = crate::config::get_config();
    let claims = decode_session_token(token, &config.jwt_secret)
        .map_err(|_| reject(StatusCode::UNAUTHORIZED, "invalid_session"))?;
    if claims.user_id().is_none() {
        return Err(reject(StatusCode::UNAUTHORIZED, "invalid_session"));
    }
    Ok(claims)
}

pub async fn require_session(mut req: Request, next: Next) -> Response {
    match authenticate(&req) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(resp) => resp,
    }
}

pub async fn require_admin(mut req: Request, next: Next) -> Response {
    match authenticate(&req) {
        Ok(claims) => {
            if !claims.has_role(ROLE_ADMIN) {
                return reject(StatusCode::FORBIDDEN, "forbidden");
            }
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(resp) => resp,
    }
}
