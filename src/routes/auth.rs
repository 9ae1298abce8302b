use axum::{
    extract::{Extension, State},
    http::header,
    response::{IntoResponse, Json},
};
use serde_json::json;

use crate::{
    config::get_config,
    dto::auth_dto::{LoginPayload, SessionResponse},
    error::{Error, Result},
    routes::session_user,
    utils::{
        crypto::verify_password,
        token::{expired_session_cookie, issue_session_token, session_cookie, Claims},
        validation::validate,
    },
    AppState,
};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Session started, cookie set", body = Json<SessionResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Wrong credentials or archived account")
    )
)]
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse> {
    validate(&payload)?;

    let user = state
        .user_service
        .get_by_email(&payload.email)
        .await?
        .ok_or_else(|| Error::Unauthorized(INVALID_CREDENTIALS.into()))?;
    if !verify_password(&payload.password, user.password_hash.as_deref())? {
        tracing::info!(user_id = %user.id, "login rejected");
        return Err(Error::Unauthorized(INVALID_CREDENTIALS.into()));
    }
    if user.archived {
        return Err(Error::Unauthorized("This account has been archived".into()));
    }

    let config = get_config();
    let ttl = chrono::Duration::hours(config.session_ttl_hours);
    let token = issue_session_token(user.id, &user.role, &config.jwt_secret, ttl)?;
    let cookie = session_cookie(&token, ttl.num_seconds());

    tracing::info!(user_id = %user.id, role = %user.role, "session started");
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(SessionResponse {
            user,
            token: Some(token),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Session cookie cleared")
    )
)]
pub async fn logout() -> impl IntoResponse {
    (
        [(header::SET_COOKIE, expired_session_cookie())],
        Json(json!({ "success": true })),
    )
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = Json<SessionResponse>),
        (status = 401, description = "No valid session")
    )
)]
#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let user = state.user_service.require_user(session_user(&claims)?).await?;
    if user.archived {
        return Err(Error::Unauthorized("This account has been archived".into()));
    }
    Ok(Json(SessionResponse { user, token: None }))
}

#[utoipa::path(
    get,
    path = "/api/admin/me",
    responses(
        (status = 200, description = "Current admin", body = Json<SessionResponse>),
        (status = 401, description = "No valid session"),
        (status = 403, description = "Not an admin")
    )
)]
#[axum::debug_handler]
pub async fn admin_me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let user = state.user_service.require_user(session_user(&claims)?).await?;
    // The role in the token may be stale if the account was changed since.
    if !user.is_admin() {
        return Err(Error::Forbidden("Admin access required".into()));
    }
    Ok(Json(SessionResponse { user, token: None }))
}
