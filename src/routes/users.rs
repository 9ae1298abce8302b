use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;

use crate::{
    dto::{
        admin_dto::{CreateUserPayload, UserOverview},
        archive_dto::ArchiveListQuery,
    },
    error::Result,
    models::user::{User, ROLE_CANDIDATE},
    services::{
        progress_service::{Checklist, ProgressService},
        status_service::StatusService,
        user_service::NewUser,
    },
    utils::validation::validate,
    AppState,
};

async fn overview(state: &AppState, user: User) -> Result<UserOverview> {
    let docket = state.docket_service.get(user.id).await?;
    let contract = state.contract_service.get(user.id).await?;
    let permit = state.work_permit_service.get(user.id).await?;

    let docket_progress = ProgressService::calculate(docket.as_ref(), Checklist::Standard);
    Ok(UserOverview {
        docket_status: StatusService::classify(docket_progress.percentage).into(),
        docket_progress,
        contract_status: StatusService::contract_status(contract.as_ref()),
        work_permit_status: permit.map(|p| p.status),
        user,
    })
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    params(
        ("archived" = Option<bool>, Query, description = "Filter by archive state")
    ),
    responses(
        (status = 200, description = "Candidates with their progress", body = [UserOverview])
    )
)]
#[axum::debug_handler]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ArchiveListQuery>,
) -> Result<impl IntoResponse> {
    let users = state.user_service.list_candidates(query.archived).await?;
    let mut items = Vec::with_capacity(users.len());
    for user in users {
        items.push(overview(&state, user).await?);
    }
    Ok(Json(items))
}

#[utoipa::path(
    post,
    path = "/api/admin/users",
    request_body = CreateUserPayload,
    responses(
        (status = 201, description = "Candidate created", body = Json<UserOverview>),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Email already registered")
    )
)]
#[axum::debug_handler]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserPayload>,
) -> Result<impl IntoResponse> {
    validate(&payload)?;
    let user = state
        .user_service
        .create_user(NewUser {
            email: payload.email,
            display_name: payload.display_name,
            password: payload.password,
            role: ROLE_CANDIDATE.to_string(),
        })
        .await?;
    let created = overview(&state, user).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/admin/users/{user_id}/history",
    params(
        ("user_id" = Uuid, Path, description = "Candidate ID")
    ),
    responses(
        (status = 200, description = "Audit trail, newest first"),
        (status = 404, description = "User not found")
    )
)]
#[axum::debug_handler]
pub async fn user_history(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.user_service.require_user(user_id).await?;
    let history = state.audit_service.list_for_entity("user", user_id).await?;
    Ok(Json(history))
}
