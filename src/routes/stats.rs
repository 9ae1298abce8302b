use axum::{
    extract::State,
    response::{IntoResponse, Json},
};

use crate::{
    error::Result,
    services::stats_service::summarize,
    utils::time::now,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/admin/stats",
    responses(
        (status = 200, description = "Dashboard counters", body = Json<AdminStats>)
    )
)]
#[axum::debug_handler]
pub async fn get_stats(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let (counts, eligible) = state
        .stats_service
        .user_counts(state.archive_service.policy(), now())
        .await?;
    let dockets = state.docket_service.list_active().await?;
    let contracts = state.contract_service.list_active().await?;
    let permits = state.work_permit_service.list_active().await?;

    Ok(Json(summarize(counts, eligible, &dockets, &contracts, &permits)))
}
