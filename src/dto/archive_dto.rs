use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::services::archive_service::EligibleUser;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ArchivePayload {
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ArchiveListQuery {
    pub archived: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibleUsersResponse {
    pub archive_after_days: i64,
    pub users: Vec<EligibleUser>,
}
