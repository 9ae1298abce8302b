use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::user::User;
use crate::models::work_permit::WorkPermitStatus;
use crate::services::progress_service::DocketProgress;
use crate::services::status_service::{ContractStatus, LabelledStatus};

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserPayload {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 200))]
    pub display_name: String,
    #[validate(length(min = 8, max = 256))]
    pub password: Option<String>,
}

/// One row of the admin users table.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOverview {
    pub user: User,
    pub docket_progress: DocketProgress,
    pub docket_status: LabelledStatus,
    pub contract_status: ContractStatus,
    pub work_permit_status: Option<WorkPermitStatus>,
}
