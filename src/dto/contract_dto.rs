use serde::{Deserialize, Serialize};

use crate::models::contract::{Contract, DocumentStatus};
use crate::services::status_service::{ContractStatus, StatusService, Tone};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractResponse {
    pub contract: Option<Contract>,
    pub status: ContractStatus,
    pub tone: Tone,
}

impl From<Option<Contract>> for ContractResponse {
    fn from(contract: Option<Contract>) -> Self {
        let status = StatusService::contract_status(contract.as_ref());
        Self {
            contract,
            status,
            tone: status.tone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewContractPayload {
    pub status: DocumentStatus,
    pub signature_valid: Option<bool>,
}
