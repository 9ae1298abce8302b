use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "document_status", rename_all = "snake_case")]
#[serde(rename_all = "kebab-case")]
pub enum DocumentStatus {
    NotStarted,
    Pending,
    Signed,
    Rejected,
}

/// The two documents every candidate signs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContractDocument {
    CompanyContract,
    JobOffer,
}

impl ContractDocument {
    /// Column prefix in the `contracts` table.
    pub fn column_prefix(self) -> &'static str {
        match self {
            ContractDocument::CompanyContract => "company_contract",
            ContractDocument::JobOffer => "job_offer",
        }
    }

    /// Multipart field a candidate uses for the signed copy.
    pub fn signed_field(self) -> &'static str {
        match self {
            ContractDocument::CompanyContract => "signedContract",
            ContractDocument::JobOffer => "signedJobOffer",
        }
    }
}

impl std::str::FromStr for ContractDocument {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "companyContract" | "company-contract" | "company_contract" => {
                Ok(ContractDocument::CompanyContract)
            }
            "jobOffer" | "job-offer" | "job_offer" => Ok(ContractDocument::JobOffer),
            other => Err(format!("Unknown contract document: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractPart {
    pub original_url: Option<String>,
    pub signed_url: Option<String>,
    pub status: DocumentStatus,
    pub signature_valid: Option<bool>,
}

impl Default for ContractPart {
    fn default() -> Self {
        Self {
            original_url: None,
            signed_url: None,
            status: DocumentStatus::NotStarted,
            signature_valid: None,
        }
    }
}

impl ContractPart {
    pub fn is_signed(&self) -> bool {
        self.signed_url.as_deref().is_some_and(|u| !u.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub user_id: Uuid,
    pub company_contract: ContractPart,
    pub job_offer: ContractPart,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Contract {
    pub fn part(&self, document: ContractDocument) -> &ContractPart {
        match document {
            ContractDocument::CompanyContract => &self.company_contract,
            ContractDocument::JobOffer => &self.job_offer,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ContractRow {
    pub user_id: Uuid,
    pub company_contract_original_url: Option<String>,
    pub company_contract_signed_url: Option<String>,
    pub company_contract_status: DocumentStatus,
    pub company_contract_signature_valid: Option<bool>,
    pub job_offer_original_url: Option<String>,
    pub job_offer_signed_url: Option<String>,
    pub job_offer_status: DocumentStatus,
    pub job_offer_signature_valid: Option<bool>,
    pub updated_at: DateTime<Utc>,
}

impl From<ContractRow> for Contract {
    fn from(row: ContractRow) -> Self {
        Self {
            user_id: row.user_id,
            company_contract: ContractPart {
                original_url: row.company_contract_original_url,
                signed_url: row.company_contract_signed_url,
                status: row.company_contract_status,
                signature_valid: row.company_contract_signature_valid,
            },
            job_offer: ContractPart {
                original_url: row.job_offer_original_url,
                signed_url: row.job_offer_signed_url,
                status: row.job_offer_status,
                signature_valid: row.job_offer_signature_valid,
            },
            updated_at: Some(row.updated_at),
        }
    }
}
