use crate::error::{Error, Result};
use crate::models::contract::{Contract, ContractDocument, ContractRow, DocumentStatus};
use crate::services::audit_service;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

const CONTRACT_COLUMNS: &str = "user_id, company_contract_original_url, company_contract_signed_url, company_contract_status, company_contract_signature_valid, job_offer_original_url, job_offer_signed_url, job_offer_status, job_offer_signature_valid, updated_at";

#[derive(Clone)]
pub struct ContractService {
    pool: PgPool,
}

impl ContractService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, user_id: Uuid) -> Result<Option<Contract>> {
        let row = sqlx::query_as::<_, ContractRow>(&format!(
            "SELECT {} FROM contracts WHERE user_id = $1",
            CONTRACT_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Contract::from))
    }

    pub async fn list_active(&self) -> Result<Vec<Contract>> {
        let rows = sqlx::query_as::<_, ContractRow>(&format!(
            r#"
            SELECT {}
            FROM contracts
            WHERE user_id IN (SELECT id FROM users WHERE archived = FALSE)
            "#,
            CONTRACT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Contract::from).collect())
    }

    /// Admin upload of the document the candidate has to sign. A fresh
    /// original resets the part to `pending` and clears any earlier signature.
    pub async fn set_original(
        &self,
        actor_id: Uuid,
        user_id: Uuid,
        document: ContractDocument,
        url: &str,
    ) -> Result<Contract> {
        let p = document.column_prefix();
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query_as::<_, ContractRow>(&format!(
            r#"
            INSERT INTO contracts (user_id, {p}_original_url, {p}_status)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE SET
                {p}_original_url = EXCLUDED.{p}_original_url,
                {p}_signed_url = NULL,
                {p}_status = EXCLUDED.{p}_status,
                {p}_signature_valid = NULL,
                updated_at = NOW()
            RETURNING {columns}
            "#,
            p = p,
            columns = CONTRACT_COLUMNS,
        ))
        .bind(user_id)
        .bind(url)
        .bind(DocumentStatus::Pending)
        .fetch_one(&mut *tx)
        .await?;

        audit_service::record(
            &mut *tx,
            Some(actor_id),
            "contract.original_uploaded",
            "user",
            user_id,
            Some(json!({ "document": document, "url": url })),
        )
        .await?;
        tx.commit().await?;

        Ok(row.into())
    }

    /// Candidate upload of signed copies. All parts land together or none
    /// does; every part needs an uploaded original. The signature itself is
    /// not checked here, `signatureValid` stays null until an admin reviews it.
    pub async fn sign(&self, user_id: Uuid, signed: &[(ContractDocument, String)]) -> Result<Contract> {
        let mut tx = self.pool.begin().await?;
        let current: Contract = sqlx::query_as::<_, ContractRow>(&format!(
            "SELECT {} FROM contracts WHERE user_id = $1 FOR UPDATE",
            CONTRACT_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| Error::NotFound("Contract not found".into()))?
        .into();
        ensure_signable(&current, signed.iter().map(|(doc, _)| *doc))?;

        let mut contract = current;
        for (document, url) in signed {
            let p = document.column_prefix();
            let row = sqlx::query_as::<_, ContractRow>(&format!(
                r#"
                UPDATE contracts SET
                    {p}_signed_url = $2,
                    {p}_status = $3,
                    {p}_signature_valid = NULL,
                    updated_at = NOW()
                WHERE user_id = $1
                RETURNING {columns}
                "#,
                p = p,
                columns = CONTRACT_COLUMNS,
            ))
            .bind(user_id)
            .bind(url)
            .bind(DocumentStatus::Signed)
            .fetch_one(&mut *tx)
            .await?;
            contract = row.into();
        }
        tx.commit().await?;

        tracing::info!(user_id = %user_id, parts = signed.len(), "signed contract uploaded");
        Ok(contract)
    }

    /// Admin verdict on a signed copy.
    pub async fn review(
        &self,
        actor_id: Uuid,
        user_id: Uuid,
        document: ContractDocument,
        status: DocumentStatus,
        signature_valid: Option<bool>,
    ) -> Result<Contract> {
        if !matches!(status, DocumentStatus::Signed | DocumentStatus::Rejected) {
            return Err(Error::BadRequest(
                "Review status must be either signed or rejected".into(),
            ));
        }
        let contract = self
            .get(user_id)
            .await?
            .ok_or_else(|| Error::NotFound("Contract not found".into()))?;
        if !contract.part(document).is_signed() {
            return Err(Error::BadRequest("Nothing has been signed yet".into()));
        }

        let p = document.column_prefix();
        // A rejected copy is discarded so the candidate has to sign again.
        let signed_url = if status == DocumentStatus::Rejected {
            "NULL".to_string()
        } else {
            format!("{p}_signed_url")
        };
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query_as::<_, ContractRow>(&format!(
            r#"
            UPDATE contracts SET
                {p}_signed_url = {signed_url},
                {p}_status = $2,
                {p}_signature_valid = $3,
                updated_at = NOW()
            WHERE user_id = $1
            RETURNING {columns}
            "#,
            p = p,
            signed_url = signed_url,
            columns = CONTRACT_COLUMNS,
        ))
        .bind(user_id)
        .bind(status)
        .bind(signature_valid)
        .fetch_one(&mut *tx)
        .await?;

        audit_service::record(
            &mut *tx,
            Some(actor_id),
            "contract.reviewed",
            "user",
            user_id,
            Some(json!({
                "document": document,
                "status": status,
                "signatureValid": signature_valid,
            })),
        )
        .await?;
        tx.commit().await?;

        Ok(row.into())
    }
}

/// Every document about to be signed must already have its original.
pub fn ensure_signable(
    contract: &Contract,
    documents: impl IntoIterator<Item = ContractDocument>,
) -> Result<()> {
    for document in documents {
        if contract.part(document).original_url.is_none() {
            return Err(Error::BadRequest(format!(
                "There is no {} to sign yet; wait for the original to be uploaded",
                document.column_prefix().replace('_', " ")
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::contract::ContractPart;

    #[test]
    fn signing_needs_an_original_for_every_part() {
        let contract = Contract {
            company_contract: ContractPart {
                original_url: Some("/uploads/contracts/company.pdf".into()),
                ..ContractPart::default()
            },
            ..Contract::default()
        };
        assert!(ensure_signable(&contract, [ContractDocument::CompanyContract]).is_ok());
        assert!(matches!(
            ensure_signable(
                &contract,
                [ContractDocument::CompanyContract, ContractDocument::JobOffer]
            ),
            Err(Error::BadRequest(_))
        ));
        assert!(ensure_signable(&contract, std::iter::empty()).is_ok());
    }
}
