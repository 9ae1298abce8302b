use crate::error::Result;
use crate::models::contract::Contract;
use crate::models::docket::Docket;
use crate::models::work_permit::{WorkPermit, WorkPermitStatus};
use crate::services::archive_service::ArchivePolicy;
use crate::services::progress_service::{Checklist, ProgressService};
use crate::services::status_service::{ContractStatus, StatusLabel, StatusService};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_users: i64,
    pub active_users: i64,
    pub archived_users: i64,
    pub eligible_for_archive: i64,
    pub dockets: BTreeMap<&'static str, i64>,
    pub average_docket_percentage: f64,
    pub contracts: BTreeMap<&'static str, i64>,
    pub work_permits: BTreeMap<&'static str, i64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct UserCounts {
    pub total: i64,
    pub active: i64,
    pub archived: i64,
}

#[derive(Clone)]
pub struct StatsService {
    pool: PgPool,
}

impl StatsService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn user_counts(&self, policy: ArchivePolicy, now: DateTime<Utc>) -> Result<(UserCounts, i64)> {
        let counts = sqlx::query_as::<_, UserCounts>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE archived = FALSE) AS active,
                COUNT(*) FILTER (WHERE archived = TRUE) AS archived
            FROM users
            WHERE role = 'candidate'
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let cutoff = now - policy.after;
        let (eligible,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM users WHERE role = 'candidate' AND archived = FALSE AND created_at <= $1",
        )
        .bind(cutoff)
        .fetch_one(&self.pool)
        .await?;

        Ok((counts, eligible))
    }
}

/// Folds the per-candidate records of active users into dashboard counters.
pub fn summarize(
    counts: UserCounts,
    eligible_for_archive: i64,
    dockets: &[Docket],
    contracts: &[Contract],
    permits: &[WorkPermit],
) -> AdminStats {
    let mut docket_buckets: BTreeMap<&'static str, i64> = [
        StatusLabel::Complete,
        StatusLabel::NearlyDone,
        StatusLabel::InProgress,
        StatusLabel::Started,
        StatusLabel::NotStarted,
    ]
    .into_iter()
    .map(|l| (l.as_str(), 0))
    .collect();

    let mut percentage_sum = 0.0;
    for docket in dockets {
        let progress = ProgressService::calculate(Some(docket), Checklist::Standard);
        percentage_sum += progress.percentage;
        *docket_buckets
            .entry(StatusService::classify(progress.percentage).as_str())
            .or_default() += 1;
    }

    let mut contract_buckets: BTreeMap<&'static str, i64> = [
        ContractStatus::Completed,
        ContractStatus::InProgress,
        ContractStatus::Pending,
    ]
    .into_iter()
    .map(|s| (s.as_str(), 0))
    .collect();
    for contract in contracts {
        *contract_buckets
            .entry(StatusService::contract_status(Some(contract)).as_str())
            .or_default() += 1;
    }

    let mut permit_buckets: BTreeMap<&'static str, i64> =
        WorkPermitStatus::ALL.into_iter().map(|s| (s.as_str(), 0)).collect();
    for permit in permits {
        *permit_buckets.entry(permit.status.as_str()).or_default() += 1;
    }

    let average_docket_percentage = if dockets.is_empty() {
        0.0
    } else {
        percentage_sum / dockets.len() as f64
    };

    AdminStats {
        total_users: counts.total,
        active_users: counts.active,
        archived_users: counts.archived,
        eligible_for_archive,
        dockets: docket_buckets,
        average_docket_percentage,
        contracts: contract_buckets,
        work_permits: permit_buckets,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::contract::ContractPart;

    #[test]
    fn summary_buckets_every_record_once() {
        let dockets = vec![
            Docket::default(),
            Docket {
                passport_front_url: Some("/uploads/docket/front.pdf".into()),
                resume_url: Some("/uploads/docket/cv.pdf".into()),
                ..Docket::default()
            },
        ];
        let contracts = vec![Contract {
            company_contract: ContractPart {
                signed_url: Some("/uploads/contracts/signed.pdf".into()),
                ..ContractPart::default()
            },
            ..Contract::default()
        }];
        let permits = vec![
            WorkPermit::default(),
            WorkPermit {
                status: WorkPermitStatus::Applied,
                ..WorkPermit::default()
            },
        ];

        let stats = summarize(
            UserCounts {
                total: 3,
                active: 2,
                archived: 1,
            },
            1,
            &dockets,
            &contracts,
            &permits,
        );

        assert_eq!(stats.dockets["Not Started"], 1);
        assert_eq!(stats.dockets["Started"], 1);
        assert_eq!(stats.dockets["Complete"], 0);
        assert_eq!(stats.contracts["In Progress"], 1);
        assert_eq!(stats.work_permits["preparation"], 1);
        assert_eq!(stats.work_permits["applied"], 1);
        assert_eq!(stats.work_permits["approved"], 0);
        assert!((stats.average_docket_percentage - 100.0 / 9.0).abs() < 1e-9);
        assert_eq!(stats.eligible_for_archive, 1);
    }
}
