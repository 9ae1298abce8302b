pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    archive_service::{ArchivePolicy, ArchiveService},
    audit_service::AuditService,
    contract_service::ContractService,
    docket_service::DocketService,
    stats_service::StatsService,
    storage_service::StorageService,
    user_service::UserService,
    work_permit_service::WorkPermitService,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub user_service: UserService,
    pub docket_service: DocketService,
    pub contract_service: ContractService,
    pub work_permit_service: WorkPermitService,
    pub archive_service: ArchiveService,
    pub audit_service: AuditService,
    pub stats_service: StatsService,
    pub storage_service: StorageService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();

        let user_service = UserService::new(pool.clone());
        let docket_service = DocketService::new(pool.clone());
        let contract_service = ContractService::new(pool.clone());
        let work_permit_service =
            WorkPermitService::new(pool.clone(), config.final_docket_auto_approve);
        let archive_service = ArchiveService::new(
            pool.clone(),
            ArchivePolicy::after_days(config.archive_after_days),
        );
        let audit_service = AuditService::new(pool.clone());
        let stats_service = StatsService::new(pool.clone());
        let storage_service =
            StorageService::new(config.uploads_dir.clone(), config.max_upload_bytes());

        Self {
            pool,
            user_service,
            docket_service,
            contract_service,
            work_permit_service,
            archive_service,
            audit_service,
            stats_service,
            storage_service,
        }
    }
}
