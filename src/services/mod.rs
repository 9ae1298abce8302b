pub mod archive_service;
pub mod audit_service;
pub mod contract_service;
pub mod docket_service;
pub mod progress_service;
pub mod stats_service;
pub mod status_service;
pub mod storage_service;
pub mod user_service;
pub mod work_permit_service;
