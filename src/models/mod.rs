pub mod audit_log;
pub mod contract;
pub mod docket;
pub mod user;
pub mod work_permit;
