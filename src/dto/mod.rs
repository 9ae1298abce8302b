pub mod admin_dto;
pub mod archive_dto;
pub mod auth_dto;
pub mod contract_dto;
pub mod docket_dto;
pub mod work_permit_dto;
