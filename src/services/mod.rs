pub mod file_service;
pub mod quota;
pub mod share_policy;
pub mod share_service;
pub mod storage;
