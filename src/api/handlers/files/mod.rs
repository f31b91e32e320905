pub mod list;
pub mod manage;
pub mod share;
pub mod types;
pub mod upload;
