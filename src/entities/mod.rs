pub mod prelude;

pub mod files;
pub mod users;
