pub mod auth;
pub mod error;
pub mod market;
pub mod role;

pub use error::ErrorMessage;
pub use role::UserRole;
