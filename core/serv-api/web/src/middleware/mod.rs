pub mod auth;

pub use auth::{ident::Identity, Auth, AuthMiddleware};
