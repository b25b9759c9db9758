pub mod middleware;
pub mod scope;
