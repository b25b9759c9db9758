#[macro_use]
extern crate diesel;

pub mod cli;
mod dao;
mod db;
mod rest;
pub mod service;

pub use service::{AuthError, AuthResolver, IdentityService};
