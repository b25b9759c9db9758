#[macro_use]
extern crate diesel;

pub mod executor;
#[cfg(feature = "service")]
pub mod service;
pub mod types;
