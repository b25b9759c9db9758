#[macro_use]
extern crate diesel;

pub mod cli;
mod db;
pub mod market;
mod rest_api;

pub use market::{MarketError, MarketService};
