//! Marketplace REST endpoints.
//!
//! Responsibility of these functions is calling respective functions from
//! within [`crate::market::MarketService`] and mapping return values to
//! http responses. No market logic is allowed here.

use actix_web::error::InternalError;
use actix_web::http::StatusCode;
use actix_web::web::{JsonConfig, PathConfig, QueryConfig};
use bigdecimal::BigDecimal;
use serde::Deserialize;

use fg_model::ErrorMessage;

mod error;
pub(crate) mod prices;
pub(crate) mod submissions;

const DEFAULT_LATEST_LIMIT: i64 = 5;
const MAX_LATEST_LIMIT: i64 = 100;

pub fn path_config() -> PathConfig {
    PathConfig::default().error_handler(|err, _req| {
        InternalError::new(
            serde_json::to_string(&ErrorMessage::new(err.to_string())).unwrap(),
            StatusCode::BAD_REQUEST,
        )
        .into()
    })
}

pub fn json_config() -> JsonConfig {
    JsonConfig::default().error_handler(|err, _req| {
        InternalError::new(
            serde_json::to_string(&ErrorMessage::new(err.to_string())).unwrap(),
            StatusCode::BAD_REQUEST,
        )
        .into()
    })
}

pub fn query_config() -> QueryConfig {
    QueryConfig::default().error_handler(|err, _req| {
        InternalError::new(
            serde_json::to_string(&ErrorMessage::new(err.to_string())).unwrap(),
            StatusCode::BAD_REQUEST,
        )
        .into()
    })
}

#[derive(Deserialize)]
pub struct PathSubmission {
    pub submission_id: String,
}

#[derive(Deserialize)]
pub struct QuerySubmissions {
    #[serde(rename = "search")]
    pub search: Option<String>,
    #[serde(rename = "maxPrice")]
    pub max_price: Option<BigDecimal>,
}

#[derive(Deserialize)]
pub struct QueryLatest {
    #[serde(rename = "limit", default = "default_latest_limit")]
    pub limit: i64,
}

impl QueryLatest {
    /// Requested row count clamped to a sane window.
    pub fn capped(&self) -> i64 {
        self.limit.clamp(1, MAX_LATEST_LIMIT)
    }
}

#[inline(always)]
fn default_latest_limit() -> i64 {
    DEFAULT_LATEST_LIMIT
}
