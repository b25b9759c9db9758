use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const MARKET_API_PATH: &str = "/market-api/v1";

/// Crop offered for sale by a farmer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCropSubmission {
    pub crop_name: String,
    pub quantity: i32,
    pub desired_price: BigDecimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropSubmission {
    pub id: String,
    pub farmer_id: String,
    pub crop_name: String,
    pub quantity: i32,
    pub desired_price: BigDecimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Submission enriched with the owning farmer's contact details, as served
/// to browsing marketers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropListing {
    #[serde(flatten)]
    pub submission: CropSubmission,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub farmer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub farmer_mobile: Option<String>,
}

/// Observed price reported by a marketer. Entries are immutable once
/// published.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMarketPrice {
    pub crop_name: String,
    pub current_price: BigDecimal,
    pub market_location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketPrice {
    pub id: String,
    pub marketer_id: String,
    pub crop_name: String,
    pub current_price: BigDecimal,
    pub market_location: String,
    pub price_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}
