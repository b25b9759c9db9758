use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use actix_web::web::Data;
use bigdecimal::{BigDecimal, Zero};
use lazy_static::lazy_static;
use metrics::counter;
use thiserror::Error;

use fg_identity::IdentityService;
use fg_model::auth::UserProfile;
use fg_model::market::{
    CropListing, CropSubmission, MarketPrice, NewCropSubmission, NewMarketPrice, MARKET_API_PATH,
};
use fg_model::UserRole;
use fg_persistence::executor::DbExecutor;
use fg_service_api_interfaces::{Provider, Service};
use fg_service_api_web::middleware::Identity;
use fg_service_api_web::scope::ExtendableScope;

use crate::db::dao::{PriceDao, RemovalOutcome, SubmissionDao};
use crate::db::model::{Price, Submission};
use crate::db::DbError;
use crate::rest_api;

#[derive(Error, Debug)]
pub enum MarketError {
    #[error("{0}")]
    BadRequest(String),
    #[error("This action is available to {0} accounts only")]
    WrongRole(UserRole),
    #[error("Submission [{0}] does not belong to the caller")]
    NotOwner(String),
    #[error("Submission [{0}] not found")]
    NotFound(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl<ErrorType: Into<DbError>> From<ErrorType> for MarketError {
    fn from(err: ErrorType) -> Self {
        MarketError::Internal(err.into().to_string())
    }
}

#[derive(Error, Debug)]
pub enum MarketInitError {
    #[error("Failed to migrate market database. Error: {0}.")]
    Migration(#[from] fg_persistence::executor::Error),
}

/// Marketplace backend. Submissions and prices live in the market
/// database; farmer display data comes from the identity service.
pub struct MarketService {
    db: DbExecutor,
    identity: Arc<IdentityService>,
}

impl MarketService {
    pub fn new(
        db: &DbExecutor,
        identity: Arc<IdentityService>,
    ) -> Result<Self, MarketInitError> {
        counter!("market.submissions.created", 0);
        counter!("market.submissions.removed", 0);
        counter!("market.prices.published", 0);

        db.apply_migration(crate::db::migrations::run_with_output)?;

        Ok(MarketService {
            db: db.clone(),
            identity,
        })
    }

    pub async fn create_submission(
        &self,
        new: NewCropSubmission,
        id: &Identity,
    ) -> Result<CropSubmission, MarketError> {
        ensure_role(id, UserRole::Farmer)?;
        validate_submission(&new)?;

        let submission = Submission::from_new(&new, &id.user_id);
        self.db.as_dao::<SubmissionDao>().create(&submission).await?;

        counter!("market.submissions.created", 1);
        log::info!(
            "Farmer {} listed {} ({} units)",
            id.name,
            submission.crop_name,
            submission.quantity
        );
        Ok(submission.into_client())
    }

    /// Active submissions enriched with farmer contact data, newest
    /// first. Search and price bounds are applied after enrichment, as
    /// the farmer name lives in the identity database.
    pub async fn list_submissions(
        &self,
        search: Option<String>,
        max_price: Option<BigDecimal>,
    ) -> Result<Vec<CropListing>, MarketError> {
        let submissions = self.db.as_dao::<SubmissionDao>().list_active().await?;
        let listings = self.enrich(submissions).await?;
        Ok(filter_listings(listings, search, max_price))
    }

    pub async fn my_submissions(&self, id: &Identity) -> Result<Vec<CropSubmission>, MarketError> {
        ensure_role(id, UserRole::Farmer)?;
        let submissions = self
            .db
            .as_dao::<SubmissionDao>()
            .list_by_farmer(id.user_id.clone())
            .await?;
        Ok(submissions.into_iter().map(Submission::into_client).collect())
    }

    pub async fn get_submission(&self, submission_id: &str) -> Result<CropListing, MarketError> {
        let submission = self
            .db
            .as_dao::<SubmissionDao>()
            .get(submission_id.to_string())
            .await?
            .ok_or_else(|| MarketError::NotFound(submission_id.to_string()))?;

        let mut listings = self.enrich(vec![submission]).await?;
        listings
            .pop()
            .ok_or_else(|| MarketError::Internal("listing enrichment dropped a row".to_string()))
    }

    pub async fn remove_submission(
        &self,
        submission_id: &str,
        id: &Identity,
    ) -> Result<(), MarketError> {
        ensure_role(id, UserRole::Farmer)?;
        let outcome = self
            .db
            .as_dao::<SubmissionDao>()
            .remove(submission_id.to_string(), id.user_id.clone())
            .await?;

        match outcome {
            RemovalOutcome::Removed => {
                counter!("market.submissions.removed", 1);
                Ok(())
            }
            RemovalOutcome::NotOwner => Err(MarketError::NotOwner(submission_id.to_string())),
            RemovalOutcome::NotFound => Err(MarketError::NotFound(submission_id.to_string())),
        }
    }

    pub async fn publish_price(
        &self,
        new: NewMarketPrice,
        id: &Identity,
    ) -> Result<MarketPrice, MarketError> {
        ensure_role(id, UserRole::Marketer)?;
        validate_price(&new)?;

        let price = Price::from_new(&new, &id.user_id);
        self.db.as_dao::<PriceDao>().create(&price).await?;

        counter!("market.prices.published", 1);
        log::info!(
            "Marketer {} reported {} at {} ({})",
            id.name,
            price.crop_name,
            price.current_price,
            price.market_location
        );
        Ok(price.into_client())
    }

    pub async fn my_prices(&self, id: &Identity) -> Result<Vec<MarketPrice>, MarketError> {
        ensure_role(id, UserRole::Marketer)?;
        let prices = self
            .db
            .as_dao::<PriceDao>()
            .list_by_marketer(id.user_id.clone())
            .await?;
        Ok(prices.into_iter().map(Price::into_client).collect())
    }

    pub async fn latest_prices(&self, limit: i64) -> Result<Vec<MarketPrice>, MarketError> {
        let prices = self.db.as_dao::<PriceDao>().latest(limit).await?;
        Ok(prices.into_iter().map(Price::into_client).collect())
    }

    pub async fn list_prices(
        &self,
        crop_name: Option<String>,
    ) -> Result<Vec<MarketPrice>, MarketError> {
        let prices = self.db.as_dao::<PriceDao>().list(crop_name).await?;
        Ok(prices.into_iter().map(Price::into_client).collect())
    }

    async fn enrich(&self, submissions: Vec<Submission>) -> Result<Vec<CropListing>, MarketError> {
        let mut farmer_ids: Vec<String> =
            submissions.iter().map(|s| s.farmer_id.clone()).collect();
        farmer_ids.sort();
        farmer_ids.dedup();

        let profiles: HashMap<String, UserProfile> = self
            .identity
            .profiles_by_user_ids(farmer_ids)
            .await
            .map_err(|e| MarketError::Internal(e.to_string()))?
            .into_iter()
            .map(|profile| (profile.user_id.clone(), profile))
            .collect();

        Ok(submissions
            .into_iter()
            .map(|submission| {
                let profile = profiles.get(&submission.farmer_id);
                submission.into_listing(profile)
            })
            .collect())
    }

    pub fn rest<Context>(ctx: &Context) -> actix_web::Scope
    where
        Context: Provider<Self, DbExecutor> + Provider<Self, Arc<IdentityService>>,
    {
        let db: DbExecutor = ctx.component();
        let identity: Arc<IdentityService> = ctx.component();
        match MARKET.get_or_init_market(&db, identity) {
            Ok(market) => MarketService::bind_rest(market),
            Err(e) => {
                log::error!("REST API initialization failed: {}", e);
                panic!("Market service initialization impossible: {}", e)
            }
        }
    }

    pub fn bind_rest(myself: Arc<MarketService>) -> actix_web::Scope {
        actix_web::web::scope(MARKET_API_PATH)
            .app_data(Data::new(myself))
            .app_data(Data::new(rest_api::path_config()))
            .app_data(Data::new(rest_api::json_config()))
            .app_data(Data::new(rest_api::query_config()))
            .extend(rest_api::submissions::register_endpoints)
            .extend(rest_api::prices::register_endpoints)
    }
}

impl Service for MarketService {
    type Cli = crate::cli::MarketCommand;
}

fn ensure_role(id: &Identity, role: UserRole) -> Result<(), MarketError> {
    if id.role != role {
        return Err(MarketError::WrongRole(role));
    }
    Ok(())
}

fn validate_submission(new: &NewCropSubmission) -> Result<(), MarketError> {
    if new.crop_name.trim().is_empty() {
        return Err(MarketError::BadRequest(
            "crop name must not be empty".to_string(),
        ));
    }
    if new.quantity <= 0 {
        return Err(MarketError::BadRequest(
            "quantity must be positive".to_string(),
        ));
    }
    if new.desired_price <= BigDecimal::zero() {
        return Err(MarketError::BadRequest(
            "desired price must be positive".to_string(),
        ));
    }
    Ok(())
}

fn validate_price(new: &NewMarketPrice) -> Result<(), MarketError> {
    if new.crop_name.trim().is_empty() {
        return Err(MarketError::BadRequest(
            "crop name must not be empty".to_string(),
        ));
    }
    if new.market_location.trim().is_empty() {
        return Err(MarketError::BadRequest(
            "market location must not be empty".to_string(),
        ));
    }
    if new.current_price <= BigDecimal::zero() {
        return Err(MarketError::BadRequest(
            "current price must be positive".to_string(),
        ));
    }
    Ok(())
}

fn filter_listings(
    listings: Vec<CropListing>,
    search: Option<String>,
    max_price: Option<BigDecimal>,
) -> Vec<CropListing> {
    let needle = search.map(|s| s.to_lowercase());
    listings
        .into_iter()
        .filter(|listing| match &needle {
            Some(needle) => {
                listing.submission.crop_name.to_lowercase().contains(needle)
                    || listing
                        .farmer_name
                        .as_ref()
                        .map(|name| name.to_lowercase().contains(needle))
                        .unwrap_or(false)
            }
            None => true,
        })
        .filter(|listing| match &max_price {
            Some(max) => &listing.submission.desired_price <= max,
            None => true,
        })
        .collect()
}

// =========================================== //
// Awful static initialization. Necessary to
// share the market between workers of the
// REST server.
// =========================================== //

struct StaticMarket {
    locked_market: Mutex<Option<Arc<MarketService>>>,
}

impl StaticMarket {
    pub fn new() -> StaticMarket {
        StaticMarket {
            locked_market: Mutex::new(None),
        }
    }

    pub fn get_or_init_market(
        &self,
        db: &DbExecutor,
        identity: Arc<IdentityService>,
    ) -> Result<Arc<MarketService>, MarketInitError> {
        let mut guarded_market = self.locked_market.lock().unwrap();
        if let Some(market) = &*guarded_market {
            Ok(market.clone())
        } else {
            let market = Arc::new(MarketService::new(db, identity)?);
            *guarded_market = Some(market.clone());
            Ok(market)
        }
    }
}

lazy_static! {
    static ref MARKET: StaticMarket = StaticMarket::new();
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::str::FromStr;

    fn listing(crop: &str, farmer: Option<&str>, price: &str) -> CropListing {
        let now = Utc::now();
        CropListing {
            submission: CropSubmission {
                id: "sub-1".to_string(),
                farmer_id: "user-1".to_string(),
                crop_name: crop.to_string(),
                quantity: 10,
                desired_price: BigDecimal::from_str(price).unwrap(),
                notes: None,
                status: "Active".to_string(),
                created_at: now,
                updated_at: now,
            },
            farmer_name: farmer.map(|f| f.to_string()),
            farmer_mobile: None,
        }
    }

    #[test]
    fn search_matches_crop_or_farmer_name() {
        let listings = vec![
            listing("Maize", Some("Asha Patel"), "12"),
            listing("Beans", Some("Ravi Kumar"), "30"),
            listing("Rice", None, "45"),
        ];

        let hits = filter_listings(listings.clone(), Some("ASHA".to_string()), None);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].submission.crop_name, "Maize");

        let hits = filter_listings(listings, Some("ric".to_string()), None);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].submission.crop_name, "Rice");
    }

    #[test]
    fn max_price_bound_is_inclusive() {
        let listings = vec![
            listing("Maize", None, "12"),
            listing("Beans", None, "30"),
            listing("Rice", None, "45"),
        ];

        let hits = filter_listings(
            listings,
            None,
            Some(BigDecimal::from_str("30").unwrap()),
        );
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|l| l.submission.crop_name != "Rice"));
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let new = NewCropSubmission {
            crop_name: "Maize".to_string(),
            quantity: 0,
            desired_price: BigDecimal::from_str("10").unwrap(),
            notes: None,
        };
        assert!(matches!(
            validate_submission(&new),
            Err(MarketError::BadRequest(_))
        ));
    }

    #[test]
    fn blank_location_is_rejected() {
        let new = NewMarketPrice {
            crop_name: "Maize".to_string(),
            current_price: BigDecimal::from_str("10").unwrap(),
            market_location: "   ".to_string(),
            price_date: None,
            notes: None,
        };
        assert!(matches!(
            validate_price(&new),
            Err(MarketError::BadRequest(_))
        ));
    }
}
