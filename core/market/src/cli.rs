use std::sync::Arc;
use structopt::StructOpt;

use fg_identity::IdentityService;
use fg_persistence::executor::DbExecutor;
use fg_service_api::{CliCtx, CommandOutput, ResponseTable};

use crate::market::MarketService;

/// Marketplace browsing
#[derive(StructOpt, Debug)]
#[structopt(setting = structopt::clap::AppSettings::DeriveDisplayOrder)]
pub enum MarketCommand {
    /// Show list of active crop submissions
    Submissions,

    /// Show list of reported market prices
    Prices {
        /// Limit output to one crop
        #[structopt(long)]
        crop: Option<String>,
    },
}

impl MarketCommand {
    pub async fn run_command(self, ctx: &CliCtx) -> anyhow::Result<CommandOutput> {
        let identity_db = DbExecutor::from_data_dir(&ctx.data_dir, "identity")?;
        let market_db = DbExecutor::from_data_dir(&ctx.data_dir, "market")?;
        let identity = Arc::new(IdentityService::new(&identity_db)?);
        let market = MarketService::new(&market_db, identity)?;

        match self {
            MarketCommand::Submissions => {
                let listings = market.list_submissions(None, None).await?;
                Ok(ResponseTable {
                    columns: vec![
                        "crop".into(),
                        "quantity".into(),
                        "price".into(),
                        "farmer".into(),
                        "status".into(),
                        "created".into(),
                    ],
                    values: listings
                        .into_iter()
                        .map(|listing| {
                            serde_json::json! {
                                [listing.submission.crop_name, listing.submission.quantity,
                                 listing.submission.desired_price,
                                 listing.farmer_name.unwrap_or_default(),
                                 listing.submission.status, listing.submission.created_at]
                            }
                        })
                        .collect(),
                }
                .into())
            }
            MarketCommand::Prices { crop } => {
                let prices = market.list_prices(crop).await?;
                Ok(ResponseTable {
                    columns: vec![
                        "crop".into(),
                        "price".into(),
                        "market".into(),
                        "date".into(),
                        "reported".into(),
                    ],
                    values: prices
                        .into_iter()
                        .map(|price| {
                            serde_json::json! {
                                [price.crop_name, price.current_price, price.market_location,
                                 price.price_date, price.created_at]
                            }
                        })
                        .collect(),
                }
                .into())
            }
        }
    }
}
