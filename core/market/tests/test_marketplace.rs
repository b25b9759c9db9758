use std::str::FromStr;
use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::{Duration, Utc};

use fg_identity::IdentityService;
use fg_market::{MarketError, MarketService};
use fg_model::auth::NewUser;
use fg_model::market::{NewCropSubmission, NewMarketPrice};
use fg_model::UserRole;
use fg_persistence::executor::DbExecutor;
use fg_service_api_web::middleware::Identity;

fn spawn_services() -> anyhow::Result<(Arc<IdentityService>, MarketService)> {
    let identity_db = DbExecutor::in_memory()?;
    let market_db = DbExecutor::in_memory()?;
    let identity = Arc::new(IdentityService::new(&identity_db)?);
    let market = MarketService::new(&market_db, identity.clone())?;
    Ok((identity, market))
}

async fn signup(
    identity: &IdentityService,
    name: &str,
    email: &str,
    role: UserRole,
) -> anyhow::Result<Identity> {
    let session = identity
        .signup(NewUser {
            name: name.to_string(),
            email: email.to_string(),
            mobile: "+254 700 111 222".to_string(),
            password: "hunter22".to_string(),
            user_type: role,
        })
        .await?;
    Ok(Identity {
        user_id: session.profile.user_id,
        name: session.profile.name,
        role: session.profile.user_type,
    })
}

fn submission(crop: &str, quantity: i32, price: &str) -> NewCropSubmission {
    NewCropSubmission {
        crop_name: crop.to_string(),
        quantity,
        desired_price: BigDecimal::from_str(price).unwrap(),
        notes: None,
    }
}

fn price_report(crop: &str, price: &str, location: &str) -> NewMarketPrice {
    NewMarketPrice {
        crop_name: crop.to_string(),
        current_price: BigDecimal::from_str(price).unwrap(),
        market_location: location.to_string(),
        price_date: None,
        notes: None,
    }
}

#[tokio::test]
async fn farmer_lists_and_marketer_browses() -> anyhow::Result<()> {
    let (identity, market) = spawn_services()?;
    let farmer = signup(&identity, "Asha Patel", "asha@example.com", UserRole::Farmer).await?;

    market
        .create_submission(submission("Maize", 50, "12.50"), &farmer)
        .await?;
    market
        .create_submission(submission("Beans", 20, "30"), &farmer)
        .await?;

    // Browsing view carries farmer contact data, newest entry first.
    let listings = market.list_submissions(None, None).await?;
    assert_eq!(listings.len(), 2);
    assert_eq!(listings[0].submission.crop_name, "Beans");
    assert_eq!(listings[0].farmer_name.as_deref(), Some("Asha Patel"));
    assert_eq!(listings[0].farmer_mobile.as_deref(), Some("+254 700 111 222"));

    let single = market.get_submission(&listings[1].submission.id).await?;
    assert_eq!(single.submission.crop_name, "Maize");
    assert_eq!(single.farmer_name.as_deref(), Some("Asha Patel"));
    Ok(())
}

#[tokio::test]
async fn search_and_price_filters_apply() -> anyhow::Result<()> {
    let (identity, market) = spawn_services()?;
    let asha = signup(&identity, "Asha Patel", "asha@example.com", UserRole::Farmer).await?;
    let ravi = signup(&identity, "Ravi Kumar", "ravi@example.com", UserRole::Farmer).await?;

    market
        .create_submission(submission("Maize", 50, "12.50"), &asha)
        .await?;
    market
        .create_submission(submission("Beans", 20, "30"), &ravi)
        .await?;
    market
        .create_submission(submission("Rice", 70, "45"), &ravi)
        .await?;

    let hits = market
        .list_submissions(Some("mai".to_string()), None)
        .await?;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].submission.crop_name, "Maize");

    // Farmer names match too.
    let hits = market
        .list_submissions(Some("ravi".to_string()), None)
        .await?;
    assert_eq!(hits.len(), 2);

    let hits = market
        .list_submissions(None, Some(BigDecimal::from_str("30")?))
        .await?;
    assert_eq!(hits.len(), 2);
    assert!(hits.iter().all(|l| l.submission.crop_name != "Rice"));
    Ok(())
}

#[tokio::test]
async fn removal_is_owner_only() -> anyhow::Result<()> {
    let (identity, market) = spawn_services()?;
    let asha = signup(&identity, "Asha Patel", "asha@example.com", UserRole::Farmer).await?;
    let ravi = signup(&identity, "Ravi Kumar", "ravi@example.com", UserRole::Farmer).await?;

    let created = market
        .create_submission(submission("Maize", 50, "12.50"), &asha)
        .await?;

    let denied = market.remove_submission(&created.id, &ravi).await;
    assert!(matches!(denied, Err(MarketError::NotOwner(_))));

    market.remove_submission(&created.id, &asha).await?;
    assert!(market.list_submissions(None, None).await?.is_empty());

    let gone = market.remove_submission(&created.id, &asha).await;
    assert!(matches!(gone, Err(MarketError::NotFound(_))));

    let lookup = market.get_submission(&created.id).await;
    assert!(matches!(lookup, Err(MarketError::NotFound(_))));
    Ok(())
}

#[tokio::test]
async fn roles_are_enforced() -> anyhow::Result<()> {
    let (identity, market) = spawn_services()?;
    let farmer = signup(&identity, "Asha Patel", "asha@example.com", UserRole::Farmer).await?;
    let marketer = signup(&identity, "Ravi Kumar", "ravi@example.com", UserRole::Marketer).await?;

    let denied = market
        .create_submission(submission("Maize", 50, "12.50"), &marketer)
        .await;
    assert!(matches!(denied, Err(MarketError::WrongRole(_))));

    let denied = market
        .publish_price(price_report("Maize", "11", "Nakuru"), &farmer)
        .await;
    assert!(matches!(denied, Err(MarketError::WrongRole(_))));

    let denied = market.my_prices(&farmer).await;
    assert!(matches!(denied, Err(MarketError::WrongRole(_))));
    Ok(())
}

#[tokio::test]
async fn price_date_defaults_to_today() -> anyhow::Result<()> {
    let (identity, market) = spawn_services()?;
    let marketer = signup(&identity, "Ravi Kumar", "ravi@example.com", UserRole::Marketer).await?;

    let published = market
        .publish_price(price_report("Maize", "11.25", "Nakuru"), &marketer)
        .await?;
    assert_eq!(published.price_date, Utc::now().date_naive());
    assert_eq!(published.marketer_id, marketer.user_id);
    Ok(())
}

#[tokio::test]
async fn latest_prices_are_limited_and_newest_first() -> anyhow::Result<()> {
    let (identity, market) = spawn_services()?;
    let marketer = signup(&identity, "Ravi Kumar", "ravi@example.com", UserRole::Marketer).await?;

    for (crop, price) in [("Maize", "11"), ("Beans", "29"), ("Rice", "44")] {
        market
            .publish_price(price_report(crop, price, "Nakuru"), &marketer)
            .await?;
    }

    let latest = market.latest_prices(2).await?;
    assert_eq!(latest.len(), 2);
    assert_eq!(latest[0].crop_name, "Rice");
    assert_eq!(latest[1].crop_name, "Beans");
    Ok(())
}

#[tokio::test]
async fn my_prices_order_by_observation_day() -> anyhow::Result<()> {
    let (identity, market) = spawn_services()?;
    let marketer = signup(&identity, "Ravi Kumar", "ravi@example.com", UserRole::Marketer).await?;

    let mut last_week = price_report("Maize", "10", "Nakuru");
    last_week.price_date = Some((Utc::now() - Duration::days(7)).date_naive());
    market.publish_price(last_week, &marketer).await?;
    market
        .publish_price(price_report("Maize", "11", "Nakuru"), &marketer)
        .await?;

    let mine = market.my_prices(&marketer).await?;
    assert_eq!(mine.len(), 2);
    assert_eq!(mine[0].current_price, BigDecimal::from_str("11")?);
    assert_eq!(mine[1].current_price, BigDecimal::from_str("10")?);
    Ok(())
}

#[tokio::test]
async fn invalid_bodies_are_rejected() -> anyhow::Result<()> {
    let (identity, market) = spawn_services()?;
    let farmer = signup(&identity, "Asha Patel", "asha@example.com", UserRole::Farmer).await?;
    let marketer = signup(&identity, "Ravi Kumar", "ravi@example.com", UserRole::Marketer).await?;

    let denied = market
        .create_submission(submission("  ", 50, "12.50"), &farmer)
        .await;
    assert!(matches!(denied, Err(MarketError::BadRequest(_))));

    let denied = market
        .create_submission(submission("Maize", 50, "-1"), &farmer)
        .await;
    assert!(matches!(denied, Err(MarketError::BadRequest(_))));

    let denied = market
        .publish_price(price_report("Maize", "0", "Nakuru"), &marketer)
        .await;
    assert!(matches!(denied, Err(MarketError::BadRequest(_))));
    Ok(())
}
