use actix_web::{http::StatusCode, test, App};
use std::str::FromStr;
use std::sync::Arc;

use bigdecimal::BigDecimal;

use fg_identity::IdentityService;
use fg_market::MarketService;
use fg_model::auth::NewUser;
use fg_model::market::{CropListing, CropSubmission, MarketPrice};
use fg_model::UserRole;
use fg_persistence::executor::DbExecutor;
use fg_service_api_web::middleware::auth::dummy::DummyAuth;
use fg_service_api_web::middleware::Identity;

fn spawn_market() -> (Arc<IdentityService>, Arc<MarketService>) {
    let identity_db = DbExecutor::in_memory().unwrap();
    let market_db = DbExecutor::in_memory().unwrap();
    let identity = Arc::new(IdentityService::new(&identity_db).unwrap());
    let market = Arc::new(MarketService::new(&market_db, identity.clone()).unwrap());
    (identity, market)
}

async fn register(identity: &IdentityService, name: &str, email: &str, role: UserRole) -> Identity {
    let session = identity
        .signup(NewUser {
            name: name.to_string(),
            email: email.to_string(),
            mobile: "+254 700 111 222".to_string(),
            password: "hunter22".to_string(),
            user_type: role,
        })
        .await
        .unwrap();
    Identity {
        user_id: session.profile.user_id,
        name: session.profile.name,
        role: session.profile.user_type,
    }
}

fn submission_body(crop: &str) -> serde_json::Value {
    serde_json::json!({
        "cropName": crop,
        "quantity": 50,
        "desiredPrice": "12.50",
    })
}

#[actix_web::test]
async fn farmer_creates_and_removes_submission() {
    let (identity, market) = spawn_market();
    let farmer = register(&identity, "Asha Patel", "asha@example.com", UserRole::Farmer).await;
    let app = test::init_service(
        App::new()
            .wrap(DummyAuth::new(farmer))
            .service(MarketService::bind_rest(market)),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/market-api/v1/submissions")
        .set_json(submission_body("Maize"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: CropSubmission = test::read_body_json(resp).await;
    assert_eq!(created.status, "Active");
    assert_eq!(created.desired_price, BigDecimal::from_str("12.50").unwrap());

    let req = test::TestRequest::get()
        .uri("/market-api/v1/submissions/my")
        .to_request();
    let mine: Vec<CropSubmission> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(mine.len(), 1);

    let req = test::TestRequest::delete()
        .uri(&format!("/market-api/v1/submissions/{}", created.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri(&format!("/market-api/v1/submissions/{}", created.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn marketer_cannot_create_submission() {
    let (identity, market) = spawn_market();
    let marketer = register(&identity, "Ravi Kumar", "ravi@example.com", UserRole::Marketer).await;
    let app = test::init_service(
        App::new()
            .wrap(DummyAuth::new(marketer))
            .service(MarketService::bind_rest(market)),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/market-api/v1/submissions")
        .set_json(submission_body("Maize"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn browsing_includes_farmer_contact() {
    let (identity, market) = spawn_market();
    let farmer = register(&identity, "Asha Patel", "asha@example.com", UserRole::Farmer).await;
    let marketer = register(&identity, "Ravi Kumar", "ravi@example.com", UserRole::Marketer).await;

    let farmer_app = test::init_service(
        App::new()
            .wrap(DummyAuth::new(farmer))
            .service(MarketService::bind_rest(market.clone())),
    )
    .await;
    let req = test::TestRequest::post()
        .uri("/market-api/v1/submissions")
        .set_json(submission_body("Maize"))
        .to_request();
    let resp = test::call_service(&farmer_app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let marketer_app = test::init_service(
        App::new()
            .wrap(DummyAuth::new(marketer))
            .service(MarketService::bind_rest(market)),
    )
    .await;
    let req = test::TestRequest::get()
        .uri("/market-api/v1/submissions?search=maize")
        .to_request();
    let listings: Vec<CropListing> = test::call_and_read_body_json(&marketer_app, req).await;
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].farmer_name.as_deref(), Some("Asha Patel"));
    assert_eq!(
        listings[0].farmer_mobile.as_deref(),
        Some("+254 700 111 222")
    );

    let req = test::TestRequest::get()
        .uri("/market-api/v1/submissions?maxPrice=5")
        .to_request();
    let listings: Vec<CropListing> = test::call_and_read_body_json(&marketer_app, req).await;
    assert!(listings.is_empty());
}

#[actix_web::test]
async fn negative_price_report_is_bad_request() {
    let (identity, market) = spawn_market();
    let marketer = register(&identity, "Ravi Kumar", "ravi@example.com", UserRole::Marketer).await;
    let app = test::init_service(
        App::new()
            .wrap(DummyAuth::new(marketer))
            .service(MarketService::bind_rest(market)),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/market-api/v1/prices")
        .set_json(serde_json::json!({
            "cropName": "Maize",
            "currentPrice": "-4",
            "marketLocation": "Nakuru",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// No auth middleware here on purpose, the ticker stays open.
#[actix_web::test]
async fn latest_prices_are_public() {
    let (identity, market) = spawn_market();
    let marketer = register(&identity, "Ravi Kumar", "ravi@example.com", UserRole::Marketer).await;

    let open_app =
        test::init_service(App::new().service(MarketService::bind_rest(market.clone()))).await;
    let req = test::TestRequest::get()
        .uri("/market-api/v1/prices/latest")
        .to_request();
    let prices: Vec<MarketPrice> = test::call_and_read_body_json(&open_app, req).await;
    assert!(prices.is_empty());

    let marketer_app = test::init_service(
        App::new()
            .wrap(DummyAuth::new(marketer))
            .service(MarketService::bind_rest(market)),
    )
    .await;
    for crop in ["Maize", "Beans"] {
        let req = test::TestRequest::post()
            .uri("/market-api/v1/prices")
            .set_json(serde_json::json!({
                "cropName": crop,
                "currentPrice": "11.25",
                "marketLocation": "Nakuru",
            }))
            .to_request();
        let resp = test::call_service(&marketer_app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let req = test::TestRequest::get()
        .uri("/market-api/v1/prices/latest?limit=1")
        .to_request();
    let prices: Vec<MarketPrice> = test::call_and_read_body_json(&open_app, req).await;
    assert_eq!(prices.len(), 1);
    assert_eq!(prices[0].crop_name, "Beans");
}
