use actix_web::web::{Data, Json, Query};
use actix_web::{HttpResponse, Responder, Scope};
use std::sync::Arc;

use fg_model::market::NewMarketPrice;
use fg_service_api_web::middleware::Identity;
use fg_std_utils::LogErr;

use super::QueryLatest;
use crate::market::MarketService;

pub fn register_endpoints(scope: Scope) -> Scope {
    scope
        .service(publish_price)
        .service(my_prices)
        .service(latest_prices)
}

#[actix_web::post("/prices")]
async fn publish_price(
    market: Data<Arc<MarketService>>,
    body: Json<NewMarketPrice>,
    id: Identity,
) -> impl Responder {
    market
        .publish_price(body.into_inner(), &id)
        .await
        .log_err()
        .map(|price| HttpResponse::Created().json(price))
}

#[actix_web::get("/prices/my")]
async fn my_prices(market: Data<Arc<MarketService>>, id: Identity) -> impl Responder {
    market
        .my_prices(&id)
        .await
        .log_err()
        .map(|prices| HttpResponse::Ok().json(prices))
}

// Public ticker. No Identity extractor, the auth middleware lets the
// path through without a token.
#[actix_web::get("/prices/latest")]
async fn latest_prices(
    market: Data<Arc<MarketService>>,
    query: Query<QueryLatest>,
) -> impl Responder {
    market
        .latest_prices(query.capped())
        .await
        .log_err()
        .map(|prices| HttpResponse::Ok().json(prices))
}
