use actix_web::web::{Data, Json, Path, Query};
use actix_web::{HttpResponse, Responder, Scope};
use std::sync::Arc;

use fg_model::market::NewCropSubmission;
use fg_service_api_web::middleware::Identity;
use fg_std_utils::LogErr;

use super::{PathSubmission, QuerySubmissions};
use crate::market::MarketService;

pub fn register_endpoints(scope: Scope) -> Scope {
    // "/submissions/my" must register before the "{submission_id}" route.
    scope
        .service(create_submission)
        .service(list_submissions)
        .service(my_submissions)
        .service(get_submission)
        .service(remove_submission)
}

#[actix_web::post("/submissions")]
async fn create_submission(
    market: Data<Arc<MarketService>>,
    body: Json<NewCropSubmission>,
    id: Identity,
) -> impl Responder {
    market
        .create_submission(body.into_inner(), &id)
        .await
        .log_err()
        .map(|submission| HttpResponse::Created().json(submission))
}

#[actix_web::get("/submissions")]
async fn list_submissions(
    market: Data<Arc<MarketService>>,
    query: Query<QuerySubmissions>,
    _id: Identity,
) -> impl Responder {
    let QuerySubmissions { search, max_price } = query.into_inner();
    market
        .list_submissions(search, max_price)
        .await
        .log_err()
        .map(|listings| HttpResponse::Ok().json(listings))
}

#[actix_web::get("/submissions/my")]
async fn my_submissions(market: Data<Arc<MarketService>>, id: Identity) -> impl Responder {
    market
        .my_submissions(&id)
        .await
        .log_err()
        .map(|submissions| HttpResponse::Ok().json(submissions))
}

#[actix_web::get("/submissions/{submission_id}")]
async fn get_submission(
    market: Data<Arc<MarketService>>,
    path: Path<PathSubmission>,
    _id: Identity,
) -> impl Responder {
    market
        .get_submission(&path.submission_id)
        .await
        .log_err()
        .map(|listing| HttpResponse::Ok().json(listing))
}

#[actix_web::delete("/submissions/{submission_id}")]
async fn remove_submission(
    market: Data<Arc<MarketService>>,
    path: Path<PathSubmission>,
    id: Identity,
) -> impl Responder {
    market
        .remove_submission(&path.submission_id, &id)
        .await
        .log_err()
        .map(|_| HttpResponse::NoContent())
}
