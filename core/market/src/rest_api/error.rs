use actix_web::{HttpResponse, ResponseError};

use fg_model::ErrorMessage;

use crate::market::MarketError;

impl ResponseError for MarketError {
    fn error_response(&self) -> HttpResponse {
        let msg = ErrorMessage::new(self.to_string());
        match self {
            MarketError::BadRequest(_) => HttpResponse::BadRequest().json(msg),
            MarketError::WrongRole(_) | MarketError::NotOwner(_) => {
                HttpResponse::Forbidden().json(msg)
            }
            MarketError::NotFound(_) => HttpResponse::NotFound().json(msg),
            MarketError::Internal(_) => HttpResponse::InternalServerError().json(msg),
        }
    }
}
