use actix_web::dev::Payload;
use actix_web::http::StatusCode;
use actix_web::{FromRequest, HttpMessage, HttpRequest, ResponseError};
use futures::future;
use serde::Serialize;
use std::fmt::{Display, Formatter};

use fg_model::UserRole;

/// Authenticated caller, resolved from the session token and stored in
/// request extensions by the auth middleware.
#[derive(Clone, Debug, Serialize)]
pub struct Identity {
    pub user_id: String,
    pub name: String,
    pub role: UserRole,
}

impl FromRequest for Identity {
    type Error = MissingIdentity;
    type Future = future::Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        if let Some(v) = req.extensions().get::<Identity>() {
            future::ok(v.clone())
        } else {
            future::err(MissingIdentity {})
        }
    }
}

#[derive(Debug)]
pub struct MissingIdentity;

impl Display for MissingIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "missing identity")
    }
}

impl ResponseError for MissingIdentity {
    fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }
}
