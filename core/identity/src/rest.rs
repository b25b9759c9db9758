//! Auth REST endpoints.
//!
//! Handlers only translate between HTTP and [`IdentityService`] calls;
//! account logic stays in the service layer.

use actix_web::error::InternalError;
use actix_web::http::StatusCode;
use actix_web::web::{Data, Json, JsonConfig};
use actix_web::{HttpResponse, Responder, ResponseError, Scope};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use std::sync::Arc;

use fg_model::auth::{Credentials, NewUser};
use fg_model::ErrorMessage;
use fg_service_api_web::middleware::Identity;
use fg_std_utils::LogErr;

use crate::service::{AuthError, IdentityService};

pub fn register_endpoints(scope: Scope) -> Scope {
    scope
        .service(signup)
        .service(signin)
        .service(signout)
        .service(me)
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

impl ResponseError for AuthError {
    fn error_response(&self) -> HttpResponse {
        let msg = ErrorMessage::new(self.to_string());
        match self {
            AuthError::InvalidCredentials => HttpResponse::Unauthorized().json(msg),
            AuthError::AlreadyExists | AuthError::BadRequest(_) => {
                HttpResponse::BadRequest().json(msg)
            }
            AuthError::NotFound => HttpResponse::NotFound().json(msg),
            AuthError::Internal(_) => HttpResponse::InternalServerError().json(msg),
        }
    }
}

#[actix_web::post("/signup")]
async fn signup(identity: Data<Arc<IdentityService>>, body: Json<NewUser>) -> impl Responder {
    identity
        .signup(body.into_inner())
        .await
        .log_err()
        .map(|session| HttpResponse::Created().json(session))
}

#[actix_web::post("/signin")]
async fn signin(identity: Data<Arc<IdentityService>>, body: Json<Credentials>) -> impl Responder {
    identity
        .signin(body.into_inner())
        .await
        .log_err()
        .map(|session| HttpResponse::Ok().json(session))
}

#[actix_web::post("/signout")]
async fn signout(
    identity: Data<Arc<IdentityService>>,
    auth: BearerAuth,
    _id: Identity,
) -> impl Responder {
    identity
        .signout(auth.token())
        .await
        .log_err()
        .map(|_| HttpResponse::NoContent())
}

#[actix_web::get("/me")]
async fn me(identity: Data<Arc<IdentityService>>, id: Identity) -> impl Responder {
    identity
        .me(&id)
        .await
        .log_err()
        .map(|profile| HttpResponse::Ok().json(profile))
}

#[cfg(test)]
mod tests {
    use actix_web::{test, App};
    use std::sync::Arc;

    use fg_model::auth::SessionInfo;
    use fg_persistence::executor::DbExecutor;

    use crate::service::IdentityService;

    fn signup_body(email: &str) -> serde_json::Value {
        serde_json::json!({
            "name": "Asha Patel",
            "email": email,
            "mobile": "+91 98000 11223",
            "password": "hunter22",
            "userType": "farmer",
        })
    }

    #[actix_web::test]
    async fn signup_rejects_duplicate_email() {
        let db = DbExecutor::in_memory().unwrap();
        let service = Arc::new(IdentityService::new(&db).unwrap());
        let app =
            test::init_service(App::new().service(IdentityService::bind_rest(service))).await;

        let req = test::TestRequest::post()
            .uri("/auth-api/v1/signup")
            .set_json(signup_body("asha@example.com"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);

        // Same address with different case still collides.
        let req = test::TestRequest::post()
            .uri("/auth-api/v1/signup")
            .set_json(signup_body("ASHA@example.com"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn signup_rejects_unknown_role() {
        let db = DbExecutor::in_memory().unwrap();
        let service = Arc::new(IdentityService::new(&db).unwrap());
        let app =
            test::init_service(App::new().service(IdentityService::bind_rest(service))).await;

        let mut body = signup_body("asha@example.com");
        body["userType"] = serde_json::json!("broker");
        let req = test::TestRequest::post()
            .uri("/auth-api/v1/signup")
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn signin_with_wrong_password_is_unauthorized() {
        let db = DbExecutor::in_memory().unwrap();
        let service = Arc::new(IdentityService::new(&db).unwrap());
        let app =
            test::init_service(App::new().service(IdentityService::bind_rest(service))).await;

        let req = test::TestRequest::post()
            .uri("/auth-api/v1/signup")
            .set_json(signup_body("asha@example.com"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);

        let req = test::TestRequest::post()
            .uri("/auth-api/v1/signin")
            .set_json(serde_json::json!({
                "email": "asha@example.com",
                "password": "wrong-password",
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn signup_returns_session_with_profile() {
        let db = DbExecutor::in_memory().unwrap();
        let service = Arc::new(IdentityService::new(&db).unwrap());
        let app =
            test::init_service(App::new().service(IdentityService::bind_rest(service))).await;

        let req = test::TestRequest::post()
            .uri("/auth-api/v1/signup")
            .set_json(signup_body("asha@example.com"))
            .to_request();
        let session: SessionInfo = test::call_and_read_body_json(&app, req).await;
        assert_eq!(session.token.len(), 32);
        assert_eq!(session.profile.name, "Asha Patel");
    }
}
