pub mod dummy;
pub mod ident;

pub use crate::middleware::auth::ident::Identity;

use actix_service::{Service, Transform};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::error::{Error, ErrorUnauthorized};
use actix_web::{http::header::Header, HttpMessage};
use actix_web_httpauth::headers::authorization::{Authorization, Bearer};
use futures::future::{ok, Future, Ready};
use futures::lock::Mutex;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll};

use fg_service_api_cache::{AutoResolveCache, ValueResolver};

pub type Cache<R> = AutoResolveCache<R>;

/// Session token middleware. Translates a `Bearer` token into an [`Identity`]
/// available through request extensions. Requests without a valid token are
/// rejected unless the path is on the public list.
pub struct Auth<R>
where
    R: ValueResolver<Key = String, Value = Identity> + 'static,
    R::Error: std::fmt::Debug,
{
    cache: Arc<Mutex<Cache<R>>>,
    public_paths: Arc<Vec<String>>,
}

impl<R> Auth<R>
where
    R: ValueResolver<Key = String, Value = Identity> + 'static,
    R::Error: std::fmt::Debug,
{
    pub fn new(resolver: R, public_paths: Vec<String>) -> Self {
        Auth {
            cache: Arc::new(Mutex::new(Cache::new(
                std::time::Duration::from_secs(2),
                1024,
                resolver,
            ))),
            public_paths: Arc::new(public_paths),
        }
    }
}

impl<S, B, R> Transform<S, ServiceRequest> for Auth<R>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
    R: ValueResolver<Key = String, Value = Identity> + 'static,
    R::Error: std::fmt::Debug,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddleware<S, R>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthMiddleware {
            service: Rc::new(service),
            cache: self.cache.clone(),
            public_paths: self.public_paths.clone(),
        })
    }
}

pub struct AuthMiddleware<S, R>
where
    R: ValueResolver<Key = String, Value = Identity> + 'static,
{
    service: Rc<S>,
    cache: Arc<Mutex<Cache<R>>>,
    public_paths: Arc<Vec<String>>,
}

impl<S, B, R> Service<ServiceRequest> for AuthMiddleware<S, R>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
    R: ValueResolver<Key = String, Value = Identity> + 'static,
    R::Error: std::fmt::Debug,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let header = Authorization::<Bearer>::parse(&req)
            .ok()
            .map(|a| a.into_scheme().token().to_string());

        let is_public = self.public_paths.iter().any(|p| p == req.path());
        let cache = self.cache.clone();
        let service = self.service.clone();

        Box::pin(async move {
            match header {
                Some(token) => match cache.lock().await.get_or_resolve(&token).await {
                    Some(identity) => {
                        req.extensions_mut().insert(identity);
                        service.call(req).await
                    }
                    None if is_public => service.call(req).await,
                    None => {
                        log::debug!("{} {} Invalid session token", req.method(), req.path());
                        Err(ErrorUnauthorized("Invalid session token"))
                    }
                },
                None if is_public => service.call(req).await,
                None => {
                    log::debug!("{} {} Missing session token", req.method(), req.path());
                    Err(ErrorUnauthorized("Missing session token"))
                }
            }
        })
    }
}
