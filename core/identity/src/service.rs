use std::pin::Pin;
use std::sync::{Arc, Mutex};

use actix_web::web::Data;
use futures::{Future, FutureExt};
use lazy_static::lazy_static;
use thiserror::Error;

use fg_model::auth::{Credentials, NewUser, SessionInfo, UserProfile, AUTH_API_PATH};
use fg_persistence::executor::DbExecutor;
use fg_service_api_cache::ValueResolver;
use fg_service_api_interfaces::{Provider, Service};
use fg_service_api_web::middleware::Identity;
use fg_service_api_web::scope::ExtendableScope;

use crate::dao::{self, AccountDao, ProfileDao, TokenDao};
use crate::db::models::Profile;
use crate::rest;

const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Error, Debug)]
pub enum InitError {
    #[error("Failed to migrate identity database. Error: {0}.")]
    Migration(#[from] fg_persistence::executor::Error),
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Email already registered")]
    AlreadyExists,
    #[error("{0}")]
    BadRequest(String),
    #[error("Profile not found")]
    NotFound,
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<dao::Error> for AuthError {
    fn from(e: dao::Error) -> Self {
        match e {
            dao::Error::AlreadyExists => AuthError::AlreadyExists,
            dao::Error::NotFound => AuthError::NotFound,
            e => AuthError::Internal(e.to_string()),
        }
    }
}

/// Account row the CLI renders. Keeps the sign-in email next to the
/// public profile.
pub struct AccountEntry {
    pub email: String,
    pub profile: UserProfile,
}

pub struct IdentityService {
    db: DbExecutor,
}

impl IdentityService {
    pub fn new(db: &DbExecutor) -> Result<Self, InitError> {
        db.apply_migration(crate::db::migrations::run_with_output)?;
        Ok(IdentityService { db: db.clone() })
    }

    pub async fn signup(&self, new_user: NewUser) -> Result<SessionInfo, AuthError> {
        validate_signup(&new_user)?;

        let (account, profile) = self.db.as_dao::<AccountDao>().create(new_user).await?;
        let token = self.db.as_dao::<TokenDao>().create(account.id).await?;

        log::info!(
            "Created {} account for {}",
            profile.user_type,
            profile.name
        );
        Ok(SessionInfo {
            token: token.token,
            profile: profile.into_client(),
        })
    }

    pub async fn signin(&self, credentials: Credentials) -> Result<SessionInfo, AuthError> {
        let account = self
            .db
            .as_dao::<AccountDao>()
            .authenticate(credentials)
            .await
            .map_err(|e| match e {
                dao::Error::NotFound => AuthError::InvalidCredentials,
                e => e.into(),
            })?;

        let profile = self
            .db
            .as_dao::<ProfileDao>()
            .get_by_user_id(account.id.clone())
            .await?;
        let token = self.db.as_dao::<TokenDao>().create(account.id).await?;

        Ok(SessionInfo {
            token: token.token,
            profile: profile.into_client(),
        })
    }

    /// Invalidates a session token. Tokens already dropped by a
    /// concurrent signout are not an error.
    pub async fn signout(&self, token: &str) -> Result<(), AuthError> {
        self.db.as_dao::<TokenDao>().remove(token.to_string()).await?;
        Ok(())
    }

    pub async fn me(&self, id: &Identity) -> Result<UserProfile, AuthError> {
        let profile = self
            .db
            .as_dao::<ProfileDao>()
            .get_by_user_id(id.user_id.clone())
            .await?;
        Ok(profile.into_client())
    }

    /// Maps a session token to the caller identity. Used by the auth
    /// middleware through [`AuthResolver`].
    pub async fn resolve_token(&self, token: &str) -> Result<Option<Identity>, AuthError> {
        let profile = self
            .db
            .as_dao::<TokenDao>()
            .resolve(token.to_string())
            .await?;
        Ok(profile.map(|profile| Identity {
            user_id: profile.user_id,
            name: profile.name,
            role: profile.user_type,
        }))
    }

    /// Profile display data for listing enrichment in other services.
    pub async fn profiles_by_user_ids(
        &self,
        user_ids: Vec<String>,
    ) -> Result<Vec<UserProfile>, AuthError> {
        let profiles = self.db.as_dao::<ProfileDao>().by_user_ids(user_ids).await?;
        Ok(profiles.into_iter().map(Profile::into_client).collect())
    }

    pub async fn list_accounts(&self) -> Result<Vec<AccountEntry>, AuthError> {
        let accounts = self.db.as_dao::<AccountDao>().list().await?;
        Ok(accounts
            .into_iter()
            .map(|(account, profile)| AccountEntry {
                email: account.email,
                profile: profile.into_client(),
            })
            .collect())
    }

    pub fn get_or_init<Context: Provider<Self, DbExecutor>>(
        ctx: &Context,
    ) -> Result<Arc<IdentityService>, InitError> {
        IDENTITY.get_or_init(&ctx.component())
    }

    pub fn rest<Context: Provider<Self, DbExecutor>>(ctx: &Context) -> actix_web::Scope {
        match Self::get_or_init(ctx) {
            Ok(identity) => Self::bind_rest(identity),
            Err(e) => {
                log::error!("REST API initialization failed: {}", e);
                panic!("Identity service initialization impossible: {}", e)
            }
        }
    }

    pub fn bind_rest(myself: Arc<IdentityService>) -> actix_web::Scope {
        actix_web::web::scope(AUTH_API_PATH)
            .app_data(Data::new(myself))
            .app_data(Data::new(rest::json_config()))
            .extend(rest::register_endpoints)
    }
}

fn validate_signup(new_user: &NewUser) -> Result<(), AuthError> {
    if new_user.name.trim().is_empty() {
        return Err(AuthError::BadRequest("name must not be empty".to_string()));
    }
    if new_user.email.trim().is_empty() || !new_user.email.contains('@') {
        return Err(AuthError::BadRequest("a valid email is required".to_string()));
    }
    if new_user.mobile.trim().is_empty() {
        return Err(AuthError::BadRequest(
            "mobile number must not be empty".to_string(),
        ));
    }
    if new_user.password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::BadRequest(format!(
            "password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

impl Service for IdentityService {
    type Cli = crate::cli::AccountCommand;
}

/// Resolver plugged into the auth middleware cache. Reads the service
/// from the process-wide static, so the REST scope must be bound first.
#[derive(Default)]
pub struct AuthResolver;

impl ValueResolver for AuthResolver {
    type Key = String;
    type Value = Identity;
    type Error = AuthError;

    fn resolve<'a>(
        &self,
        key: &Self::Key,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Identity>, Self::Error>> + 'a>> {
        let key = key.clone();
        async move {
            let service = match IDENTITY.get() {
                Some(service) => service,
                None => {
                    log::error!("Identity service not initialized");
                    return Ok(None);
                }
            };
            service.resolve_token(&key).await
        }
        .boxed_local()
    }
}

// =========================================== //
// Awful static initialization. Necessary to
// share the service between the REST scope
// and the auth middleware resolver.
// =========================================== //

struct StaticIdentity {
    locked: Mutex<Option<Arc<IdentityService>>>,
}

impl StaticIdentity {
    fn new() -> StaticIdentity {
        StaticIdentity {
            locked: Mutex::new(None),
        }
    }

    fn get_or_init(&self, db: &DbExecutor) -> Result<Arc<IdentityService>, InitError> {
        let mut guarded = self.locked.lock().unwrap();
        if let Some(service) = &*guarded {
            Ok(service.clone())
        } else {
            let service = Arc::new(IdentityService::new(db)?);
            *guarded = Some(service.clone());
            Ok(service)
        }
    }

    fn get(&self) -> Option<Arc<IdentityService>> {
        self.locked.lock().unwrap().clone()
    }
}

lazy_static! {
    static ref IDENTITY: StaticIdentity = StaticIdentity::new();
}
