use std::sync::Arc;

use actix_web::{middleware, App, HttpServer};
use anyhow::{Context, Result};

use fg_identity::{AuthResolver, IdentityService};
use fg_market::MarketService;
use fg_model::auth::AUTH_API_PATH;
use fg_model::market::MARKET_API_PATH;
use fg_persistence::executor::DbExecutor;
use fg_persistence::service::Persistence;
use fg_service_api::CliCtx;
use fg_service_api_interfaces::Provider;
use fg_service_api_web::middleware::Auth;

/// Wiring context handed to service constructors. Each service gets its
/// own database file in the daemon data dir.
#[derive(Clone)]
pub struct ServiceContext {
    cli_ctx: CliCtx,
    identity_db: DbExecutor,
    market_db: DbExecutor,
}

impl ServiceContext {
    pub fn new(ctx: &CliCtx) -> Result<Self> {
        let identity_db = DbExecutor::from_data_dir(&ctx.data_dir, "identity")?;
        let market_db = DbExecutor::from_data_dir(&ctx.data_dir, "market")?;
        Ok(ServiceContext {
            cli_ctx: ctx.clone(),
            identity_db,
            market_db,
        })
    }
}

impl Provider<IdentityService, DbExecutor> for ServiceContext {
    fn component(&self) -> DbExecutor {
        self.identity_db.clone()
    }
}

impl Provider<MarketService, DbExecutor> for ServiceContext {
    fn component(&self) -> DbExecutor {
        self.market_db.clone()
    }
}

impl Provider<MarketService, Arc<IdentityService>> for ServiceContext {
    fn component(&self) -> Arc<IdentityService> {
        match IdentityService::get_or_init(self) {
            Ok(identity) => identity,
            Err(e) => {
                log::error!("Identity service initialization failed: {}", e);
                panic!("Identity service initialization impossible: {}", e)
            }
        }
    }
}

impl Provider<Persistence, CliCtx> for ServiceContext {
    fn component(&self) -> CliCtx {
        self.cli_ctx.clone()
    }
}

fn public_paths() -> Vec<String> {
    vec![
        format!("{}/signup", AUTH_API_PATH),
        format!("{}/signin", AUTH_API_PATH),
        format!("{}/prices/latest", MARKET_API_PATH),
    ]
}

pub async fn run_server(ctx: &CliCtx) -> Result<()> {
    let context = ServiceContext::new(ctx)?;

    // Bind the identity service before the server workers fork, the auth
    // middleware resolver reads the same static.
    IdentityService::get_or_init(&context)?;
    Persistence::startup(&context).await?;

    let rest_address = ctx.address();
    log::info!("Http server thread started on: {:?}", rest_address);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .wrap(Auth::new(AuthResolver::default(), public_paths()))
            .service(IdentityService::rest(&context))
            .service(MarketService::rest(&context))
    })
    .bind(rest_address)
    .context(format!("Failed to bind {:?}", rest_address))?
    .run()
    .await?;

    Ok(())
}
