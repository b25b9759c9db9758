use structopt::StructOpt;

use fg_model::auth::NewUser;
use fg_model::UserRole;
use fg_persistence::executor::DbExecutor;
use fg_service_api::{CliCtx, CommandOutput, ResponseTable};

use crate::service::IdentityService;

/// Account management
#[derive(StructOpt, Debug)]
#[structopt(setting = structopt::clap::AppSettings::DeriveDisplayOrder)]
pub enum AccountCommand {
    /// Create an account with its marketplace profile
    Create {
        /// Display name
        #[structopt(long)]
        name: String,

        /// Sign-in email
        #[structopt(long)]
        email: String,

        /// Contact mobile number
        #[structopt(long)]
        mobile: String,

        /// Marketplace side: farmer or marketer
        #[structopt(long)]
        role: UserRole,
    },

    /// Show list of all accounts
    List,
}

impl AccountCommand {
    pub async fn run_command(self, ctx: &CliCtx) -> anyhow::Result<CommandOutput> {
        let db = DbExecutor::from_data_dir(&ctx.data_dir, "identity")?;
        let service = IdentityService::new(&db)?;

        match self {
            AccountCommand::Create {
                name,
                email,
                mobile,
                role,
            } => {
                let password = rpassword::read_password_from_tty(Some("Password: "))?;
                let session = service
                    .signup(NewUser {
                        name,
                        email,
                        mobile,
                        password,
                        user_type: role,
                    })
                    .await?;
                CommandOutput::object(session.profile)
            }
            AccountCommand::List => {
                let accounts = service.list_accounts().await?;
                Ok(ResponseTable {
                    columns: vec![
                        "id".into(),
                        "email".into(),
                        "name".into(),
                        "role".into(),
                        "created".into(),
                    ],
                    values: accounts
                        .into_iter()
                        .map(|entry| {
                            serde_json::json! {
                                [entry.profile.user_id, entry.email, entry.profile.name,
                                 entry.profile.user_type, entry.profile.created_at]
                            }
                        })
                        .collect(),
                }
                .into())
            }
        }
    }
}
