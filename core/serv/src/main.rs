use std::convert::TryFrom;
use std::fmt;
use std::path::PathBuf;

use anyhow::{Context, Result};
use structopt::{clap, StructOpt};

use fg_file_logging::start_logger;
use fg_service_api::constants::{rest_api_url, DEFAULT_API_HOST, DEFAULT_API_PORT};
use fg_service_api::{CliCtx, CommandOutput};
use fg_utils_path::data_dir::DataDir;

mod services;

const LOG_MODULES: &str = "actix_server=info,actix_web=info";

#[derive(StructOpt, Debug)]
#[structopt(global_setting = clap::AppSettings::ColoredHelp)]
#[structopt(about = clap::crate_description!())]
#[structopt(setting = clap::AppSettings::DeriveDisplayOrder)]
struct CliArgs {
    /// Daemon data dir
    #[structopt(short, long = "datadir", env = "FARMGATE_DATA_DIR")]
    #[structopt(set = clap::ArgSettings::Global)]
    data_dir: Option<DataDir>,

    /// Daemon address
    #[structopt(short, long, env = "FARMGATE_HOST")]
    address: Option<String>,

    /// Daemon port
    #[structopt(short, long, env = "FARMGATE_HTTP_PORT")]
    port: Option<u16>,

    /// Return results in JSON format
    #[structopt(long)]
    #[structopt(set = clap::ArgSettings::Global)]
    json: bool,

    #[structopt(subcommand)]
    command: CliCommand,
}

impl CliArgs {
    pub fn get_data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(data_dir) => data_dir.get_or_create(),
            None => DataDir::new(clap::crate_name!()).get_or_create(),
        }
    }

    pub fn get_address(&self) -> Result<(String, u16)> {
        let api_url = rest_api_url()?;
        let host = self
            .address
            .clone()
            .or_else(|| api_url.host_str().map(ToString::to_string))
            .unwrap_or_else(|| DEFAULT_API_HOST.to_string());
        let port = self
            .port
            .or_else(|| api_url.port_or_known_default())
            .unwrap_or(DEFAULT_API_PORT);
        Ok((host, port))
    }
}

impl TryFrom<&CliArgs> for CliCtx {
    type Error = anyhow::Error;

    fn try_from(args: &CliArgs) -> Result<Self> {
        let data_dir = args.get_data_dir()?;
        let address = args.get_address()?;
        let json_output = args.json;

        Ok(CliCtx {
            data_dir,
            address,
            json_output,
        })
    }
}

#[derive(StructOpt, Debug)]
enum CliCommand {
    /// Core service usage
    #[structopt(setting = clap::AppSettings::DeriveDisplayOrder)]
    Service(ServiceCommand),

    /// Account management
    #[structopt(setting = clap::AppSettings::DeriveDisplayOrder)]
    Account(fg_identity::cli::AccountCommand),

    /// Marketplace browsing
    #[structopt(setting = clap::AppSettings::DeriveDisplayOrder)]
    Market(fg_market::cli::MarketCommand),

    /// Database management
    #[structopt(setting = clap::AppSettings::DeriveDisplayOrder)]
    Db(fg_persistence::service::Command),

    #[structopt(name = "complete")]
    #[structopt(setting = clap::AppSettings::Hidden)]
    Complete(CompleteCommand),
}

impl CliCommand {
    pub async fn run_command(self, ctx: &CliCtx) -> Result<CommandOutput> {
        match self {
            CliCommand::Service(service) => service.run_command(ctx).await,
            CliCommand::Account(account) => account.run_command(ctx).await,
            CliCommand::Market(market) => market.run_command(ctx).await,
            CliCommand::Db(db) => db.run_command(ctx).await,
            CliCommand::Complete(complete) => complete.run_command(ctx),
        }
    }
}

#[derive(StructOpt, Debug)]
enum ServiceCommand {
    /// Runs server in foreground
    Run,
}

impl ServiceCommand {
    pub async fn run_command(self, ctx: &CliCtx) -> Result<CommandOutput> {
        match self {
            Self::Run => {
                log::info!("Starting {} service!", clap::crate_name!());
                services::run_server(ctx).await?;
                Ok(CommandOutput::NoOutput)
            }
        }
    }
}

#[derive(StructOpt)]
/// Generates autocomplete script from given shell
struct CompleteCommand {
    /// Describes which shell to produce a completions file for
    #[structopt(
        parse(try_from_str),
        possible_values = &clap::Shell::variants(),
        case_insensitive = true
    )]
    shell: clap::Shell,
}

impl fmt::Debug for CompleteCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        writeln!(f, "complete({})", self.shell)
    }
}

impl CompleteCommand {
    pub fn run_command(&self, _ctx: &CliCtx) -> Result<CommandOutput> {
        let binary_name = clap::crate_name!();
        println!(
            "# generating {} completions for {}",
            binary_name, self.shell
        );
        CliArgs::clap().gen_completions_to(binary_name, self.shell, &mut std::io::stdout());

        Ok(CommandOutput::NoOutput)
    }
}

#[actix_web::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = CliArgs::from_args();
    let ctx = CliCtx::try_from(&args)?;

    match &args.command {
        CliCommand::Service(ServiceCommand::Run) => {
            let log_dir = ctx.data_dir.join("logs");
            std::fs::create_dir_all(&log_dir)
                .context(format!("invalid log dir: {}", log_dir.display()))?;
            start_logger("info", Some(&log_dir), LOG_MODULES, false)?;
        }
        _ => {
            start_logger("warn", None, LOG_MODULES, false)?;
        }
    }

    let output = args.command.run_command(&ctx).await?;
    ctx.output(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_address_flags_win() {
        let args =
            CliArgs::from_iter(["farmgate", "-a", "0.0.0.0", "-p", "7700", "service", "run"]);
        let (host, port) = args.get_address().unwrap();
        assert_eq!(host, "0.0.0.0");
        assert_eq!(port, 7700);
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let args = CliArgs::from_iter(["farmgate", "account", "list", "--json"]);
        assert!(args.json);
    }
}
