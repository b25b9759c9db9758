#![allow(clippy::ptr_arg)]

use std::path::{Path, PathBuf};
use structopt::StructOpt;

use fg_service_api::{CliCtx, CommandOutput};
use fg_service_api_interfaces::{Provider, Service};

use crate::executor::DbExecutor;

/// Persistence service
pub struct Persistence;

impl Service for Persistence {
    type Cli = Command;
}

impl Persistence {
    /// Rebuilds databases whose WAL file outgrew the database itself.
    /// Runs once on daemon startup.
    pub async fn startup<Context: Provider<Self, CliCtx>>(context: &Context) -> anyhow::Result<()> {
        let ctx = context.component();
        vacuum(&ctx.data_dir, filter::wal_larger_than_db, false).await?;
        Ok(())
    }
}

/// Database management
#[derive(StructOpt, Debug)]
pub enum Command {
    /// Rebuild databases to reduce size
    #[structopt(setting = structopt::clap::AppSettings::DeriveDisplayOrder)]
    Vacuum {
        /// List target databases without rebuilding them
        #[structopt(long)]
        dry_run: bool,
    },
}

impl Command {
    pub async fn run_command(self, ctx: &CliCtx) -> anyhow::Result<CommandOutput> {
        match self {
            Command::Vacuum { dry_run } => vacuum(&ctx.data_dir, filter::any, dry_run).await,
        }
    }
}

async fn vacuum<F, P>(data_dir: P, filter: F, dry_run: bool) -> anyhow::Result<CommandOutput>
where
    F: Fn(&PathBuf) -> bool,
    P: AsRef<Path>,
{
    let db_files = std::fs::read_dir(&data_dir)?
        .filter_map(|r| r.map(|e| e.path()).ok())
        .filter(|p| !p.is_dir())
        .filter(|p| {
            p.extension()
                .map(|e| {
                    let ext = e.to_string_lossy().to_lowercase();
                    ext.as_str() == "db"
                })
                .unwrap_or(false)
        })
        .filter(filter)
        .collect::<Vec<_>>();

    if db_files.is_empty() {
        return Ok(CommandOutput::Object(serde_json::Value::String(
            "no databases found to vacuum".to_string(),
        )));
    }

    if dry_run {
        return Ok(CommandOutput::Object(serde_json::Value::Array(
            db_files
                .iter()
                .map(|p| serde_json::Value::String(p.display().to_string()))
                .collect(),
        )));
    }

    for db_file in db_files {
        eprintln!("vacuuming {}", db_file.display());
        let db = DbExecutor::new(db_file.display().to_string())?;
        db.execute("VACUUM;").await?;
    }

    Ok(CommandOutput::NoOutput)
}

mod filter {
    use std::path::PathBuf;

    pub(super) fn any(_: &PathBuf) -> bool {
        true
    }

    pub(super) fn wal_larger_than_db(db: &PathBuf) -> bool {
        let mut wal = db.to_path_buf();
        wal.set_extension("db-wal");

        let db_meta = match db.metadata() {
            Ok(meta) => meta,
            _ => return false,
        };
        let wal_meta = match wal.metadata() {
            Ok(meta) => meta,
            _ => return false,
        };

        wal_meta.len() > db_meta.len()
    }
}
