use std::path::PathBuf;

pub mod constants;

pub use fg_utils_cli::{CommandOutput, ResponseTable};

/// Context shared by all CLI command handlers.
#[derive(Clone, Debug)]
pub struct CliCtx {
    pub data_dir: PathBuf,
    pub address: (String, u16),
    pub json_output: bool,
}

impl CliCtx {
    pub fn address(&self) -> (&str, u16) {
        (&self.address.0, self.address.1)
    }

    pub fn output(&self, output: CommandOutput) -> anyhow::Result<()> {
        output.print(self.json_output)
    }
}
