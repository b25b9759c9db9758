use anyhow::Result;
use serde::Serialize;
use serde_json::Value;

use crate::table;

/// What a CLI handler hands back for rendering. `--json` switches every
/// variant to machine-readable output.
pub enum CommandOutput {
    NoOutput,
    Object(Value),
    Table {
        columns: Vec<String>,
        values: Vec<Value>,
    },
}

impl CommandOutput {
    pub fn object<T: Serialize>(value: T) -> Result<Self> {
        Ok(CommandOutput::Object(serde_json::to_value(value)?))
    }

    pub fn print(&self, json_output: bool) -> Result<()> {
        if json_output {
            return self.print_json();
        }
        match self {
            CommandOutput::NoOutput => {}
            CommandOutput::Object(Value::String(s)) => println!("{}", s),
            CommandOutput::Object(value) => println!("{}", serde_yaml::to_string(value)?),
            CommandOutput::Table { columns, values } => table::print_table(columns, values),
        }
        Ok(())
    }

    fn print_json(&self) -> Result<()> {
        match self {
            CommandOutput::NoOutput => println!("null"),
            CommandOutput::Object(value) => println!("{}", serde_json::to_string_pretty(value)?),
            CommandOutput::Table { columns, values } => table::print_json_table(columns, values)?,
        }
        Ok(())
    }
}

impl From<()> for CommandOutput {
    fn from(_: ()) -> Self {
        CommandOutput::NoOutput
    }
}
