pub mod cmd;
pub mod table;

pub use cmd::CommandOutput;
pub use table::ResponseTable;
