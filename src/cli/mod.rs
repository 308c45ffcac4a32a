pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{CliArgs, DialectArg, OutputFormatArg};
pub use handlers::{handle, EXIT_BLOCKED, EXIT_FAILURE, EXIT_SUCCESS};
pub use output::{OutputFormat, OutputFormatter, Summary};
