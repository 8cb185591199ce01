pub mod cli;

pub use cli::{Cli, Commands, NetworkArgs, OutputFormat};
