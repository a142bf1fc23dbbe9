#![forbid(unsafe_code)]

pub mod check;
pub mod cli;
pub mod error;
pub mod labels;
pub mod logging;
pub mod overlay;
pub mod pick;
pub mod pointer;
pub mod resolve;
pub mod terminal;

pub use cli::run_from_env;
pub use error::{CliError, Result};
