#![forbid(unsafe_code)]

//! `keygrid check-config`: validate without running a session.

use std::io::{self, Write};

use clap::Args;
use keygrid_runtime::config::KeygridConfig;

use crate::cli::GlobalArgs;
use crate::error::Result;

#[derive(Debug, Clone, Default, Args)]
pub struct CheckConfigArgs {
    /// Also print the effective configuration as TOML.
    #[arg(long)]
    pub print: bool,
}

pub fn run_check_config(global: &GlobalArgs, args: CheckConfigArgs) -> Result<()> {
    let config = global.load_config()?;
    check_config(&mut io::stdout().lock(), &config, args.print)
}

/// Print `ok` or one `warning:` line per finding. Fatal problems are errors.
pub fn check_config<W: Write>(out: &mut W, config: &KeygridConfig, print: bool) -> Result<()> {
    let warnings = config.validate()?;
    if warnings.is_empty() {
        writeln!(out, "ok")?;
    }
    for warning in &warnings {
        writeln!(out, "warning: {warning}")?;
    }
    if print {
        write!(out, "{}", config.to_toml_string()?)?;
    }
    Ok(())
}
