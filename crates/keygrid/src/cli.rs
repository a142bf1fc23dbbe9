use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use keygrid_core::geometry::Rect;
use keygrid_runtime::config::KeygridConfig;

use crate::check::{CheckConfigArgs, run_check_config};
use crate::error::{CliError, Result};
use crate::labels::{LabelsArgs, run_labels};
use crate::logging::{self, LogOptions};
use crate::pick::{PickArgs, run_pick};
use crate::resolve::{ResolveArgs, run_resolve};

/// Screen size used when nothing else says otherwise.
pub const DEFAULT_SCREEN: Rect = Rect::new(0, 0, 1920, 1080);

#[derive(Debug, Parser)]
#[command(
    name = "keygrid",
    about = "Move the pointer by typing grid labels",
    version
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every subcommand.
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalArgs {
    /// TOML configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Width of the addressed screen in pixels.
    #[arg(long, global = true)]
    pub width: Option<i32>,

    /// Height of the addressed screen in pixels.
    #[arg(long, global = true)]
    pub height: Option<i32>,

    /// Append logs to this file instead of stderr.
    #[arg(long = "log-file", global = true)]
    pub log_file: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long = "log-json", global = true)]
    pub log_json: bool,
}

impl GlobalArgs {
    /// The `--config` file, or built-in defaults.
    pub fn load_config(&self) -> Result<KeygridConfig> {
        let config = match &self.config {
            Some(path) => KeygridConfig::from_toml_file(path)?,
            None => KeygridConfig::default(),
        };
        tracing::debug!(
            target: "keygrid.config",
            path = ?self.config,
            "configuration loaded"
        );
        Ok(config)
    }

    /// Addressed screen: flags, then `[screen]`, then `probe`, then
    /// [`DEFAULT_SCREEN`].
    pub fn screen<F>(&self, config: &KeygridConfig, probe: F) -> Result<Rect>
    where
        F: FnOnce() -> Option<Rect>,
    {
        let rect = match (self.width, self.height) {
            (Some(width), Some(height)) => Rect::from_size(width, height),
            (None, None) => config
                .screen_rect()
                .or_else(probe)
                .unwrap_or(DEFAULT_SCREEN),
            _ => return Err(CliError::invalid("--width and --height must be given together")),
        };
        if rect.is_empty() {
            return Err(CliError::invalid(format!("screen {rect} has no area")));
        }
        Ok(rect)
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the overlay in this terminal and dispatch the chosen point.
    Pick(PickArgs),

    /// Feed a key string through a headless session and print the target.
    Resolve(ResolveArgs),

    /// Print every main-grid label with its center.
    Labels(LabelsArgs),

    /// Validate the configuration and report warnings.
    #[command(name = "check-config")]
    CheckConfig(CheckConfigArgs),
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    logging::init(LogOptions {
        file: cli.global.log_file.as_deref(),
        json: cli.global.log_json,
    })?;
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    let Cli { global, command } = cli;
    match command {
        Commands::Pick(args) => run_pick(&global, args),
        Commands::Resolve(args) => run_resolve(&global, args),
        Commands::Labels(args) => run_labels(&global, args),
        Commands::CheckConfig(args) => run_check_config(&global, args),
    }
}
