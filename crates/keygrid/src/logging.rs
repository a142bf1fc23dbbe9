#![forbid(unsafe_code)]

//! Subscriber setup for the binary.
//!
//! The overlay owns stdout and the alternate screen, so logs go to stderr or
//! to `--log-file`. Filtering follows `KEYGRID_LOG` (`EnvFilter` syntax) and
//! defaults to `warn`.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::error::{CliError, Result};

/// Environment variable holding the filter directives.
pub const LOG_ENV: &str = "KEYGRID_LOG";

const DEFAULT_DIRECTIVE: &str = "warn";

type DynLayer = dyn Layer<Registry> + Send + Sync + 'static;

/// Where and how to write logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogOptions<'a> {
    pub file: Option<&'a Path>,
    pub json: bool,
}

/// Install the global subscriber.
pub fn init(options: LogOptions<'_>) -> Result<()> {
    let layer = build_layer(options)?;
    tracing_subscriber::registry()
        .with(layer)
        .try_init()
        .map_err(|err| CliError::Logging {
            message: err.to_string(),
        })
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

fn build_layer(options: LogOptions<'_>) -> Result<Box<DynLayer>> {
    let (writer, ansi) = match options.file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
        None => (BoxMakeWriter::new(std::io::stderr), true),
    };

    let layer = if options.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(writer)
            .with_filter(env_filter())
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_ansi(ansi)
            .with_writer(writer)
            .with_filter(env_filter())
            .boxed()
    };
    Ok(layer)
}
