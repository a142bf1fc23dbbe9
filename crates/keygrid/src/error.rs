use keygrid_runtime::config::ConfigError;
use keygrid_runtime::session::SessionError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Session(#[from] SessionError),

    #[error("missing dependency command: {command}")]
    MissingCommand { command: String },

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("keys did not resolve to a target: {keys}")]
    Unresolved { keys: String },

    #[error("selection cancelled")]
    Cancelled,

    #[error("pointer dispatch failed")]
    DispatchFailed,

    #[error("cannot initialize logging: {message}")]
    Logging { message: String },
}

impl CliError {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::InvalidArgument { .. } => 2,
            Self::Unresolved { .. } => 3,
            Self::DispatchFailed => 4,
            Self::Cancelled => 130,
            Self::MissingCommand { .. } => 127,
            _ => 1,
        }
    }

    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CliError;
    use keygrid_runtime::config::ConfigError;

    #[test]
    fn config_errors_are_usage_errors() {
        let error = CliError::from(ConfigError::Validation(vec!["rows empty".into()]));
        assert_eq!(error.exit_code(), 2);
        assert!(error.to_string().contains("rows empty"));
    }

    #[test]
    fn distinct_codes_for_script_callers() {
        assert_eq!(CliError::invalid("x").exit_code(), 2);
        assert_eq!(
            CliError::Unresolved {
                keys: "qz".to_string()
            }
            .exit_code(),
            3
        );
        assert_eq!(CliError::DispatchFailed.exit_code(), 4);
        assert_eq!(CliError::Cancelled.exit_code(), 130);
        assert_eq!(
            CliError::MissingCommand {
                command: "xdotool".to_string()
            }
            .exit_code(),
            127
        );
    }
}
