//! CLI-specific error types and exit code mapping

use pagehint_core::error::PagehintError;

/// CLI-specific error type.
///
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// The scan completed and found problems at or above the `--fail-on` threshold.
    #[error("found {count} problem(s) at or above '{threshold}'")]
    ProblemsFound { count: usize, threshold: String },

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from pagehint-core.
    #[error("{0}")]
    Core(#[from] PagehintError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                                  |
    /// |------|------------------------------------------|
    /// | 0    | Success                                  |
    /// | 1    | General / command error                  |
    /// | 2    | Configuration error                      |
    /// | 4    | Problems found at the `--fail-on` level  |
    /// | 10   | IO error                                 |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Core(PagehintError::Config(_)) => 2,
            Self::ProblemsFound { .. } => 4,
            Self::Io(_) | Self::Core(PagehintError::Io(_)) => 10,
            Self::JsonSerialize(_) | Self::Command(_) | Self::Core(_) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagehint_core::error::{ConfigError, HintError};

    #[test]
    fn test_exit_code_config_error() {
        let err = CliError::Config("test error".to_owned());
        assert_eq!(err.exit_code(), 2, "config error should return exit code 2");
    }

    #[test]
    fn test_exit_code_core_config_error() {
        let err: CliError = PagehintError::Config(ConfigError::FileNotFound {
            path: "pagehint.toml".to_owned(),
        })
        .into();
        assert_eq!(err.exit_code(), 2, "core config error should map to 2");
    }

    #[test]
    fn test_exit_code_problems_found() {
        let err = CliError::ProblemsFound {
            count: 3,
            threshold: "warning".to_owned(),
        };
        assert_eq!(err.exit_code(), 4);
        assert_eq!(err.to_string(), "found 3 problem(s) at or above 'warning'");
    }

    #[test]
    fn test_exit_code_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        assert_eq!(CliError::Io(io_err).exit_code(), 10);

        let core_io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(CliError::Core(PagehintError::Io(core_io)).exit_code(), 10);
    }

    #[test]
    fn test_exit_code_command_and_domain_errors() {
        assert_eq!(CliError::Command("boom".to_owned()).exit_code(), 1);

        let hint_err: CliError = PagehintError::Hint(HintError::NotFound {
            id: "x".to_owned(),
        })
        .into();
        assert_eq!(hint_err.exit_code(), 1);
    }

    #[test]
    fn test_exit_code_json_serialize_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid json")
            .expect_err("should fail parsing");
        assert_eq!(CliError::JsonSerialize(json_err).exit_code(), 1);
    }

    #[test]
    fn test_error_display_config() {
        let err = CliError::Config("invalid TOML syntax".to_owned());
        let display_str = err.to_string();
        assert!(display_str.contains("configuration error"));
        assert!(display_str.contains("invalid TOML syntax"));
    }
}
