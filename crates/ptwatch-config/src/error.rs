//! Error types for configuration loading and validation.

use thiserror::Error;

/// Primary error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not set.
    #[error("missing environment variable {name}")]
    MissingEnv {
        /// Name of the missing variable.
        name: &'static str,
    },
    /// Config file could not be read.
    #[error("failed to read configuration file {path}")]
    Io {
        /// Path that could not be read.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// Config file contents did not parse as YAML.
    #[error("failed to parse configuration file {path}")]
    Parse {
        /// Path that failed to parse.
        path: String,
        /// Underlying parse error.
        #[source]
        source: serde_yaml::Error,
    },
    /// A field failed semantic validation (distinct from syntactic parse failure).
    #[error("invalid configuration field {field}: {reason}")]
    Invalid {
        /// Dotted field path, e.g. `sites[0].include_rules[1]`.
        field: String,
        /// Human-readable reason.
        reason: String,
    },
    /// Fatal misconfiguration: no client selected, or no sites configured.
    #[error("fatal misconfiguration: {reason}")]
    Fatal {
        /// Human-readable reason.
        reason: String,
    },
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;
