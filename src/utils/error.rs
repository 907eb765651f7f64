use thiserror::Error;

#[derive(Error, Debug)]
pub enum MokhberError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("XML error: {0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Feed error for {url}: {message}")]
    FeedError { url: String, message: String },

    #[error("Scrape error for {url}: {message}")]
    ScrapeError { url: String, message: String },

    #[error("{provider} error: {message}")]
    LlmError { provider: String, message: String },

    #[error("Telegram {method} failed ({status}): {body}")]
    TelegramError {
        method: String,
        status: u16,
        body: String,
    },

    #[error("Image manifest check failed: {message}")]
    ImageManifestError { message: String },
}

pub type Result<T> = std::result::Result<T, MokhberError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Parsing,
    Upstream,
    FileSystem,
    Packaging,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl MokhberError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            MokhberError::HttpError(_) | MokhberError::TelegramError { .. } => {
                ErrorCategory::Network
            }
            MokhberError::IoError(_) => ErrorCategory::FileSystem,
            MokhberError::SerializationError(_)
            | MokhberError::XmlError(_)
            | MokhberError::FeedError { .. }
            | MokhberError::ScrapeError { .. } => ErrorCategory::Parsing,
            MokhberError::LlmError { .. } => ErrorCategory::Upstream,
            MokhberError::ConfigError { .. }
            | MokhberError::MissingConfigError { .. }
            | MokhberError::InvalidConfigValueError { .. }
            | MokhberError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            MokhberError::ImageManifestError { .. } => ErrorCategory::Packaging,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network | ErrorCategory::Upstream => ErrorSeverity::Medium,
            ErrorCategory::Parsing | ErrorCategory::Configuration | ErrorCategory::Packaging => {
                ErrorSeverity::High
            }
            ErrorCategory::FileSystem => ErrorSeverity::Critical,
        }
    }

    /// Process exit code for an error that ends the run.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, MokhberError::IoError(e) if e.kind() == std::io::ErrorKind::NotFound)
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            MokhberError::IoError(e) if e.kind() == std::io::ErrorKind::NotFound => {
                "Check that the file exists and the path passed with --config is correct"
            }
            MokhberError::IoError(_) => "Check file permissions and free disk space",
            MokhberError::HttpError(_) => "Check network connectivity and retry the run",
            MokhberError::TelegramError { .. } => {
                "Verify the bot token, that the bot is an admin of the channel, and the channel id"
            }
            MokhberError::LlmError { .. } => {
                "Verify the AI provider API key and model name, or switch ai.provider"
            }
            MokhberError::MissingConfigError { .. } => {
                "Set the missing value in the config file or the referenced environment variable"
            }
            MokhberError::InvalidConfigValueError { .. }
            | MokhberError::ConfigValidationError { .. }
            | MokhberError::ConfigError { .. } => "Fix the configuration file and run again",
            MokhberError::SerializationError(_)
            | MokhberError::XmlError(_)
            | MokhberError::FeedError { .. }
            | MokhberError::ScrapeError { .. } => {
                "The upstream page or feed layout may have changed; inspect it manually"
            }
            MokhberError::ImageManifestError { .. } => {
                "Make sure every file the container command references is copied into the final stage"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            MokhberError::IoError(e) if e.kind() == std::io::ErrorKind::NotFound => {
                format!("File not found: {}", e)
            }
            MokhberError::MissingConfigError { field } => {
                format!("Required setting '{}' is not configured", field)
            }
            MokhberError::InvalidConfigValueError { field, reason, .. } => {
                format!("Setting '{}' is invalid: {}", field, reason)
            }
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_critical() {
        let err = MokhberError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "mokhber.toml",
        ));
        assert!(err.is_not_found());
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(err.exit_code(), 3);
        assert!(err.user_friendly_message().starts_with("File not found"));
    }

    #[test]
    fn test_config_errors_exit_with_one() {
        let err = MokhberError::MissingConfigError {
            field: "ai.gemini_api_key".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_upstream_errors_are_retryable() {
        let err = MokhberError::TelegramError {
            method: "sendMessage".to_string(),
            status: 502,
            body: "Bad Gateway".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert_eq!(err.exit_code(), 2);
    }
}
