use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TimingError {
    #[error("Cannot open input log {path}")]
    InputOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read input log {path}")]
    InputRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write output file {path}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Unknown dataset group: {name}")]
    UnknownDatasetGroup { name: String, available: Vec<String> },

    #[error("Operation was cancelled by user")]
    Cancelled,
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for TimingError {
    fn user_message(&self) -> String {
        match self {
            TimingError::InputOpen { path, source } => {
                format!("Cannot open input log {}: {}", path.display(), source)
            }
            TimingError::InputRead { path, source } => {
                format!("Failed while reading {}: {}", path.display(), source)
            }
            TimingError::OutputWrite { path, source } => {
                format!("Failed to write {}: {}", path.display(), source)
            }
            TimingError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            TimingError::UnknownDatasetGroup { name, available } => {
                format!(
                    "Dataset group '{}' is not defined (available: {})",
                    name,
                    available.join(", ")
                )
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            TimingError::InputOpen { .. } => Some(
                "Check --input-dir and the run parameters; use --dry-run to list every expected log file.".to_string()
            ),
            TimingError::OutputWrite { .. } => Some(
                "Ensure the output directory exists and is writable, or pick another one with --output-dir.".to_string()
            ),
            TimingError::Config { .. } => Some(
                "Check your configuration file syntax; --generate-config writes a complete sample.".to_string()
            ),
            TimingError::UnknownDatasetGroup { .. } => Some(
                "Run with --list-groups to see the configured dataset groups.".to_string()
            ),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, TimingError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_user_friendly_messages() {
        let error = TimingError::InputOpen {
            path: PathBuf::from("/logs/nell2-b7-k7-c14-m0-r16-tk8-tb1.txt"),
            source: io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
        };
        assert!(error.user_message().contains("nell2-b7-k7-c14-m0-r16-tk8-tb1.txt"));
        assert!(error.user_message().contains("No such file"));
        assert!(error.suggestion().is_some());
    }

    #[test]
    fn test_unknown_group_lists_available() {
        let error = TimingError::UnknownDatasetGroup {
            name: "huge".to_string(),
            available: vec!["s3".to_string(), "test".to_string()],
        };
        assert_eq!(
            error.user_message(),
            "Dataset group 'huge' is not defined (available: s3, test)"
        );
    }

    #[test]
    fn test_cancelled_has_no_suggestion() {
        assert!(TimingError::Cancelled.suggestion().is_none());
        assert_eq!(TimingError::Cancelled.user_message(), "Operation was cancelled by user");
    }
}
