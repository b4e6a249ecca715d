/// Error types for every layer of the application.
///
/// Each concern owns one enum. Only [`SubmitError`] and [`DispatchError`]
/// travel through iced messages, so those two are `Clone`.

use std::sync::Arc;
use thiserror::Error;

/// Configuration could not be resolved at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine a data directory; set PORTFOLIO_DATA_DIR")]
    NoDataDir,
}

/// A form rule was broken. The display string is shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a title for your artwork")]
    TitleRequired,
    #[error("The title must be at least {min} characters long")]
    TitleTooShort { min: usize },
    #[error("The title must be at most {max} characters long")]
    TitleTooLong { max: usize },
    #[error("The description must be at most {max} characters long")]
    DescriptionTooLong { max: usize },
    #[error("Please upload at least one image of your artwork")]
    ImageRequired,
    #[error("Please upload a valid image file (JPEG, PNG, GIF, or WebP): {file_name}")]
    InvalidImageType { file_name: String },
    #[error("Image size exceeds the maximum allowed (5MB): {file_name}")]
    ImageTooLarge { file_name: String },
    #[error("The year must be between {min} and {max}")]
    YearOutOfRange { min: i32, max: i32 },
}

/// Turning a picked file into a data URI failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("could not read image {file_name}: {reason}")]
    Unreadable { file_name: String, reason: String },
    #[error("image encode task failed: {0}")]
    Task(String),
}

/// Remote dispatch outcome other than `204 No Content`.
///
/// None of these abort a submission; they only select an advisory.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("no dispatch token configured")]
    CredentialMissing,
    #[error("dispatch token is malformed")]
    CredentialMalformed,
    #[error("dispatch token was rejected (401)")]
    AuthenticationRejected,
    #[error("dispatch token lacks the required permission (403)")]
    AuthorizationInsufficient,
    #[error("repository {repository} not found (404)")]
    RemoteNotFound { repository: String },
    #[error("dispatch failed: {0}")]
    Transient(String),
}

impl DispatchError {
    /// Banner text shown after an otherwise successful local save
    pub fn advisory(&self) -> &'static str {
        match self {
            DispatchError::CredentialMissing => {
                "GitHub token is not configured. Your artwork was saved locally but not to the server."
            }
            DispatchError::CredentialMalformed => {
                "GitHub token is malformed. Your artwork was saved locally but not to the server."
            }
            DispatchError::AuthenticationRejected => {
                "GitHub rejected the access token (invalid or expired). Your artwork was saved locally only."
            }
            DispatchError::AuthorizationInsufficient => {
                "The access token cannot trigger the publishing workflow. Your artwork was saved locally only."
            }
            DispatchError::RemoteNotFound { .. } => {
                "The portfolio repository could not be found. Your artwork was saved locally only."
            }
            DispatchError::Transient(_) => {
                "Error submitting artwork to the server. Please try again later. Your artwork was saved locally."
            }
        }
    }

    /// True when the dispatch was never attempted because of local configuration
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            DispatchError::CredentialMissing | DispatchError::CredentialMalformed
        )
    }
}

/// Local cache tier failure
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cache database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("cache directory error: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not serialize collection: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("cache task failed: {0}")]
    Task(String),
}

/// One load-time tier could not produce a collection
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed collection: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A submission did not produce a persisted artwork
#[derive(Debug, Clone, Error)]
pub enum SubmitError {
    #[error("A submission is already in progress")]
    Busy,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    Encode(#[from] EncodeError),
    #[error("Your artwork could not be saved: {0}")]
    Persist(Arc<StoreError>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_dispatch_error_has_distinct_advisory() {
        let errors = [
            DispatchError::CredentialMissing,
            DispatchError::CredentialMalformed,
            DispatchError::AuthenticationRejected,
            DispatchError::AuthorizationInsufficient,
            DispatchError::RemoteNotFound {
                repository: "a/b".to_string(),
            },
            DispatchError::Transient("timeout".to_string()),
        ];

        let mut advisories: Vec<&str> = errors.iter().map(DispatchError::advisory).collect();
        advisories.sort_unstable();
        advisories.dedup();

        assert_eq!(advisories.len(), errors.len());
    }

    #[test]
    fn test_only_credential_errors_are_configuration() {
        assert!(DispatchError::CredentialMissing.is_configuration());
        assert!(DispatchError::CredentialMalformed.is_configuration());
        assert!(!DispatchError::AuthenticationRejected.is_configuration());
        assert!(!DispatchError::Transient("x".into()).is_configuration());
    }
}
