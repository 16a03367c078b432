//! Error taxonomy shared by the claim and review workflows.

use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AppError {
    /// A submitted field is missing or malformed
    #[error("{message}")]
    Validation { field: &'static str, message: String },

    #[error("Account number not found: {account_number}")]
    AccountNotFound { account_number: String },

    /// The client directory could not be reached or returned garbage
    #[error("Error verifying account: {message}")]
    Lookup { message: String },

    #[error("Session expired. Please start over.")]
    SessionExpired,

    #[error("Reference number '{reference}' has already been submitted")]
    DuplicateReference { reference: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    /// Payment creation failed or the response carried no payment id
    #[error("Payment API error: {message}")]
    ExternalApi { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl AppError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn account_not_found(account_number: impl Into<String>) -> Self {
        Self::AccountNotFound {
            account_number: account_number.into(),
        }
    }

    pub fn lookup(message: impl Into<String>) -> Self {
        Self::Lookup {
            message: message.into(),
        }
    }

    pub fn duplicate_reference(reference: impl Into<String>) -> Self {
        Self::DuplicateReference {
            reference: reference.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn external_api(message: impl Into<String>) -> Self {
        Self::ExternalApi {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Errors the submitting user can fix by re-entering data on the same step.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::Validation { .. }
                | AppError::AccountNotFound { .. }
                | AppError::Lookup { .. }
                | AppError::DuplicateReference { .. }
        )
    }

    /// Errors that send the public form back to step 1.
    pub fn restarts_submission(&self) -> bool {
        matches!(self, AppError::SessionExpired)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::storage(format!("JSON error: {}", err))
    }
}
