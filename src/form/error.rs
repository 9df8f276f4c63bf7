use thiserror::Error;

use crate::api::ApiError;

/// Loading the record behind an edit form failed. Fatal to that form.
#[derive(Debug, Error)]
#[error("Failed to load user data. Please try again.")]
pub struct FetchError {
    #[source]
    pub source: ApiError,
}

/// A create or update request failed. The form stays editable.
#[derive(Debug, Error)]
#[error("Failed to save data. Check the information and try again.")]
pub struct SubmitError {
    #[source]
    pub source: ApiError,
}

impl From<ApiError> for FetchError {
    fn from(source: ApiError) -> Self {
        FetchError { source }
    }
}

impl From<ApiError> for SubmitError {
    fn from(source: ApiError) -> Self {
        SubmitError { source }
    }
}
