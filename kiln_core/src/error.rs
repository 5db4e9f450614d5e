use std::io;
use std::result::Result as StdResult;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{element}: {message}")]
    Validation { element: String, message: String },
    #[error("compiler fault at {element}: {message}")]
    Internal { element: String, message: String },
    #[error("io error: `{0}`")]
    Io(#[from] io::Error),
}

impl Error {
    pub fn validation(element: impl ToString, message: impl ToString) -> Self {
        Self::Validation {
            element: element.to_string(),
            message: message.to_string(),
        }
    }

    pub fn internal(element: impl ToString, message: impl ToString) -> Self {
        Self::Internal {
            element: element.to_string(),
            message: message.to_string(),
        }
    }

    /// Attribute syntax errors are user mistakes, so they surface as validation errors.
    pub fn from_syn(element: impl ToString, err: syn::Error) -> Self {
        Self::validation(element, err)
    }
}

pub type Result<T> = StdResult<T, Error>;
