use std::result::Result as StdResult;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum KilnError {
    #[error("no instance of `{type_name}` with classifier `{classifier}`")]
    NotFound {
        type_name: &'static str,
        classifier: String,
    },
    #[error("{count} instances of `{type_name}` with classifier `{classifier}`, expected one")]
    Ambiguous {
        type_name: &'static str,
        classifier: String,
        count: usize,
    },
    #[error("lazy `{type_name}` needs a scope that provides an owned handle")]
    Detached { type_name: &'static str },
    #[error("scope returned something other than `Arc<{type_name}>`")]
    TypeMismatch { type_name: &'static str },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = StdResult<T, KilnError>;
