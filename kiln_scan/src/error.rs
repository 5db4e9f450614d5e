use std::io;
use std::result::Result as StdResult;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: `{0}`")]
    IoError(#[from] io::Error),
    #[error("syn error: `{0}`")]
    SynError(#[from] syn::Error),
    #[error("compile error: `{0}`")]
    CoreError(#[from] kiln_core::Error),
    #[error("toml error: `{0}`")]
    TomlError(#[from] toml::de::Error),
    #[error("crate resolve error: `{0}`")]
    CrateError(#[from] proc_macro_crate::Error),
    #[error("no parent: `{0}`")]
    NoParent(String),
    #[error("environment variable `{0}` is not set")]
    MissingEnv(&'static str),
    #[error("{0} instance error(s) reported")]
    Reported(usize),
}

pub type Result<T> = StdResult<T, Error>;
