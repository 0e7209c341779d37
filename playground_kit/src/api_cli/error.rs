use std::io;

use thiserror::Error;

use playground_core::DispatchError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Request failed: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("JSON parsing failed: {0}")]
    JsonParseFailed(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unknown service `{0}`")]
    UnknownService(String),

    #[error("CLI error: {0}")]
    CliError(#[from] clap::error::Error),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
