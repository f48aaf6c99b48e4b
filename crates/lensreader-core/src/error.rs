use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Input errors
    #[error("Invalid tag line: {0}")]
    InvalidTagLine(String),

    #[error("Invalid tag identifier: {0}")]
    InvalidTagId(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
