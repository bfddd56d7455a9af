use faststr::FastStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum Error {
    #[error("invalid recipe id {0:?}: expected 24 hex characters")]
    InvalidIdLength(FastStr),

    #[error("invalid recipe id {0:?}: {1}")]
    InvalidIdHex(FastStr, hex::FromHexError),
}

pub type Result<T> = std::result::Result<T, Error>;
