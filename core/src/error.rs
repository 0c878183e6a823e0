use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("position {position} out of range for {len} rows")]
    OutOfRange { position: usize, len: usize },

    #[error("computation failed: {0}")]
    Computation(String),
}
