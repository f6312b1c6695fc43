use std::collections::TryReserveError;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("buffer allocation failed: {0}")]
    Allocation(#[from] TryReserveError),

    #[error("unknown code name: {0:?}")]
    UnknownCodeName(String),
}
