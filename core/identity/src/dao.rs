pub mod account;
pub mod profile;
pub mod token;

use thiserror::Error;

pub use account::AccountDao;
pub use profile::ProfileDao;
pub use token::TokenDao;

#[derive(Error, Debug)]
pub enum Error {
    #[error("DB connection error: {0}")]
    Db(#[from] r2d2::Error),
    #[error("DAO error: {0}")]
    Dao(#[from] diesel::result::Error),
    #[error("Runtime error: {0}")]
    Runtime(#[from] tokio::task::JoinError),
    #[error("Password hashing error: {0}")]
    Crypto(String),
    #[error("Already exists")]
    AlreadyExists,
    #[error("Not found")]
    NotFound,
}

impl From<bcrypt::BcryptError> for Error {
    fn from(e: bcrypt::BcryptError) -> Self {
        Error::Crypto(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
