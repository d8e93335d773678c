use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid screening date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
