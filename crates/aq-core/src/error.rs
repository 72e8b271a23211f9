use thiserror::Error;

pub type AqResult<T> = Result<T, AqError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AqError {
    #[error("Unknown unit system '{name}' (expected metric or us)")]
    UnknownUnitSystem { name: String },
}
