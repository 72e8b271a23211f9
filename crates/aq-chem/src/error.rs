//! Chemistry errors.

use thiserror::Error;

/// Result type for chemistry operations.
pub type ChemResult<T> = Result<T, ChemError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChemError {
    #[error("Unknown ion: {key}")]
    UnknownIon { key: String },

    #[error("Unknown charge-balance mode: {name}")]
    UnknownMode { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ChemError::UnknownIon { key: "Xx".into() };
        assert!(err.to_string().contains("Xx"));
    }
}
