use thiserror::Error;

/// 本 crate 统一使用的 Result 别名
pub type Result<T> = std::result::Result<T, KdfError>;

#[derive(Debug, Error)]
pub enum KdfError {
    #[error("invalid Argon2 variant: {0}")]
    InvalidVariant(String),

    #[error("invalid memory cost type: {0}")]
    InvalidMemoryCostType(String),

    #[error("unsupported Argon2 version: {0}")]
    InvalidVersion(String),

    #[error("Argon2 error: {0}")]
    Argon2(#[from] argon2::Error),

    #[error("algorithm {0} not recognised")]
    UnknownAlgorithm(String),

    #[error("invalid key length for {algorithm}: {length} bytes")]
    InvalidKeyLength { algorithm: String, length: usize },

    #[error("range {offset}+{length} exceeds buffer of {available} bytes")]
    OutOfRange {
        offset: usize,
        length: usize,
        available: usize,
    },

    #[error("generator not initialised")]
    NotInitialized,
}
