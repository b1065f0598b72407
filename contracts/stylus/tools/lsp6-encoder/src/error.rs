use thiserror::Error;

#[derive(Debug, Error)]
pub enum EncoderError {
    #[error("unknown permission `{0}`")]
    UnknownPermission(String),

    #[error("unknown call type `{0}`")]
    UnknownCallType(String),

    #[error("controller {0} is granted no permissions")]
    EmptyPermissions(String),

    #[error("allowed data key 0x{0} must be between 1 and 32 bytes")]
    InvalidAllowedDataKey(String),

    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("invalid signing key: {0}")]
    SigningKey(#[from] k256::ecdsa::Error),

    #[error("bundle: {0}")]
    Bundle(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
