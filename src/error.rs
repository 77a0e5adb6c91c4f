use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum GatewayError {
    #[error("Failed to bind RPC listener: {0}")]
    RpcBindFailed(String),

    #[error(transparent)]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GatewayError>;
