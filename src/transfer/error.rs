//! Transfer Error Types

use thiserror::Error;

/// Errors produced by the transfer transition engine and its store.
#[derive(Error, Debug)]
pub enum TransferError {
    /// Server identifier does not resolve
    #[error("Server not found")]
    NotFound,

    /// No active transfer for the server (duplicate or stray callback)
    #[error("Server is not being transferred")]
    Conflict,

    /// The transfer record was no longer pending when the terminal outcome
    /// was written. Unreachable behind the active-transfer row lock; if it
    /// fires anyway it signals a protocol violation or a race bug and must
    /// roll back the whole transition.
    #[error("Transfer {0} already resolved")]
    AlreadyResolved(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl TransferError {
    /// Stable error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            TransferError::NotFound => "SERVER_NOT_FOUND",
            TransferError::Conflict => "NOT_BEING_TRANSFERRED",
            TransferError::AlreadyResolved(_) => "ALREADY_RESOLVED",
            TransferError::Database(_) => "DATABASE_ERROR",
        }
    }

    /// HTTP status code for the webhook response
    pub fn http_status(&self) -> u16 {
        match self {
            TransferError::NotFound => 404,
            TransferError::Conflict => 409,
            TransferError::AlreadyResolved(_) | TransferError::Database(_) => 500,
        }
    }
}
