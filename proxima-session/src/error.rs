//! Error types for proxima-session

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session already running")]
    AlreadyRunning,

    #[error("Core error: {0}")]
    Core(#[from] proxima_core::ProximaError),
}
