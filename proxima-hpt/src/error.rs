//! Error types for proxima-hpt

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HapticError {
    #[error("Haptic hardware unavailable")]
    Unavailable,

    #[error("Haptic device error: {0}")]
    Device(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(HapticError::Unavailable.to_string(), "Haptic hardware unavailable");
        let err = HapticError::Device("engine reset".to_string());
        assert_eq!(err.to_string(), "Haptic device error: engine reset");
    }
}
