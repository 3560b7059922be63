//! Tweenie error types

use thiserror::Error;

/// Errors a setter can report while applying a tweened value
///
/// Neither variant ever reaches the caller of [`Tweenie::update`](crate::Tweenie::update):
/// the scheduler tears the failing tweener down, logs the error and keeps
/// running the frame.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SetterError {
    /// The object the setter writes into no longer exists
    #[error("tween target is no longer available")]
    TargetUnavailable,

    /// Any other failure raised while applying the value
    #[error("setter failed: {0}")]
    Fault(String),
}

impl SetterError {
    /// Create a [`SetterError::Fault`] from anything printable
    pub fn fault(msg: impl Into<String>) -> Self {
        Self::Fault(msg.into())
    }
}

/// Errors from strict parsing of easing and loop mode names
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown easing: {0}")]
    UnknownEasing(String),

    #[error("unknown loop mode: {0}")]
    UnknownLoopMode(String),
}

/// Result type returned by setters
pub type Result<T> = std::result::Result<T, SetterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            SetterError::TargetUnavailable.to_string(),
            "tween target is no longer available"
        );
        assert_eq!(SetterError::fault("boom").to_string(), "setter failed: boom");
        assert_eq!(
            ParseError::UnknownEasing("bounce".into()).to_string(),
            "unknown easing: bounce"
        );
    }
}
