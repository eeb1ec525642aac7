//! Error types for message handling.

// Layer 1: Standard library imports
use std::error::Error;
use std::fmt;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
// (none)

/// Result type returned by protocol handlers.
pub type ActorResult<T> = Result<T, ActorError>;

/// Error raised by a user message handler.
///
/// Any error type can be boxed into an `ActorError`, and plain strings are
/// accepted so that non-error failure values still carry a stable string
/// form:
///
/// ```rust
/// use stagehand::message::ActorError;
///
/// let from_str: ActorError = "deposit would overdraw".into();
/// assert_eq!(from_str.to_string(), "deposit would overdraw");
///
/// let wrapped = ActorError::new(std::io::Error::other("disk full"));
/// assert!(wrapped.to_string().contains("disk full"));
/// ```
pub struct ActorError(Box<dyn Error + Send + Sync + 'static>);

impl ActorError {
    /// Wrap an existing error.
    pub fn new<E>(error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self(Box::new(error))
    }

    /// Build an error from a plain message.
    pub fn message(message: impl Into<String>) -> Self {
        Self(message.into().into())
    }
}

impl fmt::Debug for ActorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActorError({:?})", self.0)
    }
}

impl fmt::Display for ActorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ActorError {
    fn from(message: String) -> Self {
        Self::message(message)
    }
}

impl From<&str> for ActorError {
    fn from(message: &str) -> Self {
        Self::message(message)
    }
}

impl From<Box<dyn Error + Send + Sync + 'static>> for ActorError {
    fn from(error: Box<dyn Error + Send + Sync + 'static>) -> Self {
        Self(error)
    }
}

/// Fault record produced by the runtime.
///
/// Faults complete caller deferreds and travel to supervisors. They are
/// cheap to clone because the same fault is delivered to both parties.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActorFault {
    /// A message handler returned an error.
    #[error("handler `{selector}` failed: {message}")]
    Handler {
        /// The method selector of the failing message.
        selector: &'static str,
        /// Stable string form of the handler error.
        message: String,
    },

    /// A bounded mailbox rejected the message.
    #[error("mailbox overflow")]
    MailboxOverflow,

    /// The target actor has stopped.
    #[error("actor stopped")]
    Stopped,

    /// An explicit restart was requested through the proxy.
    #[error("restart requested")]
    RestartRequested,

    /// A stop did not finish within its deadline.
    #[error("stop timed out after {timeout_ms} ms")]
    StopTimeout {
        /// The deadline that elapsed, in milliseconds.
        timeout_ms: u64,
    },

    /// The message was discarded before dispatch (overflow drop, or the
    /// runtime went away).
    #[error("message abandoned before dispatch")]
    Abandoned,
}

impl ActorFault {
    /// Build a handler fault from a selector and the handler's error.
    pub fn handler(selector: &'static str, error: &ActorError) -> Self {
        Self::Handler {
            selector,
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_fault_has_stable_form() {
        let error = ActorError::message("boom");
        let fault = ActorFault::handler("cause_error", &error);
        assert_eq!(fault.to_string(), "handler `cause_error` failed: boom");
    }

    #[test]
    fn test_string_errors_preserve_message() {
        let error: ActorError = "not enough funds".into();
        assert_eq!(error.to_string(), "not enough funds");
    }

    #[test]
    fn test_wrapped_errors_preserve_source_message() {
        let error = ActorError::new(std::io::Error::other("io broke"));
        assert!(error.to_string().contains("io broke"));
    }

    #[test]
    fn test_fault_equality() {
        assert_eq!(ActorFault::Stopped, ActorFault::Stopped);
        assert_ne!(ActorFault::Stopped, ActorFault::MailboxOverflow);
    }

    #[test]
    fn test_stop_timeout_display() {
        let fault = ActorFault::StopTimeout { timeout_ms: 250 };
        assert_eq!(fault.to_string(), "stop timed out after 250 ms");
    }
}
