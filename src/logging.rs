//! The four-level logging contract and its default implementations.

// Layer 1: Standard library imports
use std::io::Write;

// Layer 2: Third-party crate imports
// (tracing, used by the default logger)

// Layer 3: Internal module imports
// (none)

/// Four-level, fluent logging contract.
///
/// Every method returns the logger so calls chain:
///
/// ```rust
/// use stagehand::logging::{Logger, StandardLogger};
///
/// let logger = StandardLogger::default();
/// logger.info("stage open").debug("directory sized");
/// ```
pub trait Logger: Send + Sync {
    /// Diagnostic detail.
    fn debug(&self, message: &str) -> &dyn Logger;

    /// Operational information.
    fn info(&self, message: &str) -> &dyn Logger;

    /// The plain level.
    fn log(&self, message: &str) -> &dyn Logger;

    /// Failures.
    fn error(&self, message: &str) -> &dyn Logger;
}

/// Default logger: routes through the `tracing` facade, so whatever
/// subscriber the host application installs sees runtime events.
#[derive(Debug, Default, Clone)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn debug(&self, message: &str) -> &dyn Logger {
        tracing::debug!(target: "stagehand", "{message}");
        self
    }

    fn info(&self, message: &str) -> &dyn Logger {
        tracing::info!(target: "stagehand", "{message}");
        self
    }

    fn log(&self, message: &str) -> &dyn Logger {
        tracing::info!(target: "stagehand", "{message}");
        self
    }

    fn error(&self, message: &str) -> &dyn Logger {
        tracing::error!(target: "stagehand", "{message}");
        self
    }
}

/// Plain stream logger: errors to stderr, everything else to stdout.
#[derive(Debug, Default, Clone)]
pub struct StandardLogger;

impl StandardLogger {
    fn write_out(level: &str, message: &str) {
        let _ = writeln!(std::io::stdout().lock(), "[{level}] {message}");
    }
}

impl Logger for StandardLogger {
    fn debug(&self, message: &str) -> &dyn Logger {
        Self::write_out("debug", message);
        self
    }

    fn info(&self, message: &str) -> &dyn Logger {
        Self::write_out("info", message);
        self
    }

    fn log(&self, message: &str) -> &dyn Logger {
        Self::write_out("log", message);
        self
    }

    fn error(&self, message: &str) -> &dyn Logger {
        let _ = writeln!(std::io::stderr().lock(), "[error] {message}");
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fluent_chaining() {
        let logger = StandardLogger::default();
        logger
            .debug("one")
            .info("two")
            .log("three")
            .error("four");
    }

    #[test]
    fn test_tracing_logger_chains() {
        let logger = TracingLogger;
        logger.debug("a").info("b").log("c").error("d");
    }
}
