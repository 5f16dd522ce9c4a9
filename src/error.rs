//! Error handling types for embedmap
//!
//! Mapping and aggregation lookups never fail: "no correspondence" is an
//! absent result. These types cover the remaining fallible edges: fixture
//! loading for the inspector and plugin failures.

use std::sync::PoisonError;
use thiserror::Error;

/// Crate-level error type
#[derive(Debug, Error)]
pub enum EmbedError {
    /// A fixture or virtual file description could not be used
    #[error("Invalid fixture: {message}")]
    Fixture { message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for embedmap operations
pub type EmbedResult<T> = Result<T, EmbedError>;

/// Failure reported by an analysis plugin.
///
/// The aggregator logs these and treats the plugin as having returned nothing.
#[derive(Debug, Error)]
pub enum PluginError {
    /// The plugin tried and failed
    #[error("{plugin} failed: {message}")]
    Failed { plugin: String, message: String },
}

impl PluginError {
    /// Create a failure for the named plugin
    pub fn failed(plugin: impl Into<String>, message: impl Into<String>) -> Self {
        PluginError::Failed {
            plugin: plugin.into(),
            message: message.into(),
        }
    }
}

/// Result type returned by plugin operations
pub type PluginResult<T> = Result<T, PluginError>;

/// Helper trait to convert PoisonError to EmbedError
pub trait LockResultExt<T> {
    /// Convert a PoisonError to EmbedError with recovery and logging.
    ///
    /// The context parameter identifies which operation triggered lock recovery.
    fn recover_poison(self, context: &str) -> Result<T, EmbedError>;
}

impl<T> LockResultExt<T> for Result<T, PoisonError<T>> {
    fn recover_poison(self, context: &str) -> Result<T, EmbedError> {
        match self {
            Ok(guard) => Ok(guard),
            Err(poisoned) => {
                log::warn!(
                    target: "embedmap::lock_recovery",
                    "Recovered from poisoned lock in {}",
                    context
                );
                Ok(poisoned.into_inner())
            }
        }
    }
}

/// Helper functions for common error patterns
impl EmbedError {
    /// Create a fixture error
    pub fn fixture(message: impl Into<String>) -> Self {
        EmbedError::Fixture {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn recover_poison_returns_inner_guard() {
        let lock = Arc::new(Mutex::new(7));
        let poisoner = Arc::clone(&lock);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(lock.is_poisoned());
        let guard = lock.lock().recover_poison("test").unwrap();
        assert_eq!(*guard, 7);
    }

    #[test]
    fn error_messages_include_context() {
        assert_eq!(
            EmbedError::fixture("missing root").to_string(),
            "Invalid fixture: missing root"
        );
        assert_eq!(
            PluginError::failed("ts", "boom").to_string(),
            "ts failed: boom"
        );
    }
}
