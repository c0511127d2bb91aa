//! Ports for storage collaborators
//!
//! Templates and generated records are loaded and saved by whatever backend
//! the host provides (the dashboard's REST API, a database, memory in tests).
//! Domain crates define port traits that extend [`DomainPort`] and report
//! failures as [`PortError`].
//!
//! ```rust,ignore
//! #[async_trait]
//! pub trait RecurringTaskPort: DomainPort {
//!     async fn list_recurring_tasks(&self) -> Result<Vec<RecurringTask>, PortError>;
//!     async fn save_recurring_task(&self, task: &RecurringTask) -> Result<(), PortError>;
//! }
//! ```

use std::fmt;
use thiserror::Error;

/// Error type for port operations
#[derive(Debug, Error)]
pub enum PortError {
    /// The requested entity was not found
    #[error("Not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: String,
        id: String,
    },

    /// The write conflicts with a newer version of the record
    #[error("Conflict: {message}")]
    Conflict {
        message: String,
    },

    /// The backend could not be reached
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PortError {
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        PortError::Conflict {
            message: message.into(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        PortError::Connection {
            message: message.into(),
            source: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        PortError::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Returns true if a retry may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, PortError::Connection { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }
}

/// Marker trait for all domain ports
///
/// Ports must be shareable across async tasks.
pub trait DomainPort: Send + Sync + 'static {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(PortError::connection("refused").is_transient());
        assert!(!PortError::internal("bad row").is_transient());
        assert!(!PortError::conflict("stale version").is_transient());
        assert!(PortError::not_found("RecurringTask", "RTSK-1").is_not_found());
    }
}
