//! Target platform identity.

use std::fmt;

/// Platform a target runs on, as far as metadata collection cares.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Platform {
    /// Any platform without direct metadata access.
    Generic,
    /// An AWS EC2 instance.
    Aws {
        /// EC2 instance identifier, e.g. `i-0abc123`.
        instance_id: String,
    },
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Generic => write!(f, "generic"),
            Platform::Aws { instance_id } => write!(f, "AWS ({instance_id})"),
        }
    }
}
