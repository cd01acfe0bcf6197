use thiserror::Error;

/// Rejected form input. Nothing is constructed or persisted when this is
/// returned, and the form stays open.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be a number")]
    NotANumber { field: &'static str },
    #[error("{field} must be a positive number")]
    NotPositive { field: &'static str },
    #[error("{metric} is out of range for these inputs")]
    MetricOutOfRange { metric: &'static str },
    #[error("unknown workout type: {0:?}")]
    UnknownKind(String),
}

impl ValidationError {
    /// Single line shown to the user.
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::NotANumber { .. } | Self::NotPositive { .. } => {
                "Inputs should be positive numbers."
            }
            Self::MetricOutOfRange { .. } => "Inputs are too large or too small.",
            Self::UnknownKind(_) => "Workout type should be running or cycling.",
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no workout with id {id}")]
    NotFound { id: String },
    #[error("stored workouts are unreadable: {0}")]
    PersistenceCorrupt(String),
}

#[derive(Debug, Clone, Error)]
#[error("location unavailable: {0}")]
pub struct LocationUnavailable(pub String);
