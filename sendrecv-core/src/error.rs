use crate::events::EventKind;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid config: {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("unknown event name '{0}'")]
    UnknownEvent(String),

    #[error("handler for {found} cannot be bound to {event} (expects {expected})")]
    SignatureMismatch {
        event: EventKind,
        expected: &'static str,
        found: EventKind,
    },

    #[error("no element named '{0}' in pipeline")]
    ElementNotFound(String),

    #[error("pipeline description did not produce a pipeline")]
    NotAPipeline,

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}
