use thiserror::Error;

/// Typed failure channel for the assistant core.
///
/// Handlers return these internally; the router renders them to a
/// user-facing string at the outermost boundary, so callers always
/// receive text and never a raised error.
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("Invalid query. Please provide a valid string.")]
    InvalidInput,

    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },

    #[error("Mode '{0}' already exists")]
    AlreadyExists(String),

    #[error("Mode '{0}' is the fallback mode and cannot be removed")]
    ProtectedMode(String),

    #[error("{service} error: {message}")]
    Collaborator {
        service: &'static str,
        message: String,
    },

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AssistantError>;

impl AssistantError {
    pub fn collaborator(service: &'static str, message: impl Into<String>) -> Self {
        Self::Collaborator {
            service,
            message: message.into(),
        }
    }

    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Render the error as the string shown (and spoken) to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidInput => self.to_string(),
            Self::NotFound { .. } | Self::AlreadyExists(_) | Self::ProtectedMode(_) => {
                self.to_string()
            }
            Self::Collaborator { message, .. } => {
                format!("Error while processing query: {}", message)
            }
            Self::Storage(e) => format!("Error while processing query: {}", e),
            Self::Io(e) => format!("Error while processing query: {}", e),
            Self::Serialization(e) => format!("Error while processing query: {}", e),
        }
    }
}
