use thiserror::Error;

/// Fallback shown when an error carries no usable text at all.
pub const GENERIC_ERROR_MESSAGE: &str = "Ocurrió un error inesperado";

/// Separator used when the server reports several validation messages.
pub const MESSAGE_SEPARATOR: &str = ", ";

/// Message body reported by the backend on a rejected request.
///
/// Validation layers answer either with a single sentence or with one
/// sentence per offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    Text(String),
    List(Vec<String>),
}

impl ServerMessage {
    /// Flattens the message into one line, or `None` when there is nothing to show.
    pub fn to_line(&self) -> Option<String> {
        match self {
            ServerMessage::Text(text) if !text.trim().is_empty() => Some(text.clone()),
            ServerMessage::Text(_) => None,
            ServerMessage::List(items) => {
                let parts: Vec<&str> = items
                    .iter()
                    .map(|item| item.as_str())
                    .filter(|item| !item.trim().is_empty())
                    .collect();
                if parts.is_empty() {
                    None
                } else {
                    Some(parts.join(MESSAGE_SEPARATOR))
                }
            }
        }
    }
}

/// Error types produced by catalog services
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The backend answered with a non-success status
    #[error("Request rejected with status {status}")]
    Rejected {
        status: u16,
        message: Option<ServerMessage>,
    },

    /// The request never produced a usable response
    #[error("{0}")]
    Transport(String),

    /// The response could not be decoded
    #[error("Failed to parse response: {0}")]
    Decode(String),

    /// Anything else the service wants to surface
    #[error("{0}")]
    Other(String),
}

impl ServiceError {
    /// Most specific text available for the user.
    ///
    /// Preference order: server sentence, server list joined with
    /// [`MESSAGE_SEPARATOR`], the error's own description, then
    /// [`GENERIC_ERROR_MESSAGE`].
    pub fn user_message(&self) -> String {
        if let ServiceError::Rejected {
            message: Some(message),
            ..
        } = self
        {
            if let Some(line) = message.to_line() {
                return line;
            }
        }

        let own = self.to_string();
        if own.trim().is_empty() {
            GENERIC_ERROR_MESSAGE.to_string()
        } else {
            own
        }
    }
}

/// Type alias for Result with ServiceError
pub type Result<T> = std::result::Result<T, ServiceError>;
