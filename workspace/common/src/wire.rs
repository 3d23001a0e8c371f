//! Envelope shapes the backend wraps collections and errors in.

use catalog::{LoadResponse, ServerMessage};
use serde::{Deserialize, Serialize};

/// A collection answer: bare array from simple endpoints, `{data, total}`
/// from paginated ones.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ListPayload<T> {
    Plain(Vec<T>),
    Paged { data: Vec<T>, total: usize },
}

impl<T> From<ListPayload<T>> for LoadResponse<T> {
    fn from(payload: ListPayload<T>) -> Self {
        match payload {
            ListPayload::Plain(items) => LoadResponse::List(items),
            ListPayload::Paged { data, total } => LoadResponse::Paged { data, total },
        }
    }
}

/// `message` as sent by the validation layer: one sentence or one per field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MessageField {
    Text(String),
    List(Vec<String>),
}

impl From<MessageField> for ServerMessage {
    fn from(field: MessageField) -> Self {
        match field {
            MessageField::Text(text) => ServerMessage::Text(text),
            MessageField::List(items) => ServerMessage::List(items),
        }
    }
}

/// Error body of a rejected request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ErrorResponse {
    #[serde(rename = "statusCode", default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<MessageField>,
    /// Short reason phrase, e.g. "Bad Request"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorResponse {
    /// The most useful text of the body: `message` first, then `error`.
    pub fn server_message(self) -> Option<ServerMessage> {
        match (self.message, self.error) {
            (Some(message), _) => Some(message.into()),
            (None, Some(error)) => Some(ServerMessage::Text(error)),
            (None, None) => None,
        }
    }
}
