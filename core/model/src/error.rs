use serde::{Deserialize, Serialize};

/// Error body returned by every REST endpoint on failure.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorMessage {
    #[serde(rename = "message", skip_serializing_if = "Option::is_none", default)]
    pub message: Option<String>,
}

impl ErrorMessage {
    pub fn new(message: impl ToString) -> Self {
        ErrorMessage {
            message: Some(message.to_string()),
        }
    }
}
