use crate::models::ChatRequest;

pub const MAX_MESSAGE_CHARS: usize = 1_000;
pub const MAX_SESSION_ID_CHARS: usize = 100;

const STRIPPED_CHARS: [char; 5] = ['<', '>', '"', '\'', '&'];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("message is required")]
    MissingMessage,
    #[error("message must be at most 1000 characters")]
    MessageTooLong,
    #[error("sessionId is required")]
    MissingSessionId,
    #[error("sessionId must be at most 100 characters")]
    SessionIdTooLong,
}

/// A chat request that passed validation. `message` is already sanitized and is
/// the only copy used downstream, for processing and storage alike.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedChat {
    pub message: String,
    pub session_id: String,
}

pub fn sanitize_message(input: &str) -> String {
    input
        .trim()
        .chars()
        .filter(|ch| !STRIPPED_CHARS.contains(ch))
        .collect::<String>()
        .trim()
        .to_string()
}

pub fn validate_chat_request(request: &ChatRequest) -> Result<ValidatedChat, ValidationError> {
    let raw_message = request
        .message
        .as_deref()
        .filter(|value| !value.trim().is_empty())
        .ok_or(ValidationError::MissingMessage)?;
    if raw_message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(ValidationError::MessageTooLong);
    }

    let session_id = request
        .session_id
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(ValidationError::MissingSessionId)?;
    if session_id.chars().count() > MAX_SESSION_ID_CHARS {
        return Err(ValidationError::SessionIdTooLong);
    }

    let message = sanitize_message(raw_message);
    if message.is_empty() {
        return Err(ValidationError::MissingMessage);
    }

    Ok(ValidatedChat {
        message,
        session_id: session_id.to_string(),
    })
}
