use thiserror::Error;

/// Errors produced while generating, linking or persisting NPCs
#[derive(Debug, Error)]
pub enum NpcError {
    #[error("credential unavailable: {0}")]
    Credential(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("generation call timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("response violates schema '{schema}': {reason}")]
    Schema { schema: String, reason: String },

    #[error("palette has no {0} to sample from")]
    EmptyPalette(&'static str),

    #[error("could not find an unused name after {attempts} attempts (last: {name})")]
    DuplicateName { name: String, attempts: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NpcError {
    /// Whether a failed generation call is worth issuing again
    pub fn is_retryable(&self) -> bool {
        match self {
            NpcError::Transport(_) | NpcError::Timeout(_) => true,
            NpcError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    pub(crate) fn schema(schema: &str, reason: impl Into<String>) -> Self {
        NpcError::Schema {
            schema: schema.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<reqwest::Error> for NpcError {
    fn from(err: reqwest::Error) -> Self {
        NpcError::Transport(err.to_string())
    }
}

impl From<toml::de::Error> for NpcError {
    fn from(err: toml::de::Error) -> Self {
        NpcError::Config(err.to_string())
    }
}

pub type Result<T, E = NpcError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn only_transient_failures_are_retryable() {
        assert!(NpcError::Transport("reset".into()).is_retryable());
        assert!(NpcError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(NpcError::Api { status: 429, body: String::new() }.is_retryable());
        assert!(NpcError::Api { status: 503, body: String::new() }.is_retryable());

        assert!(!NpcError::Api { status: 401, body: String::new() }.is_retryable());
        assert!(!NpcError::schema("npc_character_sheet", "missing name").is_retryable());
        assert!(!NpcError::MalformedResponse("no tool call".into()).is_retryable());
    }
}
