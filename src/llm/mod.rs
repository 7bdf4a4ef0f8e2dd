pub mod openai;
pub mod retry;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::schema::FunctionSchema;

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

/// One structured-generation call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub messages: Vec<Message>,
    pub schema: FunctionSchema,
    /// Require the model to answer through `schema` instead of free text
    pub force_schema: bool,
    pub temperature: f64,
}

impl CompletionRequest {
    pub fn new(messages: Vec<Message>, schema: FunctionSchema, temperature: f64) -> Self {
        Self {
            messages,
            schema,
            force_schema: true,
            temperature,
        }
    }

    /// All message contents joined, handy for logging and assertions
    pub fn transcript(&self) -> String {
        self.messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// The generation capability: answers a request with JSON shaped by its schema
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn generate(&self, request: &CompletionRequest) -> Result<Value>;
}

#[async_trait]
impl<T: LlmClient + ?Sized> LlmClient for std::sync::Arc<T> {
    async fn generate(&self, request: &CompletionRequest) -> Result<Value> {
        (**self).generate(request).await
    }
}

pub use openai::OpenAiClient;
pub use retry::{RetryPolicy, RetryingClient};
