pub mod config;
pub mod openai;
pub mod traits;
pub mod types;

pub use config::{ClientFactory, OpenAIConfig, ProviderConfig};
pub use openai::OpenAIClient;
pub use traits::{
    ChatClient, ChatOptions, ChatRequest, ChatResponse, EmbeddingClient, EmbeddingRequest,
    TokenUsage,
};
pub use types::{Content, Message, Tool, ToolCall, ToolChoice};
