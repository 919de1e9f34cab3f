// Provider configuration and client factory

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::openai::OpenAIClient;
use crate::traits::{ChatClient, EmbeddingClient};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIConfig {
    pub api_key: String,
    /// Defaults to https://api.openai.com/v1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl OpenAIConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    OpenAI(OpenAIConfig),
}

impl ProviderConfig {
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::OpenAI(OpenAIConfig::new(api_key))
    }

    pub fn with_base_url(self, base_url: impl Into<String>) -> Self {
        match self {
            Self::OpenAI(config) => Self::OpenAI(config.with_base_url(base_url)),
        }
    }
}

/// Builds chat and embedding clients from a [`ProviderConfig`].
pub struct ClientFactory;

impl ClientFactory {
    pub fn create_chat_client(config: &ProviderConfig) -> Result<Arc<dyn ChatClient>> {
        Ok(Arc::new(Self::openai(config)?))
    }

    pub fn create_embedding_client(config: &ProviderConfig) -> Result<Arc<dyn EmbeddingClient>> {
        Ok(Arc::new(Self::openai(config)?))
    }

    fn openai(config: &ProviderConfig) -> Result<OpenAIClient> {
        match config {
            ProviderConfig::OpenAI(openai) => {
                let client = OpenAIClient::new(openai.api_key.clone())?;
                Ok(match &openai.base_url {
                    Some(url) => client.with_base_url(url.clone()),
                    None => client,
                })
            }
        }
    }
}
