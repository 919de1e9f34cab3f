use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::traits::{
    ChatClient, ChatOptions, ChatRequest, ChatResponse, EmbeddingClient, EmbeddingRequest,
    TokenUsage,
};
use crate::types::{Content, Message, ToolCall};

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// OpenAI client over plain HTTP. Any OpenAI-compatible endpoint works
/// through [`OpenAIClient::with_base_url`].
pub struct OpenAIClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl OpenAIClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .context("Invalid API key format")?,
        );

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: OPENAI_API_BASE.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn build_chat_request(
        &self,
        model: &str,
        messages: Vec<Message>,
        options: &ChatOptions,
    ) -> Result<Value> {
        let openai_messages = messages
            .into_iter()
            .map(convert_message)
            .collect::<Result<Vec<_>>>()?;

        let mut obj = Map::new();
        obj.insert("model".to_string(), json!(model));
        obj.insert("messages".to_string(), Value::Array(openai_messages));

        if let Some(temp) = options.temperature {
            obj.insert("temperature".to_string(), json!(temp));
        }
        if let Some(max_tokens) = options.max_tokens {
            obj.insert("max_tokens".to_string(), json!(max_tokens));
        }
        if let Some(tools) = &options.tools {
            obj.insert("tools".to_string(), serde_json::to_value(tools)?);
        }
        if let Some(tool_choice) = &options.tool_choice {
            obj.insert("tool_choice".to_string(), serde_json::to_value(tool_choice)?);
        }

        Ok(Value::Object(obj))
    }

    async fn post_json(&self, path: &str, payload: &Value) -> Result<reqwest::Response> {
        let response = self
            .http_client
            .post(format!("{}{}", self.base_url, path))
            .json(payload)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("OpenAI API error ({}): {}", status, error_text);
        }

        Ok(response)
    }
}

fn convert_message(message: Message) -> Result<Value> {
    let value = match message {
        Message::System { content } => json!({
            "role": "system",
            "content": convert_content(content),
        }),
        Message::Human { content } => json!({
            "role": "user",
            "content": convert_content(content),
        }),
        Message::AI {
            content,
            tool_calls,
        } => {
            let mut map = Map::new();
            map.insert("role".to_string(), json!("assistant"));
            // OpenAI requires the key even when the turn is only tool calls
            map.insert(
                "content".to_string(),
                content.map(convert_content).unwrap_or(Value::Null),
            );
            if let Some(tool_calls) = tool_calls {
                map.insert("tool_calls".to_string(), serde_json::to_value(tool_calls)?);
            }
            Value::Object(map)
        }
    };
    Ok(value)
}

fn convert_content(content: Content) -> Value {
    Value::String(content.into_text())
}

#[async_trait]
impl ChatClient for OpenAIClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let payload = self.build_chat_request(&request.model, request.messages, &request.options)?;
        tracing::debug!(model = %request.model, "sending chat completion");

        let raw: OpenAIChatResponse = self
            .post_json("/chat/completions", &payload)
            .await?
            .json()
            .await
            .context("Failed to parse response")?;

        let choice = raw.choices.first();
        Ok(ChatResponse {
            content: choice.and_then(|c| c.message.content.clone()),
            tool_calls: choice.and_then(|c| c.message.tool_calls.clone()),
            usage: raw.usage.as_ref().map(|u| TokenUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            finish_reason: choice.and_then(|c| c.finish_reason.clone()),
            raw: serde_json::to_value(&raw)?,
        })
    }
}

#[async_trait]
impl EmbeddingClient for OpenAIClient {
    async fn embed(&self, request: EmbeddingRequest) -> Result<Vec<Vec<f32>>> {
        let payload = json!({
            "model": request.model,
            "input": request.input,
        });

        let mut raw: OpenAIEmbeddingResponse = self
            .post_json("/embeddings", &payload)
            .await?
            .json()
            .await
            .context("Failed to parse embedding response")?;

        // The API documents input order, but each row carries its index anyway
        raw.data.sort_by_key(|row| row.index);
        Ok(raw.data.into_iter().map(|row| row.embedding).collect())
    }
}

// Wire types for the chat completions and embeddings endpoints

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAIChatResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Choice {
    pub index: u32,
    pub message: ResponseMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ResponseMessage {
    pub role: String,
    pub content: Option<String>,
    pub tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAIEmbeddingResponse {
    data: Vec<EmbeddingRow>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingRow {
    index: usize,
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Tool, ToolChoice};

    #[test]
    fn test_tool_only_assistant_turn_keeps_null_content() {
        let msg = Message::ai_with_tools(vec![ToolCall::new("call_1", "structured_response", "{}")]);
        let value = convert_message(msg).unwrap();

        assert_eq!(value["role"], "assistant");
        assert!(value["content"].is_null());
        assert_eq!(value["tool_calls"][0]["function"]["name"], "structured_response");
    }

    #[test]
    fn test_build_chat_request_includes_forced_tool() {
        let client = OpenAIClient::new("test-key").unwrap();
        let options = ChatOptions::new()
            .temperature(0.0)
            .tools(vec![Tool::new("pick", "Pick one", json!({"type": "object"}))])
            .tool_choice(ToolChoice::force("pick"));

        let payload = client
            .build_chat_request("gpt-4o-mini", vec![Message::human("hi")], &options)
            .unwrap();

        assert_eq!(payload["model"], "gpt-4o-mini");
        assert_eq!(payload["tools"][0]["function"]["name"], "pick");
        assert_eq!(payload["tool_choice"]["function"]["name"], "pick");
        assert!(payload.get("max_tokens").is_none());
    }
}
