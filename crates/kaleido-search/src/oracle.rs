//! The LLM seen as a service that answers either free text or one of a
//! fixed set of structured shapes.
//!
//! Structured output is always checked against the JSON schema derived from
//! the Rust type before deserialization, so callers only ever receive a
//! validated value or [`SearchError::SchemaViolation`].

use async_trait::async_trait;
use jsonschema::JSONSchema;
use kaleido_llm::{ChatClient, ChatOptions, ChatRequest, Message, Tool, ToolChoice};
use kaleido_types::QueryEvaluation;
use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::{Arc, LazyLock};

use crate::error::{Result, SearchError};
use crate::types::{RelevanceVerdictList, SummaryList};

#[async_trait]
pub trait Oracle: Send + Sync {
    /// Free-text reply to the transcript
    async fn invoke(&self, transcript: &[Message]) -> Result<Message>;

    /// Reply constrained to `schema`
    async fn invoke_structured(
        &self,
        transcript: &[Message],
        schema: OutputSchema,
    ) -> Result<StructuredOutput>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputSchema {
    QueryEvaluation,
    RelevanceVerdicts,
    Summaries,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StructuredOutput {
    QueryEvaluation(QueryEvaluation),
    RelevanceVerdicts(RelevanceVerdictList),
    Summaries(SummaryList),
}

struct CompiledSchema {
    schema: Value,
    validator: JSONSchema,
}

fn compile<T: JsonSchema>() -> std::result::Result<CompiledSchema, String> {
    let schema = serde_json::to_value(schema_for!(T)).map_err(|e| e.to_string())?;
    let validator = JSONSchema::compile(&schema).map_err(|e| e.to_string())?;
    Ok(CompiledSchema { schema, validator })
}

static QUERY_EVALUATION_SCHEMA: LazyLock<std::result::Result<CompiledSchema, String>> =
    LazyLock::new(compile::<QueryEvaluation>);

static RELEVANCE_VERDICTS_SCHEMA: LazyLock<std::result::Result<CompiledSchema, String>> =
    LazyLock::new(compile::<RelevanceVerdictList>);

static SUMMARIES_SCHEMA: LazyLock<std::result::Result<CompiledSchema, String>> =
    LazyLock::new(compile::<SummaryList>);

impl OutputSchema {
    pub fn name(self) -> &'static str {
        match self {
            Self::QueryEvaluation => "query_evaluation",
            Self::RelevanceVerdicts => "relevance_verdicts",
            Self::Summaries => "summaries",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::QueryEvaluation => "Report the evaluation of the shopper's search query",
            Self::RelevanceVerdicts => "Report whether each document is relevant to the query",
            Self::Summaries => "Report the rewritten title and description of each document",
        }
    }

    fn compiled(self) -> Result<&'static CompiledSchema> {
        let compiled = match self {
            Self::QueryEvaluation => &*QUERY_EVALUATION_SCHEMA,
            Self::RelevanceVerdicts => &*RELEVANCE_VERDICTS_SCHEMA,
            Self::Summaries => &*SUMMARIES_SCHEMA,
        };
        compiled.as_ref().map_err(|message| SearchError::SchemaViolation {
            schema: self.name(),
            errors: vec![format!("schema failed to compile: {}", message)],
        })
    }

    /// JSON schema suitable as function-tool parameters
    pub fn parameters(self) -> Result<Value> {
        let mut schema = self.compiled()?.schema.clone();
        if let Some(obj) = schema.as_object_mut() {
            obj.remove("$schema");
        }
        Ok(schema)
    }

    /// Validates `payload` and converts it into the typed output.
    pub fn parse(self, payload: Value) -> Result<StructuredOutput> {
        let compiled = self.compiled()?;
        if let Err(errors) = compiled.validator.validate(&payload) {
            return Err(SearchError::SchemaViolation {
                schema: self.name(),
                errors: errors.map(|e| e.to_string()).collect(),
            });
        }

        Ok(match self {
            Self::QueryEvaluation => StructuredOutput::QueryEvaluation(self.deserialize(payload)?),
            Self::RelevanceVerdicts => {
                StructuredOutput::RelevanceVerdicts(self.deserialize(payload)?)
            }
            Self::Summaries => StructuredOutput::Summaries(self.deserialize(payload)?),
        })
    }

    fn deserialize<T: DeserializeOwned>(self, payload: Value) -> Result<T> {
        serde_json::from_value(payload).map_err(|e| self.violation(e.to_string()))
    }

    fn violation(self, error: impl Into<String>) -> SearchError {
        SearchError::SchemaViolation {
            schema: self.name(),
            errors: vec![error.into()],
        }
    }
}

impl StructuredOutput {
    pub fn schema(&self) -> OutputSchema {
        match self {
            Self::QueryEvaluation(_) => OutputSchema::QueryEvaluation,
            Self::RelevanceVerdicts(_) => OutputSchema::RelevanceVerdicts,
            Self::Summaries(_) => OutputSchema::Summaries,
        }
    }

    pub fn into_query_evaluation(self) -> Result<QueryEvaluation> {
        match self {
            Self::QueryEvaluation(evaluation) => Ok(evaluation),
            other => Err(other.mismatch(OutputSchema::QueryEvaluation)),
        }
    }

    pub fn into_relevance_verdicts(self) -> Result<RelevanceVerdictList> {
        match self {
            Self::RelevanceVerdicts(verdicts) => Ok(verdicts),
            other => Err(other.mismatch(OutputSchema::RelevanceVerdicts)),
        }
    }

    pub fn into_summaries(self) -> Result<SummaryList> {
        match self {
            Self::Summaries(summaries) => Ok(summaries),
            other => Err(other.mismatch(OutputSchema::Summaries)),
        }
    }

    fn mismatch(&self, expected: OutputSchema) -> SearchError {
        expected.violation(format!("oracle returned {} output", self.schema().name()))
    }
}

/// [`Oracle`] backed by a chat model. Structured calls offer a single
/// function tool whose parameters are the target schema and force the model
/// to call it.
pub struct LlmOracle {
    client: Arc<dyn ChatClient>,
    model: String,
    temperature: Option<f32>,
}

impl LlmOracle {
    pub fn new(client: Arc<dyn ChatClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    fn options(&self) -> ChatOptions {
        match self.temperature {
            Some(t) => ChatOptions::new().temperature(t),
            None => ChatOptions::new(),
        }
    }
}

#[async_trait]
impl Oracle for LlmOracle {
    async fn invoke(&self, transcript: &[Message]) -> Result<Message> {
        let request =
            ChatRequest::new(self.model.clone(), transcript.to_vec()).with_options(self.options());
        let response = self.client.chat(request).await.map_err(SearchError::Oracle)?;

        match (response.content, response.tool_calls) {
            (Some(content), _) => Ok(Message::ai(content)),
            (None, Some(calls)) if !calls.is_empty() => Ok(Message::ai_with_tools(calls)),
            _ => Err(SearchError::Oracle(anyhow::anyhow!("model returned an empty message"))),
        }
    }

    async fn invoke_structured(
        &self,
        transcript: &[Message],
        schema: OutputSchema,
    ) -> Result<StructuredOutput> {
        let tool = Tool::new(schema.name(), schema.description(), schema.parameters()?);
        let options = self
            .options()
            .tools(vec![tool])
            .tool_choice(ToolChoice::force(schema.name()));
        let request =
            ChatRequest::new(self.model.clone(), transcript.to_vec()).with_options(options);

        let response = self.client.chat(request).await.map_err(SearchError::Oracle)?;
        tracing::debug!(
            schema = schema.name(),
            finish_reason = ?response.finish_reason,
            "structured oracle response"
        );

        let call = response
            .tool_call(schema.name())
            .ok_or_else(|| schema.violation("model did not call the output tool"))?;
        let payload = call
            .arguments_value()
            .map_err(|e| schema.violation(format!("arguments are not valid JSON: {}", e)))?;

        schema.parse(payload)
    }
}
