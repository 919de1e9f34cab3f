#![allow(dead_code)]

use anyhow::anyhow;
use async_trait::async_trait;
use kaleido_llm::Message;
use kaleido_persist::InMemoryStore;
use kaleido_search::{
    OrchestratorBuilder, Oracle, OutputSchema, PipelineConfig, Result, Retriever, SearchError,
    SearchOrchestrator, StructuredOutput,
};
use kaleido_types::{Product, RetrievedDocument, Shop};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Oracle that replays queued JSON payloads through the real schema check.
#[derive(Default)]
pub struct ScriptedOracle {
    replies: Mutex<VecDeque<std::result::Result<Value, String>>>,
    calls: Mutex<Vec<(OutputSchema, Vec<Message>)>>,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, payload: Value) -> Self {
        self.replies.lock().unwrap().push_back(Ok(payload));
        self
    }

    pub fn fail(self, message: &str) -> Self {
        self.replies.lock().unwrap().push_back(Err(message.to_string()));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_for(&self, schema: OutputSchema) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _)| *s == schema)
            .count()
    }

    pub fn transcript(&self, index: usize) -> Vec<Message> {
        self.calls.lock().unwrap()[index].1.clone()
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    async fn invoke(&self, _transcript: &[Message]) -> Result<Message> {
        Ok(Message::ai("ok"))
    }

    async fn invoke_structured(
        &self,
        transcript: &[Message],
        schema: OutputSchema,
    ) -> Result<StructuredOutput> {
        self.calls
            .lock()
            .unwrap()
            .push((schema, transcript.to_vec()));
        let next = self.replies.lock().unwrap().pop_front();
        match next {
            Some(Ok(payload)) => schema.parse(payload),
            Some(Err(message)) => Err(SearchError::Oracle(anyhow!(message))),
            None => Err(SearchError::Oracle(anyhow!("no scripted reply left"))),
        }
    }
}

/// Retriever returning the same documents for every query.
pub struct FixedRetriever {
    documents: Vec<RetrievedDocument>,
    queries: Mutex<Vec<String>>,
}

impl FixedRetriever {
    pub fn new(documents: Vec<RetrievedDocument>) -> Self {
        Self {
            documents,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Retriever for FixedRetriever {
    async fn search(&self, query: &str) -> anyhow::Result<Vec<RetrievedDocument>> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(self.documents.clone())
    }
}

pub fn product(id: i64, title: &str) -> Product {
    Product {
        id,
        title: title.to_string(),
        price: 899.99,
        url: format!("https://shop.example/p/{}", id),
        thumbnail_url: Some(format!("https://shop.example/img/{}.jpg", id)),
        shop: Shop {
            name: "Example Shop".to_string(),
            url: "https://shop.example".to_string(),
        },
    }
}

pub fn documents(ids: &[i64]) -> Vec<RetrievedDocument> {
    ids.iter()
        .map(|id| RetrievedDocument::new(*id, format!("raw listing text for product {}", id)))
        .collect()
}

pub fn orchestrator(
    store: Arc<InMemoryStore>,
    oracle: Arc<ScriptedOracle>,
    retriever: Arc<FixedRetriever>,
) -> SearchOrchestrator {
    OrchestratorBuilder::new()
        .oracle(oracle)
        .thread_store(store.clone())
        .checkpoint_store(store.clone())
        .product_lookup(store)
        .retriever(retriever)
        .pipeline_config(PipelineConfig::default())
        .build()
        .unwrap()
}
