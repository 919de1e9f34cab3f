pub mod builder;
pub mod engine;
pub mod error;
pub mod node;
pub mod nodes;
pub mod oracle;
pub mod orchestrator;
pub mod pipeline;
pub mod prompts;
pub mod retrievers;
pub mod router;
pub mod types;

pub use builder::OrchestratorBuilder;
pub use engine::QueryEvaluationEngine;
pub use error::{Result, SearchError};
pub use node::{Node, NodeType};
pub use oracle::{LlmOracle, Oracle, OutputSchema, StructuredOutput};
pub use orchestrator::SearchOrchestrator;
pub use pipeline::RetrievalPipeline;
pub use retrievers::{ChromaRetriever, HttpReranker, RerankRetriever, Reranker, Retriever};
pub use router::{NextNode, RetrieveRouter, Router};
pub use types::{PipelineConfig, RetrievalRequest};
