mod common;

use async_trait::async_trait;
use common::{documents, FixedRetriever, ScriptedOracle};
use kaleido_search::{
    OutputSchema, PipelineConfig, RerankRetriever, Reranker, RetrievalPipeline, RetrievalRequest,
    SearchError,
};
use kaleido_types::RetrievedDocument;
use serde_json::json;
use std::sync::Arc;

fn pipeline(oracle: Arc<ScriptedOracle>, retriever: Arc<FixedRetriever>) -> RetrievalPipeline {
    RetrievalPipeline::new(retriever, oracle, PipelineConfig::default())
}

#[tokio::test]
async fn test_filter_keeps_relevant_documents_in_order() {
    let oracle = Arc::new(
        ScriptedOracle::new()
            .reply(json!({"verdicts": [
                {"id": 5, "relevant": true},
                {"id": 4, "relevant": false},
                {"id": 3, "relevant": true},
                {"id": 2, "relevant": false},
                {"id": 1, "relevant": true}
            ]}))
            .reply(json!({"summaries": []})),
    );
    let retriever = Arc::new(FixedRetriever::new(documents(&[1, 2, 3, 4, 5])));

    let docs = pipeline(oracle.clone(), retriever)
        .run(RetrievalRequest::new("gaming laptop"))
        .await
        .unwrap();

    let ids: Vec<i64> = docs.iter().map(|d| d.ref_id).collect();
    assert_eq!(ids, vec![1, 3, 5]);
    assert_eq!(oracle.calls_for(OutputSchema::RelevanceVerdicts), 1);
    // left out by the summarizer, so original text survives
    assert_eq!(docs[0].content, "raw listing text for product 1");
}

#[tokio::test]
async fn test_blank_summary_keeps_original_text() {
    let oracle = Arc::new(
        ScriptedOracle::new()
            .reply(json!({"verdicts": [
                {"id": 1, "relevant": true},
                {"id": 2, "relevant": true}
            ]}))
            .reply(json!({"summaries": [
                {"id": 1, "title": "", "description": "   "},
                {"id": 2, "title": " ", "description": "Compact two-person tent"}
            ]})),
    );
    let retriever = Arc::new(FixedRetriever::new(documents(&[1, 2])));

    let docs = pipeline(oracle, retriever)
        .run(RetrievalRequest::new("tent"))
        .await
        .unwrap();

    assert_eq!(docs[0].content, "raw listing text for product 1");
    assert_eq!(docs[0].ai_title, None);
    assert_eq!(docs[1].content, "Compact two-person tent");
    assert_eq!(docs[1].ai_title, None);
}

#[tokio::test]
async fn test_nothing_relevant_skips_summarize() {
    let oracle = Arc::new(ScriptedOracle::new().reply(json!({"verdicts": [
        {"id": 1, "relevant": false},
        {"id": 2, "relevant": false}
    ]})));
    let retriever = Arc::new(FixedRetriever::new(documents(&[1, 2])));

    let docs = pipeline(oracle.clone(), retriever)
        .run(RetrievalRequest::new("tent"))
        .await
        .unwrap();

    assert!(docs.is_empty());
    assert_eq!(oracle.calls_for(OutputSchema::Summaries), 0);
}

#[tokio::test]
async fn test_empty_retrieval_makes_no_oracle_calls() {
    let oracle = Arc::new(ScriptedOracle::new());
    let retriever = Arc::new(FixedRetriever::new(vec![]));

    let docs = pipeline(oracle.clone(), retriever)
        .run(RetrievalRequest::new("anything"))
        .await
        .unwrap();

    assert!(docs.is_empty());
    assert_eq!(oracle.call_count(), 0);
}

#[tokio::test]
async fn test_filter_ignores_ids_outside_batch() {
    let oracle = Arc::new(
        ScriptedOracle::new()
            .reply(json!({"verdicts": [
                {"id": 1, "relevant": true},
                {"id": 99, "relevant": true}
            ]}))
            .reply(json!({"summaries": [
                {"id": 1, "title": "Tent", "description": "Two person tent"},
                {"id": 99, "title": "Ghost", "description": "Not retrieved"}
            ]})),
    );
    let retriever = Arc::new(FixedRetriever::new(documents(&[1, 2])));

    let docs = pipeline(oracle, retriever)
        .run(RetrievalRequest::new("tent"))
        .await
        .unwrap();

    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].content, "Two person tent");
    assert_eq!(docs[0].ai_title.as_deref(), Some("Tent"));
}

#[tokio::test]
async fn test_summary_lengths_reach_the_prompt() {
    let oracle = Arc::new(
        ScriptedOracle::new()
            .reply(json!({"verdicts": [{"id": 1, "relevant": true}]}))
            .reply(json!({"summaries": [{"id": 1, "title": "T", "description": "D"}]})),
    );
    let retriever = Arc::new(FixedRetriever::new(documents(&[1])));

    pipeline(oracle.clone(), retriever)
        .run(
            RetrievalRequest::new("tent")
                .title_length(3)
                .summary_length(42),
        )
        .await
        .unwrap();

    let transcript = oracle.transcript(1);
    let prompt = transcript[0].text().unwrap_or_default();
    assert!(prompt.contains("about 42 words"));
    assert!(prompt.contains("about 3 words"));
}

#[tokio::test]
async fn test_summarize_disabled_stops_after_filter() {
    let oracle = Arc::new(ScriptedOracle::new().reply(json!({"verdicts": [
        {"id": 1, "relevant": true}
    ]})));
    let retriever = Arc::new(FixedRetriever::new(documents(&[1])));

    let docs = RetrievalPipeline::new(
        retriever,
        oracle.clone(),
        PipelineConfig::default().with_summarize(false),
    )
    .run(RetrievalRequest::new("tent"))
    .await
    .unwrap();

    assert_eq!(docs.len(), 1);
    assert_eq!(oracle.call_count(), 1);
}

#[tokio::test]
async fn test_filter_schema_violation_is_surfaced() {
    let oracle = Arc::new(ScriptedOracle::new().reply(json!({"verdicts": [{"id": "one"}]})));
    let retriever = Arc::new(FixedRetriever::new(documents(&[1])));

    let err = pipeline(oracle, retriever)
        .run(RetrievalRequest::new("tent"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SearchError::SchemaViolation { schema: "relevance_verdicts", .. }
    ));
}

struct ReverseReranker;

#[async_trait]
impl Reranker for ReverseReranker {
    async fn rerank(
        &self,
        _query: &str,
        mut documents: Vec<RetrievedDocument>,
        top_n: usize,
    ) -> anyhow::Result<Vec<RetrievedDocument>> {
        documents.reverse();
        documents.truncate(top_n);
        Ok(documents)
    }
}

#[tokio::test]
async fn test_rerank_request_uses_rerank_retriever() {
    let oracle = Arc::new(
        ScriptedOracle::new()
            .reply(json!({"verdicts": [
                {"id": 6, "relevant": true},
                {"id": 5, "relevant": true}
            ]}))
            .reply(json!({"summaries": []})),
    );
    let plain = Arc::new(FixedRetriever::new(documents(&[1, 2])));
    let candidates = Arc::new(FixedRetriever::new(documents(&[1, 2, 3, 4, 5, 6])));
    let rerank = Arc::new(RerankRetriever::new(candidates.clone(), Arc::new(ReverseReranker)).with_top_n(2));

    let docs = RetrievalPipeline::new(plain.clone(), oracle, PipelineConfig::default())
        .with_rerank_retriever(rerank)
        .run(RetrievalRequest::new("tent").rerank(true))
        .await
        .unwrap();

    let ids: Vec<i64> = docs.iter().map(|d| d.ref_id).collect();
    assert_eq!(ids, vec![6, 5]);
    assert!(plain.queries().is_empty());
    assert_eq!(candidates.queries(), vec!["tent".to_string()]);
}

#[tokio::test]
async fn test_rerank_without_rerank_retriever_falls_back() {
    let oracle = Arc::new(ScriptedOracle::new().reply(json!({"verdicts": []})));
    let plain = Arc::new(FixedRetriever::new(documents(&[1])));

    let docs = pipeline(oracle, plain.clone())
        .run(RetrievalRequest::new("tent").rerank(true))
        .await
        .unwrap();

    assert!(docs.is_empty());
    assert_eq!(plain.queries().len(), 1);
}
