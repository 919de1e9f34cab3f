pub mod config;
pub mod schema;
pub mod state;

pub use config::{PipelineConfig, RetrievalRequest};
pub use schema::{RelevanceVerdict, RelevanceVerdictList, SummarizedContent, SummaryList};
pub use state::PipelineState;
