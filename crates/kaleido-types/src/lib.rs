pub mod document;
pub mod evaluation;
pub mod product;
pub mod thread;

pub use document::RetrievedDocument;
pub use evaluation::{
    format_answers, AnsweredQuestion, FollowUpQuestion, QueryEvaluation, QueryEvaluationOut,
    UserSearch,
};
pub use product::{Product, ProductRecommendation, Shop};
pub use thread::{ConversationCheckpoint, Thread, ThreadSummary};
