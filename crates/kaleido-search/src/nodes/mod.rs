pub mod filter_node;
pub mod retrieve_node;
pub mod summarize_node;

pub use filter_node::FilterNode;
pub use retrieve_node::RetrieveNode;
pub use summarize_node::SummarizeNode;
