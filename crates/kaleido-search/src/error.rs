use kaleido_persist::PersistError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("{0}")]
    Validation(String),

    #[error("Answers do not match the questions of this thread: unknown ids {0:?}")]
    AnswerMismatch(Vec<u32>),

    #[error("The query needs refinement before recommendations can be made")]
    NeedsRefinement,

    #[error("Access to thread {0} denied")]
    AccessDenied(String),

    #[error("Thread not found: {0}")]
    NotFound(String),

    #[error("Oracle output does not satisfy the {schema} schema: {errors:?}")]
    SchemaViolation {
        schema: &'static str,
        errors: Vec<String>,
    },

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error("Oracle error: {0:#}")]
    Oracle(anyhow::Error),

    #[error("Retrieval error: {0:#}")]
    Retrieval(anyhow::Error),
}

impl SearchError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;
