use chrono::{DateTime, Utc};
use kaleido_llm::Message;
use serde::{Deserialize, Serialize};

use crate::evaluation::QueryEvaluation;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Thread {
    pub fn new(id: impl Into<String>, user_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            user_id: user_id.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Thread as listed to its owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadSummary {
    pub thread_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Thread> for ThreadSummary {
    fn from(thread: Thread) -> Self {
        Self {
            thread_id: thread.id,
            created_at: thread.created_at,
            updated_at: thread.updated_at,
        }
    }
}

/// Latest snapshot of a thread's conversation.
///
/// There is one checkpoint per thread. `version` is assigned by the store on
/// every write; callers do not set it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationCheckpoint {
    pub transcript: Vec<Message>,
    pub evaluation: Option<QueryEvaluation>,
    #[serde(default)]
    pub version: u64,
    pub updated_at: DateTime<Utc>,
}

impl ConversationCheckpoint {
    pub fn new(transcript: Vec<Message>, evaluation: Option<QueryEvaluation>) -> Self {
        Self {
            transcript,
            evaluation,
            version: 0,
            updated_at: Utc::now(),
        }
    }
}
