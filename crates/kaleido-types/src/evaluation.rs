use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// Field docs on these types end up in the JSON schema handed to the model,
// so they double as instructions.

/// A question the shopper has answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AnsweredQuestion {
    /// Id of the follow-up question this answers
    pub id: u32,
    /// The shopper's answer
    pub answer: String,
}

impl AnsweredQuestion {
    pub fn new(id: u32, answer: impl Into<String>) -> Self {
        Self {
            id,
            answer: answer.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.answer.trim().is_empty()
    }
}

/// A question that would make the search more specific.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FollowUpQuestion {
    /// Unique id, starting at 0 and incrementing across the conversation
    pub id: u32,
    /// 1 to 3 word version of the question
    pub short: String,
    /// Full question as shown to the shopper
    pub long: String,
}

/// Assessment of how searchable the accumulated shopper intent is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct QueryEvaluation {
    /// True when the conversation holds at least two distinct pieces of product information
    pub valid: bool,
    /// Every question the shopper has answered so far
    #[serde(default)]
    pub answered_questions: Vec<AnsweredQuestion>,
    /// Questions still worth asking
    #[serde(default)]
    pub follow_up_questions: Vec<FollowUpQuestion>,
    /// Similarity-search ready rewrite of the intent, null when no e-commerce intent is present
    #[serde(default)]
    pub cleaned_query: Option<String>,
}

impl QueryEvaluation {
    /// Ids a shopper may answer on the next turn.
    pub fn known_ids(&self) -> HashSet<u32> {
        self.answered_questions
            .iter()
            .map(|q| q.id)
            .chain(self.follow_up_questions.iter().map(|q| q.id))
            .collect()
    }

    /// Cleaned query, ignoring whitespace-only values
    pub fn search_query(&self) -> Option<&str> {
        self.cleaned_query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }
}

/// Evaluation as returned to callers, tagged with its thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryEvaluationOut {
    #[serde(flatten)]
    pub evaluation: QueryEvaluation,
    pub thread_id: String,
}

impl QueryEvaluationOut {
    pub fn new(thread_id: impl Into<String>, evaluation: QueryEvaluation) -> Self {
        Self {
            evaluation,
            thread_id: thread_id.into(),
        }
    }
}

/// One shopper turn: free text, answers, or both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserSearch {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub answers: Option<Vec<AnsweredQuestion>>,
}

impl UserSearch {
    pub fn query(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            answers: None,
        }
    }

    pub fn answers(answers: Vec<AnsweredQuestion>) -> Self {
        Self {
            query: None,
            answers: Some(answers),
        }
    }

    /// Non-blank query text
    pub fn query_text(&self) -> Option<&str> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }

    pub fn has_content(&self) -> bool {
        self.query_text().is_some() || self.answers.as_ref().is_some_and(|a| !a.is_empty())
    }

    /// Submitted answers with duplicates collapsed by id. A later entry
    /// replaces an earlier one but keeps its position.
    pub fn unique_answers(&self) -> Vec<AnsweredQuestion> {
        let mut unique: Vec<AnsweredQuestion> = Vec::new();
        for answer in self.answers.iter().flatten() {
            match unique.iter_mut().find(|a| a.id == answer.id) {
                Some(existing) => existing.answer = answer.answer.clone(),
                None => unique.push(answer.clone()),
            }
        }
        unique
    }
}

/// Renders answers as a single user turn: `"{id}: {text}"` joined by `"; "`.
///
/// Text is trimmed and `;` is replaced by `,` so the separator stays unambiguous.
pub fn format_answers(answers: &[AnsweredQuestion]) -> String {
    answers
        .iter()
        .map(|a| format!("{}: {}", a.id, a.answer.trim().replace(';', ",")))
        .collect::<Vec<_>>()
        .join("; ")
}
