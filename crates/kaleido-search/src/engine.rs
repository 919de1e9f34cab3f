use kaleido_llm::Message;
use kaleido_persist::CheckpointStore;
use kaleido_types::{
    format_answers, AnsweredQuestion, ConversationCheckpoint, QueryEvaluation, QueryEvaluationOut,
    UserSearch,
};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use crate::error::{Result, SearchError};
use crate::oracle::{Oracle, OutputSchema};
use crate::prompts::QUERY_EVALUATION_PROMPT;

/// Turns shopper input into a [`QueryEvaluation`] and keeps the per-thread
/// transcript in the checkpoint store.
pub struct QueryEvaluationEngine {
    oracle: Arc<dyn Oracle>,
    checkpoints: Arc<dyn CheckpointStore>,
}

impl QueryEvaluationEngine {
    pub fn new(oracle: Arc<dyn Oracle>, checkpoints: Arc<dyn CheckpointStore>) -> Self {
        Self {
            oracle,
            checkpoints,
        }
    }

    /// Runs one shopper turn against `thread_id`.
    ///
    /// A query and answers submitted together are processed as two turns,
    /// query first. The checkpoint is written once, after the last turn.
    pub async fn evaluate(&self, thread_id: &str, search: &UserSearch) -> Result<QueryEvaluationOut> {
        if !search.has_content() {
            return Err(SearchError::validation("No query and no answers given"));
        }

        let (mut transcript, previous) = match self.checkpoints.get_checkpoint(thread_id).await? {
            Some(checkpoint) => (checkpoint.transcript, checkpoint.evaluation),
            None => (Vec::new(), None),
        };

        let answers = search.unique_answers();
        if let Some(previous) = &previous {
            check_answer_ids(previous, &answers)?;
        }

        if transcript.is_empty() {
            transcript.push(Message::system(QUERY_EVALUATION_PROMPT));
        }

        let mut evaluation = previous.unwrap_or_default();

        if let Some(query) = search.query_text() {
            transcript.push(Message::human(query));
            evaluation = reconcile(self.run_turn(&transcript).await?, &[]);
            transcript.push(evaluation_message(&evaluation)?);
        }

        if !answers.is_empty() {
            transcript.push(Message::human(format_answers(&answers)));
            evaluation = reconcile(self.run_turn(&transcript).await?, &answers);
            transcript.push(evaluation_message(&evaluation)?);
        }

        let checkpoint = self
            .checkpoints
            .put_checkpoint(
                thread_id,
                ConversationCheckpoint::new(transcript, Some(evaluation.clone())),
            )
            .await?;

        tracing::info!(
            thread_id,
            valid = evaluation.valid,
            answered = evaluation.answered_questions.len(),
            follow_ups = evaluation.follow_up_questions.len(),
            version = checkpoint.version,
            "query evaluated"
        );

        Ok(QueryEvaluationOut::new(thread_id, evaluation))
    }

    /// Latest evaluation for the thread, or the empty default before the first turn.
    pub async fn get_evaluation(&self, thread_id: &str) -> Result<QueryEvaluation> {
        Ok(self
            .checkpoints
            .get_checkpoint(thread_id)
            .await?
            .and_then(|checkpoint| checkpoint.evaluation)
            .unwrap_or_default())
    }

    async fn run_turn(&self, transcript: &[Message]) -> Result<QueryEvaluation> {
        self.oracle
            .invoke_structured(transcript, OutputSchema::QueryEvaluation)
            .await?
            .into_query_evaluation()
    }
}

fn evaluation_message(evaluation: &QueryEvaluation) -> Result<Message> {
    let json = serde_json::to_string(evaluation).map_err(|e| SearchError::Oracle(e.into()))?;
    Ok(Message::ai(json))
}

/// Every submitted id must be a question the latest evaluation knows about.
fn check_answer_ids(previous: &QueryEvaluation, answers: &[AnsweredQuestion]) -> Result<()> {
    let known = previous.known_ids();
    let mut unknown: Vec<u32> = answers
        .iter()
        .map(|a| a.id)
        .filter(|id| !known.contains(id))
        .collect();

    if unknown.is_empty() {
        return Ok(());
    }
    unknown.sort_unstable();
    unknown.dedup();
    Err(SearchError::AnswerMismatch(unknown))
}

/// Applies the answer rules to an oracle evaluation.
///
/// Answers are keyed by id and the last write wins. A non-blank submitted
/// answer replaces the stored one, a blank one removes it. Follow-up
/// questions that share an id with an answer are dropped.
pub fn reconcile(mut evaluation: QueryEvaluation, submitted: &[AnsweredQuestion]) -> QueryEvaluation {
    let mut answered: BTreeMap<u32, String> = evaluation
        .answered_questions
        .drain(..)
        .map(|a| (a.id, a.answer))
        .collect();

    for answer in submitted {
        if answer.is_blank() {
            answered.remove(&answer.id);
        } else {
            answered.insert(answer.id, answer.answer.trim().replace(';', ","));
        }
    }
    answered.retain(|_, text| !text.trim().is_empty());

    let mut seen: HashSet<u32> = answered.keys().copied().collect();
    evaluation.follow_up_questions.retain(|q| seen.insert(q.id));

    evaluation.answered_questions = answered
        .into_iter()
        .map(|(id, answer)| AnsweredQuestion { id, answer })
        .collect();
    evaluation
}
