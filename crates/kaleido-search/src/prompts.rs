use kaleido_types::RetrievedDocument;

/// System instruction prepended once to every conversation.
pub const QUERY_EVALUATION_PROMPT: &str = r#"You help shoppers turn vague wishes into product searches for an online store.

Judge whether the conversation so far says enough about what the shopper wants to produce useful product recommendations.

Validity
- The search is valid only when the accumulated intent carries at least two distinct, meaningful pieces of information.
- Count as distinct: product category ("laptop"), attribute ("lightweight", "red"), intended use or occasion ("for hiking"), price range ("under $50"), brand ("Samsung").
- With fewer than two, the search is not yet valid.

Follow-up questions
- Ask focused questions that would make the search more specific, whether or not it is already valid.
- Every question gets an integer id. Ids start at 0 and keep incrementing across the whole conversation; never reuse an id.
- Give each question a 1 to 3 word short form and a full long form.
- Ask about one attribute per question and offer example options where it helps ("Which material, e.g. leather, cotton or synthetic?").
- Avoid personal, presumptuous or open-ended catch-all questions ("Any other preferences?").

Answers
- The shopper answers as "<id>: <answer>", several answers separated by "; ".
- Record each answer under its question id.
- A new answer for an id replaces the previous answer for that id.
- An empty answer ("2:") removes the recorded answer for that id; ignore it if nothing was recorded.

Cleaned query
- Rewrite the accumulated intent as a short query suited to vector similarity search, e.g. "I need a laptop" plus "0: for gaming under $1000" becomes "gaming laptop under $1000".
- Always reflect the latest answers; drop information that an answer replaced or removed.
- Set it to null when the conversation holds no shopping intent at all ("hello", "test", "what's the weather?").

Always report your evaluation through the provided tool."#;

/// Batched relevance grading over every retrieved document.
pub fn filter_documents_prompt(query: &str, documents: &[RetrievedDocument]) -> String {
    format!(
        r#"You grade search results. For every document below decide whether it is relevant to the shopper's query, meaning it shares significant keywords or meaning with it.

Documents are listed as:

Document ID: <id>
Content: <content>

Documents:

{documents}

Shopper query:

{query}

Return exactly one verdict per document, using its Document ID. Mark a document relevant only when it clearly matches the query."#,
        documents = render_documents(documents, "Content"),
        query = query,
    )
}

/// Batched rewrite of titles and descriptions for relevant documents.
pub fn summarize_documents_prompt(
    documents: &[RetrievedDocument],
    title_length: usize,
    summary_length: usize,
) -> String {
    format!(
        r#"You write product copy for an online store. Rewrite each product description below into an informative, engaging description of about {summary_length} words, and derive a precise product title of about {title_length} words from it.

Products are listed as:

Document ID: <id>
Description: <description>

Products:

{documents}

Reference each result by its Document ID. Use plain text without formatting, and do not mention the Document ID inside the title or description."#,
        summary_length = summary_length,
        title_length = title_length,
        documents = render_documents(documents, "Description"),
    )
}

fn render_documents(documents: &[RetrievedDocument], label: &str) -> String {
    documents
        .iter()
        .map(|doc| format!("Document ID: {}\n{}: {}", doc.ref_id, label, doc.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}
