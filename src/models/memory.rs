use serde::{Deserialize, Serialize};

/// One recorded user-input / assistant-response pair. Append-only;
/// exchanges are never mutated or deleted once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exchange {
    pub session_id: String,
    pub timestamp: String,
    pub user_input: String,
    pub assistant_response: String,
    pub context_tags: Vec<String>,
    pub importance_score: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub interaction_count: i64,
    pub conversation_count: i64,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeFact {
    pub topic: String,
    pub fact: String,
    pub source: Option<String>,
    pub confidence: f64,
    pub created_at: String,
}
