use std::collections::VecDeque;
use std::hash::Hasher;
use std::path::PathBuf;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use twox_hash::XxHash64;

use crate::database;
use crate::error::Result;
use crate::models::{Exchange, KnowledgeFact, SessionSummary};

/// Capacity of the in-memory context buffer.
const CONTEXT_CAPACITY: usize = 50;
/// How many buffered exchanges feed the fallback AI prompt.
const CONTEXT_WINDOW: usize = 10;

/// Durable conversation memory plus a bounded in-process context
/// buffer. The buffer is a derived cache over the newest exchanges;
/// the database is the source of truth.
pub struct MemoryStore {
    db_path: PathBuf,
    session_id: String,
    buffer: VecDeque<Exchange>,
}

fn new_session_id() -> String {
    let stamp = Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_else(|| Utc::now().timestamp_millis());
    let mut hasher = XxHash64::with_seed(0);
    hasher.write_i64(stamp);
    format!("{:016x}", hasher.finish())[..12].to_string()
}

impl MemoryStore {
    pub fn new(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        database::init_memory_db(&db_path)?;

        let store = Self {
            db_path,
            session_id: new_session_id(),
            buffer: VecDeque::with_capacity(CONTEXT_CAPACITY),
        };
        store.open_session_row()?;
        Ok(store)
    }

    fn connect(&self) -> Result<Connection> {
        database::open(&self.db_path)
    }

    fn open_session_row(&self) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT OR IGNORE INTO sessions (session_id, start_time, interaction_count)
             VALUES (?1, ?2, 0)",
            params![self.session_id, database::now_stored()],
        )?;
        Ok(())
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Append an exchange under the current session, bump the session
    /// interaction counter and cache the exchange in the buffer.
    pub fn save_conversation(
        &mut self,
        user_input: &str,
        assistant_response: &str,
        context_tags: &[String],
        importance: i64,
    ) -> Result<()> {
        let timestamp = database::now_stored();
        let tags_json = serde_json::to_string(context_tags)?;

        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO conversations
                (session_id, timestamp, user_input, assistant_response, context_tags, importance_score)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                self.session_id,
                timestamp,
                user_input,
                assistant_response,
                tags_json,
                importance
            ],
        )?;
        conn.execute(
            "INSERT INTO sessions (session_id, start_time, interaction_count)
             VALUES (?1, ?2, 1)
             ON CONFLICT(session_id)
             DO UPDATE SET interaction_count = interaction_count + 1",
            params![self.session_id, timestamp],
        )?;

        self.buffer.push_back(Exchange {
            session_id: self.session_id.clone(),
            timestamp,
            user_input: user_input.to_string(),
            assistant_response: assistant_response.to_string(),
            context_tags: context_tags.to_vec(),
            importance_score: importance,
        });
        while self.buffer.len() > CONTEXT_CAPACITY {
            self.buffer.pop_front();
        }
        Ok(())
    }

    /// Recent exchanges in chronological order. The query runs
    /// newest-first to honor the limit, then is reversed.
    pub fn get_conversation_history(
        &self,
        limit: usize,
        session_id: Option<&str>,
    ) -> Result<Vec<Exchange>> {
        let conn = self.connect()?;
        let mut exchanges = match session_id {
            Some(session) => {
                let mut stmt = conn.prepare(
                    "SELECT session_id, timestamp, user_input, assistant_response,
                            context_tags, importance_score
                     FROM conversations
                     WHERE session_id = ?1
                     ORDER BY timestamp DESC, id DESC
                     LIMIT ?2",
                )?;
                let rows = stmt.query_map(params![session, limit as i64], row_to_exchange)?;
                rows.collect::<std::result::Result<Vec<_>, _>>()?
            }
            None => {
                let mut stmt = conn.prepare(
                    "SELECT session_id, timestamp, user_input, assistant_response,
                            context_tags, importance_score
                     FROM conversations
                     ORDER BY timestamp DESC, id DESC
                     LIMIT ?1",
                )?;
                let rows = stmt.query_map(params![limit as i64], row_to_exchange)?;
                rows.collect::<std::result::Result<Vec<_>, _>>()?
            }
        };
        exchanges.reverse();
        Ok(exchanges)
    }

    /// Case-insensitive substring search over both sides of every
    /// exchange, newest first.
    pub fn search_conversations(&self, query: &str, limit: usize) -> Result<Vec<Exchange>> {
        let pattern = format!("%{}%", query);
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT session_id, timestamp, user_input, assistant_response,
                    context_tags, importance_score
             FROM conversations
             WHERE user_input LIKE ?1 OR assistant_response LIKE ?1
             ORDER BY timestamp DESC, id DESC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![pattern, limit as i64], row_to_exchange)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// "User:/Assistant:" transcript of the newest buffered exchanges,
    /// injected into fallback AI prompts.
    pub fn get_current_context(&self) -> String {
        if self.buffer.is_empty() {
            return String::new();
        }
        let start = self.buffer.len().saturating_sub(CONTEXT_WINDOW);
        let mut lines = Vec::new();
        for exchange in self.buffer.iter().skip(start) {
            lines.push(format!("User: {}", exchange.user_input));
            lines.push(format!("Assistant: {}", exchange.assistant_response));
        }
        lines.join("\n")
    }

    pub fn save_user_preference(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO user_preferences (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = ?3",
            params![key, value, database::now_stored()],
        )?;
        Ok(())
    }

    pub fn get_user_preference(&self, key: &str, default: &str) -> Result<String> {
        let conn = self.connect()?;
        let value: Option<String> = conn
            .query_row(
                "SELECT value FROM user_preferences WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value.unwrap_or_else(|| default.to_string()))
    }

    pub fn add_knowledge(
        &self,
        topic: &str,
        fact: &str,
        source: Option<&str>,
        confidence: f64,
    ) -> Result<()> {
        let now = database::now_stored();
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO knowledge_base (topic, fact, source, confidence_score, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![topic, fact, source, confidence, now],
        )?;
        Ok(())
    }

    /// Facts whose topic or text matches the query, most trusted and
    /// most recent first.
    pub fn search_knowledge(&self, query: &str, limit: usize) -> Result<Vec<KnowledgeFact>> {
        let pattern = format!("%{}%", query);
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT topic, fact, source, confidence_score, created_at
             FROM knowledge_base
             WHERE topic LIKE ?1 OR fact LIKE ?1
             ORDER BY confidence_score DESC, created_at DESC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![pattern, limit as i64], |row| {
            Ok(KnowledgeFact {
                topic: row.get(0)?,
                fact: row.get(1)?,
                source: row.get(2)?,
                confidence: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Session metadata plus how many exchanges it recorded.
    pub fn session_summary(&self, session_id: Option<&str>) -> Result<SessionSummary> {
        let target = session_id.unwrap_or(&self.session_id).to_string();
        let conn = self.connect()?;

        let metadata = conn
            .query_row(
                "SELECT start_time, end_time, interaction_count, session_summary
                 FROM sessions WHERE session_id = ?1",
                params![target],
                |row| {
                    Ok((
                        row.get::<_, Option<String>>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, Option<String>>(3)?,
                    ))
                },
            )
            .optional()?;

        let conversation_count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM conversations WHERE session_id = ?1",
            params![target],
            |row| row.get(0),
        )?;

        let (start_time, end_time, interaction_count, summary) =
            metadata.unwrap_or((None, None, 0, None));
        Ok(SessionSummary {
            session_id: target,
            start_time,
            end_time,
            interaction_count,
            conversation_count,
            summary,
        })
    }

    /// Close the current session, start a fresh one and drop the
    /// buffer. Durable history is untouched.
    pub fn end_session(&mut self, summary: Option<&str>) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            "UPDATE sessions SET end_time = ?1, session_summary = ?2 WHERE session_id = ?3",
            params![database::now_stored(), summary, self.session_id],
        )?;
        drop(conn);

        self.session_id = new_session_id();
        self.buffer.clear();
        self.open_session_row()
    }
}

fn row_to_exchange(row: &rusqlite::Row<'_>) -> rusqlite::Result<Exchange> {
    let tags_json: Option<String> = row.get(4)?;
    let context_tags = tags_json
        .and_then(|json| serde_json::from_str(&json).ok())
        .unwrap_or_default();
    Ok(Exchange {
        session_id: row.get(0)?,
        timestamp: row.get(1)?,
        user_input: row.get(2)?,
        assistant_response: row.get(3)?,
        context_tags,
        importance_score: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(tag: &str) -> (MemoryStore, PathBuf) {
        let path = std::env::temp_dir().join(format!(
            "artifix-memory-{}-{}.db",
            tag,
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        (MemoryStore::new(&path).unwrap(), path)
    }

    #[test]
    fn history_is_chronological() {
        let (mut store, path) = temp_store("history");
        for i in 0..5 {
            store
                .save_conversation(&format!("question {}", i), &format!("answer {}", i), &[], 1)
                .unwrap();
        }
        let history = store.get_conversation_history(3, None).unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].user_input, "question 2");
        assert_eq!(history[2].user_input, "question 4");
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn context_reflects_last_ten_and_buffer_stays_bounded() {
        let (mut store, path) = temp_store("context");
        for i in 0..60 {
            store
                .save_conversation(&format!("input {}", i), "noted", &[], 1)
                .unwrap();
        }
        assert_eq!(store.buffer.len(), CONTEXT_CAPACITY);

        let context = store.get_current_context();
        assert!(context.contains("User: input 59"));
        assert!(context.contains("User: input 50"));
        assert!(!context.contains("User: input 49\n"));
        assert_eq!(context.lines().count(), CONTEXT_WINDOW * 2);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn search_matches_either_side_of_the_exchange() {
        let (mut store, path) = temp_store("search");
        store
            .save_conversation("remind me about the dentist", "Reminder saved", &[], 1)
            .unwrap();
        store
            .save_conversation("hello", "The weather is sunny today", &[], 1)
            .unwrap();

        let hits = store.search_conversations("dentist", 10).unwrap();
        assert_eq!(hits.len(), 1);
        let hits = store.search_conversations("WEATHER", 10).unwrap();
        assert_eq!(hits.len(), 1);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn preferences_are_latest_write_wins() {
        let (store, path) = temp_store("prefs");
        store.save_user_preference("theme", "dark").unwrap();
        store.save_user_preference("theme", "light").unwrap();
        assert_eq!(store.get_user_preference("theme", "none").unwrap(), "light");
        assert_eq!(
            store.get_user_preference("missing", "fallback").unwrap(),
            "fallback"
        );
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn knowledge_is_ranked_by_confidence_then_recency() {
        let (store, path) = temp_store("knowledge");
        store
            .add_knowledge("rust", "Rust has no garbage collector", None, 0.6)
            .unwrap();
        store
            .add_knowledge("rust", "Rust 1.0 shipped in 2015", Some("release notes"), 0.9)
            .unwrap();

        let facts = store.search_knowledge("rust", 5).unwrap();
        assert_eq!(facts.len(), 2);
        assert_eq!(facts[0].fact, "Rust 1.0 shipped in 2015");
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn end_session_rotates_id_and_clears_buffer() {
        let (mut store, path) = temp_store("end-session");
        store
            .save_conversation("first", "response", &[], 1)
            .unwrap();
        let old_session = store.session_id().to_string();

        store.end_session(Some("wrap up")).unwrap();
        assert_ne!(store.session_id(), old_session);
        assert!(store.get_current_context().is_empty());

        let closed = store.session_summary(Some(&old_session)).unwrap();
        assert!(closed.end_time.is_some());
        assert_eq!(closed.summary.as_deref(), Some("wrap up"));
        assert_eq!(closed.conversation_count, 1);
        let _ = std::fs::remove_file(path);
    }
}
