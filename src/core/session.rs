//! Chat session history shown in the sidebar.
//!
//! Sessions only carry a summary. Selecting one restores a fixed demo
//! transcript; full transcripts are not kept per session.

use crate::core::message::Message;

/// Titles longer than this many characters are cut and suffixed with `...`.
pub const TITLE_MAX_CHARS: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSession {
    pub id: String,
    pub title: String,
    pub date: String,
    pub preview: String,
}

impl ChatSession {
    /// Summarize a conversation from the first prompt the user sent.
    pub fn from_first_message(id: impl Into<String>, text: &str) -> Self {
        Self {
            id: id.into(),
            title: session_title(text),
            date: "Just now".to_string(),
            preview: text.to_string(),
        }
    }
}

pub fn session_title(text: &str) -> String {
    if text.chars().count() > TITLE_MAX_CHARS {
        let head: String = text.chars().take(TITLE_MAX_CHARS).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Vec<ChatSession>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_demo_sessions()
    }
}

impl SessionStore {
    pub fn empty() -> Self {
        Self {
            sessions: Vec::new(),
        }
    }

    pub fn with_demo_sessions() -> Self {
        Self {
            sessions: vec![
                ChatSession {
                    id: "1".to_string(),
                    title: "React Component Help".to_string(),
                    date: "2 days ago".to_string(),
                    preview: "How to create a...".to_string(),
                },
                ChatSession {
                    id: "2".to_string(),
                    title: "Creative Writing".to_string(),
                    date: "5 days ago".to_string(),
                    preview: "Write a story about...".to_string(),
                },
            ],
        }
    }

    pub fn list(&self) -> &[ChatSession] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ChatSession> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.sessions.iter().position(|s| s.id == id)
    }

    /// Create a session for a freshly completed exchange and put it at the
    /// top of the list. Returns the new session id.
    pub fn create_from_prompt(&mut self, text: &str) -> String {
        let id = self.next_id();
        self.sessions
            .insert(0, ChatSession::from_first_message(id.clone(), text));
        id
    }

    fn next_id(&self) -> String {
        let mut candidate = chrono::Utc::now().timestamp_millis();
        while self.contains(&candidate.to_string()) {
            candidate += 1;
        }
        candidate.to_string()
    }
}

/// Transcript shown when a saved session is opened.
pub fn demo_transcript(first_id: u64) -> Vec<Message> {
    vec![
        Message::user(first_id, "This is a restored history for demo."),
        Message::model(first_id + 1, "Indeed, this is a visual demonstration."),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_titles_are_kept_verbatim() {
        assert_eq!(session_title("Hi"), "Hi");
        let exactly_thirty = "a".repeat(TITLE_MAX_CHARS);
        assert_eq!(session_title(&exactly_thirty), exactly_thirty);
    }

    #[test]
    fn long_titles_are_cut_on_character_boundaries() {
        let text = "é".repeat(TITLE_MAX_CHARS + 1);
        let title = session_title(&text);
        assert_eq!(title, format!("{}...", "é".repeat(TITLE_MAX_CHARS)));
    }

    #[test]
    fn new_sessions_go_to_the_front() {
        let mut store = SessionStore::with_demo_sessions();
        let id = store.create_from_prompt("Hi");

        assert_eq!(store.len(), 3);
        let first = &store.list()[0];
        assert_eq!(first.id, id);
        assert_eq!(first.title, "Hi");
        assert_eq!(first.preview, "Hi");
        assert_eq!(first.date, "Just now");
    }

    #[test]
    fn generated_ids_do_not_collide() {
        let mut store = SessionStore::empty();
        let first = store.create_from_prompt("one");
        let second = store.create_from_prompt("two");
        assert_ne!(first, second);
    }

    #[test]
    fn demo_transcript_alternates_roles() {
        let transcript = demo_transcript(10);
        assert_eq!(transcript.len(), 2);
        assert!(transcript[0].is_user());
        assert!(transcript[1].is_model());
        assert_eq!(transcript[1].id, 11);
    }
}
