use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use retention_core::{ChatMessage, ChatRole};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

/// A saved assistant conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: String,
    /// Human-readable name, taken from the first question
    pub name: String,
    /// Backend the conversation was held against
    pub api_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub messages: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(api_url: impl Into<String>) -> Self {
        let now = Utc::now();
        let id = Uuid::new_v4().simple().to_string();
        Self {
            name: now.format("%Y%m%d-%H%M%S").to_string(),
            id,
            api_url: api_url.into(),
            created_at: now,
            updated_at: now,
            messages: Vec::new(),
        }
    }

    /// Update the name from the first user message (the greeting is skipped).
    pub fn update_name_from_first_message(&mut self) {
        let first = self.messages.iter().find(|m| m.role == ChatRole::User);
        if let Some(message) = first {
            let sanitized = sanitize_session_name(&message.content);
            if !sanitized.is_empty() {
                self.name = sanitized;
            }
        }
    }

    pub fn file_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.json", self.id))
    }

    /// Save the transcript into `dir`, creating it when needed.
    pub fn save(&mut self, dir: &Path) -> Result<PathBuf> {
        self.updated_at = Utc::now();
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create transcripts dir: {}", dir.display()))?;
        let path = self.file_path(dir);
        let json = serde_json::to_string_pretty(self).context("failed to serialize transcript")?;
        std::fs::write(&path, json)
            .with_context(|| format!("failed to write transcript: {}", path.display()))?;
        debug!(id = %self.id, path = %path.display(), "Transcript saved");
        Ok(path)
    }

    /// Load a transcript by ID prefix or name fragment.
    pub fn load(dir: &Path, id_or_name: &str) -> Result<Self> {
        let exact_path = dir.join(format!("{}.json", id_or_name));
        if exact_path.exists() {
            return Self::load_from_path(&exact_path);
        }

        let needle = id_or_name.to_lowercase();
        let mut matches: Vec<Self> = Self::read_all(dir)?
            .into_iter()
            .filter(|s| s.id.starts_with(id_or_name) || s.name.to_lowercase().contains(&needle))
            .collect();

        match matches.len() {
            0 => anyhow::bail!("no transcript found matching '{}'", id_or_name),
            1 => Ok(matches.remove(0)),
            n => anyhow::bail!(
                "ambiguous transcript '{}': {} matches found. Use a more specific identifier.",
                id_or_name,
                n
            ),
        }
    }

    fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read transcript: {}", path.display()))?;
        let session: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse transcript: {}", path.display()))?;
        Ok(session)
    }

    fn read_all(dir: &Path) -> Result<Vec<Self>> {
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let entries = std::fs::read_dir(dir).context("failed to read transcripts directory")?;
        let sessions = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .filter_map(|path| Self::load_from_path(&path).ok())
            .collect();
        Ok(sessions)
    }

    /// List saved transcripts, most recent first.
    pub fn list_all(dir: &Path) -> Result<Vec<SessionSummary>> {
        let mut summaries: Vec<SessionSummary> = Self::read_all(dir)?
            .into_iter()
            .map(|s| SessionSummary {
                message_count: s.messages.len(),
                id: s.id,
                name: s.name,
                updated_at: s.updated_at,
            })
            .collect();
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(summaries)
    }
}

/// Lightweight summary of a transcript for listing.
#[derive(Debug)]
pub struct SessionSummary {
    pub id: String,
    pub name: String,
    pub updated_at: DateTime<Utc>,
    pub message_count: usize,
}

/// Takes the first ~50 chars, replaces non-alphanumeric with dashes, lowercases.
fn sanitize_session_name(text: &str) -> String {
    let mut result = String::new();
    let mut prev_dash = false;
    for c in text.chars().take(50) {
        if c.is_alphanumeric() || c == '_' {
            result.extend(c.to_lowercase());
            prev_dash = false;
        } else {
            if !prev_dash && !result.is_empty() {
                result.push('-');
            }
            prev_dash = true;
        }
    }
    result.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_session_name() {
        assert_eq!(sanitize_session_name("Who is at risk in Sales?"), "who-is-at-risk-in-sales");
        assert_eq!(sanitize_session_name("   lots   of   spaces   "), "lots-of-spaces");
        assert!(sanitize_session_name(&"a".repeat(100)).len() <= 50);
    }

    #[test]
    fn test_name_skips_greeting() {
        let mut session = ChatSession::new("http://localhost:8000/api/v1");
        session.messages = vec![
            ChatMessage::assistant("Hello!"),
            ChatMessage::user("Attrition by department"),
        ];
        session.update_name_from_first_message();
        assert_eq!(session.name, "attrition-by-department");
    }

    #[test]
    fn test_save_load_and_list() {
        let dir = tempfile::tempdir().unwrap();
        let mut first = ChatSession::new("http://a");
        first.messages.push(ChatMessage::user("overtime drivers"));
        first.update_name_from_first_message();
        first.save(dir.path()).unwrap();

        let mut second = ChatSession::new("http://a");
        second.save(dir.path()).unwrap();

        let loaded = ChatSession::load(dir.path(), &first.id[..8]).unwrap();
        assert_eq!(loaded.messages, first.messages);
        assert_eq!(ChatSession::load(dir.path(), "overtime").unwrap().id, first.id);
        assert!(ChatSession::load(dir.path(), "nothing-like-this").is_err());

        let listed = ChatSession::list_all(dir.path()).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);
    }

    #[test]
    fn test_list_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ChatSession::list_all(&dir.path().join("none")).unwrap().is_empty());
    }
}
