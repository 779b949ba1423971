//! GitHub event types and their chat message rendering.

use serde::Serialize;

use crate::error::RelayError;
use crate::payload::{Commit, EventPayload, PushEvent, RefEvent};

/// Maximum number of commit messages listed for a push.
pub const MAX_LISTED_COMMITS: usize = 15;

/// Line appended when a push has more commits than are listed.
pub const TRUNCATION_MARKER: &str = "...";

/// Username used for events without a mapping.
const FALLBACK_USERNAME: &str = "bot";

/// GitHub events the relay knows how to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GithubEvent {
    /// A branch or tag was created
    Create,
    /// A branch or tag was deleted
    Delete,
    /// Commits were pushed to a ref
    Push,
    /// Any other event, carrying the header value as received
    Unknown(String),
}

impl GithubEvent {
    /// Classify an `X-GitHub-Event` header value (case-insensitive).
    #[must_use]
    pub fn from_header(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "create" => Self::Create,
            "delete" => Self::Delete,
            "push" => Self::Push,
            _ => Self::Unknown(raw.to_string()),
        }
    }

    /// Event name used in log fields and message text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Create => "create",
            Self::Delete => "delete",
            Self::Push => "push",
            Self::Unknown(raw) => raw,
        }
    }

    /// Render the chat message for this event.
    pub fn format(&self, payload: EventPayload) -> Result<ChatMessage, RelayError> {
        match self {
            Self::Create | Self::Delete => {
                let event = payload.into_typed::<RefEvent>()?;
                Ok(format_ref_event(self.as_str(), &event))
            }
            Self::Push => Ok(format_push(&payload.into_typed::<PushEvent>()?)),
            Self::Unknown(raw) => Ok(format_unknown(raw)),
        }
    }
}

/// Body of a Mattermost incoming-webhook request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub username: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

fn format_ref_event(action: &str, event: &RefEvent) -> ChatMessage {
    ChatMessage {
        username: event.sender.login.clone(),
        text: format!(
            "Event: {action} {},  Repo: {}, User: {}",
            event.ref_name, event.repository.full_name, event.sender.login
        ),
        icon_url: Some(event.sender.avatar_url.clone()),
    }
}

fn format_push(event: &PushEvent) -> ChatMessage {
    ChatMessage {
        username: event.sender.login.clone(),
        text: format!(
            "Event: push, Repo: {}, Ref: {}, User: {}\nCommits: {}",
            event.repository.full_name,
            event.ref_name,
            event.sender.login,
            summarize_commits(&event.commits)
        ),
        icon_url: Some(event.sender.avatar_url.clone()),
    }
}

fn format_unknown(raw: &str) -> ChatMessage {
    ChatMessage {
        username: FALLBACK_USERNAME.to_string(),
        text: format!("No mapped event: {raw}"),
        icon_url: None,
    }
}

/// Join commit messages one per line, listing at most [`MAX_LISTED_COMMITS`].
#[must_use]
pub fn summarize_commits(commits: &[Commit]) -> String {
    let mut lines: Vec<&str> = commits
        .iter()
        .take(MAX_LISTED_COMMITS)
        .map(|c| c.message.as_str())
        .collect();

    if commits.len() > MAX_LISTED_COMMITS {
        lines.push(TRUNCATION_MARKER);
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: &serde_json::Value) -> EventPayload {
        EventPayload::from_json(value.to_string().as_bytes()).unwrap()
    }

    fn push_payload(commit_count: usize) -> EventPayload {
        let commits: Vec<_> = (1..=commit_count)
            .map(|i| json!({ "id": format!("{i:040}"), "message": format!("commit {i}") }))
            .collect();

        payload(&json!({
            "ref": "refs/heads/main",
            "repository": { "full_name": "o/r" },
            "sender": { "login": "alice", "avatar_url": "https://avatars.example/alice" },
            "commits": commits,
        }))
    }

    fn commit_lines(message: &ChatMessage) -> Vec<&str> {
        let (_, commits) = message.text.split_once("Commits: ").unwrap();
        commits.lines().collect()
    }

    #[test]
    fn test_event_from_header() {
        assert_eq!(GithubEvent::from_header("create"), GithubEvent::Create);
        assert_eq!(GithubEvent::from_header("DELETE"), GithubEvent::Delete);
        assert_eq!(GithubEvent::from_header("Push"), GithubEvent::Push);
        assert_eq!(
            GithubEvent::from_header("Pull_Request"),
            GithubEvent::Unknown("Pull_Request".to_string())
        );
    }

    #[test]
    fn test_create_message() {
        let message = GithubEvent::Create
            .format(payload(&json!({
                "ref": "refs/heads/main",
                "repository": { "full_name": "o/r" },
                "sender": { "login": "alice", "avatar_url": "u" }
            })))
            .unwrap();

        assert_eq!(
            message.text,
            "Event: create refs/heads/main,  Repo: o/r, User: alice"
        );
        assert_eq!(message.username, "alice");
        assert_eq!(message.icon_url.as_deref(), Some("u"));
    }

    #[test]
    fn test_delete_message_uses_canonical_name() {
        let message = GithubEvent::from_header("Delete")
            .format(payload(&json!({
                "ref": "feature/x",
                "ref_type": "branch",
                "repository": { "full_name": "o/r" },
                "sender": { "login": "bob", "avatar_url": "b" }
            })))
            .unwrap();

        assert_eq!(message.text, "Event: delete feature/x,  Repo: o/r, User: bob");
    }

    #[test]
    fn test_push_message() {
        let message = GithubEvent::Push.format(push_payload(3)).unwrap();

        assert_eq!(
            message.text,
            "Event: push, Repo: o/r, Ref: refs/heads/main, User: alice\n\
             Commits: commit 1\ncommit 2\ncommit 3"
        );
        assert_eq!(
            message.icon_url.as_deref(),
            Some("https://avatars.example/alice")
        );
    }

    #[test]
    fn test_push_truncates_long_commit_lists() {
        let message = GithubEvent::Push.format(push_payload(20)).unwrap();
        let lines = commit_lines(&message);

        assert_eq!(lines.len(), MAX_LISTED_COMMITS + 1);
        assert_eq!(lines[0], "commit 1");
        assert_eq!(lines[14], "commit 15");
        assert_eq!(lines[15], TRUNCATION_MARKER);
    }

    #[test]
    fn test_push_at_limit_is_not_truncated() {
        let message = GithubEvent::Push.format(push_payload(15)).unwrap();
        let lines = commit_lines(&message);

        assert_eq!(lines.len(), 15);
        assert!(!lines.contains(&TRUNCATION_MARKER));

        let message = GithubEvent::Push.format(push_payload(16)).unwrap();
        let lines = commit_lines(&message);
        assert_eq!(lines.len(), 16);
        assert_eq!(lines[14], "commit 15");
        assert_eq!(lines[15], TRUNCATION_MARKER);
    }

    #[test]
    fn test_push_without_commits() {
        let message = GithubEvent::Push.format(push_payload(0)).unwrap();
        assert!(message.text.ends_with("\nCommits: "));
    }

    #[test]
    fn test_unknown_event_message() {
        let message = GithubEvent::from_header("foo")
            .format(payload(&json!({ "zen": "Design for failure." })))
            .unwrap();

        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({ "username": "bot", "text": "No mapped event: foo" })
        );
    }

    #[test]
    fn test_missing_ref_is_malformed() {
        let err = GithubEvent::Create
            .format(payload(&json!({
                "repository": { "full_name": "o/r" },
                "sender": { "login": "alice", "avatar_url": "u" }
            })))
            .unwrap_err();

        assert!(matches!(err, RelayError::MalformedPayload(_)));
    }

    #[test]
    fn test_summarize_commits_preserves_order() {
        let commits: Vec<Commit> = ["first", "second"]
            .iter()
            .map(|m| Commit {
                message: (*m).to_string(),
            })
            .collect();

        assert_eq!(summarize_commits(&commits), "first\nsecond");
    }
}
