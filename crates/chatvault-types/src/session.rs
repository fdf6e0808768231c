//! Session context types for chatvault.
//!
//! These types model the rolling interaction record kept for one user:
//! the last recognized intent and entity, the current topic, and the
//! ordered history of input/response exchanges.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// One recorded exchange between the user and the bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub input: String,
    pub response: String,
}

/// The mutable per-user record that gets persisted.
///
/// `user_id` is fixed at construction. `history` only grows, except on
/// [`SessionContext::clear`], which resets everything but the user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    user_id: String,
    pub last_intent: Option<String>,
    pub last_entity: Option<String>,
    pub topic: Option<String>,
    history: Vec<HistoryEntry>,
}

impl SessionContext {
    /// Create an empty context for a user: all fields unknown, no history.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            last_intent: None,
            last_entity: None,
            topic: None,
            history: Vec::new(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Recorded exchanges in insertion order.
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Merge the fields present in `update`.
    ///
    /// Absent fields keep their current value. An exchange is appended to
    /// the history only when both `input` and `response` are supplied.
    pub fn apply_update(&mut self, update: UpdateRequest) {
        if let Some(intent) = update.intent {
            self.last_intent = Some(intent);
        }
        if let Some(entity) = update.entity {
            self.last_entity = Some(entity);
        }
        if let Some(topic) = update.topic {
            self.topic = Some(topic);
        }
        if let (Some(input), Some(response)) = (update.input, update.response) {
            self.history.push(HistoryEntry { input, response });
        }
    }

    /// Reset every field to unknown and empty the history.
    pub fn clear(&mut self) {
        self.last_intent = None;
        self.last_entity = None;
        self.topic = None;
        self.history.clear();
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.last_intent.is_none()
            && self.last_entity.is_none()
            && self.topic.is_none()
            && self.history.is_empty()
    }
}

/// Fields supplied by a single user turn. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateRequest {
    pub intent: Option<String>,
    pub entity: Option<String>,
    pub topic: Option<String>,
    pub input: Option<String>,
    pub response: Option<String>,
}

impl UpdateRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intent(mut self, intent: impl Into<String>) -> Self {
        self.intent = Some(intent.into());
        self
    }

    pub fn entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Set both sides of an exchange so it is recorded in the history.
    pub fn exchange(mut self, input: impl Into<String>, response: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self.response = Some(response.into());
        self
    }
}

/// Short view of the current context, as shown by the `summary` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextSummary {
    pub current_topic: Option<String>,
    pub last_intent: Option<String>,
    pub last_entity: Option<String>,
    pub history_len: usize,
    pub last_interaction: DateTime<Utc>,
}

/// What the language front end made of one line of user text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interpretation {
    pub intent: Option<String>,
    pub entities: Vec<Entity>,
    pub response: String,
}

/// A recognized entity, e.g. `{ kind: "profession", value: "developer" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub kind: String,
    pub value: String,
}

/// Lifecycle state of a session controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    /// Constructed, persisted context not yet loaded.
    #[default]
    Fresh,
    /// Loaded and accepting interaction.
    Active,
    /// Final. Rejects further interaction.
    Terminated,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleState::Fresh => write!(f, "fresh"),
            LifecycleState::Active => write!(f, "active"),
            LifecycleState::Terminated => write!(f, "terminated"),
        }
    }
}

impl FromStr for LifecycleState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fresh" => Ok(LifecycleState::Fresh),
            "active" => Ok(LifecycleState::Active),
            "terminated" => Ok(LifecycleState::Terminated),
            other => Err(format!("invalid lifecycle state: '{other}'")),
        }
    }
}
