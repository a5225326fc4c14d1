//! Activity events emitted by agents and the team coordinator.

use crate::agent::value_objects::AgentId;
use serde::{Deserialize, Serialize};

/// Source id used by the coordinator for its own events.
pub const TEAM_SOURCE: &str = "team";

/// Kind of lifecycle notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Free-text reasoning from the model
    Thought,
    /// A tool is about to be invoked (payload: tool name and arguments)
    Action,
    /// Tool output or a final answer
    Result,
    /// A run or step failed
    Failure,
}

impl EventKind {
    pub fn as_str(&self) -> &str {
        match self {
            EventKind::Thought => "thought",
            EventKind::Action => "action",
            EventKind::Result => "result",
            EventKind::Failure => "failure",
        }
    }

    /// Thought and Action events may be shed under backpressure; Result and
    /// Failure events must always reach the observer.
    pub fn is_droppable(&self) -> bool {
        matches!(self, EventKind::Thought | EventKind::Action)
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One ordered lifecycle notification.
///
/// `sequence` starts at 1 and increases by one per event from the same
/// source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub source: AgentId,
    pub kind: EventKind,
    pub payload: String,
    pub sequence: u64,
}

impl ActivityEvent {
    pub fn new(source: AgentId, kind: EventKind, payload: impl Into<String>, sequence: u64) -> Self {
        Self {
            source,
            kind,
            payload: payload.into(),
            sequence,
        }
    }

    pub fn is_from_team(&self) -> bool {
        self.source.as_str() == TEAM_SOURCE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_droppable_kinds() {
        assert!(EventKind::Thought.is_droppable());
        assert!(EventKind::Action.is_droppable());
        assert!(!EventKind::Result.is_droppable());
        assert!(!EventKind::Failure.is_droppable());
    }

    #[test]
    fn test_team_source() {
        let event = ActivityEvent::new(TEAM_SOURCE.into(), EventKind::Thought, "dispatching", 1);
        assert!(event.is_from_team());
        let event = ActivityEvent::new("web".into(), EventKind::Result, "done", 4);
        assert!(!event.is_from_team());
    }
}
