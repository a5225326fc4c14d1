//! Scripted collaborators for use case tests.

use crate::ports::activity_observer::ActivityObserver;
use crate::ports::capability_tool::CapabilityTool;
use crate::ports::completion::{CompletionBackend, CompletionError, CompletionRequest};
use async_trait::async_trait;
use finteam_domain::{ActivityEvent, ToolCall, ToolDefinition, ToolFailure, ToolOutput};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// A scripted backend reply
#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Text(String),
    Error(CompletionError),
    /// Wait, then answer with the text
    Delayed(Duration, String),
    /// Never answer
    Hang,
    /// Panic with the message
    Panic(&'static str),
}

/// Mock backend routing each request to the first script whose needle
/// occurs in the system prompt.
pub(crate) struct ScriptedBackend {
    scripts: Mutex<Vec<(String, VecDeque<Reply>)>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedBackend {
    pub(crate) fn new() -> Self {
        Self {
            scripts: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn script(self, needle: &str, replies: Vec<Reply>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .push((needle.to_string(), replies.into()));
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub(crate) fn requests_matching(&self, needle: &str) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.system.contains(needle))
            .cloned()
            .collect()
    }

    fn next_reply(&self, system: &str) -> Reply {
        let mut scripts = self.scripts.lock().unwrap();
        scripts
            .iter_mut()
            .find(|(needle, _)| system.contains(needle.as_str()))
            .and_then(|(_, replies)| replies.pop_front())
            .unwrap_or(Reply::Text("(no more responses)".to_string()))
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    fn model(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        self.requests.lock().unwrap().push(request.clone());
        match self.next_reply(&request.system) {
            Reply::Text(text) => Ok(text),
            Reply::Error(e) => Err(e),
            Reply::Delayed(delay, text) => {
                tokio::time::sleep(delay).await;
                Ok(text)
            }
            Reply::Hang => std::future::pending().await,
            Reply::Panic(message) => panic!("{}", message),
        }
    }
}

/// A scripted tool reply
#[derive(Debug, Clone)]
pub(crate) enum ToolReply {
    Output(String),
    Fail(ToolFailure),
    Hang,
}

/// Mock tool that counts invocations and answers from a script, then "ok".
pub(crate) struct CountingTool {
    definition: ToolDefinition,
    replies: Mutex<VecDeque<ToolReply>>,
    calls: Mutex<Vec<ToolCall>>,
}

impl CountingTool {
    pub(crate) fn new(definition: ToolDefinition) -> Self {
        Self {
            definition,
            replies: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn reply(self, reply: ToolReply) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    pub(crate) fn invocations(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl CapabilityTool for CountingTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn invoke(&self, call: &ToolCall) -> Result<ToolOutput, ToolFailure> {
        self.calls.lock().unwrap().push(call.clone());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(ToolReply::Output("ok".to_string()));
        match reply {
            ToolReply::Output(text) => Ok(ToolOutput::text(text)),
            ToolReply::Fail(failure) => Err(failure),
            ToolReply::Hang => std::future::pending().await,
        }
    }
}

/// Observer keeping every event it sees
#[derive(Default)]
pub(crate) struct RecordingObserver {
    events: Mutex<Vec<ActivityEvent>>,
}

impl RecordingObserver {
    pub(crate) fn events(&self) -> Vec<ActivityEvent> {
        self.events.lock().unwrap().clone()
    }

    pub(crate) fn events_from(&self, source: &str) -> Vec<ActivityEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.source.as_str() == source)
            .collect()
    }
}

impl ActivityObserver for RecordingObserver {
    fn notify(&self, event: &ActivityEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
