//! Run Agent use case
//!
//! Drives one agent's bounded reasoning loop against a query:
//!
//! ```text
//! ┌─▶ ask backend (system: role + tools, prompt: query + scratchpad)
//! │      │
//! │      ├── final answer ──────────────▶ Succeeded
//! │      ├── tool call ─▶ invoke ─▶ record invocation ─┐
//! │      └── unparseable ─▶ note in scratchpad ────────┤
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! After `tool_round_bound` rounds the next request forbids tools; anything
//! but a final answer then fails the run with `NoFinalAnswer`.

pub mod agent;
mod tool_step;

pub use agent::Agent;

use crate::activity::EventEmitter;
use crate::config::{ResolvedParams, TeamConfig};
use crate::ports::completion::{CompletionBackend, CompletionRequest};
use crate::use_cases::shared::{StepExit, check_cancelled, complete_with_retry};
use finteam_domain::core::string::preview;
use finteam_domain::{
    AgentRun, AgentStep, EventKind, FailureKind, FailureReason, PromptTemplate,
    Query, ScratchpadEntry, Thought, parse_step,
};
use std::sync::Arc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Maximum payload length for Action/Result event previews
const EVENT_PREVIEW_LEN: usize = 200;

/// Use case for running one agent
pub struct RunAgentUseCase {
    backend: Arc<dyn CompletionBackend>,
    config: TeamConfig,
}

impl RunAgentUseCase {
    pub fn new(backend: Arc<dyn CompletionBackend>, config: TeamConfig) -> Self {
        Self { backend, config }
    }

    /// Run `agent` to a terminal state. Never fails: every outcome is
    /// recorded in the returned [`AgentRun`].
    pub async fn execute(
        &self,
        agent: &Agent,
        query: &Query,
        emitter: &mut EventEmitter,
        token: &CancellationToken,
    ) -> AgentRun {
        let start = Instant::now();
        let mut run = AgentRun::new(agent.profile());
        let params = self.config.resolve(query.params());

        info!("Agent {} started", agent.id());
        let outcome = self
            .reasoning_loop(agent, query, params, &mut run, emitter, token)
            .await;

        // The terminal state is recorded before its event is queued.
        let (finished, kind, payload) = match outcome {
            Ok(answer) => (run.succeed(answer.clone()), EventKind::Result, answer),
            Err(StepExit::Failed(reason)) => {
                warn!("Agent {} failed: {}", agent.id(), reason);
                let payload = reason.to_string();
                // A step may fail mid tool call; failures are recorded from Reasoning.
                let finished = run.reason().and_then(|_| run.fail(reason));
                (finished, EventKind::Failure, payload)
            }
            Err(StepExit::Cancelled) => {
                info!("Agent {} cancelled", agent.id());
                run.cancel();
                (Ok(()), EventKind::Failure, "cancelled".to_string())
            }
        };
        if let Err(e) = finished {
            error!("Agent {} ended in an inconsistent state: {}", agent.id(), e);
            run.cancel();
        }
        run.set_elapsed(start.elapsed());
        emitter.emit(kind, payload).await;
        run
    }

    async fn reasoning_loop(
        &self,
        agent: &Agent,
        query: &Query,
        params: ResolvedParams,
        run: &mut AgentRun,
        emitter: &mut EventEmitter,
        token: &CancellationToken,
    ) -> Result<String, StepExit> {
        let system = PromptTemplate::agent_system(agent.profile(), agent.tool_spec());
        let mut scratchpad: Vec<ScratchpadEntry> = Vec::new();
        let mut rounds_used = 0usize;

        loop {
            check_cancelled(token)?;
            run.reason()?;

            let forced = rounds_used >= params.tool_round_bound;
            let prompt = if forced {
                debug!("Agent {} out of tool rounds, forcing final answer", agent.id());
                PromptTemplate::agent_final(query.text(), &scratchpad)
            } else {
                PromptTemplate::agent_step(query.text(), &scratchpad)
            };
            let request = CompletionRequest {
                system: system.clone(),
                prompt,
                temperature: params.temperature,
                max_tokens: params.max_tokens,
            };

            let response =
                complete_with_retry(self.backend.as_ref(), &request, &self.config.backend_retry, token)
                    .await?;

            let step = parse_step(&response);
            if let Some(thought) = step.as_ref().and_then(|s| s.thought()) {
                run.record_thought(Thought::new(thought));
                emitter.emit(EventKind::Thought, thought).await;
            }

            match step {
                Some(AgentStep::Final { answer, .. }) => return Ok(answer),
                Some(AgentStep::Call { .. }) | None if forced => {
                    return Err(StepExit::Failed(FailureReason::new(
                        FailureKind::NoFinalAnswer,
                        format!("no final answer after {} tool rounds", rounds_used),
                    )));
                }
                Some(AgentStep::Call { thought, call }) => {
                    run.begin_tool_call()?;
                    let action = format!("{}({})", call.tool_name, call.arguments_json());
                    emitter.emit(EventKind::Action, action.clone()).await;

                    let invocation = tool_step::invoke_tool(
                        agent,
                        &call,
                        self.config.tool_timeout,
                        &self.config.tool_retry,
                        token,
                    )
                    .await?;

                    let observation = invocation.observation();
                    emitter
                        .emit(
                            EventKind::Result,
                            format!("{}: {}", call.tool_name, preview(&observation, EVENT_PREVIEW_LEN)),
                        )
                        .await;
                    scratchpad.push(ScratchpadEntry::tool(thought, action, observation));
                    run.record_invocation(invocation);
                    run.reason()?;
                }
                None => {
                    warn!(
                        "Agent {} returned an unparseable response: {}",
                        agent.id(),
                        preview(&response, EVENT_PREVIEW_LEN)
                    );
                    scratchpad.push(ScratchpadEntry::malformed());
                }
            }
            rounds_used += 1;
        }
    }
}
