//! Run Team use case
//!
//! Fans a query out to every enabled agent, waits for them within the
//! coordinator timeout and merges the successful answers.
//!
//! ```text
//!                 ┌─▶ Agent (web)     ─┐
//! query ─▶ Team ──┼─▶ Agent (finance) ─┼─▶ synthesis (registration order) ─▶ TeamReport
//!                 └─▶ ...             ─┘        └─ on failure: concatenation (Degraded)
//! ```

use super::run_agent::{Agent, RunAgentUseCase};
use super::shared::complete_with_retry;
use crate::activity::{ActivityPump, ActivityQueue, EventEmitter};
use crate::config::{ConfigError, TeamConfig};
use crate::ports::activity_observer::ActivityObserver;
use crate::ports::completion::{CompletionBackend, CompletionRequest};
use finteam_domain::{
    AgentRun, DomainError, EventKind, FailureKind, FailureReason, MergeMode, PromptTemplate, Query,
    TEAM_SOURCE, TeamReport, concatenate_answers,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{Id, JoinError, JoinSet};
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// How long cancelled agents get to record their own `Cancelled` state
/// before their tasks are aborted.
const CANCEL_GRACE: Duration = Duration::from_millis(100);

struct TeamMember {
    agent: Arc<Agent>,
    enabled: bool,
}

/// Coordinator for a team of agents
pub struct TeamCoordinator {
    backend: Arc<dyn CompletionBackend>,
    config: TeamConfig,
    members: Vec<TeamMember>,
    team_instructions: Vec<String>,
    cancellation: Option<CancellationToken>,
}

impl std::fmt::Debug for TeamCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TeamCoordinator")
            .field("model", &self.backend.model())
            .field(
                "agents",
                &self
                    .members
                    .iter()
                    .map(|m| (m.agent.id().as_str(), m.enabled))
                    .collect::<Vec<_>>(),
            )
            .field("team_instructions", &self.team_instructions.len())
            .finish()
    }
}

impl TeamCoordinator {
    pub fn new(backend: Arc<dyn CompletionBackend>, config: TeamConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            backend,
            config,
            members: Vec::new(),
            team_instructions: Vec::new(),
            cancellation: None,
        })
    }

    /// Register an agent (enabled). Registration order is merge order.
    pub fn register(&mut self, agent: Agent) -> Result<(), DomainError> {
        if self.members.iter().any(|m| m.agent.id() == agent.id()) {
            return Err(DomainError::DuplicateAgent(agent.id().to_string()));
        }
        self.members.push(TeamMember {
            agent: Arc::new(agent),
            enabled: true,
        });
        Ok(())
    }

    pub fn with_agent(mut self, agent: Agent) -> Result<Self, DomainError> {
        self.register(agent)?;
        Ok(self)
    }

    /// Toggle an agent. Returns `false` if no agent has that id.
    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> bool {
        match self.members.iter_mut().find(|m| m.agent.id().as_str() == id) {
            Some(member) => {
                member.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Add an instruction for the synthesis step (formatting, emphasis).
    pub fn with_team_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.team_instructions.push(instruction.into());
        self
    }

    /// Cancel runs when `token` is cancelled (e.g. on Ctrl-C).
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn config(&self) -> &TeamConfig {
        &self.config
    }

    /// Registered agents with their enabled flag, in registration order.
    pub fn agents(&self) -> impl Iterator<Item = (&Agent, bool)> {
        self.members.iter().map(|m| (m.agent.as_ref(), m.enabled))
    }

    /// Run the team on `query`. Always resolves to a report, within
    /// the coordinator timeout plus a short grace period.
    pub async fn run(&self, query: &Query, observer: Arc<dyn ActivityObserver>) -> TeamReport {
        let start = Instant::now();
        let deadline = start + self.config.coordinator_timeout;
        let token = self
            .cancellation
            .as_ref()
            .map(CancellationToken::child_token)
            .unwrap_or_default();

        let queue = Arc::new(ActivityQueue::new(self.config.event_queue_capacity));
        let pump = ActivityPump::start(Arc::clone(&queue), observer);
        let mut team = EventEmitter::new(TEAM_SOURCE.into(), Arc::clone(&queue));

        let enabled: Vec<Arc<Agent>> = self
            .members
            .iter()
            .filter(|m| m.enabled)
            .map(|m| Arc::clone(&m.agent))
            .collect();

        if enabled.is_empty() {
            warn!("No agents enabled, nothing to run");
            team.emit(EventKind::Failure, "no agents enabled").await;
            pump.finish(self.config.drain_grace).await;
            return TeamReport::from_runs(query.text(), &[], None, start.elapsed());
        }

        info!("Dispatching query to {} agents", enabled.len());
        team.emit(
            EventKind::Thought,
            format!("dispatching query to {} agents", enabled.len()),
        )
        .await;

        let runs = self.run_agents(&enabled, query, &queue, &token, deadline).await;

        let answers: Vec<(String, String)> = runs
            .iter()
            .filter_map(|r| r.answer().map(|a| (r.agent_name.clone(), a.to_string())))
            .collect();

        let merged = if answers.is_empty() {
            warn!("All {} agents failed", runs.len());
            team.emit(EventKind::Failure, "all agents failed").await;
            None
        } else {
            team.emit(
                EventKind::Thought,
                format!("merging {} answers", answers.len()),
            )
            .await;
            let merged = self.merge(query, &answers, &token, deadline).await;
            team.emit(EventKind::Result, format!("merge {}", merged.1.as_str()))
                .await;
            Some(merged)
        };

        pump.finish(self.config.drain_grace).await;
        TeamReport::from_runs(query.text(), &runs, merged, start.elapsed())
    }

    /// Run every agent concurrently until all finish or the deadline passes.
    /// Returns one run per agent, in registration order.
    async fn run_agents(
        &self,
        agents: &[Arc<Agent>],
        query: &Query,
        queue: &Arc<ActivityQueue>,
        token: &CancellationToken,
        deadline: Instant,
    ) -> Vec<AgentRun> {
        let start = Instant::now();
        let runner = Arc::new(RunAgentUseCase::new(
            Arc::clone(&self.backend),
            self.config.clone(),
        ));
        let mut slots: Vec<Option<AgentRun>> = agents.iter().map(|_| None).collect();
        let mut tasks: HashMap<Id, usize> = HashMap::new();
        let mut join_set = JoinSet::new();

        for (slot, agent) in agents.iter().enumerate() {
            let runner = Arc::clone(&runner);
            let agent = Arc::clone(agent);
            let query = query.clone();
            let token = token.clone();
            let mut emitter = EventEmitter::new(agent.id().clone(), Arc::clone(queue));

            let handle = join_set.spawn(async move {
                let run = runner.execute(&agent, &query, &mut emitter, &token).await;
                (slot, run)
            });
            tasks.insert(handle.id(), slot);
        }

        loop {
            tokio::select! {
                biased;
                joined = join_set.join_next() => match joined {
                    Some(result) => record(&mut slots, &tasks, agents, start, result),
                    None => break,
                },
                _ = token.cancelled() => {
                    info!("Team run cancelled");
                    break;
                }
                _ = sleep_until(deadline) => {
                    warn!(
                        "Coordinator timeout of {:?} reached, cancelling agents",
                        self.config.coordinator_timeout
                    );
                    break;
                }
            }
        }

        if !join_set.is_empty() {
            token.cancel();
            let grace_end = Instant::now() + CANCEL_GRACE;
            loop {
                tokio::select! {
                    biased;
                    joined = join_set.join_next() => match joined {
                        Some(result) => record(&mut slots, &tasks, agents, start, result),
                        None => break,
                    },
                    _ = sleep_until(grace_end) => break,
                }
            }
            join_set.abort_all();
            while let Some(result) = join_set.join_next().await {
                record(&mut slots, &tasks, agents, start, result);
            }
        }

        slots
            .into_iter()
            .zip(agents)
            .map(|(slot, agent)| {
                slot.unwrap_or_else(|| {
                    debug!("Agent {} did not finish, recording as cancelled", agent.id());
                    let mut run = AgentRun::new(agent.profile());
                    run.cancel();
                    run.set_elapsed(start.elapsed());
                    run
                })
            })
            .collect()
    }

    /// Ask the backend to merge `answers`; fall back to concatenation on
    /// failure or when the deadline leaves no time.
    async fn merge(
        &self,
        query: &Query,
        answers: &[(String, String)],
        token: &CancellationToken,
        deadline: Instant,
    ) -> (String, MergeMode) {
        let degraded = || (concatenate_answers(answers), MergeMode::Degraded);

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() || token.is_cancelled() {
            warn!("No time left for synthesis, concatenating answers");
            return degraded();
        }

        let params = self.config.resolve(query.params());
        let request = CompletionRequest {
            system: PromptTemplate::synthesis_system(&self.team_instructions),
            prompt: PromptTemplate::synthesis_prompt(query.text(), answers),
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        };

        let synthesis = complete_with_retry(
            self.backend.as_ref(),
            &request,
            &self.config.backend_retry,
            token,
        );
        match tokio::time::timeout(remaining, synthesis).await {
            Ok(Ok(text)) if !text.trim().is_empty() => (text.trim().to_string(), MergeMode::Synthesized),
            Ok(Ok(_)) => {
                warn!("Synthesis returned no text, concatenating answers");
                degraded()
            }
            Ok(Err(exit)) => {
                warn!("Synthesis failed ({:?}), concatenating answers", exit);
                degraded()
            }
            Err(_) => {
                warn!("Synthesis hit the coordinator deadline, concatenating answers");
                degraded()
            }
        }
    }
}

fn record(
    slots: &mut [Option<AgentRun>],
    tasks: &HashMap<Id, usize>,
    agents: &[Arc<Agent>],
    start: Instant,
    result: Result<(usize, AgentRun), JoinError>,
) {
    match result {
        Ok((slot, run)) => {
            debug!("Agent {} finished: {}", run.agent, run.status());
            slots[slot] = Some(run);
        }
        Err(e) if e.is_cancelled() => debug!("Agent task aborted"),
        Err(e) => {
            let Some(&slot) = tasks.get(&e.id()) else {
                warn!("Unknown agent task panicked: {}", e);
                return;
            };
            let agent = &agents[slot];
            let message = panic_message(e);
            warn!("Agent {} panicked: {}", agent.id(), message);
            let mut run = AgentRun::new(agent.profile());
            let failed = run.reason().and_then(|_| {
                run.fail(FailureReason::new(
                    FailureKind::Internal,
                    format!("agent task panicked: {}", message),
                ))
            });
            if let Err(e) = failed {
                warn!("Could not record panic of agent {}: {}", agent.id(), e);
            }
            run.set_elapsed(start.elapsed());
            slots[slot] = Some(run);
        }
    }
}

fn panic_message(error: JoinError) -> String {
    match error.try_into_panic() {
        Ok(payload) => payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string()),
        Err(e) => e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryPolicy;
    use crate::ports::activity_observer::NoActivity;
    use crate::ports::completion::CompletionError;
    use crate::use_cases::test_support::{CountingTool, RecordingObserver, Reply, ScriptedBackend};
    use finteam_domain::{
        AgentProfile, FailureKind, RunStatus, ToolDefinition, ToolParameter,
    };

    const SYNTHESIS: &str = "lead analyst";

    fn web_agent() -> Agent {
        Agent::new(
            AgentProfile::new("web", "Web Researcher", "Gather real-time web data")
                .with_instruction("Always cite sources with [1] notation"),
        )
        .with_tool(Arc::new(CountingTool::new(
            ToolDefinition::new("web_search", "Search the web")
                .with_parameter(ToolParameter::new("query", "Search terms", true)),
        )))
        .unwrap()
    }

    fn finance_agent() -> Agent {
        Agent::new(AgentProfile::new(
            "finance",
            "Financial Analyst",
            "Analyze stock market data",
        ))
        .with_tool(Arc::new(CountingTool::new(
            ToolDefinition::new("get_stock_price", "Latest quote")
                .with_parameter(ToolParameter::new("symbol", "Ticker", true)),
        )))
        .unwrap()
    }

    fn final_answer(answer: &str) -> Reply {
        Reply::Text(format!(r#"{{"final_answer": "{}"}}"#, answer))
    }

    fn team(backend: Arc<ScriptedBackend>, config: TeamConfig) -> TeamCoordinator {
        TeamCoordinator::new(backend, config)
            .unwrap()
            .with_agent(web_agent())
            .unwrap()
            .with_agent(finance_agent())
            .unwrap()
            .with_team_instruction("Use 💹 for positive trends and 🔻 for negative ones")
    }

    fn query() -> Query {
        Query::new("Analyze NVIDIA's current market position in AI chips").unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_partial_failure_merges_surviving_answer() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .script("Web Researcher", vec![final_answer("NVIDIA up 3%")])
                .script(
                    "Financial Analyst",
                    vec![Reply::Error(CompletionError::Transient("503".into())); 4],
                )
                .script(SYNTHESIS, vec![Reply::Text("NVIDIA up 3% 💹".into())]),
        );
        let coordinator = team(backend.clone(), TeamConfig::default());

        let report = coordinator.run(&query(), Arc::new(NoActivity)).await;

        assert_eq!(report.answer.as_deref(), Some("NVIDIA up 3% 💹"));
        assert_eq!(report.merge, Some(MergeMode::Synthesized));
        assert_eq!(report.contributors.len(), 1);
        assert_eq!(report.failures.len(), 1);
        let failure = report.failure_for("finance").unwrap();
        assert_eq!(failure.reason.kind, FailureKind::BackendUnavailable);
        assert_eq!(failure.reason.cause, Some(FailureKind::Transient));

        let synthesis = backend.requests_matching(SYNTHESIS);
        assert_eq!(synthesis.len(), 1);
        assert!(synthesis[0].prompt.contains("NVIDIA up 3%"));
        assert!(!synthesis[0].prompt.contains("Financial Analyst"));
        assert!(synthesis[0].system.contains("💹"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_synthesis_order_is_registration_order() {
        // The web agent finishes last but is still merged first.
        let backend = Arc::new(
            ScriptedBackend::new()
                .script(
                    "Web Researcher",
                    vec![Reply::Delayed(
                        Duration::from_secs(5),
                        r#"{"final_answer": "News [1]"}"#.to_string(),
                    )],
                )
                .script("Financial Analyst", vec![final_answer("$120 ▲")])
                .script(SYNTHESIS, vec![Reply::Text("merged".into())]),
        );
        let coordinator = team(backend.clone(), TeamConfig::default());

        let report = coordinator.run(&query(), Arc::new(NoActivity)).await;

        let prompt = &backend.requests_matching(SYNTHESIS)[0].prompt;
        let web = prompt.find("--- Web Researcher ---").unwrap();
        let finance = prompt.find("--- Financial Analyst ---").unwrap();
        assert!(web < finance);
        assert_eq!(
            report.contributors.iter().map(|a| a.as_str()).collect::<Vec<_>>(),
            vec!["web", "finance"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_failed() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .script(
                    "Web Researcher",
                    vec![Reply::Error(CompletionError::PermissionDenied("401".into()))],
                )
                .script(
                    "Financial Analyst",
                    vec![Reply::Error(CompletionError::InvalidRequest("400".into()))],
                ),
        );
        let coordinator = team(backend.clone(), TeamConfig::default());

        let report = coordinator.run(&query(), Arc::new(NoActivity)).await;

        assert_eq!(report.answer, None);
        assert_eq!(report.merge, None);
        assert_eq!(report.team_failure, Some(FailureKind::AllAgentsFailed));
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].reason.kind, FailureKind::PermissionDenied);
        assert_eq!(report.failures[1].reason.kind, FailureKind::InvalidArgument);
        assert!(backend.requests_matching(SYNTHESIS).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_cancels_hung_agent() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .script("Web Researcher", vec![Reply::Hang])
                .script("Financial Analyst", vec![final_answer("$120 ▲")])
                .script(SYNTHESIS, vec![Reply::Text("merged".into())]),
        );
        let config = TeamConfig::default().with_coordinator_timeout(Duration::from_secs(2));
        let coordinator = team(backend, config);

        let started = Instant::now();
        let report = coordinator.run(&query(), Arc::new(NoActivity)).await;
        let elapsed = started.elapsed();

        assert!(elapsed < Duration::from_secs(3), "took {:?}", elapsed);
        let web = &report.runs[0];
        assert_eq!(web.status, RunStatus::Cancelled);
        assert!(web.elapsed >= Duration::from_secs(2));
        assert!(web.elapsed < Duration::from_secs(3));
        assert_eq!(report.failure_for("web").unwrap().reason.kind, FailureKind::Cancelled);

        // Synthesis has no time left, so the surviving answer is concatenated.
        assert_eq!(report.merge, Some(MergeMode::Degraded));
        assert_eq!(
            report.answer.as_deref(),
            Some("## Financial Analyst\n\n$120 ▲")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_synthesis_failure_degrades() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .script("Web Researcher", vec![final_answer("News [1]")])
                .script("Financial Analyst", vec![final_answer("$120 ▲")])
                .script(
                    SYNTHESIS,
                    vec![Reply::Error(CompletionError::Transient("503".into())); 2],
                ),
        );
        let config = TeamConfig::default()
            .with_backend_retry(RetryPolicy::default().with_max_retries(1));
        let coordinator = team(backend.clone(), config);

        let report = coordinator.run(&query(), Arc::new(NoActivity)).await;

        assert!(report.is_degraded());
        assert_eq!(
            report.answer.as_deref(),
            Some("## Web Researcher\n\nNews [1]\n\n## Financial Analyst\n\n$120 ▲")
        );
        assert!(report.failures.is_empty());
        assert_eq!(backend.requests_matching(SYNTHESIS).len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_success_still_synthesized() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .script("Financial Analyst", vec![final_answer("$120 ▲")])
                .script(SYNTHESIS, vec![Reply::Text("$120 💹".into())]),
        );
        let mut coordinator = team(backend.clone(), TeamConfig::default());
        assert!(coordinator.set_enabled("web", false));

        let report = coordinator.run(&query(), Arc::new(NoActivity)).await;

        assert_eq!(report.merge, Some(MergeMode::Synthesized));
        assert_eq!(report.answer.as_deref(), Some("$120 💹"));
        assert_eq!(report.runs.len(), 1);
        assert!(backend.requests_matching("Web Researcher").is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_enabled_agents() {
        let backend = Arc::new(ScriptedBackend::new());
        let mut coordinator = team(backend.clone(), TeamConfig::default());
        coordinator.set_enabled("web", false);
        coordinator.set_enabled("finance", false);

        let report = coordinator.run(&query(), Arc::new(NoActivity)).await;

        assert_eq!(report.team_failure, Some(FailureKind::AllAgentsFailed));
        assert!(report.failures.is_empty());
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_caller_cancellation() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .script("Web Researcher", vec![Reply::Hang])
                .script("Financial Analyst", vec![Reply::Hang]),
        );
        let token = CancellationToken::new();
        let coordinator = team(backend, TeamConfig::default()).with_cancellation(token.clone());
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            token.cancel();
        });

        let started = Instant::now();
        let report = coordinator.run(&query(), Arc::new(NoActivity)).await;

        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(report.runs.iter().all(|r| r.status == RunStatus::Cancelled));
        assert_eq!(report.team_failure, Some(FailureKind::AllAgentsFailed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_event_sequences_per_source() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .script(
                    "Web Researcher",
                    vec![
                        Reply::Text(
                            r#"{"thought": "search", "tool": "web_search", "arguments": {"query": "NVIDIA"}}"#
                                .into(),
                        ),
                        final_answer("News [1]"),
                    ],
                )
                .script(
                    "Financial Analyst",
                    vec![
                        Reply::Text(
                            r#"{"thought": "quote", "tool": "get_stock_price", "arguments": {"symbol": "NVDA"}}"#
                                .into(),
                        ),
                        final_answer("$120 ▲"),
                    ],
                )
                .script(SYNTHESIS, vec![Reply::Text("merged".into())]),
        );
        let observer = Arc::new(RecordingObserver::default());
        let coordinator = team(backend, TeamConfig::default());

        coordinator.run(&query(), observer.clone()).await;

        for source in ["web", "finance", TEAM_SOURCE] {
            let sequences: Vec<u64> = observer.events_from(source).iter().map(|e| e.sequence).collect();
            assert!(!sequences.is_empty(), "no events from {}", source);
            let expected: Vec<u64> = (1..=sequences.len() as u64).collect();
            assert_eq!(sequences, expected, "source {}", source);
        }
        let web_kinds: Vec<EventKind> = observer.events_from("web").iter().map(|e| e.kind).collect();
        assert_eq!(
            web_kinds,
            vec![
                EventKind::Thought,
                EventKind::Action,
                EventKind::Result,
                EventKind::Result
            ]
        );
    }

    #[test]
    fn test_duplicate_agent_rejected() {
        let backend = Arc::new(ScriptedBackend::new());
        let err = TeamCoordinator::new(backend, TeamConfig::default())
            .unwrap()
            .with_agent(web_agent())
            .unwrap()
            .with_agent(web_agent())
            .unwrap_err();
        assert_eq!(err, DomainError::DuplicateAgent("web".to_string()));
    }

    #[test]
    fn test_debug_lists_agents() {
        let coordinator = team(Arc::new(ScriptedBackend::new()), TeamConfig::default());
        let debug = format!("{:?}", coordinator);
        assert!(debug.contains("scripted"));
        assert!(debug.contains("(\"web\", true)"));
        assert!(debug.contains("(\"finance\", true)"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_agent_recorded_as_failed() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .script("Web Researcher", vec![Reply::Panic("scratchpad index out of range")])
                .script("Financial Analyst", vec![final_answer("$120 ▲")])
                .script(SYNTHESIS, vec![Reply::Text("merged".into())]),
        );
        let coordinator = team(backend, TeamConfig::default());

        let report = coordinator.run(&query(), Arc::new(NoActivity)).await;

        assert_eq!(report.answer.as_deref(), Some("merged"));
        assert_eq!(report.contributors.len(), 1);
        assert_eq!(report.contributors[0].as_str(), "finance");
        let failure = report.failure_for("web").unwrap();
        assert_eq!(failure.reason.kind, FailureKind::Internal);
        assert!(failure.reason.message.contains("scratchpad index out of range"));
    }

    struct SlowObserver;

    impl ActivityObserver for SlowObserver {
        fn notify(&self, _event: &finteam_domain::ActivityEvent) {
            std::thread::sleep(Duration::from_millis(500));
        }
    }

    #[tokio::test]
    async fn test_slow_observer_does_not_stretch_run() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .script("Web Researcher", vec![final_answer("News [1]")])
                .script("Financial Analyst", vec![final_answer("$120 ▲")])
                .script(SYNTHESIS, vec![Reply::Text("merged".into())]),
        );
        let config = TeamConfig::default()
            .with_event_queue_capacity(1)
            .with_coordinator_timeout(Duration::from_secs(1))
            .with_drain_grace(Duration::from_millis(100));
        let coordinator = team(backend, config);

        let started = std::time::Instant::now();
        let report = coordinator.run(&query(), Arc::new(SlowObserver)).await;
        let elapsed = started.elapsed();

        assert!(elapsed < Duration::from_millis(1500), "run took {:?}", elapsed);
        assert!(report.failures.is_empty());
        assert_eq!(report.contributors.len(), 2);
        assert_eq!(report.merge, Some(MergeMode::Synthesized));
        assert_eq!(report.answer.as_deref(), Some("merged"));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let backend = Arc::new(ScriptedBackend::new());
        let result = TeamCoordinator::new(backend, TeamConfig::default().with_max_tokens(0));
        assert!(result.is_err());
    }
}
