//! One tool round: resolve, validate, invoke with timeout and retry.

use super::agent::Agent;
use crate::config::RetryPolicy;
use crate::use_cases::shared::{StepExit, backoff};
use finteam_domain::{
    DefaultToolValidator, ToolCall, ToolFailure, ToolInvocation, ToolOutcome, ToolValidator,
    now_millis,
};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Run `call` against `agent`'s tools and record the result.
///
/// Unknown tools and schema violations produce an `InvalidArgument`
/// invocation without touching the tool. Only `Timeout`/`Transient`
/// failures are retried.
pub(crate) async fn invoke_tool(
    agent: &Agent,
    call: &ToolCall,
    timeout: Duration,
    policy: &RetryPolicy,
    token: &CancellationToken,
) -> Result<ToolInvocation, StepExit> {
    let started_at = now_millis();
    let start = Instant::now();

    let Some(tool) = agent.tool(&call.tool_name) else {
        let available: Vec<&str> = agent.tool_spec().names().collect();
        warn!(
            "Agent {} asked for unknown tool '{}'",
            agent.id(),
            call.tool_name
        );
        let failure = ToolFailure::invalid_argument(format!(
            "Unknown tool '{}'. Available: {}",
            call.tool_name,
            available.join(", ")
        ));
        return Ok(ToolInvocation::new(
            call,
            ToolOutcome::Failure(failure),
            started_at,
            start.elapsed(),
            0,
        ));
    };

    if let Err(failure) = DefaultToolValidator.validate(call, tool.definition()) {
        debug!("Rejected call to {}: {}", call.tool_name, failure);
        return Ok(ToolInvocation::new(
            call,
            ToolOutcome::Failure(failure),
            started_at,
            start.elapsed(),
            0,
        ));
    }

    let mut retries = 0u32;
    let outcome = loop {
        let attempt = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(StepExit::Cancelled),
            result = tokio::time::timeout(timeout, tool.invoke(call)) => result,
        };
        let result = attempt.unwrap_or_else(|_| Err(ToolFailure::timeout(&call.tool_name)));

        match result {
            Err(failure) if failure.is_retryable() && policy.allows_retry(retries) => {
                let delay = policy.delay_for(retries);
                retries += 1;
                debug!(
                    "Tool {} failed ({}), retry {}/{} in {:?}",
                    call.tool_name, failure, retries, policy.max_retries, delay
                );
                backoff(delay, token).await?;
            }
            other => break ToolOutcome::from(other),
        }
    };

    Ok(ToolInvocation::new(
        call,
        outcome,
        started_at,
        start.elapsed(),
        retries,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::{CountingTool, ToolReply};
    use finteam_domain::{AgentProfile, FailureKind, ToolDefinition, ToolParameter};
    use std::sync::Arc;

    fn price_tool() -> CountingTool {
        CountingTool::new(
            ToolDefinition::new("get_stock_price", "Latest quote")
                .with_parameter(ToolParameter::new("symbol", "Ticker", true)),
        )
    }

    fn agent_with(tool: Arc<CountingTool>) -> Agent {
        Agent::new(AgentProfile::new("finance", "Financial Analyst", "Analyze stock market data"))
            .with_tool(tool)
            .unwrap()
    }

    fn policy() -> RetryPolicy {
        RetryPolicy::default().with_max_retries(2)
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_required_argument_never_invokes() {
        let tool = Arc::new(price_tool());
        let agent = agent_with(tool.clone());
        let call = ToolCall::new("get_stock_price");

        let invocation = invoke_tool(&agent, &call, Duration::from_secs(5), &policy(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(invocation.failure().unwrap().kind, FailureKind::InvalidArgument);
        assert_eq!(invocation.retries, 0);
        assert_eq!(tool.invocations(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_tool_is_recorded() {
        let tool = Arc::new(price_tool());
        let agent = agent_with(tool.clone());
        let call = ToolCall::new("get_crypto_price").with_arg("symbol", "BTC");

        let invocation = invoke_tool(&agent, &call, Duration::from_secs(5), &policy(), &CancellationToken::new())
            .await
            .unwrap();

        let failure = invocation.failure().unwrap();
        assert_eq!(failure.kind, FailureKind::InvalidArgument);
        assert!(failure.message.contains("get_stock_price"));
        assert_eq!(tool.invocations(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failure_is_retried() {
        let tool = Arc::new(
            price_tool()
                .reply(ToolReply::Fail(ToolFailure::transient("502")))
                .reply(ToolReply::Output("NVDA $120.50".to_string())),
        );
        let agent = agent_with(tool.clone());
        let call = ToolCall::new("get_stock_price").with_arg("symbol", "NVDA");

        let invocation = invoke_tool(&agent, &call, Duration::from_secs(5), &policy(), &CancellationToken::new())
            .await
            .unwrap();

        assert!(invocation.is_success());
        assert_eq!(invocation.retries, 1);
        assert_eq!(invocation.observation(), "NVDA $120.50");
        assert_eq!(tool.invocations(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_permission_denied_is_not_retried() {
        let tool = Arc::new(price_tool().reply(ToolReply::Fail(ToolFailure::permission_denied("quote API"))));
        let agent = agent_with(tool.clone());
        let call = ToolCall::new("get_stock_price").with_arg("symbol", "NVDA");

        let invocation = invoke_tool(&agent, &call, Duration::from_secs(5), &policy(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(invocation.failure().unwrap().kind, FailureKind::PermissionDenied);
        assert_eq!(invocation.retries, 0);
        assert_eq!(tool.invocations(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_tool_times_out_after_retries() {
        let tool = Arc::new(
            price_tool()
                .reply(ToolReply::Hang)
                .reply(ToolReply::Hang)
                .reply(ToolReply::Hang),
        );
        let agent = agent_with(tool.clone());
        let call = ToolCall::new("get_stock_price").with_arg("symbol", "NVDA");

        let invocation = invoke_tool(&agent, &call, Duration::from_secs(1), &policy(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(invocation.failure().unwrap().kind, FailureKind::Timeout);
        assert_eq!(invocation.retries, 2);
        assert_eq!(tool.invocations(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_drops_tool_call() {
        let tool = Arc::new(price_tool().reply(ToolReply::Hang));
        let agent = agent_with(tool.clone());
        let call = ToolCall::new("get_stock_price").with_arg("symbol", "NVDA");
        let token = CancellationToken::new();
        token.cancel();

        let exit = invoke_tool(&agent, &call, Duration::from_secs(30), &policy(), &token)
            .await
            .unwrap_err();
        assert_eq!(exit, StepExit::Cancelled);
    }
}
