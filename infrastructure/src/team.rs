//! Default market analysis team.
//!
//! Two agents, registered in this order:
//!
//! | Id | Name | Tools |
//! |----|------|-------|
//! | `web` | Web Researcher | `web_search` |
//! | `finance` | Financial Analyst | `get_stock_price`, `get_analyst_recommendations`, `get_company_info` |

use crate::config::FileTeamConfig;
use crate::tools::market::{
    AnalystRecommendationsTool, CompanyInfoTool, GET_ANALYST_RECOMMENDATIONS, GET_COMPANY_INFO,
    GET_STOCK_PRICE, StockPriceTool, YahooFinanceClient,
};
use crate::tools::web_search::{WEB_SEARCH, WebSearchTool};
use finteam_application::{
    Agent, CompletionBackend, ConfigError, TeamConfig, TeamCoordinator,
};
use finteam_domain::{AgentProfile, DomainError};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

pub const WEB_AGENT: &str = "web";
pub const FINANCE_AGENT: &str = "finance";

/// Instructions for the synthesis step.
pub const TEAM_INSTRUCTIONS: [&str; 3] = [
    "Combine web research and financial data into one analysis",
    "Use 💹 for positive trends and 🔻 for negative trends",
    "Include timestamps for data points",
];

#[derive(Error, Debug)]
pub enum TeamSetupError {
    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Which default agents take part in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamToggles {
    pub web: bool,
    pub finance: bool,
}

impl Default for TeamToggles {
    fn default() -> Self {
        Self {
            web: true,
            finance: true,
        }
    }
}

impl From<&FileTeamConfig> for TeamToggles {
    fn from(config: &FileTeamConfig) -> Self {
        Self {
            web: config.web_agent,
            finance: config.finance_agent,
        }
    }
}

pub fn web_researcher_profile() -> AgentProfile {
    AgentProfile::new(WEB_AGENT, "Web Researcher", "Gather real-time web data")
        .with_instruction("Always cite sources with [1] notation")
        .with_instruction("List the cited URLs at the end of your answer")
}

pub fn financial_analyst_profile() -> AgentProfile {
    AgentProfile::new(FINANCE_AGENT, "Financial Analyst", "Analyze stock market data")
        .with_instruction("Format numbers with $ symbols and ▲/▼ indicators")
        .with_instruction("Use ticker symbols (e.g. NVDA) when calling tools")
}

pub fn web_agent(http_timeout: Duration) -> Result<Agent, TeamSetupError> {
    let agent = Agent::new(web_researcher_profile())
        .with_tool(Arc::new(WebSearchTool::new(http_timeout)?))?
        .with_tool_alias("search", WEB_SEARCH)
        .with_tool_alias("web", WEB_SEARCH);
    Ok(agent)
}

pub fn finance_agent(http_timeout: Duration) -> Result<Agent, TeamSetupError> {
    let client = Arc::new(YahooFinanceClient::new(http_timeout)?);
    let agent = Agent::new(financial_analyst_profile())
        .with_tool(Arc::new(StockPriceTool::new(client.clone())))?
        .with_tool(Arc::new(AnalystRecommendationsTool::new(client.clone())))?
        .with_tool(Arc::new(CompanyInfoTool::new(client)))?
        .with_tool_alias("stock_price", GET_STOCK_PRICE)
        .with_tool_alias("analyst_recommendations", GET_ANALYST_RECOMMENDATIONS)
        .with_tool_alias("company_info", GET_COMPANY_INFO);
    Ok(agent)
}

/// Build the coordinator with both default agents registered and the
/// disabled ones switched off.
pub fn default_team(
    backend: Arc<dyn CompletionBackend>,
    config: TeamConfig,
    toggles: TeamToggles,
) -> Result<TeamCoordinator, TeamSetupError> {
    let http_timeout = config.tool_timeout;
    let mut coordinator = TeamCoordinator::new(backend, config)?
        .with_agent(web_agent(http_timeout)?)?
        .with_agent(finance_agent(http_timeout)?)?;

    for instruction in TEAM_INSTRUCTIONS {
        coordinator = coordinator.with_team_instruction(instruction);
    }
    coordinator.set_enabled(WEB_AGENT, toggles.web);
    coordinator.set_enabled(FINANCE_AGENT, toggles.finance);

    info!(
        web = toggles.web,
        finance = toggles.finance,
        "Default team assembled"
    );
    Ok(coordinator)
}
