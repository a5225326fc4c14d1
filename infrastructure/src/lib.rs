//! Infrastructure layer for finteam
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: the Gemini completion backend, web and market-data
//! tools, the JSONL activity log, and configuration file loading.

pub mod config;
pub mod http;
pub mod logging;
pub mod providers;
pub mod team;
pub mod tools;

// Re-export commonly used types
pub use config::{ConfigIssue, ConfigLoader, ConfigValidationError, FileConfig};
pub use logging::JsonlActivityLog;
pub use providers::{
    backend_from_config,
    gemini::{GeminiBackend, GeminiSettings},
};
pub use team::{
    FINANCE_AGENT, TEAM_INSTRUCTIONS, TeamSetupError, TeamToggles, WEB_AGENT, default_team,
};
pub use tools::{
    AnalystRecommendationsTool, CompanyInfoTool, StockPriceTool, WebSearchTool,
    YahooFinanceClient,
};
