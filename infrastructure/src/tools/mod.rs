//! Capability tools available to the default team.
//!
//! | Module | Tools |
//! |--------|-------|
//! | [`web_search`] | `web_search` |
//! | [`market`] | `get_stock_price`, `get_analyst_recommendations`, `get_company_info` |

pub mod market;
pub mod web_search;

pub use market::{
    AnalystRecommendationsTool, CompanyInfoTool, StockPriceTool, YahooFinanceClient,
};
pub use web_search::WebSearchTool;
