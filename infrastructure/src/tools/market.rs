//! Market-data tools backed by the public Yahoo Finance endpoints.
//!
//! | Tool | Endpoint | Output |
//! |------|----------|--------|
//! | `get_stock_price` | v8 chart | price, change ▲/▼, timestamp |
//! | `get_analyst_recommendations` | quoteSummary `recommendationTrend` | buy/hold/sell counts per period |
//! | `get_company_info` | quoteSummary `assetProfile,price,summaryDetail` | profile and key figures |
//!
//! All three take one `symbol` parameter and share one [`YahooFinanceClient`].

use crate::http::{build_client, tool_failure, tool_status_failure};
use async_trait::async_trait;
use chrono::DateTime;
use finteam_application::CapabilityTool;
use finteam_domain::{ToolCall, ToolDefinition, ToolFailure, ToolOutput, ToolParameter};
use reqwest::{Client, header};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub const GET_STOCK_PRICE: &str = "get_stock_price";
pub const GET_ANALYST_RECOMMENDATIONS: &str = "get_analyst_recommendations";
pub const GET_COMPANY_INFO: &str = "get_company_info";

const YAHOO_BASE_URL: &str = "https://query2.finance.yahoo.com";
const MAX_SYMBOL_LEN: usize = 12;
const SUMMARY_MAX_LEN: usize = 600;

/// Thin HTTP client for the Yahoo Finance JSON API.
pub struct YahooFinanceClient {
    client: Client,
    base_url: String,
}

impl YahooFinanceClient {
    pub fn new(request_timeout: Duration) -> Result<Self, reqwest::Error> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        Ok(Self {
            client: build_client(headers, request_timeout)?,
            base_url: YAHOO_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn get_json(
        &self,
        operation: &str,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Value, ToolFailure> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        debug!(%url, "Yahoo Finance request");

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| tool_failure(operation, &e))?;

        let status = response.status().as_u16();
        if status == 404 {
            return Err(ToolFailure::invalid_argument(format!(
                "{}: symbol not found",
                operation
            )));
        }
        if !response.status().is_success() {
            return Err(tool_status_failure(operation, status));
        }

        response
            .json()
            .await
            .map_err(|e| ToolFailure::transient(format!("{}: unreadable response: {}", operation, e)))
    }

    async fn chart(&self, symbol: &str) -> Result<Value, ToolFailure> {
        self.get_json(
            "Stock quote",
            &format!("/v8/finance/chart/{}", symbol),
            &[("range", "1d"), ("interval", "1d")],
        )
        .await
    }

    async fn quote_summary(&self, symbol: &str, modules: &str) -> Result<Value, ToolFailure> {
        self.get_json(
            "Quote summary",
            &format!("/v10/finance/quoteSummary/{}", symbol),
            &[("modules", modules)],
        )
        .await
    }
}

/// Normalize and validate a ticker symbol.
///
/// Accepts letters, digits and `.`, `-`, `^`, `=` (e.g. `BRK-B`, `^GSPC`,
/// `EURUSD=X`); returns the upper-cased symbol.
pub fn normalize_symbol(raw: &str) -> Result<String, ToolFailure> {
    let symbol = raw.trim().to_ascii_uppercase();
    if symbol.is_empty() {
        return Err(ToolFailure::invalid_argument("symbol must not be empty"));
    }
    if symbol.len() > MAX_SYMBOL_LEN {
        return Err(ToolFailure::invalid_argument(format!(
            "symbol '{}' is longer than {} characters",
            symbol, MAX_SYMBOL_LEN
        )));
    }
    if !symbol
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='))
    {
        return Err(ToolFailure::invalid_argument(format!(
            "symbol '{}' contains invalid characters",
            symbol
        )));
    }
    Ok(symbol)
}

fn symbol_parameter() -> ToolParameter {
    ToolParameter::new("symbol", "Ticker symbol, e.g. NVDA", true)
}

fn symbol_of(call: &ToolCall) -> Result<String, ToolFailure> {
    let raw = call
        .require_string("symbol")
        .map_err(ToolFailure::invalid_argument)?;
    normalize_symbol(raw)
}

// ==================== get_stock_price ====================

pub struct StockPriceTool {
    client: Arc<YahooFinanceClient>,
    definition: ToolDefinition,
}

impl StockPriceTool {
    pub fn new(client: Arc<YahooFinanceClient>) -> Self {
        Self {
            client,
            definition: ToolDefinition::new(
                GET_STOCK_PRICE,
                "Latest stock price with change from the previous close",
            )
            .with_parameter(symbol_parameter()),
        }
    }
}

#[async_trait]
impl CapabilityTool for StockPriceTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn invoke(&self, call: &ToolCall) -> Result<ToolOutput, ToolFailure> {
        let symbol = symbol_of(call)?;
        let body = self.client.chart(&symbol).await?;
        let meta = chart_meta(&body)?;
        Ok(ToolOutput::text(format_price(&symbol, meta)?).with_data(meta.clone()))
    }
}

fn chart_meta(body: &Value) -> Result<&Value, ToolFailure> {
    if let Some(description) = body["chart"]["error"]["description"].as_str() {
        return Err(ToolFailure::invalid_argument(description.to_string()));
    }
    let meta = &body["chart"]["result"][0]["meta"];
    if meta.is_null() {
        return Err(ToolFailure::invalid_argument("no quote data for symbol"));
    }
    Ok(meta)
}

fn format_price(symbol: &str, meta: &Value) -> Result<String, ToolFailure> {
    let price = meta["regularMarketPrice"]
        .as_f64()
        .ok_or_else(|| ToolFailure::transient("quote has no market price"))?;
    let currency = meta["currency"].as_str().unwrap_or("USD");

    let mut out = format!("{}: {}", symbol, format_money(price, currency));

    let previous = meta["chartPreviousClose"]
        .as_f64()
        .or_else(|| meta["previousClose"].as_f64());
    if let Some(previous) = previous
        && previous > 0.0
    {
        let change = price - previous;
        let percent = change / previous * 100.0;
        let arrow = if change >= 0.0 { "▲" } else { "▼" };
        out.push_str(&format!(
            " {} {:+.2} ({:+.2}%) vs previous close {}",
            arrow,
            change,
            percent,
            format_money(previous, currency)
        ));
    }

    if let Some(exchange) = meta["fullExchangeName"]
        .as_str()
        .or_else(|| meta["exchangeName"].as_str())
    {
        out.push_str(&format!("\nExchange: {}", exchange));
    }
    if let Some(time) = meta["regularMarketTime"].as_i64().and_then(format_timestamp) {
        out.push_str(&format!("\nAs of: {}", time));
    }
    Ok(out)
}

// ==================== get_analyst_recommendations ====================

pub struct AnalystRecommendationsTool {
    client: Arc<YahooFinanceClient>,
    definition: ToolDefinition,
}

impl AnalystRecommendationsTool {
    pub fn new(client: Arc<YahooFinanceClient>) -> Self {
        Self {
            client,
            definition: ToolDefinition::new(
                GET_ANALYST_RECOMMENDATIONS,
                "Analyst buy/hold/sell recommendation counts for recent months",
            )
            .with_parameter(symbol_parameter()),
        }
    }
}

#[async_trait]
impl CapabilityTool for AnalystRecommendationsTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn invoke(&self, call: &ToolCall) -> Result<ToolOutput, ToolFailure> {
        let symbol = symbol_of(call)?;
        let body = self.client.quote_summary(&symbol, "recommendationTrend").await?;
        let result = summary_result(&body)?;
        Ok(ToolOutput::text(format_recommendations(&symbol, result)))
    }
}

fn summary_result(body: &Value) -> Result<&Value, ToolFailure> {
    if let Some(description) = body["quoteSummary"]["error"]["description"].as_str() {
        return Err(ToolFailure::invalid_argument(description.to_string()));
    }
    let result = &body["quoteSummary"]["result"][0];
    if result.is_null() {
        return Err(ToolFailure::invalid_argument("no summary data for symbol"));
    }
    Ok(result)
}

fn format_recommendations(symbol: &str, result: &Value) -> String {
    let trend = result["recommendationTrend"]["trend"]
        .as_array()
        .map(Vec::as_slice)
        .unwrap_or_default();
    if trend.is_empty() {
        return format!("{}: no analyst recommendations available", symbol);
    }

    let mut lines = vec![format!("Analyst recommendations for {}:", symbol)];
    for period in trend {
        let count = |key: &str| period[key].as_u64().unwrap_or(0);
        let (strong_buy, buy, hold, sell, strong_sell) = (
            count("strongBuy"),
            count("buy"),
            count("hold"),
            count("sell"),
            count("strongSell"),
        );
        lines.push(format!(
            "- {}: strong buy {}, buy {}, hold {}, sell {}, strong sell {} ({})",
            period_label(period["period"].as_str().unwrap_or("?")),
            strong_buy,
            buy,
            hold,
            sell,
            strong_sell,
            consensus(strong_buy + buy, hold, sell + strong_sell),
        ));
    }
    lines.join("\n")
}

fn period_label(period: &str) -> String {
    match period {
        "0m" => "current month".to_string(),
        p => match p.strip_prefix('-').and_then(|m| m.strip_suffix('m')) {
            Some("1") => "1 month ago".to_string(),
            Some(m) => format!("{} months ago", m),
            None => p.to_string(),
        },
    }
}

fn consensus(bullish: u64, hold: u64, bearish: u64) -> &'static str {
    if bullish == 0 && hold == 0 && bearish == 0 {
        "no ratings"
    } else if bullish > hold + bearish {
        "consensus buy ▲"
    } else if bearish > bullish + hold {
        "consensus sell ▼"
    } else {
        "mixed"
    }
}

// ==================== get_company_info ====================

pub struct CompanyInfoTool {
    client: Arc<YahooFinanceClient>,
    definition: ToolDefinition,
}

impl CompanyInfoTool {
    pub fn new(client: Arc<YahooFinanceClient>) -> Self {
        Self {
            client,
            definition: ToolDefinition::new(
                GET_COMPANY_INFO,
                "Company profile: sector, industry, market cap, valuation and business summary",
            )
            .with_parameter(symbol_parameter()),
        }
    }
}

#[async_trait]
impl CapabilityTool for CompanyInfoTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn invoke(&self, call: &ToolCall) -> Result<ToolOutput, ToolFailure> {
        let symbol = symbol_of(call)?;
        let body = self
            .client
            .quote_summary(&symbol, "assetProfile,price,summaryDetail")
            .await?;
        let result = summary_result(&body)?;
        Ok(ToolOutput::text(format_company(&symbol, result)))
    }
}

fn format_company(symbol: &str, result: &Value) -> String {
    let profile = &result["assetProfile"];
    let price = &result["price"];
    let detail = &result["summaryDetail"];
    let currency = price["currency"].as_str().unwrap_or("USD");

    let name = price["longName"]
        .as_str()
        .or_else(|| price["shortName"].as_str())
        .unwrap_or(symbol);
    let mut lines = vec![format!("{} ({})", name, symbol)];

    let mut push = |label: &str, value: Option<String>| {
        if let Some(value) = value {
            lines.push(format!("{}: {}", label, value));
        }
    };
    push("Sector", profile["sector"].as_str().map(str::to_string));
    push("Industry", profile["industry"].as_str().map(str::to_string));
    push("Country", profile["country"].as_str().map(str::to_string));
    push(
        "Employees",
        profile["fullTimeEmployees"].as_u64().map(group_thousands),
    );
    push(
        "Market cap",
        raw(&price["marketCap"]).map(|v| format_large_money(v, currency)),
    );
    push(
        "Trailing P/E",
        raw(&detail["trailingPE"]).map(|v| format!("{:.2}", v)),
    );
    push(
        "52-week range",
        raw(&detail["fiftyTwoWeekLow"])
            .zip(raw(&detail["fiftyTwoWeekHigh"]))
            .map(|(low, high)| {
                format!(
                    "{} - {}",
                    format_money(low, currency),
                    format_money(high, currency)
                )
            }),
    );
    push("Website", profile["website"].as_str().map(str::to_string));

    if let Some(summary) = profile["longBusinessSummary"].as_str() {
        lines.push(String::new());
        lines.push(finteam_domain::core::string::truncate(summary, SUMMARY_MAX_LEN));
    }

    lines.join("\n")
}

/// quoteSummary numbers come as `{"raw": 1.0, "fmt": "1.00"}` or bare.
fn raw(value: &Value) -> Option<f64> {
    value["raw"].as_f64().or_else(|| value.as_f64())
}

// ==================== formatting ====================

fn currency_prefix(currency: &str) -> String {
    match currency {
        "USD" => "$".to_string(),
        other => format!("{} ", other),
    }
}

/// `1234.5` → `$1,234.50`
pub fn format_money(value: f64, currency: &str) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let cents = (value.abs() * 100.0).round() as u64;
    format!(
        "{}{}{}.{:02}",
        sign,
        currency_prefix(currency),
        group_thousands(cents / 100),
        cents % 100
    )
}

/// `2.95e12` → `$2.95T`
pub fn format_large_money(value: f64, currency: &str) -> String {
    let (scaled, suffix) = match value.abs() {
        v if v >= 1e12 => (value / 1e12, "T"),
        v if v >= 1e9 => (value / 1e9, "B"),
        v if v >= 1e6 => (value / 1e6, "M"),
        _ => return format_money(value, currency),
    };
    format!("{}{:.2}{}", currency_prefix(currency), scaled, suffix)
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn format_timestamp(secs: i64) -> Option<String> {
    DateTime::from_timestamp(secs, 0).map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
}
