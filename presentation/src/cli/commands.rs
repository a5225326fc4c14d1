//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Query used when none is given on the command line.
pub const DEFAULT_QUERY: &str =
    "Analyze NVIDIA's current market position in AI chips including stock performance and recent news";

/// Output format for team reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Answer plus per-agent status, failures and timings
    Report,
    /// Only the team answer
    Answer,
    /// The full report as JSON
    Json,
}

/// CLI arguments for finteam
#[derive(Parser, Debug)]
#[command(name = "finteam")]
#[command(author, version, about = "Market analysis by a team of AI agents")]
#[command(long_about = r#"
finteam fans a market question out to a team of agents and merges their answers.

The default team:
1. Web Researcher: searches the web and cites sources with [n]
2. Financial Analyst: reads quotes, analyst ratings and company profiles

Their answers are merged by a synthesis step. If synthesis fails the answers
are concatenated and the report is marked as degraded.

Configuration files are loaded from (in priority order):
1. FINTEAM_<SECTION>__<KEY>   Environment variables
2. --config <path>            Explicit config file
3. ./finteam.toml             Project-level config
4. ~/.config/finteam/config.toml   Global config

The API key is read from GEMINI_API_KEY (a .env file is honoured).

Example:
  finteam "How did AMD stock react to its latest earnings?"
  finteam --no-web -o answer "Compare NVDA and AMD valuations"
  finteam --timeout 60 --activity-log run.jsonl
"#)]
pub struct Cli {
    /// The market question for the team
    pub query: Option<String>,

    /// Sampling temperature (0.0 - 1.0)
    #[arg(long, value_name = "T")]
    pub temperature: Option<f32>,

    /// Maximum tokens per completion
    #[arg(long, value_name = "N")]
    pub max_tokens: Option<u32>,

    /// Maximum tool calls per agent before a final answer is forced
    #[arg(long, value_name = "N")]
    pub tool_rounds: Option<usize>,

    /// Team timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Leave the Web Researcher out of the team
    #[arg(long)]
    pub no_web: bool,

    /// Leave the Financial Analyst out of the team
    #[arg(long)]
    pub no_finance: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "report")]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress live activity display
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Write every activity event to a JSONL file
    #[arg(long, value_name = "PATH")]
    pub activity_log: Option<PathBuf>,

    /// Write diagnostic logs to a file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Skip the backend connection test before running
    #[arg(long)]
    pub no_preflight: bool,
}

impl Cli {
    /// The query to run: the positional argument, or the default question.
    pub fn query_text(&self) -> &str {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .unwrap_or(DEFAULT_QUERY)
    }
}
