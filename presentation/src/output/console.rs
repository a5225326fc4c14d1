//! Console output formatter for team reports

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use finteam_domain::{AgentFailure, FailureKind, RunStatus, RunSummary, TeamReport};
use std::time::Duration;

/// Formats team reports for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete report
    pub fn format(report: &TeamReport) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Market Analysis Report"));
        output.push('\n');

        output.push_str(&format!("{} {}\n", "Query:".cyan().bold(), report.query));

        // Answer
        match (&report.answer, report.is_degraded()) {
            (Some(answer), false) => {
                output.push_str(&Self::section_header("Team Answer"));
                output.push_str(&format!("\n{}\n", answer.trim()));
            }
            (Some(answer), true) => {
                output.push_str(&Self::section_header("Team Answer (degraded)"));
                output.push_str(&format!(
                    "\n{}\n\n{}\n",
                    "Synthesis was unavailable; agent answers are shown as written."
                        .yellow()
                        .bold(),
                    answer.trim()
                ));
            }
            (None, _) => {
                output.push_str(&Self::section_header("No Answer"));
                output.push_str(&format!("\n{}\n", Self::no_answer_notice(report).red().bold()));
            }
        }

        // Agents
        if !report.runs.is_empty() {
            output.push_str(&Self::section_header("Agents"));
            for run in &report.runs {
                output.push_str(&Self::run_line(run));
                output.push('\n');
            }
        }

        // Failures
        if !report.failures.is_empty() {
            output.push_str(&Self::section_header("Failures"));
            for failure in &report.failures {
                output.push_str(&Self::failure_line(failure));
                output.push('\n');
            }
        }

        output.push_str(&format!(
            "\n{} {}\n",
            "Total time:".dimmed(),
            format_duration(report.elapsed)
        ));
        output.push_str(&Self::footer());

        output
    }

    /// Format as JSON
    pub fn format_json(report: &TeamReport) -> String {
        serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the answer only (concise output)
    pub fn format_answer_only(report: &TeamReport) -> String {
        match &report.answer {
            Some(answer) if report.is_degraded() => format!(
                "{}\n\n{}\n",
                "(degraded: agent answers concatenated)".yellow(),
                answer.trim()
            ),
            Some(answer) => format!("{}\n", answer.trim()),
            None => format!("{}\n", Self::no_answer_notice(report).red().bold()),
        }
    }

    fn no_answer_notice(report: &TeamReport) -> String {
        if report.runs.is_empty() {
            "No agents were enabled.".to_string()
        } else {
            format!(
                "All agents failed ({}).",
                report
                    .team_failure
                    .unwrap_or(FailureKind::AllAgentsFailed)
            )
        }
    }

    fn run_line(run: &RunSummary) -> String {
        let status = match &run.status {
            RunStatus::Succeeded => "succeeded".green(),
            RunStatus::Cancelled => "cancelled".yellow(),
            RunStatus::Failed { .. } => "failed".red(),
            other => other.as_str().normal(),
        };
        format!(
            "  {:<20} {:<10} {} tool call(s), {}",
            run.agent_name,
            status,
            run.tool_invocations,
            format_duration(run.elapsed)
        )
    }

    fn failure_line(failure: &AgentFailure) -> String {
        let kind = match failure.reason.cause {
            Some(cause) => format!("{} after {}", failure.reason.kind, cause),
            None => failure.reason.kind.to_string(),
        };
        format!(
            "  {}: {}",
            format!("{} [{}]", failure.agent_name, kind).red().bold(),
            failure.reason.message
        )
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("{}\n", "=".repeat(60).cyan())
    }
}

fn format_duration(d: Duration) -> String {
    format!("{:.1}s", d.as_secs_f64())
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, report: &TeamReport) -> String {
        Self::format(report)
    }

    fn format_json(&self, report: &TeamReport) -> String {
        Self::format_json(report)
    }

    fn format_answer_only(&self, report: &TeamReport) -> String {
        Self::format_answer_only(report)
    }
}
