//! Output formatter trait

use finteam_domain::TeamReport;

/// Trait for formatting team reports
pub trait OutputFormatter {
    /// Answer plus run details, failures and timings
    fn format(&self, report: &TeamReport) -> String;

    /// Format as JSON
    fn format_json(&self, report: &TeamReport) -> String;

    /// Only the answer (or the failure notice when there is none)
    fn format_answer_only(&self, report: &TeamReport) -> String;
}
