//! Live activity display for team runs

use colored::Colorize;
use finteam_application::ActivityObserver;
use finteam_domain::core::string::preview;
use finteam_domain::{ActivityEvent, EventKind};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const PAYLOAD_PREVIEW: usize = 160;

fn kind_emoji(kind: EventKind) -> &'static str {
    match kind {
        EventKind::Thought => "🧠",
        EventKind::Action => "⚡",
        EventKind::Result => "✅",
        EventKind::Failure => "❌",
    }
}

/// One display line for an event.
///
/// Payloads are collapsed to a single line and shortened unless `verbose`.
pub fn format_event(event: &ActivityEvent, verbose: bool) -> String {
    let payload = if verbose {
        event.payload.clone()
    } else {
        preview(&event.payload, PAYLOAD_PREVIEW)
    };

    let source = format!("[{}]", event.source);
    let source = if event.is_from_team() {
        source.magenta().bold()
    } else {
        source.cyan().bold()
    };

    let payload = match event.kind {
        EventKind::Thought => payload.dimmed(),
        EventKind::Action => payload.yellow(),
        EventKind::Result => payload.normal(),
        EventKind::Failure => payload.red(),
    };

    format!("{} {} {}", kind_emoji(event.kind), source, payload)
}

/// Prints events above a spinner while the team works
pub struct ActivityDisplay {
    spinner: ProgressBar,
    verbose: bool,
}

impl ActivityDisplay {
    pub fn new(verbose: bool) -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(Self::spinner_style());
        spinner.set_prefix("Team");
        spinner.set_message("working...");
        spinner.enable_steady_tick(Duration::from_millis(120));
        Self { spinner, verbose }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    /// Stop the spinner and clear its line.
    pub fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ActivityObserver for ActivityDisplay {
    fn notify(&self, event: &ActivityEvent) {
        self.spinner.println(format_event(event, self.verbose));
        self.spinner
            .set_message(format!("{} {}", event.source, event.kind));
    }
}

impl Drop for ActivityDisplay {
    fn drop(&mut self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}

/// Plain line-per-event output (no spinner), for non-interactive terminals
pub struct SimpleActivity {
    pub verbose: bool,
}

impl ActivityObserver for SimpleActivity {
    fn notify(&self, event: &ActivityEvent) {
        eprintln!("{}", format_event(event, self.verbose));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finteam_domain::{AgentId, TEAM_SOURCE};

    fn event(source: &str, kind: EventKind, payload: &str) -> ActivityEvent {
        ActivityEvent::new(AgentId::new(source), kind, payload, 1)
    }

    #[test]
    fn test_format_event_emoji_and_source() {
        colored::control::set_override(false);
        assert_eq!(
            format_event(&event("finance", EventKind::Action, "get_stock_price({\"symbol\":\"NVDA\"})"), false),
            "⚡ [finance] get_stock_price({\"symbol\":\"NVDA\"})"
        );
        assert!(format_event(&event("web", EventKind::Thought, "x"), false).starts_with("🧠"));
        assert!(format_event(&event("web", EventKind::Result, "x"), false).starts_with("✅"));
        assert!(format_event(&event(TEAM_SOURCE, EventKind::Failure, "x"), false).starts_with("❌ [team]"));
    }

    #[test]
    fn test_format_event_collapses_and_shortens() {
        colored::control::set_override(false);
        let long = format!("line one\nline two {}", "x".repeat(400));
        let short = format_event(&event("web", EventKind::Result, &long), false);
        assert!(!short.contains('\n'));
        assert!(short.contains("line one line two"));
        assert!(short.chars().count() < 200);

        let full = format_event(&event("web", EventKind::Result, &long), true);
        assert!(full.contains('\n'));
    }
}
