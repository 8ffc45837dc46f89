use minion_core::Config;
use minion_core::summary::SummaryLimits;
use minion_core::summary::generate_collapsed_summary;
use minion_protocol::events::ToolCallEvent;
use minion_protocol::tool_call::ResolvedToolStatus;
use minion_protocol::tool_call::ToolCallRecord;
use owo_colors::OwoColorize;
use owo_colors::Style;

use crate::event_processor::EventProcessor;
use crate::event_processor::SessionSummary;

/// Prints one line per event followed by a table of final statuses.
pub(crate) struct EventProcessorWithHumanOutput {
    // To ensure that --color=never is respected, ANSI escapes _must_ be added
    // using .style() with one of these fields. If you need a new style, add a
    // new field here.
    bold: Style,
    dimmed: Style,
    red: Style,
    green: Style,
    yellow: Style,
    cyan: Style,

    limits: SummaryLimits,
}

impl EventProcessorWithHumanOutput {
    pub(crate) fn create_with_ansi(with_ansi: bool, config: &Config) -> Self {
        if with_ansi {
            Self {
                bold: Style::new().bold(),
                dimmed: Style::new().dimmed(),
                red: Style::new().red(),
                green: Style::new().green(),
                yellow: Style::new().yellow(),
                cyan: Style::new().cyan(),
                limits: config.summary,
            }
        } else {
            Self {
                bold: Style::new(),
                dimmed: Style::new(),
                red: Style::new(),
                green: Style::new(),
                yellow: Style::new(),
                cyan: Style::new(),
                limits: config.summary,
            }
        }
    }

    fn print_record(&self, session_id: &str, label: &str, style: Style, record: &ToolCallRecord) {
        let historical = if record.is_historical {
            " (historical)"
        } else {
            ""
        };
        println!(
            "{} {} {}{historical} {}",
            format!("[{session_id}]").style(self.dimmed),
            label.style(style),
            record.id.style(self.bold),
            generate_collapsed_summary(record, &self.limits)
        );
    }

    fn status_style(&self, status: ResolvedToolStatus, has_error: bool) -> Style {
        match status {
            _ if has_error => self.red,
            ResolvedToolStatus::Completed => self.green,
            ResolvedToolStatus::Orphaned | ResolvedToolStatus::PermissionRequired => self.yellow,
            _ => self.cyan,
        }
    }
}

impl EventProcessor for EventProcessorWithHumanOutput {
    fn print_config_summary(&mut self, config: &Config, source: &str, default_session_id: &str) {
        println!(
            "{} {source} {}",
            "replaying".style(self.bold),
            format!("(default session {default_session_id})").style(self.dimmed)
        );
        println!(
            "{} {}",
            "orphaned message:".style(self.dimmed),
            config.orphaned_message
        );
    }

    fn process_event(&mut self, event: ToolCallEvent) {
        match event {
            ToolCallEvent::Started(event) => {
                self.print_record(&event.session_id, "started", self.cyan, &event.tool_call);
            }
            ToolCallEvent::PermissionRequired(event) => {
                self.print_record(
                    &event.session_id,
                    "permission required",
                    self.yellow,
                    &event.tool_call,
                );
            }
            ToolCallEvent::Completed(event) => {
                let failed = event.tool_call.is_denied()
                    || event.tool_call.result.as_ref().is_some_and(|r| r.error);
                let style = if failed { self.red } else { self.green };
                self.print_record(&event.session_id, "completed", style, &event.tool_call);
            }
            ToolCallEvent::Updated(event) => {
                for tool_call in &event.tool_calls {
                    self.print_record(&event.session_id, "updated", self.cyan, tool_call);
                }
            }
            ToolCallEvent::SessionTerminated(event) => {
                let orphaned = if event.orphaned_tool_call_ids.is_empty() {
                    "no tool calls orphaned".to_string()
                } else {
                    format!("orphaned: {}", event.orphaned_tool_call_ids.join(", "))
                };
                println!(
                    "{} {} {orphaned}",
                    format!("[{}]", event.session_id).style(self.dimmed),
                    "session terminated".style(self.red),
                );
            }
            ToolCallEvent::SessionResumed(event) => {
                println!(
                    "{} {}",
                    format!("[{}]", event.session_id).style(self.dimmed),
                    "session resumed".style(self.green),
                );
            }
        }
    }

    fn print_final_state(&mut self, sessions: &[SessionSummary]) {
        for session in sessions {
            println!();
            println!(
                "{} {}",
                "session".style(self.bold),
                session.session_id.style(self.bold)
            );
            if session.views.is_empty() {
                println!("  {}", "no tool calls".style(self.dimmed));
                continue;
            }
            for view in &session.views {
                println!(
                    "  {:<10} {}",
                    view.status.to_string().style(self.status_style(view.status, view.has_error)),
                    view.summary
                );
                if let Some(info) = &view.orphaned_info {
                    println!("    {}", info.message.style(self.dimmed));
                }
            }
        }
    }
}
