use minion_core::Config;
use minion_protocol::events::ToolCallEvent;

use crate::event_processor::EventProcessor;
use crate::event_processor::SessionSummary;

/// Writes every event as one JSON line on stdout.
pub(crate) struct EventProcessorWithJsonOutput;

impl EventProcessorWithJsonOutput {
    pub fn new() -> Self {
        Self {}
    }
}

impl EventProcessor for EventProcessorWithJsonOutput {
    fn print_config_summary(&mut self, _config: &Config, _source: &str, _default_session_id: &str) {
        // Intentionally left blank: JSON consumers only want events.
    }

    fn process_event(&mut self, event: ToolCallEvent) {
        match serde_json::to_string(&event) {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::error!("failed to serialize event: {e}"),
        }
    }

    fn print_final_state(&mut self, _sessions: &[SessionSummary]) {}
}
