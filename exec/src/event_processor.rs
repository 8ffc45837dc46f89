use minion_core::Config;
use minion_protocol::events::ToolCallEvent;
use minion_protocol::tool_call::ToolCallView;

/// Final state of one session after the transcript was exhausted.
pub(crate) struct SessionSummary {
    pub session_id: String,
    pub views: Vec<ToolCallView>,
}

pub(crate) trait EventProcessor: Send {
    /// Print a summary of the effective configuration and input.
    fn print_config_summary(&mut self, config: &Config, source: &str, default_session_id: &str);

    /// Handle a single event emitted by the engine.
    fn process_event(&mut self, event: ToolCallEvent);

    /// Print every tool call's resolved state once replay has finished.
    fn print_final_state(&mut self, sessions: &[SessionSummary]);
}
