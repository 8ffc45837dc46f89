// Aggregates the `minion-exec` integration tests as modules.
mod config_file;
mod json_output;
