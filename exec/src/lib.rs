mod cli;
mod event_processor;
mod event_processor_with_human_output;
mod event_processor_with_json_output;

use std::io::IsTerminal;
use std::path::Path;

use anyhow::Context;
pub use cli::Cli;
use minion_core::Config;
use minion_core::ConfigOverrides;
use minion_core::SessionManager;
use minion_core::transcript::parse_transcript_line;
use supports_color::Stream;
use tokio::io::AsyncBufReadExt;
use tokio::io::AsyncRead;
use tokio::io::BufReader;
use tracing::debug;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::event_processor::EventProcessor;
use crate::event_processor::SessionSummary;
use crate::event_processor_with_human_output::EventProcessorWithHumanOutput;
use crate::event_processor_with_json_output::EventProcessorWithJsonOutput;

pub async fn run_main(cli: Cli) -> anyhow::Result<()> {
    let Cli {
        json: json_mode,
        session_id,
        config_file,
        orphaned_message,
        color,
        transcript,
    } = cli;

    let (stdout_with_ansi, stderr_with_ansi) = match color {
        cli::Color::Always => (true, true),
        cli::Color::Never => (false, false),
        cli::Color::Auto => (
            supports_color::on_cached(Stream::Stdout).is_some(),
            supports_color::on_cached(Stream::Stderr).is_some(),
        ),
    };

    let config = Config::load_with_overrides(ConfigOverrides {
        orphaned_message,
        log_level: None,
        config_file,
    })?;

    let default_level = config.log_level.as_str();
    let _ = tracing_subscriber::fmt()
        // Fallback to the `default_level` log filter if the environment
        // variable is not set _or_ contains an invalid value
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(default_level))
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_ansi(stderr_with_ansi)
        .with_writer(std::io::stderr)
        .try_init();

    let transcript = transcript.filter(|path| path.as_path() != Path::new("-"));
    if transcript.is_none() && std::io::stdin().is_terminal() {
        eprintln!("No transcript provided. Either specify a file or pipe the transcript into stdin.");
        std::process::exit(1);
    }

    let default_session_id = session_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let source = transcript
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<stdin>".to_string());

    let (mut manager, rx_event) = SessionManager::new(config);

    let mut event_processor: Box<dyn EventProcessor> = if json_mode {
        Box::new(EventProcessorWithJsonOutput::new())
    } else {
        Box::new(EventProcessorWithHumanOutput::create_with_ansi(
            stdout_with_ansi,
            manager.config(),
        ))
    };
    event_processor.print_config_summary(manager.config(), &source, &default_session_id);

    // Print events as the engine produces them. The loop ends once the
    // manager (and with it every sender) is dropped.
    let consumer = tokio::spawn(async move {
        while let Ok(event) = rx_event.recv().await {
            event_processor.process_event(event);
        }
        event_processor
    });

    let input: Box<dyn AsyncRead + Unpin + Send> = match &transcript {
        Some(path) => Box::new(
            tokio::fs::File::open(path)
                .await
                .with_context(|| format!("failed to open transcript {}", path.display()))?,
        ),
        None => Box::new(tokio::io::stdin()),
    };
    let replayed = replay(&mut manager, input, &default_session_id).await;

    let sessions: Vec<SessionSummary> = manager
        .session_ids()
        .map(|session_id| SessionSummary {
            session_id: session_id.to_string(),
            views: manager.tool_call_views(session_id),
        })
        .collect();
    drop(manager);

    let mut event_processor = consumer.await?;
    let lines = replayed?;
    info!(lines, sessions = sessions.len(), "replay finished");
    event_processor.print_final_state(&sessions);

    Ok(())
}

/// Feeds every transcript line to `manager`. Returns the number of lines read.
async fn replay(
    manager: &mut SessionManager,
    input: Box<dyn AsyncRead + Unpin + Send>,
    default_session_id: &str,
) -> anyhow::Result<usize> {
    let mut lines = BufReader::new(input).lines();
    let mut line_number = 0;
    while let Some(line) = lines.next_line().await? {
        line_number += 1;
        let Some(envelope) = parse_transcript_line(line_number, &line)? else {
            continue;
        };
        debug!(line = line_number, message = ?envelope.message, "replaying envelope");
        manager.handle_envelope(&envelope, default_session_id);
    }
    Ok(line_number)
}
