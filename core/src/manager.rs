use async_channel::Receiver;
use async_channel::Sender;
use indexmap::IndexMap;
use minion_protocol::events::SessionResumedEvent;
use minion_protocol::events::SessionTerminatedEvent;
use minion_protocol::events::ToolCallEvent;
use minion_protocol::messages::InboundEnvelope;
use minion_protocol::messages::InboundMessage;
use minion_protocol::messages::SessionLifecycleNotification;
use minion_protocol::tool_call::ResolvedToolStatus;
use minion_protocol::tool_call::ToolCallView;
use tracing::debug;
use tracing::info;

use crate::config::Config;
use crate::orphan::LifecycleTransition;
use crate::orphan::OrphanDetector;
use crate::session::ToolCallSession;
use crate::session::send_event;
use crate::status::StatusResolver;

/// Owns every live [`ToolCallSession`] and the lifecycle state shared by them.
///
/// Created together with the receiving end of the event channel; the owner is
/// expected to drain it.
#[derive(Debug)]
pub struct SessionManager {
    config: Config,
    sessions: IndexMap<String, ToolCallSession>,
    orphans: OrphanDetector,
    tx_event: Sender<ToolCallEvent>,
}

impl SessionManager {
    pub fn new(config: Config) -> (Self, Receiver<ToolCallEvent>) {
        let (tx_event, rx_event) = async_channel::unbounded();
        let orphans = OrphanDetector::new(config.orphaned_message.clone());
        (
            Self {
                config,
                sessions: IndexMap::new(),
                orphans,
                tx_event,
            },
            rx_event,
        )
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn open_session(&mut self, session_id: &str) -> &mut ToolCallSession {
        let tx_event = &self.tx_event;
        self.sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                debug!(%session_id, "opening session");
                ToolCallSession::new(session_id, tx_event.clone())
            })
    }

    pub fn session(&self, session_id: &str) -> Option<&ToolCallSession> {
        self.sessions.get(session_id)
    }

    pub fn session_mut(&mut self, session_id: &str) -> Option<&mut ToolCallSession> {
        self.sessions.get_mut(session_id)
    }

    pub fn session_ids(&self) -> impl Iterator<Item = &str> {
        self.sessions.keys().map(String::as_str)
    }

    /// Tears a session down, dropping its registry and lifecycle state.
    pub fn discard_session(&mut self, session_id: &str) -> Option<ToolCallSession> {
        self.orphans.forget(session_id);
        let session = self.sessions.shift_remove(session_id);
        if session.is_some() {
            info!(%session_id, "discarded session");
        }
        session
    }

    pub fn orphan_detector(&self) -> &OrphanDetector {
        &self.orphans
    }

    pub fn status_resolver(&self) -> StatusResolver<'_> {
        StatusResolver::new(&self.orphans)
    }

    /// Dispatches one envelope, opening its session on first sight.
    /// `default_session_id` applies when the envelope names none.
    pub fn handle_envelope(&mut self, envelope: &InboundEnvelope, default_session_id: &str) {
        let session_id = envelope
            .session_id
            .as_deref()
            .unwrap_or(default_session_id);
        self.handle_message(session_id, &envelope.message);
    }

    pub fn handle_message(&mut self, session_id: &str, message: &InboundMessage) {
        match message {
            InboundMessage::SessionLifecycle(update) => {
                self.observe_lifecycle(&SessionLifecycleNotification {
                    session_id: session_id.to_string(),
                    terminated: update.terminated,
                });
            }
            message => self.open_session(session_id).handle_message(message),
        }
    }

    /// Records a lifecycle change and announces it. On termination the event
    /// lists the calls whose resolved status became `orphaned`.
    pub fn observe_lifecycle(
        &mut self,
        notification: &SessionLifecycleNotification,
    ) -> LifecycleTransition {
        let transition = self.orphans.observe(notification);
        let session_id = notification.session_id.clone();
        match transition {
            LifecycleTransition::Terminated => {
                let orphaned_tool_call_ids = self
                    .tool_call_views(&session_id)
                    .into_iter()
                    .filter(|view| view.status == ResolvedToolStatus::Orphaned)
                    .map(|view| view.record.id)
                    .collect::<Vec<_>>();
                info!(
                    %session_id,
                    orphaned = orphaned_tool_call_ids.len(),
                    "session terminated"
                );
                send_event(
                    &self.tx_event,
                    ToolCallEvent::SessionTerminated(SessionTerminatedEvent {
                        session_id,
                        orphaned_tool_call_ids,
                    }),
                );
            }
            LifecycleTransition::Resumed => {
                info!(%session_id, "session resumed");
                send_event(
                    &self.tx_event,
                    ToolCallEvent::SessionResumed(SessionResumedEvent { session_id }),
                );
            }
            LifecycleTransition::Unchanged => {}
        }
        transition
    }

    /// Whether `tool_call_id` of `session_id` was left behind by a terminated
    /// session, judged against its backend-declared status when one is known.
    pub fn is_orphaned(&self, session_id: &str, tool_call_id: &str) -> bool {
        self.sessions.get(session_id).is_some_and(|session| {
            self.orphans.is_orphaned(
                session_id,
                tool_call_id,
                session.registry(),
                session.backend_status(tool_call_id),
            )
        })
    }

    pub fn tool_call_view(&self, session_id: &str, tool_call_id: &str) -> Option<ToolCallView> {
        let session = self.sessions.get(session_id)?;
        let record = session.registry().get_tool_call(tool_call_id)?;
        Some(self.status_resolver().view(
            session_id,
            record,
            session.backend_status(tool_call_id),
            &self.config.summary,
        ))
    }

    /// Views for every tool call of a session, in arrival order.
    pub fn tool_call_views(&self, session_id: &str) -> Vec<ToolCallView> {
        let Some(session) = self.sessions.get(session_id) else {
            return Vec::new();
        };
        let resolver = self.status_resolver();
        session
            .registry()
            .iter()
            .map(|record| {
                resolver.view(
                    session_id,
                    record,
                    session.backend_status(&record.id),
                    &self.config.summary,
                )
            })
            .collect()
    }
}
