//! Wire types shared between the agent runtime, the browser UI and the
//! tool-call engine in `minion-core`.
//!
//! Inbound messages live in [`messages`], the per-tool-call read model in
//! [`tool_call`] and the notifications fired after every engine mutation in
//! [`events`].

pub mod events;
pub mod messages;
pub mod tool_call;
