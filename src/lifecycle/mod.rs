//! Call lifecycle coordination
//!
//! The coordinator sequences one outbound call end to end: request the
//! recording, launch the voice session, dial, wait for the callee, key in
//! the conference PIN, hold the conversation, then run the termination
//! hooks exactly once, on the happy path and on every failure path alike.

mod coordinator;
mod session;
mod shutdown;

pub use coordinator::{CallState, LifecycleCoordinator};
pub use session::CallSession;
pub use shutdown::TerminationHooks;
