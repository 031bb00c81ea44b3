//! Telephony, media-room and egress backend seam
//!
//! This module defines the traits the lifecycle coordinator drives:
//! - `TelephonyBackend`: outbound SIP dialing, participant presence, DTMF
//!   signaling and room teardown
//! - `EgressBackend`: composite audio capture of a room
//!
//! `HttpApiClient` is the production implementation of both, a single
//! shared handle for the call's duration, closed exactly once at the very
//! end of the shutdown sequence. Tests substitute mock implementations.

mod backend;
mod http;

pub use backend::{
    EgressBackend, EgressError, EgressRequest, Participant, SipParticipantRequest,
    TelephonyBackend,
};
pub use http::HttpApiClient;
