//! Messaging between the host and a rendering surface.
//!
//! A [`Bridge`] owns one [`Surface`]. It posts typed messages in order,
//! dispatches inbound messages to one handler per type, tracks the surface's
//! `ready` handshake and correlates request/response pairs by id.

mod bridge;
pub mod error;
pub mod message;
mod surface;

pub use crate::bridge::{Bridge, BridgeState};
pub use crate::message::{DigestBody, EnabledBody, InitBody, Message, StateBody};
pub use crate::surface::{ChannelSurface, Surface};
