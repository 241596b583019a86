//! Async runtime for the tournament table.
//!
//! The gameroom is the imperative shell around the pure gameplay engine:
//!
//! - [`Room`] — single-task session loop owning all game state
//! - [`Registry`] — seat ↔ connection join table with reconnect handling
//! - [`Clock`] — per-turn decision countdown with pause-on-disconnect
//! - [`Table`] — mailbox fan-out to players, spectators, and operators
//! - [`codec`] / [`ServerMessage`] — wire envelopes in and out
//!
//! Transports (see the server crate) bridge sockets to [`Intent`]s; nothing
//! outside the room task touches the engine.
mod clock;
pub mod codec;
mod intent;
mod message;
mod options;
mod registry;
mod room;
mod status;
mod table;

pub use clock::*;
pub use codec::ClientMessage;
pub use intent::*;
pub use message::*;
pub use options::*;
pub use registry::*;
pub use room::*;
pub use status::*;
pub use table::*;
