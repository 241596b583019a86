use tokio::sync::mpsc::UnboundedSender;

/// Process-local connection identifier, minted by the transport layer.
pub type ConnId = u64;

/// Mailbox of encoded frames headed for one socket.
pub type Outbox = UnboundedSender<String>;

/// Which WebSocket path the connection arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// `/ws` — seat-bound bots.
    Bots,
    /// `/spectate` — spectators and operators.
    Spectators,
}

/// Transport-to-room messages. Bridges submit intents; only the room task
/// mutates game state.
#[derive(Debug)]
pub enum Intent {
    Opened {
        conn: ConnId,
        endpoint: Endpoint,
        outbox: Outbox,
    },
    Frame {
        conn: ConnId,
        text: String,
    },
    Closed {
        conn: ConnId,
    },
}
