use crate::status::TableStatus;
use arena_core::Chips;
use arena_core::PROTOCOL_VERSION;
use arena_core::Position;
use arena_gameplay::ActionKind;
use arena_gameplay::HandEvent;
use arena_gameplay::Phase;
use serde::Serialize;

/// Messages sent to seat-bound bot connections.
///
/// Serializes as the flat wire envelope: the `type` tag and the payload
/// fields share the top level, with `"v"` added by [`to_json`](Self::to_json).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome {
        table_id: String,
        seat: Position,
        config: ConfigBody,
    },
    Lobby {
        players: Vec<LobbyPlayer>,
    },
    StartHand {
        hand_id: String,
        seed: u64,
        button: Position,
        stacks: Vec<StackEntry>,
    },
    /// Private turn prompt for the acting seat.
    Act(ActBody),
    Event {
        #[serde(flatten)]
        event: HandEvent,
    },
    EndHand {
        hand_id: String,
        stacks: Vec<StackEntry>,
    },
    /// Private resume state after a reconnect.
    Snapshot(SnapshotBody),
    MatchEnd {
        winner: Option<WinnerBody>,
        final_stacks: Vec<FinalStack>,
    },
    Error {
        code: ErrorCode,
        msg: String,
    },
}

/// Messages sent to `/spectate` connections. Same payloads as the bot
/// dialect where they overlap, under `spectator/`-prefixed types.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum SpectatorMessage {
    #[serde(rename = "spectator/welcome")]
    Welcome { table_id: String, config: ConfigBody },
    #[serde(rename = "spectator/lobby")]
    Lobby { players: Vec<LobbyPlayer> },
    #[serde(rename = "spectator/start_hand")]
    StartHand {
        hand_id: String,
        seed: u64,
        button: Position,
        stacks: Vec<StackEntry>,
    },
    #[serde(rename = "spectator/event")]
    Event {
        #[serde(flatten)]
        event: HandEvent,
    },
    #[serde(rename = "spectator/end_hand")]
    EndHand {
        hand_id: String,
        stacks: Vec<StackEntry>,
    },
    /// Full table view, hole cards included. Spectators are trusted.
    #[serde(rename = "spectator/snapshot")]
    Snapshot(SpectatorSnapshot),
    #[serde(rename = "spectator/status")]
    Status(TableStatus),
    #[serde(rename = "spectator/match_end")]
    MatchEnd {
        winner: Option<WinnerBody>,
        final_stacks: Vec<FinalStack>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    BadHello,
    BadSchema,
    TeamTaken,
    TeamUnknown,
    TableFull,
    InvalidAction,
    OutOfTurn,
    ActionTooLate,
    UnknownType,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigBody {
    pub variant: String,
    pub seats: usize,
    pub starting_stack: Chips,
    pub sb: Chips,
    pub bb: Chips,
    pub move_time_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LobbyPlayer {
    pub seat: Position,
    pub team: String,
    pub connected: bool,
    pub stack: Chips,
}

#[derive(Debug, Clone, Serialize)]
pub struct StackEntry {
    pub seat: Position,
    pub stack: Chips,
}

#[derive(Debug, Clone, Serialize)]
pub struct WinnerBody {
    pub seat: Position,
    pub team: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FinalStack {
    pub seat: Position,
    pub team: String,
    pub stack: Chips,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerPublic {
    pub seat: Position,
    pub stack: Chips,
    pub has_folded: bool,
    pub committed: Chips,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActYou {
    pub hole: Vec<String>,
    pub stack: Chips,
    pub committed: Chips,
    pub to_call: Chips,
    pub time_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActTable {
    pub sb: Chips,
    pub bb: Chips,
    pub seats: usize,
    pub button: Position,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActBody {
    pub hand_id: String,
    pub seat: Position,
    pub phase: Phase,
    pub pot: Chips,
    pub current_bet: Chips,
    pub min_raise_increment: Chips,
    pub you: ActYou,
    pub table: ActTable,
    pub players: Vec<PlayerPublic>,
    pub community: Vec<String>,
    pub legal: Vec<ActionKind>,
    pub call_amount: Option<Chips>,
    pub min_raise_to: Option<Chips>,
    pub max_raise_to: Option<Chips>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SnapshotYou {
    pub seat: Position,
    pub hole: Vec<String>,
    pub stack: Chips,
    pub to_call: Chips,
}

#[derive(Debug, Clone, Serialize)]
pub struct SnapshotBody {
    pub at_hand_id: String,
    pub phase: Phase,
    pub you: SnapshotYou,
    pub players: Vec<PlayerPublic>,
    pub community: Vec<String>,
    pub next_actor: Option<Position>,
    pub time_ms_remaining: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legal: Option<Vec<ActionKind>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_amount: Option<Chips>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_raise_to: Option<Chips>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_raise_to: Option<Chips>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpectatorSeat {
    pub seat: Position,
    pub team: String,
    pub stack: Chips,
    pub committed: Chips,
    pub hole: Vec<String>,
    pub has_folded: bool,
    pub connected: bool,
    pub is_button: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpectatorSnapshot {
    pub hand_id: String,
    pub table_id: String,
    pub pot: Chips,
    pub phase: Phase,
    pub community: Vec<String>,
    pub seats: Vec<SpectatorSeat>,
    pub next_actor: Option<Position>,
    pub time_remaining_ms: Option<u64>,
    pub sb: Chips,
    pub bb: Chips,
}

#[derive(Serialize)]
struct Envelope<T: Serialize> {
    v: u32,
    #[serde(flatten)]
    body: T,
}

impl ServerMessage {
    pub fn to_json(&self) -> String {
        serde_json::to_string(&Envelope {
            v: PROTOCOL_VERSION,
            body: self,
        })
        .expect("serialize server message")
    }
    pub fn error(code: ErrorCode, msg: impl Into<String>) -> Self {
        Self::Error {
            code,
            msg: msg.into(),
        }
    }
}

impl SpectatorMessage {
    pub fn to_json(&self) -> String {
        serde_json::to_string(&Envelope {
            v: PROTOCOL_VERSION,
            body: self,
        })
        .expect("serialize spectator message")
    }
}
