use serde::Serialize;

/// Operator advisory, pushed whenever any field changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableStatus {
    pub in_hand: bool,
    pub awaiting_manual_start: bool,
    pub manual_start_armed: bool,
    pub players_ready: bool,
    pub can_start: bool,
}
