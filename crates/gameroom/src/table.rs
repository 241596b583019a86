use crate::intent::ConnId;
use crate::intent::Outbox;
use crate::message::ServerMessage;
use crate::message::SpectatorMessage;
use arena_core::Position;
use std::collections::HashMap;
use std::collections::HashSet;

/// Fan-out of encoded frames to every recipient class.
///
/// Players are addressed by seat, spectators and operators by connection.
/// Each mailbox preserves enqueue order, so one transition's event burst is
/// never interleaved with another's for any recipient. Presentation pacing
/// happens behind the spectator's mailbox and never delays players.
#[derive(Debug)]
pub struct Table {
    players: Vec<Option<Outbox>>,
    spectators: HashMap<ConnId, Outbox>,
    operators: HashSet<ConnId>,
}

impl Table {
    pub fn new(seats: usize) -> Self {
        Self {
            players: vec![None; seats],
            spectators: HashMap::new(),
            operators: HashSet::new(),
        }
    }
    pub fn bind_seat(&mut self, seat: Position, outbox: Outbox) {
        if let Some(slot) = self.players.get_mut(seat) {
            *slot = Some(outbox);
        }
    }
    pub fn unbind_seat(&mut self, seat: Position) {
        if let Some(slot) = self.players.get_mut(seat) {
            *slot = None;
        }
    }
    pub fn add_spectator(&mut self, conn: ConnId, outbox: Outbox, operator: bool) {
        self.spectators.insert(conn, outbox);
        if operator {
            self.operators.insert(conn);
        }
    }
    pub fn remove_spectator(&mut self, conn: ConnId) {
        self.spectators.remove(&conn);
        self.operators.remove(&conn);
    }
    pub fn has_spectators(&self) -> bool {
        !self.spectators.is_empty()
    }
    pub fn is_spectator(&self, conn: ConnId) -> bool {
        self.spectators.contains_key(&conn)
    }
    pub fn is_operator(&self, conn: ConnId) -> bool {
        self.operators.contains(&conn)
    }
    /// Direct send to one spectator connection, bypassing nothing but
    /// nonexistence.
    pub fn send_spectator(&self, conn: ConnId, message: &SpectatorMessage) {
        if let Some(outbox) = self.spectators.get(&conn) {
            let _ = outbox.send(message.to_json());
        }
    }
    /// Sends a private message to one seat's bound connection.
    pub fn unicast(&self, seat: Position, message: &ServerMessage) {
        match self.players.get(seat).and_then(Option::as_ref) {
            Some(outbox) => {
                if outbox.send(message.to_json()).is_err() {
                    log::warn!("[table] unicast to P{} failed", seat);
                }
            }
            None => log::debug!("[table] unicast to P{}: no bound connection", seat),
        }
    }
    /// Sends a public message to every bound player.
    pub fn broadcast_players(&self, message: &ServerMessage) {
        let json = message.to_json();
        for (seat, outbox) in self.players.iter().enumerate() {
            if let Some(outbox) = outbox {
                if outbox.send(json.clone()).is_err() {
                    log::warn!("[table] broadcast to P{} failed", seat);
                }
            }
        }
    }
    /// Sends the spectator-dialect form to every spectator and operator.
    pub fn broadcast_spectators(&self, message: &SpectatorMessage) {
        let json = message.to_json();
        for (conn, outbox) in self.spectators.iter() {
            if outbox.send(json.clone()).is_err() {
                log::warn!("[table] broadcast to spectator {} failed", conn);
            }
        }
    }
    /// Sends an advisory to operator connections only.
    pub fn broadcast_operators(&self, message: &SpectatorMessage) {
        let json = message.to_json();
        for conn in self.operators.iter() {
            if let Some(outbox) = self.spectators.get(conn) {
                if outbox.send(json.clone()).is_err() {
                    log::warn!("[table] advisory to operator {} failed", conn);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;

    #[test]
    fn unicast_reaches_only_the_target_seat() {
        let mut table = Table::new(2);
        let (tx0, mut rx0) = unbounded_channel();
        let (tx1, mut rx1) = unbounded_channel();
        table.bind_seat(0, tx0);
        table.bind_seat(1, tx1);
        table.unicast(0, &ServerMessage::Lobby { players: vec![] });
        assert!(rx0.try_recv().is_ok());
        assert!(rx1.try_recv().is_err());
    }

    #[test]
    fn broadcast_reaches_all_players() {
        let mut table = Table::new(2);
        let (tx0, mut rx0) = unbounded_channel();
        let (tx1, mut rx1) = unbounded_channel();
        table.bind_seat(0, tx0);
        table.bind_seat(1, tx1);
        table.broadcast_players(&ServerMessage::Lobby { players: vec![] });
        assert!(rx0.try_recv().is_ok());
        assert!(rx1.try_recv().is_ok());
    }

    #[test]
    fn operator_advisories_skip_plain_spectators() {
        let mut table = Table::new(0);
        let (spec_tx, mut spec_rx) = unbounded_channel();
        let (op_tx, mut op_rx) = unbounded_channel();
        table.add_spectator(1, spec_tx, false);
        table.add_spectator(2, op_tx, true);
        table.broadcast_operators(&SpectatorMessage::Status(crate::status::TableStatus {
            in_hand: false,
            awaiting_manual_start: true,
            manual_start_armed: false,
            players_ready: false,
            can_start: false,
        }));
        assert!(spec_rx.try_recv().is_err());
        assert!(op_rx.try_recv().is_ok());
    }

    #[test]
    fn removed_spectators_stop_receiving() {
        let mut table = Table::new(0);
        let (tx, mut rx) = unbounded_channel();
        table.add_spectator(5, tx, false);
        table.remove_spectator(5);
        table.broadcast_spectators(&SpectatorMessage::Lobby { players: vec![] });
        assert!(rx.try_recv().is_err());
    }
}
