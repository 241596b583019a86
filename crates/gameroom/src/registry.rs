use crate::intent::ConnId;
use arena_core::Position;
use arena_gameplay::Engine;
use std::collections::HashMap;

/// Outcome of a successful hello.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    pub seat: Position,
    /// A previous connection bound to this seat, now displaced.
    pub replaced: Option<ConnId>,
    /// The team already held this seat before the hello.
    pub rejoined: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimError {
    TableFull,
    TeamUnknown,
}

impl std::fmt::Display for ClaimError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TableFull => write!(f, "no seats available"),
            Self::TeamUnknown => write!(f, "seat claim rejected"),
        }
    }
}

impl std::error::Error for ClaimError {}

/// The join table between persistent seats and transient connections.
///
/// Seats own chips; connections own sockets. The registry holds only the
/// weak seat-to-connection binding, cleared on disconnect, so a seat
/// survives any number of transport failures.
#[derive(Debug, Default)]
pub struct Registry {
    require_join_code: bool,
    bindings: HashMap<Position, ConnId>,
    conns: HashMap<ConnId, Position>,
}

impl Registry {
    pub fn new(require_join_code: bool) -> Self {
        Self {
            require_join_code,
            ..Self::default()
        }
    }
    /// Resolves a bot hello to a seat. The team's lowercased name is the
    /// identity; a known team rebinds its seat, displacing any previous
    /// connection. When join codes are required, the first hello locks the
    /// seat's code and later hellos must present it.
    pub fn claim(
        &mut self,
        engine: &mut Engine,
        conn: ConnId,
        team: &str,
        join_code: Option<&str>,
    ) -> Result<Claim, ClaimError> {
        let key = team.trim().to_lowercase();
        let existing = engine.find_by_key(&key);
        if self.require_join_code {
            let code = join_code.ok_or(ClaimError::TeamUnknown)?;
            if let Some(pos) = existing {
                let held = engine.seat(pos).and_then(|s| s.join_code.as_deref());
                if held.is_some_and(|held| held != code) {
                    return Err(ClaimError::TeamUnknown);
                }
            }
        }
        let rejoined = existing.is_some();
        let seat = engine.assign(team).ok_or(ClaimError::TableFull)?;
        if self.require_join_code {
            let player = engine.seat_mut(seat).expect("just assigned");
            if player.join_code.is_none() {
                player.join_code = join_code.map(str::to_string);
            }
        }
        let replaced = self.bindings.insert(seat, conn);
        if let Some(old) = replaced {
            self.conns.remove(&old);
        }
        self.conns.insert(conn, seat);
        engine.set_connected(seat, true);
        log::info!(
            "[registry] seat P{} bound to conn {} ({})",
            seat,
            conn,
            if rejoined { "rejoin" } else { "new" }
        );
        Ok(Claim {
            seat,
            replaced,
            rejoined,
        })
    }
    /// Clears a closed connection's binding. The seat keeps its chips.
    pub fn disconnect(&mut self, engine: &mut Engine, conn: ConnId) -> Option<Position> {
        let seat = self.conns.remove(&conn)?;
        if self.bindings.get(&seat) == Some(&conn) {
            self.bindings.remove(&seat);
            engine.set_connected(seat, false);
            log::info!("[registry] seat P{} disconnected", seat);
            return Some(seat);
        }
        None
    }
    pub fn seat_of(&self, conn: ConnId) -> Option<Position> {
        self.conns.get(&conn).copied()
    }
    pub fn conn_of(&self, seat: Position) -> Option<ConnId> {
        self.bindings.get(&seat).copied()
    }
}
