use arena_cards::Hole;
use arena_core::Chips;
use arena_core::Position;

/// Persistent record for one participant.
///
/// The seat outlives any connection: identity and chips stay here for the
/// whole match while transports come and go. Per-hand betting state is
/// reset by [`reset_for_hand`](Self::reset_for_hand).
#[derive(Debug, Clone)]
pub struct PlayerSeat {
    pub index: Position,
    /// Display form, first observed spelling.
    pub team: String,
    /// Lowercased identity key, unique across the table.
    pub team_key: String,
    /// Seat lock, set at first claim when join codes are required.
    pub join_code: Option<String>,
    pub stack: Chips,
    pub connected: bool,
    /// Chips committed during the current street.
    pub committed: Chips,
    /// Chips committed during the current hand across all streets.
    pub total_in_pot: Chips,
    pub has_folded: bool,
    pub hole: Option<Hole>,
}

impl PlayerSeat {
    pub fn new(index: Position, team: String, team_key: String, stack: Chips) -> Self {
        Self {
            index,
            team,
            team_key,
            join_code: None,
            stack,
            connected: false,
            committed: 0,
            total_in_pot: 0,
            has_folded: false,
            hole: None,
        }
    }
    /// In the hand but out of chips: no further actions are owed.
    pub fn is_all_in(&self) -> bool {
        self.in_hand() && self.stack == 0
    }
    /// Dealt in and not folded.
    pub fn in_hand(&self) -> bool {
        self.hole.is_some() && !self.has_folded
    }
    /// Moves up to `amount` from stack to the pot, clamped to the stack.
    /// Returns the chips actually moved.
    pub fn commit(&mut self, amount: Chips) -> Chips {
        let moved = amount.min(self.stack);
        self.stack -= moved;
        self.committed += moved;
        self.total_in_pot += moved;
        moved
    }
    pub fn reset_for_hand(&mut self) {
        self.committed = 0;
        self.total_in_pot = 0;
        self.has_folded = false;
        self.hole = None;
    }
    pub fn reset_for_street(&mut self) {
        self.committed = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seat() -> PlayerSeat {
        PlayerSeat::new(0, "Alpha".to_string(), "alpha".to_string(), 1000)
    }

    #[test]
    fn commit_clamps_to_stack() {
        let mut seat = seat();
        assert_eq!(seat.commit(400), 400);
        assert_eq!(seat.commit(900), 600);
        assert_eq!(seat.stack, 0);
        assert_eq!(seat.committed, 1000);
        assert_eq!(seat.total_in_pot, 1000);
    }

    #[test]
    fn all_in_requires_being_dealt_in() {
        let mut seat = seat();
        seat.stack = 0;
        assert!(!seat.is_all_in());
        seat.hole = Some(Hole::from((
            arena_cards::Card::from(0),
            arena_cards::Card::from(1),
        )));
        assert!(seat.is_all_in());
        seat.has_folded = true;
        assert!(!seat.is_all_in());
    }

    #[test]
    fn hand_reset_clears_betting_state() {
        let mut seat = seat();
        seat.commit(250);
        seat.has_folded = true;
        seat.reset_for_hand();
        assert_eq!(seat.committed, 0);
        assert_eq!(seat.total_in_pot, 0);
        assert!(!seat.has_folded);
        assert!(seat.hole.is_none());
    }
}
