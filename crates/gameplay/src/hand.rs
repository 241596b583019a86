use crate::phase::Phase;
use arena_cards::Card;
use arena_cards::Deck;
use arena_core::Chips;
use arena_core::Position;
use std::collections::VecDeque;

/// Mutable state of the hand in progress.
///
/// At most one exists at a time; it is created by hand startup, mutated
/// only by engine transitions, and discarded once the phase reaches
/// SHOWDOWN and the pot is empty.
#[derive(Debug, Clone)]
pub struct HandState {
    pub(crate) hand_id: String,
    pub(crate) seed: u64,
    pub(crate) button: Position,
    pub(crate) deck: Deck,
    pub(crate) phase: Phase,
    pub(crate) community: Vec<Card>,
    pub(crate) pot: Chips,
    pub(crate) current_bet: Chips,
    pub(crate) min_raise_increment: Chips,
    pub(crate) last_aggressor: Option<Position>,
    /// Seats still owing an action this street, in acting order.
    /// Empty exactly when the street is settled.
    pub(crate) to_act: VecDeque<Position>,
}

impl HandState {
    pub fn hand_id(&self) -> &str {
        &self.hand_id
    }
    pub fn seed(&self) -> u64 {
        self.seed
    }
    pub fn button(&self) -> Position {
        self.button
    }
    pub fn phase(&self) -> Phase {
        self.phase
    }
    pub fn community(&self) -> &[Card] {
        &self.community
    }
    pub fn community_labels(&self) -> Vec<String> {
        self.community.iter().map(Card::label).collect()
    }
    pub fn pot(&self) -> Chips {
        self.pot
    }
    pub fn current_bet(&self) -> Chips {
        self.current_bet
    }
    pub fn min_raise_increment(&self) -> Chips {
        self.min_raise_increment
    }
    pub fn last_aggressor(&self) -> Option<Position> {
        self.last_aggressor
    }
}
