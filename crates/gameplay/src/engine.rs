use crate::action::ActionKind;
use crate::action::PlayerAction;
use crate::config::TableConfig;
use crate::error::ActionError;
use crate::event::HandEvent;
use crate::hand::HandState;
use crate::phase::Phase;
use crate::seat::PlayerSeat;
use arena_cards::Card;
use arena_cards::Deck;
use arena_cards::Hole;
use arena_cards::Strength;
use arena_core::Chips;
use arena_core::Position;
use std::collections::BTreeMap;
use std::collections::VecDeque;

/// Legal moves for the acting seat, with the amounts the mover needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionWindow {
    pub legal: Vec<ActionKind>,
    /// Chips owed to match the current bet, before stack clamping.
    pub to_call: Chips,
    /// Chips a CALL would actually move, clamped to the stack.
    pub call_amount: Option<Chips>,
    pub min_raise_to: Option<Chips>,
    pub max_raise_to: Option<Chips>,
}

/// Single-table No-Limit Hold'em state machine.
///
/// Owns the seat ledger and at most one [`HandState`]. Every transition is
/// synchronous, validates before mutating, and returns the public events it
/// produced; no I/O happens here. The session loop replays those events to
/// the transports, which keeps hands replayable from `(seed, seats,
/// actions)` alone.
#[derive(Debug)]
pub struct Engine {
    config: TableConfig,
    seats: Vec<Option<PlayerSeat>>,
    hand: Option<HandState>,
}

/// Seat management.
impl Engine {
    pub fn new(config: TableConfig) -> Self {
        let seats = (0..config.seats).map(|_| None).collect();
        Self {
            config,
            seats,
            hand: None,
        }
    }
    pub fn config(&self) -> &TableConfig {
        &self.config
    }
    /// Finds or creates the seat for a team. Identity is the lowercased
    /// trimmed name; the display form keeps its first observed spelling.
    /// Returns `None` when the table is full.
    pub fn assign(&mut self, team: &str) -> Option<Position> {
        let display = team.trim().to_string();
        let key = display.to_lowercase();
        if display.is_empty() {
            return None;
        }
        if let Some(pos) = self.find_by_key(&key) {
            return Some(pos);
        }
        let index = self.seats.iter().position(Option::is_none)?;
        self.seats[index] = Some(PlayerSeat::new(
            index,
            display,
            key,
            self.config.starting_stack,
        ));
        Some(index)
    }
    pub fn find_by_key(&self, key: &str) -> Option<Position> {
        self.occupied().find(|s| s.team_key == key).map(|s| s.index)
    }
    pub fn seat(&self, pos: Position) -> Option<&PlayerSeat> {
        self.seats.get(pos).and_then(Option::as_ref)
    }
    pub fn seat_mut(&mut self, pos: Position) -> Option<&mut PlayerSeat> {
        self.seats.get_mut(pos).and_then(Option::as_mut)
    }
    /// Occupied seats in index order.
    pub fn occupied(&self) -> impl Iterator<Item = &PlayerSeat> {
        self.seats.iter().flatten()
    }
    pub fn set_connected(&mut self, pos: Position, connected: bool) {
        if let Some(seat) = self.seat_mut(pos) {
            seat.connected = connected;
        }
    }
    /// Seats still holding chips.
    pub fn eligible(&self) -> Vec<Position> {
        self.occupied()
            .filter(|s| s.stack > 0)
            .map(|s| s.index)
            .collect()
    }
    pub fn can_start(&self) -> bool {
        self.hand.is_none() && self.eligible().len() >= 2
    }
    /// Total chips in play: stacks plus the live pot. Constant for the
    /// whole match outside of a single transition.
    pub fn total_chips(&self) -> Chips {
        self.occupied().map(|s| s.stack).sum::<Chips>()
            + self.hand.as_ref().map(|h| h.pot).unwrap_or(0)
    }
}

/// Hand lifecycle.
impl Engine {
    pub fn hand(&self) -> Option<&HandState> {
        self.hand.as_ref()
    }
    /// Starts a hand: resets seats, shuffles from the seed, deals two cards
    /// per eligible seat in dealer order, posts blinds, and builds the
    /// pre-flop acting queue. Heads-up, the button posts the small blind
    /// and acts first.
    pub fn start_hand(
        &mut self,
        hand_id: String,
        button: Position,
        seed: u64,
    ) -> Result<Vec<HandEvent>, ActionError> {
        if self.hand.is_some() || self.eligible().len() < 2 {
            return Err(ActionError::NotEnoughPlayers);
        }
        for seat in self.seats.iter_mut().flatten() {
            seat.reset_for_hand();
        }
        let mut deck = Deck::shuffled(seed);
        let order = self.deal_order(button);
        let firsts = order.iter().map(|_| deck.deal()).collect::<Vec<_>>();
        let seconds = order.iter().map(|_| deck.deal()).collect::<Vec<_>>();
        for (i, &pos) in order.iter().enumerate() {
            if let Some(seat) = self.seat_mut(pos) {
                seat.hole = Some(Hole::from((firsts[i], seconds[i])));
            }
        }

        let heads_up = order.len() == 2;
        let sb_seat = if heads_up {
            button
        } else {
            self.next_eligible(button)
        };
        let bb_seat = self.next_eligible(sb_seat);
        let sb = self.config.sb;
        let bb = self.config.bb;
        let mut pot = 0;
        pot += self.seat_mut(sb_seat).expect("sb seated").commit(sb);
        pot += self.seat_mut(bb_seat).expect("bb seated").commit(bb);
        let current_bet = self
            .seat(sb_seat)
            .map(|s| s.committed)
            .into_iter()
            .chain(self.seat(bb_seat).map(|s| s.committed))
            .max()
            .unwrap_or(bb);

        let first_to_act = if heads_up {
            button
        } else {
            self.next_eligible(bb_seat)
        };
        let to_act = self.rotation_of_actionable(first_to_act);

        self.hand = Some(HandState {
            hand_id,
            seed,
            button,
            deck,
            phase: Phase::PreFlop,
            community: Vec::new(),
            pot,
            current_bet,
            min_raise_increment: bb,
            last_aggressor: Some(bb_seat),
            to_act,
        });
        log::debug!(
            "[engine] hand started, button P{}, sb P{}, bb P{}",
            button,
            sb_seat,
            bb_seat
        );
        Ok(vec![HandEvent::PostBlinds {
            sb_seat,
            bb_seat,
            sb,
            bb,
        }])
    }
    /// The seat owing the next action, if any.
    pub fn next_actor(&self) -> Option<Position> {
        self.hand.as_ref().and_then(|h| h.to_act.front().copied())
    }
    /// Complete means settled: terminal phase and the pot paid out.
    pub fn is_hand_complete(&self) -> bool {
        self.hand
            .as_ref()
            .map(|h| h.phase == Phase::Showdown && h.pot == 0)
            .unwrap_or(false)
    }
    /// Discards the settled hand.
    pub fn clear_hand(&mut self) {
        self.hand = None;
    }
}

/// Legal action computation.
impl Engine {
    pub fn window(&self, pos: Position) -> Result<ActionWindow, ActionError> {
        let hand = self.hand.as_ref().ok_or(ActionError::HandNotActive)?;
        let seat = self.seat(pos).ok_or(ActionError::SeatNotActive)?;
        if !seat.in_hand() {
            return Err(ActionError::SeatNotActive);
        }
        let to_call = hand.current_bet.saturating_sub(seat.committed);
        let mut legal = vec![ActionKind::Fold];
        if to_call == 0 {
            legal.push(ActionKind::Check);
        } else if seat.stack > 0 {
            legal.push(ActionKind::Call);
        }
        let call_amount = (to_call > 0 && seat.stack > 0).then(|| to_call.min(seat.stack));

        let mut min_raise_to = None;
        let mut max_raise_to = None;
        if seat.stack > 0 {
            let all_in_to = seat.stack + seat.committed;
            let full_min = hand.current_bet + hand.min_raise_increment;
            if all_in_to > full_min {
                min_raise_to = Some(full_min);
                max_raise_to = Some(all_in_to);
                legal.push(ActionKind::RaiseTo);
            } else if all_in_to > hand.current_bet {
                // only a short all-in raise remains; it will not reopen betting
                min_raise_to = Some(all_in_to);
                max_raise_to = Some(all_in_to);
                legal.push(ActionKind::RaiseTo);
            }
        }
        Ok(ActionWindow {
            legal,
            to_call,
            call_amount,
            min_raise_to,
            max_raise_to,
        })
    }
    /// Auto-action preference on timeout or skip: check, else call, else fold.
    pub fn fallback(&self, pos: Position) -> Result<PlayerAction, ActionError> {
        let window = self.window(pos)?;
        if window.legal.contains(&ActionKind::Check) {
            Ok(PlayerAction::Check)
        } else if window.legal.contains(&ActionKind::Call) {
            Ok(PlayerAction::Call)
        } else {
            Ok(PlayerAction::Fold)
        }
    }
}

/// Action application.
impl Engine {
    /// Applies one action for the seat at the front of the acting queue.
    /// Invalid actions return an error and leave all state untouched.
    pub fn apply(&mut self, pos: Position, action: PlayerAction) -> Result<Vec<HandEvent>, ActionError> {
        let hand = self.hand.as_ref().ok_or(ActionError::HandNotActive)?;
        if hand.to_act.front() != Some(&pos) {
            return Err(ActionError::OutOfTurn);
        }
        let seat = self.seat(pos).ok_or(ActionError::SeatNotActive)?;
        if !seat.in_hand() {
            return Err(ActionError::SeatNotActive);
        }

        let mut events = match action {
            PlayerAction::Fold => self.fold(pos)?,
            PlayerAction::Check => self.check(pos)?,
            PlayerAction::Call => self.call(pos)?,
            PlayerAction::RaiseTo(amount) => self.raise_to(pos, amount)?,
        };
        events.extend(self.advance());
        Ok(events)
    }

    fn fold(&mut self, pos: Position) -> Result<Vec<HandEvent>, ActionError> {
        self.seat_mut(pos).expect("validated").has_folded = true;
        self.hand_mut().to_act.pop_front();
        Ok(vec![HandEvent::Fold { seat: pos }])
    }
    fn check(&mut self, pos: Position) -> Result<Vec<HandEvent>, ActionError> {
        let seat = self.seat(pos).expect("validated");
        if self.hand_ref().current_bet > seat.committed {
            return Err(ActionError::CheckFacingBet);
        }
        self.hand_mut().to_act.pop_front();
        Ok(vec![HandEvent::Check { seat: pos }])
    }
    fn call(&mut self, pos: Position) -> Result<Vec<HandEvent>, ActionError> {
        let owed = {
            let seat = self.seat(pos).expect("validated");
            self.hand_ref().current_bet.saturating_sub(seat.committed)
        };
        if owed == 0 {
            return Err(ActionError::NothingToCall);
        }
        let moved = self.seat_mut(pos).expect("validated").commit(owed);
        let hand = self.hand_mut();
        hand.pot += moved;
        hand.to_act.pop_front();
        Ok(vec![HandEvent::Call {
            seat: pos,
            amount: moved,
        }])
    }
    fn raise_to(&mut self, pos: Position, amount: Chips) -> Result<Vec<HandEvent>, ActionError> {
        let (committed, stack) = {
            let seat = self.seat(pos).expect("validated");
            (seat.committed, seat.stack)
        };
        let current_bet = self.hand_ref().current_bet;
        let max_raise_to = stack + committed;
        if amount > max_raise_to {
            return Err(ActionError::RaiseExceedsStack);
        }
        if amount <= current_bet {
            return Err(ActionError::RaiseNotAboveBet);
        }
        let min_raise_to = current_bet + self.hand_ref().min_raise_increment;
        let short_all_in = amount < min_raise_to;
        if short_all_in && amount != max_raise_to {
            return Err(ActionError::RaiseBelowMinimum);
        }

        let delta = amount - committed;
        let moved = self.seat_mut(pos).expect("validated").commit(delta);
        debug_assert_eq!(moved, delta);
        let hand = self.hand_mut();
        hand.pot += moved;
        hand.current_bet = amount;
        hand.to_act.pop_front();
        // a short all-in moves the price but does not reopen action for
        // seats that already acted this street; a full raise does
        if !short_all_in {
            hand.min_raise_increment = amount - current_bet;
            hand.last_aggressor = Some(pos);
            let reopened = self.rotation_of_actionable(self.next_position(pos));
            let hand = self.hand_mut();
            hand.to_act = reopened;
            hand.to_act.retain(|&p| p != pos);
        }
        Ok(vec![HandEvent::Bet {
            seat: pos,
            amount: delta,
        }])
    }

    /// Folds a seat outside its turn (operator forfeit). No-op when the
    /// seat is not live in the current hand.
    pub fn forfeit(&mut self, pos: Position) -> Vec<HandEvent> {
        if self.hand.is_none() {
            return Vec::new();
        }
        match self.seat(pos) {
            Some(seat) if seat.in_hand() => {}
            _ => return Vec::new(),
        }
        self.seat_mut(pos).expect("checked").has_folded = true;
        self.hand_mut().to_act.retain(|&p| p != pos);
        let mut events = vec![HandEvent::Fold { seat: pos }];
        events.extend(self.advance());
        events
    }
}

/// Street advancement and settlement.
impl Engine {
    /// Runs after every mutation: short-circuits an uncontested hand, or
    /// advances streets while no seat owes an action.
    fn advance(&mut self) -> Vec<HandEvent> {
        if self.hand.is_none() || self.hand_ref().phase == Phase::Showdown {
            return Vec::new();
        }
        let live = self.live_seats();
        if live.len() == 1 {
            return self.award_uncontested(live[0]);
        }
        if self.hand_ref().to_act.is_empty() {
            return self.advance_phase();
        }
        Vec::new()
    }

    fn advance_phase(&mut self) -> Vec<HandEvent> {
        let mut events = Vec::new();
        loop {
            let phase = self.hand_ref().phase;
            match phase {
                Phase::PreFlop => {
                    let cards = self.reveal(3);
                    events.push(HandEvent::Flop {
                        cards: cards.iter().map(Card::label).collect(),
                    });
                    self.hand_mut().phase = Phase::Flop;
                }
                Phase::Flop => {
                    let cards = self.reveal(1);
                    events.push(HandEvent::Turn {
                        card: cards[0].label(),
                    });
                    self.hand_mut().phase = Phase::Turn;
                }
                Phase::Turn => {
                    let cards = self.reveal(1);
                    events.push(HandEvent::River {
                        card: cards[0].label(),
                    });
                    self.hand_mut().phase = Phase::River;
                }
                Phase::River | Phase::Showdown => {
                    self.hand_mut().phase = Phase::Showdown;
                    events.extend(self.resolve_showdown());
                    return events;
                }
            }

            for seat in self.seats.iter_mut().flatten() {
                seat.reset_for_street();
            }
            let bb = self.config.bb;
            let button = self.hand_ref().button;
            let hand = self.hand_mut();
            hand.current_bet = 0;
            hand.min_raise_increment = bb;
            hand.last_aggressor = None;

            // betting resumes only while two or more seats can still act;
            // otherwise the remaining board runs out immediately
            let first = self.next_live(button);
            let to_act = self.rotation_of_actionable(first);
            if to_act.len() >= 2 {
                self.hand_mut().to_act = to_act;
                return events;
            }
        }
    }

    fn reveal(&mut self, n: usize) -> Vec<Card> {
        let hand = self.hand_mut();
        let cards = hand.deck.deal_n(n);
        hand.community.extend(cards.iter().copied());
        cards
    }

    fn award_uncontested(&mut self, winner: Position) -> Vec<HandEvent> {
        let pot = self.hand_ref().pot;
        let mut events = Vec::new();
        if pot > 0 {
            self.seat_mut(winner).expect("winner seated").stack += pot;
            events.push(HandEvent::PotAward {
                seat: winner,
                amount: pot,
            });
        }
        self.settle_hand();
        events
    }

    fn resolve_showdown(&mut self) -> Vec<HandEvent> {
        let board = self.hand_ref().community.clone();
        let board_labels = board.iter().map(Card::label).collect::<Vec<_>>();
        let mut events = Vec::new();
        let mut scores: BTreeMap<Position, Strength> = BTreeMap::new();
        for pos in self.live_seats() {
            let seat = self.seat(pos).expect("live seat");
            let hole = seat.hole.expect("live seat dealt in");
            let mut cards = hole.cards().to_vec();
            cards.extend(board.iter().copied());
            let strength = Strength::best_five(&cards);
            events.push(HandEvent::Showdown {
                seat: pos,
                hand: hole.labels(),
                board: board_labels.clone(),
                rank: strength.ranking().wire_label().to_string(),
            });
            scores.insert(pos, strength);
        }

        let button = self.hand_ref().button;
        let pots = self.side_pots();
        for (pos, payout) in distribute(&pots, &scores, button, self.config.seats) {
            self.seat_mut(pos).expect("winner seated").stack += payout;
            events.push(HandEvent::PotAward {
                seat: pos,
                amount: payout,
            });
        }
        self.settle_hand();
        events
    }

    /// Peels contribution tiers into `(amount, eligible_seats)` pots.
    /// Folded seats contribute dead money but are never eligible; folded
    /// chips beyond the deepest live contribution sink into the last pot.
    pub(crate) fn side_pots(&self) -> Vec<(Chips, Vec<Position>)> {
        let mut remaining: BTreeMap<Position, Chips> = self
            .occupied()
            .filter(|s| s.total_in_pot > 0)
            .map(|s| (s.index, s.total_in_pot))
            .collect();
        let mut pots: Vec<(Chips, Vec<Position>)> = Vec::new();
        loop {
            let live: Vec<Position> = remaining
                .iter()
                .filter(|&(&pos, &chips)| chips > 0 && self.is_live(pos))
                .map(|(&pos, _)| pos)
                .collect();
            if live.is_empty() {
                break;
            }
            let level = live
                .iter()
                .map(|pos| remaining[pos])
                .min()
                .expect("live seats present");
            let mut amount = 0;
            for (_, chips) in remaining.iter_mut() {
                let take = level.min(*chips);
                amount += take;
                *chips -= take;
            }
            pots.push((amount, live));
        }
        // dead money past the deepest live contribution (e.g. a forfeited
        // raiser) joins the deepest pot
        let residue: Chips = remaining.values().sum();
        if residue > 0 {
            if let Some(last) = pots.last_mut() {
                last.0 += residue;
            }
        }
        pots
    }

    fn settle_hand(&mut self) {
        let hand = self.hand_mut();
        hand.phase = Phase::Showdown;
        hand.pot = 0;
        hand.to_act.clear();
        for seat in self.seats.iter_mut().flatten() {
            seat.committed = 0;
            seat.total_in_pot = 0;
        }
    }
}

/// Splits each pot among its best eligible hands. Ties divide in integer
/// chips; indivisible remainders go to tied winners closest left of the
/// button, one chip each.
fn distribute(
    pots: &[(Chips, Vec<Position>)],
    scores: &BTreeMap<Position, Strength>,
    button: Position,
    seats: usize,
) -> Vec<(Position, Chips)> {
    let mut awards = Vec::new();
    for (amount, eligible) in pots {
        if *amount == 0 || eligible.is_empty() {
            continue;
        }
        let best = eligible
            .iter()
            .filter_map(|pos| scores.get(pos))
            .max()
            .expect("eligible seats are scored");
        let mut winners: Vec<Position> = eligible
            .iter()
            .copied()
            .filter(|pos| scores.get(pos) == Some(best))
            .collect();
        winners.sort_by_key(|&pos| (pos + seats - (button + 1) % seats) % seats);
        let share = amount / winners.len() as Chips;
        let remainder = (amount % winners.len() as Chips) as usize;
        for (i, &pos) in winners.iter().enumerate() {
            let payout = share + if i < remainder { 1 } else { 0 };
            if payout > 0 {
                awards.push((pos, payout));
            }
        }
    }
    awards
}

/// Rotation helpers.
impl Engine {
    fn hand_ref(&self) -> &HandState {
        self.hand.as_ref().expect("hand in progress")
    }
    fn hand_mut(&mut self) -> &mut HandState {
        self.hand.as_mut().expect("hand in progress")
    }
    fn is_live(&self, pos: Position) -> bool {
        self.seat(pos).map(|s| s.in_hand()).unwrap_or(false)
    }
    /// Dealt-in seats that have not folded, in index order.
    fn live_seats(&self) -> Vec<Position> {
        self.occupied()
            .filter(|s| s.in_hand())
            .map(|s| s.index)
            .collect()
    }
    fn next_position(&self, from: Position) -> Position {
        (from + 1) % self.config.seats
    }
    /// Next seat clockwise from `from` holding chips and not folded.
    fn next_eligible(&self, from: Position) -> Position {
        let mut pos = self.next_position(from);
        loop {
            if let Some(seat) = self.seat(pos) {
                if seat.stack > 0 && !seat.has_folded {
                    return pos;
                }
            }
            pos = self.next_position(pos);
        }
    }
    /// Next live seat clockwise from `from` (all-in seats included).
    fn next_live(&self, from: Position) -> Position {
        let mut pos = self.next_position(from);
        for _ in 0..self.config.seats {
            if self.is_live(pos) {
                return pos;
            }
            pos = self.next_position(pos);
        }
        from
    }
    /// Seats dealt in before the hand, in dealing order (left of button).
    fn deal_order(&self, button: Position) -> Vec<Position> {
        let mut order = Vec::new();
        let mut pos = self.next_position(button);
        for _ in 0..self.config.seats {
            if let Some(seat) = self.seat(pos) {
                if seat.stack > 0 {
                    order.push(pos);
                }
            }
            pos = self.next_position(pos);
        }
        order
    }
    /// Seats owing an action this street (live with chips), starting at
    /// `start` and proceeding clockwise.
    fn rotation_of_actionable(&self, start: Position) -> VecDeque<Position> {
        let mut rotation = VecDeque::new();
        let mut pos = start;
        for _ in 0..self.config.seats {
            if let Some(seat) = self.seat(pos) {
                if seat.in_hand() && seat.stack > 0 {
                    rotation.push_back(pos);
                }
            }
            pos = self.next_position(pos);
        }
        rotation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn engine(stacks: &[Chips], sb: Chips, bb: Chips) -> Engine {
        let config = TableConfig {
            seats: stacks.len(),
            starting_stack: *stacks.iter().max().unwrap(),
            sb,
            bb,
            ..TableConfig::default()
        };
        let mut engine = Engine::new(config);
        for (i, &stack) in stacks.iter().enumerate() {
            let pos = engine.assign(&format!("Team{}", i)).unwrap();
            engine.seat_mut(pos).unwrap().stack = stack;
        }
        engine
    }

    fn started(stacks: &[Chips], sb: Chips, bb: Chips, button: Position) -> Engine {
        let mut engine = engine(stacks, sb, bb);
        engine
            .start_hand("H-20240101-00000".into(), button, 42)
            .unwrap();
        engine
    }

    #[test]
    fn blinds_and_order_multiway() {
        let engine = started(&[1000, 1000, 1000, 1000], 10, 20, 0);
        assert_eq!(engine.seat(1).unwrap().committed, 10);
        assert_eq!(engine.seat(2).unwrap().committed, 20);
        assert_eq!(engine.hand().unwrap().pot(), 30);
        assert_eq!(engine.hand().unwrap().current_bet(), 20);
        // first to act is left of the big blind
        assert_eq!(engine.next_actor(), Some(3));
    }

    #[test]
    fn blinds_and_order_heads_up() {
        let engine = started(&[1000, 1000], 50, 100, 0);
        // button posts the small blind and acts first pre-flop
        assert_eq!(engine.seat(0).unwrap().committed, 50);
        assert_eq!(engine.seat(1).unwrap().committed, 100);
        assert_eq!(engine.next_actor(), Some(0));
    }

    #[test]
    fn refuses_to_start_shorthanded() {
        let mut engine = engine(&[1000, 0], 50, 100);
        assert!(!engine.can_start());
        assert!(
            engine
                .start_hand("H-20240101-00000".into(), 0, 1)
                .is_err()
        );
    }

    #[test]
    fn hole_cards_dealt_to_eligible_seats() {
        let engine = started(&[1000, 1000, 1000], 50, 100, 0);
        for pos in 0..3 {
            assert!(engine.seat(pos).unwrap().hole.is_some());
        }
        // 52 - 6 hole cards remain
        assert_eq!(engine.hand().unwrap().deck.remaining(), 46);
    }

    #[test]
    fn equal_seeds_deal_identical_holes() {
        let a = started(&[1000, 1000, 1000], 50, 100, 0);
        let b = started(&[1000, 1000, 1000], 50, 100, 0);
        for pos in 0..3 {
            assert_eq!(a.seat(pos).unwrap().hole, b.seat(pos).unwrap().hole);
        }
    }

    #[test]
    fn preflop_window_facing_big_blind() {
        let engine = started(&[1000, 1000, 1000, 1000], 10, 20, 0);
        let window = engine.window(3).unwrap();
        assert_eq!(
            window.legal,
            vec![ActionKind::Fold, ActionKind::Call, ActionKind::RaiseTo]
        );
        assert_eq!(window.to_call, 20);
        assert_eq!(window.call_amount, Some(20));
        assert_eq!(window.min_raise_to, Some(40));
        assert_eq!(window.max_raise_to, Some(1000));
    }

    #[test]
    fn check_option_when_bet_matched() {
        let mut engine = started(&[1000, 1000], 50, 100, 0);
        engine.apply(0, PlayerAction::Call).unwrap();
        let window = engine.window(1).unwrap();
        assert!(window.legal.contains(&ActionKind::Check));
        assert_eq!(window.call_amount, None);
    }

    #[test]
    fn fold_to_win_awards_pot_without_reveal() {
        // blinds 50/100: button opens to 400 and both blinds get out of the way
        let mut engine = started(&[1000, 1000, 1000], 50, 100, 0);
        assert_eq!(engine.next_actor(), Some(0));
        let events = engine.apply(0, PlayerAction::RaiseTo(400)).unwrap();
        assert_eq!(events, vec![HandEvent::Bet { seat: 0, amount: 400 }]);
        engine.apply(1, PlayerAction::Fold).unwrap();
        let events = engine.apply(2, PlayerAction::Fold).unwrap();
        assert!(events.contains(&HandEvent::PotAward { seat: 0, amount: 550 }));
        assert!(!events.iter().any(|e| matches!(e, HandEvent::Showdown { .. })));
        assert!(!events.iter().any(|e| matches!(e, HandEvent::Flop { .. })));
        assert!(engine.is_hand_complete());
        assert_eq!(engine.seat(0).unwrap().stack, 1150);
        assert_eq!(engine.seat(1).unwrap().stack, 950);
        assert_eq!(engine.seat(2).unwrap().stack, 900);
    }

    #[test]
    fn raise_updates_increment_and_aggressor() {
        let mut engine = started(&[500, 500, 500], 5, 10, 0);
        let first = engine.next_actor().unwrap();
        let min_to = engine.window(first).unwrap().min_raise_to.unwrap();
        engine.apply(first, PlayerAction::RaiseTo(min_to)).unwrap();
        let hand = engine.hand().unwrap();
        assert_eq!(hand.current_bet(), min_to);
        assert_eq!(hand.min_raise_increment(), min_to - 10);
        assert_eq!(hand.last_aggressor(), Some(first));

        let second = engine.next_actor().unwrap();
        let next_min = engine.window(second).unwrap().min_raise_to.unwrap();
        engine.apply(second, PlayerAction::RaiseTo(next_min)).unwrap();
        let hand = engine.hand().unwrap();
        assert_eq!(hand.current_bet(), next_min);
        assert_eq!(hand.min_raise_increment(), next_min - min_to);
        assert_eq!(hand.last_aggressor(), Some(second));
    }

    #[test]
    fn full_raise_reopens_action() {
        let mut engine = started(&[1000, 1000, 1000], 50, 100, 0);
        engine.apply(0, PlayerAction::Call).unwrap();
        engine.apply(1, PlayerAction::Call).unwrap();
        // big blind squeezes; both callers owe a response
        engine.apply(2, PlayerAction::RaiseTo(300)).unwrap();
        assert_eq!(engine.next_actor(), Some(0));
        engine.apply(0, PlayerAction::Call).unwrap();
        assert_eq!(engine.next_actor(), Some(1));
        engine.apply(1, PlayerAction::Call).unwrap();
        // street settled, flop dealt
        assert_eq!(engine.hand().unwrap().phase(), Phase::Flop);
    }

    #[test]
    fn short_all_in_raise_does_not_reopen() {
        // sb 25 / bb 100, small blind holds 125 total
        let mut engine = started(&[125, 1000], 25, 100, 0);
        let window = engine.window(0).unwrap();
        assert_eq!(window.to_call, 75);
        assert_eq!(window.call_amount, Some(75));
        assert_eq!(window.min_raise_to, Some(125));
        assert_eq!(window.max_raise_to, Some(125));
        let events = engine.apply(0, PlayerAction::RaiseTo(125)).unwrap();
        assert_eq!(events, vec![HandEvent::Bet { seat: 0, amount: 100 }]);
        let hand = engine.hand().unwrap();
        assert_eq!(hand.current_bet(), 125);
        // increment untouched, aggressor still the blind
        assert_eq!(hand.min_raise_increment(), 100);
        assert_eq!(hand.last_aggressor(), Some(1));
        // big blind still owes a response to the price change
        assert_eq!(engine.next_actor(), Some(1));
    }

    #[test]
    fn short_raise_rejected_unless_all_in() {
        let mut engine = started(&[1000, 1000], 50, 100, 0);
        // min raise to 200; 150 is neither a full raise nor an all-in
        assert_eq!(
            engine.apply(0, PlayerAction::RaiseTo(150)),
            Err(ActionError::RaiseBelowMinimum)
        );
        assert_eq!(engine.hand().unwrap().current_bet(), 100);
    }

    #[test]
    fn raise_bounds_are_enforced() {
        let mut engine = started(&[1000, 1000], 50, 100, 0);
        assert_eq!(
            engine.apply(0, PlayerAction::RaiseTo(1001)),
            Err(ActionError::RaiseExceedsStack)
        );
        assert_eq!(
            engine.apply(0, PlayerAction::RaiseTo(100)),
            Err(ActionError::RaiseNotAboveBet)
        );
        let before = engine.seat(0).unwrap().stack;
        assert_eq!(engine.seat(0).unwrap().stack, before);
    }

    #[test]
    fn out_of_turn_rejected_without_mutation() {
        let mut engine = started(&[1000, 1000, 1000], 50, 100, 0);
        let pot = engine.hand().unwrap().pot();
        assert_eq!(
            engine.apply(1, PlayerAction::Call),
            Err(ActionError::OutOfTurn)
        );
        assert_eq!(engine.hand().unwrap().pot(), pot);
        assert_eq!(engine.next_actor(), Some(0));
    }

    #[test]
    fn check_facing_bet_rejected() {
        let mut engine = started(&[1000, 1000], 50, 100, 0);
        assert_eq!(
            engine.apply(0, PlayerAction::Check),
            Err(ActionError::CheckFacingBet)
        );
    }

    #[test]
    fn exact_call_all_in_offers_no_raise() {
        // calling spends the entire stack: no raise is possible
        let mut engine = started(&[1000, 150], 50, 100, 0);
        engine.apply(0, PlayerAction::RaiseTo(250)).unwrap();
        let window = engine.window(1).unwrap();
        assert_eq!(window.call_amount, Some(50));
        assert!(!window.legal.contains(&ActionKind::RaiseTo));
        assert_eq!(window.min_raise_to, None);
    }

    #[test]
    fn all_in_seat_owes_no_further_action() {
        let mut engine = started(&[300, 1000, 1000], 50, 100, 0);
        engine.apply(0, PlayerAction::RaiseTo(300)).unwrap();
        engine.apply(1, PlayerAction::Call).unwrap();
        engine.apply(2, PlayerAction::Call).unwrap();
        // seat 0 is all-in; post-flop betting is between 1 and 2 only
        assert_eq!(engine.hand().unwrap().phase(), Phase::Flop);
        assert!(engine.seat(0).unwrap().is_all_in());
        assert_ne!(engine.next_actor(), Some(0));
        assert_eq!(engine.apply(0, PlayerAction::Check), Err(ActionError::OutOfTurn));
    }

    #[test]
    fn runout_when_fewer_than_two_can_bet() {
        let mut engine = started(&[300, 1000], 50, 100, 0);
        engine.apply(0, PlayerAction::RaiseTo(300)).unwrap();
        let events = engine.apply(1, PlayerAction::Call).unwrap();
        // no further betting: board runs out to showdown in one burst
        assert!(events.iter().any(|e| matches!(e, HandEvent::Flop { .. })));
        assert!(events.iter().any(|e| matches!(e, HandEvent::Turn { .. })));
        assert!(events.iter().any(|e| matches!(e, HandEvent::River { .. })));
        assert!(events.iter().any(|e| matches!(e, HandEvent::Showdown { .. })));
        assert!(events.iter().any(|e| matches!(e, HandEvent::PotAward { .. })));
        assert!(engine.is_hand_complete());
    }

    #[test]
    fn showdown_precedes_awards() {
        let mut engine = started(&[300, 1000], 50, 100, 0);
        engine.apply(0, PlayerAction::RaiseTo(300)).unwrap();
        let events = engine.apply(1, PlayerAction::Call).unwrap();
        let first_showdown = events
            .iter()
            .position(|e| matches!(e, HandEvent::Showdown { .. }))
            .unwrap();
        let first_award = events
            .iter()
            .position(|e| matches!(e, HandEvent::PotAward { .. }))
            .unwrap();
        assert!(first_showdown < first_award);
    }

    #[test]
    fn three_way_all_in_builds_tiered_pots() {
        // stacks 300 / 500 / 1000 all get in pre-flop
        let mut engine = started(&[300, 500, 1000], 50, 100, 0);
        engine.apply(0, PlayerAction::RaiseTo(300)).unwrap();
        engine.apply(1, PlayerAction::RaiseTo(500)).unwrap();
        // big stack shoves over the top; board runs out immediately
        let events = engine.apply(2, PlayerAction::RaiseTo(1000)).unwrap();
        let awards: Chips = events
            .iter()
            .filter_map(|e| match e {
                HandEvent::PotAward { amount, .. } => Some(*amount),
                _ => None,
            })
            .sum();
        assert_eq!(awards, 1800);
        assert!(engine.is_hand_complete());
        assert_eq!(engine.total_chips(), 1800);
        // the 500 only seat 2 contributed comes back whoever wins
        assert!(engine.seat(2).unwrap().stack >= 500);
    }

    #[test]
    fn side_pot_tiers_from_contributions() {
        let mut engine = engine(&[300, 500, 1000], 50, 100);
        for (pos, total) in [(0, 300), (1, 500), (2, 1000)] {
            let seat = engine.seat_mut(pos).unwrap();
            seat.total_in_pot = total;
            seat.stack = 0;
            seat.hole = Some(Hole::from((Card::from(0), Card::from(1))));
        }
        let pots = engine.side_pots();
        assert_eq!(
            pots,
            vec![
                (900, vec![0, 1, 2]),
                (400, vec![1, 2]),
                (500, vec![2]),
            ]
        );
    }

    #[test]
    fn folded_dead_money_feeds_pots_without_eligibility() {
        let mut engine = engine(&[300, 500, 1000], 50, 100);
        for (pos, total, folded) in [(0, 300, false), (1, 200, true), (2, 300, false)] {
            let seat = engine.seat_mut(pos).unwrap();
            seat.total_in_pot = total;
            seat.has_folded = folded;
            seat.hole = Some(Hole::from((Card::from(pos as u8 * 2), Card::from(pos as u8 * 2 + 1))));
        }
        let pots = engine.side_pots();
        assert_eq!(pots, vec![(800, vec![0, 2])]);
    }

    #[test]
    fn split_pot_remainder_goes_left_of_button() {
        let mut scores = BTreeMap::new();
        let tie = Strength::best_five(
            &["Ah", "Kh", "Qh", "Jh", "Th"]
                .map(|s| Card::try_from(s).unwrap()),
        );
        scores.insert(0, tie.clone());
        scores.insert(1, tie.clone());
        scores.insert(2, tie);
        // 101 chips among three tied winners, button at 1: seat 2 is
        // closest left and receives the odd chips first
        let pots = vec![(101, vec![0, 1, 2])];
        let awards = distribute(&pots, &scores, 1, 3);
        assert_eq!(awards, vec![(2, 34), (0, 34), (1, 33)]);
    }

    #[test]
    fn forfeit_folds_and_short_circuits() {
        let mut engine = started(&[1000, 1000, 1000], 50, 100, 0);
        let events = engine.forfeit(0);
        assert_eq!(events, vec![HandEvent::Fold { seat: 0 }]);
        let events = engine.forfeit(1);
        assert!(events.contains(&HandEvent::Fold { seat: 1 }));
        assert!(events.iter().any(|e| matches!(e, HandEvent::PotAward { seat: 2, .. })));
        assert!(engine.is_hand_complete());
    }

    #[test]
    fn forfeit_of_bystander_keeps_hand_running() {
        let mut engine = started(&[1000, 1000, 1000, 1000], 50, 100, 0);
        assert_eq!(engine.next_actor(), Some(3));
        let events = engine.forfeit(1);
        assert_eq!(events, vec![HandEvent::Fold { seat: 1 }]);
        assert_eq!(engine.next_actor(), Some(3));
        assert!(!engine.is_hand_complete());
    }

    #[test]
    fn fallback_prefers_check_then_call() {
        let mut engine = started(&[1000, 1000], 50, 100, 0);
        assert_eq!(engine.fallback(0).unwrap(), PlayerAction::Call);
        engine.apply(0, PlayerAction::Call).unwrap();
        assert_eq!(engine.fallback(1).unwrap(), PlayerAction::Check);
    }

    #[test]
    fn chip_conservation_over_random_playouts() {
        let mut rng = StdRng::seed_from_u64(2024);
        for round in 0usize..40 {
            let stacks = [1000, 700, 1500, 400];
            let mut engine = started(&stacks, 10, 20, round % 4);
            let total: Chips = stacks.iter().sum();
            assert_eq!(engine.total_chips(), total);
            while !engine.is_hand_complete() {
                let actor = engine.next_actor().expect("hand still owes actions");
                let window = engine.window(actor).unwrap();
                let pick = window.legal[rng.random_range(0..window.legal.len())];
                let action = match pick {
                    ActionKind::Fold => PlayerAction::Fold,
                    ActionKind::Check => PlayerAction::Check,
                    ActionKind::Call => PlayerAction::Call,
                    ActionKind::RaiseTo => {
                        let lo = window.min_raise_to.unwrap();
                        let hi = window.max_raise_to.unwrap();
                        PlayerAction::RaiseTo(rng.random_range(lo..=hi))
                    }
                };
                // every offered action applies cleanly
                engine.apply(actor, action).expect("offered action is legal");
                assert_eq!(engine.total_chips(), total, "conservation after transition");
            }
        }
    }
}
