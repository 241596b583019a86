use crate::engine::Engine;
use crate::event::HandEvent;
use arena_core::HandNo;
use arena_core::Position;
use std::collections::HashSet;

/// Who decides when the next hand begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandControl {
    /// Hands start as soon as the table can play.
    Auto,
    /// Hands wait for an operator START_HAND command.
    Operator,
}

impl std::str::FromStr for HandControl {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "operator" => Ok(Self::Operator),
            other => Err(format!("unknown hand control mode: {}", other)),
        }
    }
}

/// Multi-hand orchestration: button rotation, hand identifiers,
/// elimination bookkeeping, and match-end detection.
///
/// The controller never touches chips; it reads the engine's seat ledger
/// and decides what happens between hands.
#[derive(Debug)]
pub struct Controller {
    control: HandControl,
    sequence: HandNo,
    button: Option<Position>,
    eliminated: HashSet<Position>,
}

impl Controller {
    pub fn new(control: HandControl) -> Self {
        Self {
            control,
            sequence: 0,
            button: None,
            eliminated: HashSet::new(),
        }
    }
    pub fn control(&self) -> HandControl {
        self.control
    }
    pub fn hands_played(&self) -> HandNo {
        self.sequence
    }
    pub fn button(&self) -> Option<Position> {
        self.button
    }
    /// Produces the next `H-<yyyymmdd>-<seq>` label and bumps the sequence.
    pub fn next_hand_id(&mut self) -> String {
        let date = time::OffsetDateTime::now_utc().date();
        let id = format!(
            "H-{:04}{:02}{:02}-{:05}",
            date.year(),
            u8::from(date.month()),
            date.day(),
            self.sequence
        );
        self.sequence += 1;
        id
    }
    /// Moves the button to the next eligible seat clockwise; the first hand
    /// seats it at the lowest eligible index.
    pub fn rotate_button(&mut self, engine: &Engine) -> Option<Position> {
        let eligible = engine.eligible();
        if eligible.len() < 2 {
            return None;
        }
        let button = match self.button {
            None => eligible[0],
            Some(prev) => *eligible
                .iter()
                .find(|&&pos| pos > prev)
                .unwrap_or(&eligible[0]),
        };
        self.button = Some(button);
        Some(button)
    }
    /// Seats that just busted, each reported exactly once per match.
    pub fn eliminations(&mut self, engine: &Engine) -> Vec<HandEvent> {
        let mut events = Vec::new();
        for seat in engine.occupied() {
            if seat.stack == 0 && self.eliminated.insert(seat.index) {
                log::info!("[controller] seat P{} ({}) eliminated", seat.index, seat.team);
                events.push(HandEvent::Eliminated { seat: seat.index });
            }
        }
        events
    }
    /// The match ends when at most one seat ever seated still holds chips.
    /// Disconnected seats with chips count as alive.
    pub fn is_match_over(&self, engine: &Engine) -> bool {
        engine.occupied().filter(|s| s.stack > 0).count() <= 1 && engine.occupied().count() >= 1
    }
    pub fn winner(&self, engine: &Engine) -> Option<Position> {
        let alive = engine
            .occupied()
            .filter(|s| s.stack > 0)
            .map(|s| s.index)
            .collect::<Vec<_>>();
        match alive.as_slice() {
            [winner] => Some(*winner),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TableConfig;

    fn engine(stacks: &[arena_core::Chips]) -> Engine {
        let config = TableConfig {
            seats: stacks.len().max(2),
            ..TableConfig::default()
        };
        let mut engine = Engine::new(config);
        for (i, &stack) in stacks.iter().enumerate() {
            let pos = engine.assign(&format!("Team{}", i)).unwrap();
            engine.seat_mut(pos).unwrap().stack = stack;
        }
        engine
    }

    #[test]
    fn hand_ids_are_dated_and_sequential() {
        let mut controller = Controller::new(HandControl::Auto);
        let first = controller.next_hand_id();
        let second = controller.next_hand_id();
        assert!(first.starts_with("H-"));
        assert_eq!(first.len(), "H-YYYYMMDD-00000".len());
        assert!(first.ends_with("-00000"));
        assert!(second.ends_with("-00001"));
    }

    #[test]
    fn button_rotates_over_eligible_seats() {
        let engine = engine(&[100, 100, 100]);
        let mut controller = Controller::new(HandControl::Auto);
        assert_eq!(controller.rotate_button(&engine), Some(0));
        assert_eq!(controller.rotate_button(&engine), Some(1));
        assert_eq!(controller.rotate_button(&engine), Some(2));
        assert_eq!(controller.rotate_button(&engine), Some(0));
    }

    #[test]
    fn button_skips_busted_seats() {
        let mut engine = engine(&[100, 100, 100]);
        let mut controller = Controller::new(HandControl::Auto);
        controller.rotate_button(&engine);
        engine.seat_mut(1).unwrap().stack = 0;
        assert_eq!(controller.rotate_button(&engine), Some(2));
    }

    #[test]
    fn eliminations_report_once() {
        let mut engine = engine(&[100, 100, 100]);
        let mut controller = Controller::new(HandControl::Auto);
        engine.seat_mut(1).unwrap().stack = 0;
        assert_eq!(
            controller.eliminations(&engine),
            vec![HandEvent::Eliminated { seat: 1 }]
        );
        assert!(controller.eliminations(&engine).is_empty());
    }

    #[test]
    fn match_ends_with_single_stack() {
        let mut engine = engine(&[100, 100]);
        let controller = Controller::new(HandControl::Auto);
        assert!(!controller.is_match_over(&engine));
        engine.seat_mut(1).unwrap().stack = 0;
        assert!(controller.is_match_over(&engine));
        assert_eq!(controller.winner(&engine), Some(0));
    }
}
