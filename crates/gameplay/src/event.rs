use arena_core::Chips;
use arena_core::Position;
use serde::Serialize;

/// Public events produced by engine transitions.
///
/// Each transition returns its events as one ordered burst; the session
/// loop broadcasts them without interleaving. The serialized form is the
/// `ev`-tagged body of `event` envelopes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "ev", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HandEvent {
    PostBlinds {
        sb_seat: Position,
        bb_seat: Position,
        sb: Chips,
        bb: Chips,
    },
    Bet {
        seat: Position,
        amount: Chips,
    },
    Call {
        seat: Position,
        amount: Chips,
    },
    Check {
        seat: Position,
    },
    Fold {
        seat: Position,
    },
    Flop {
        cards: Vec<String>,
    },
    Turn {
        card: String,
    },
    River {
        card: String,
    },
    Showdown {
        seat: Position,
        hand: Vec<String>,
        board: Vec<String>,
        rank: String,
    },
    PotAward {
        seat: Position,
        amount: Chips,
    },
    Eliminated {
        seat: Position,
    },
}

impl std::fmt::Display for HandEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::PostBlinds { sb_seat, bb_seat, .. } => {
                write!(f, "blinds posted by P{} and P{}", sb_seat, bb_seat)
            }
            Self::Bet { seat, amount } => write!(f, "P{} bets {}", seat, amount),
            Self::Call { seat, amount } => write!(f, "P{} calls {}", seat, amount),
            Self::Check { seat } => write!(f, "P{} checks", seat),
            Self::Fold { seat } => write!(f, "P{} folds", seat),
            Self::Flop { cards } => write!(f, "flop {}", cards.join(" ")),
            Self::Turn { card } => write!(f, "turn {}", card),
            Self::River { card } => write!(f, "river {}", card),
            Self::Showdown { seat, rank, .. } => write!(f, "P{} shows {}", seat, rank),
            Self::PotAward { seat, amount } => write!(f, "P{} wins {}", seat, amount),
            Self::Eliminated { seat } => write!(f, "P{} eliminated", seat),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_ev_tag() {
        let event = HandEvent::PotAward { seat: 2, amount: 550 };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["ev"], "POT_AWARD");
        assert_eq!(json["seat"], 2);
        assert_eq!(json["amount"], 550);
    }

    #[test]
    fn street_events_carry_cards() {
        let event = HandEvent::Flop {
            cards: vec!["Ah".into(), "Kd".into(), "2c".into()],
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["ev"], "FLOP");
        assert_eq!(json["cards"].as_array().unwrap().len(), 3);
    }
}
