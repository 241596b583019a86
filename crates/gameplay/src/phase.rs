use serde::Deserialize;
use serde::Serialize;

/// Betting phase of a hand. SHOWDOWN is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    PreFlop,
    Flop,
    Turn,
    River,
    Showdown,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Phase::PreFlop => write!(f, "PRE_FLOP"),
            Phase::Flop => write!(f, "FLOP"),
            Phase::Turn => write!(f, "TURN"),
            Phase::River => write!(f, "RIVER"),
            Phase::Showdown => write!(f, "SHOWDOWN"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names() {
        assert_eq!(
            serde_json::to_string(&Phase::PreFlop).unwrap(),
            "\"PRE_FLOP\""
        );
        assert_eq!(serde_json::to_string(&Phase::River).unwrap(), "\"RIVER\"");
    }

    #[test]
    fn ordering_follows_streets() {
        assert!(Phase::PreFlop < Phase::Flop);
        assert!(Phase::River < Phase::Showdown);
    }
}
