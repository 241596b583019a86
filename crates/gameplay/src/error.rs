/// Rule violations surfaced by the engine. The offending transition never
/// mutates state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    HandNotActive,
    SeatNotActive,
    OutOfTurn,
    CheckFacingBet,
    NothingToCall,
    RaiseNotAboveBet,
    RaiseBelowMinimum,
    RaiseExceedsStack,
    NotEnoughPlayers,
}

impl std::fmt::Display for ActionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HandNotActive => write!(f, "hand not in progress"),
            Self::SeatNotActive => write!(f, "seat not active in this hand"),
            Self::OutOfTurn => write!(f, "not this seat's turn"),
            Self::CheckFacingBet => write!(f, "cannot check when facing a bet"),
            Self::NothingToCall => write!(f, "nothing to call"),
            Self::RaiseNotAboveBet => write!(f, "raise must exceed current bet"),
            Self::RaiseBelowMinimum => write!(f, "raise below minimum"),
            Self::RaiseExceedsStack => write!(f, "raise exceeds stack"),
            Self::NotEnoughPlayers => write!(f, "not enough active players"),
        }
    }
}

impl std::error::Error for ActionError {}
