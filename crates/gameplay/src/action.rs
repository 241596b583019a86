use arena_core::Chips;
use serde::Deserialize;
use serde::Serialize;

/// A seat's decision, with the raise target attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    Fold,
    Check,
    Call,
    RaiseTo(Chips),
}

impl PlayerAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Fold => ActionKind::Fold,
            Self::Check => ActionKind::Check,
            Self::Call => ActionKind::Call,
            Self::RaiseTo(_) => ActionKind::RaiseTo,
        }
    }
}

impl std::fmt::Display for PlayerAction {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Fold => write!(f, "FOLD"),
            Self::Check => write!(f, "CHECK"),
            Self::Call => write!(f, "CALL"),
            Self::RaiseTo(amount) => write!(f, "RAISE_TO {}", amount),
        }
    }
}

/// Wire-level action discriminant, as carried in `action` frames and
/// offered in `legal` lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    Fold,
    Check,
    Call,
    RaiseTo,
}
