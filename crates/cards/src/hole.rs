use super::card::Card;

/// A player's two private cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hole(Card, Card);

impl Hole {
    pub fn cards(&self) -> [Card; 2] {
        [self.0, self.1]
    }
    /// Wire labels in deal order.
    pub fn labels(&self) -> Vec<String> {
        vec![self.0.label(), self.1.label()]
    }
}

impl From<(Card, Card)> for Hole {
    fn from((a, b): (Card, Card)) -> Self {
        Self(a, b)
    }
}

impl std::fmt::Display for Hole {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}{}", self.0, self.1)
    }
}
