/// A poker hand's category, worst to best.
///
/// The discriminant ordering is the comparison ordering; kicker cards break
/// ties within a category (see [`Strength`](super::strength::Strength)).
#[derive(Debug, Clone, Copy, Eq, PartialEq, PartialOrd, Ord)]
pub enum Ranking {
    HighCard,
    OnePair,
    TwoPair,
    ThreeOAK,
    Straight,
    Flush,
    FullHouse,
    FourOAK,
    StraightFlush,
}

impl Ranking {
    /// The snake_case name carried in SHOWDOWN events.
    pub fn wire_label(&self) -> &'static str {
        match self {
            Ranking::HighCard => "high_card",
            Ranking::OnePair => "pair",
            Ranking::TwoPair => "two_pair",
            Ranking::ThreeOAK => "three_of_a_kind",
            Ranking::Straight => "straight",
            Ranking::Flush => "flush",
            Ranking::FullHouse => "full_house",
            Ranking::FourOAK => "four_of_a_kind",
            Ranking::StraightFlush => "straight_flush",
        }
    }
}

impl std::fmt::Display for Ranking {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.wire_label())
    }
}
