use super::card::Card;
use super::evaluator::evaluate_five;
use super::rank::Rank;
use super::ranking::Ranking;

/// A hand's total strength.
///
/// Constructed from an unordered set of 5–7 cards; the best five-card
/// selection determines the value. Ordering is category first, then the
/// category's tiebreak ranks lexicographically, so two strengths compare
/// equal exactly when the hands would split a pot.
#[derive(Debug, Clone, Eq, PartialEq, PartialOrd, Ord)]
pub struct Strength {
    ranking: Ranking,
    kicks: Vec<Rank>,
}

impl Strength {
    pub(crate) fn new(ranking: Ranking, kicks: Vec<Rank>) -> Self {
        Self { ranking, kicks }
    }
    pub fn ranking(&self) -> Ranking {
        self.ranking
    }
    pub fn kicks(&self) -> &[Rank] {
        &self.kicks
    }
    /// Evaluates the best five-card hand among 5 to 7 cards.
    ///
    /// Enumerates every five-card selection and keeps the maximum, so the
    /// result is invariant under permutation of the input.
    pub fn best_five(cards: &[Card]) -> Self {
        debug_assert!((5..=7).contains(&cards.len()));
        let n = cards.len();
        let mut best: Option<Strength> = None;
        for mask in 0u32..(1 << n) {
            if mask.count_ones() != 5 {
                continue;
            }
            let mut five = [cards[0]; 5];
            let mut i = 0;
            for (j, &card) in cards.iter().enumerate() {
                if mask & (1 << j) != 0 {
                    five[i] = card;
                    i += 1;
                }
            }
            let strength = evaluate_five(&five);
            best = match best {
                Some(b) if b >= strength => Some(b),
                _ => Some(strength),
            };
        }
        best.expect("at least five cards")
    }
}

impl std::fmt::Display for Strength {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:<16}", self.ranking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cards(labels: &[&str]) -> Vec<Card> {
        labels
            .iter()
            .map(|s| Card::try_from(*s).expect("valid label"))
            .collect()
    }

    #[test]
    fn identifies_all_hand_categories() {
        let cases = [
            (Ranking::StraightFlush, vec!["Ah", "Kh", "Qh", "Jh", "Th"]),
            (Ranking::FourOAK, vec!["As", "Ah", "Ad", "Ac", "Kd"]),
            (Ranking::FullHouse, vec!["Qc", "Qd", "Qs", "9h", "9s"]),
            (Ranking::Flush, vec!["Ah", "Jh", "9h", "6h", "2h"]),
            (Ranking::Straight, vec!["9h", "8d", "7c", "6s", "5h"]),
            (Ranking::ThreeOAK, vec!["8h", "8d", "8s", "Qd", "Js"]),
            (Ranking::TwoPair, vec!["7h", "7d", "4s", "4c", "As"]),
            (Ranking::OnePair, vec!["6h", "6s", "Qh", "8d", "4c"]),
            (Ranking::HighCard, vec!["As", "Kd", "Jh", "9c", "4d"]),
        ];
        for (expected, labels) in cases {
            let strength = Strength::best_five(&cards(&labels));
            assert_eq!(strength.ranking(), expected, "labels={:?}", labels);
        }
    }

    #[test]
    fn wheel_straight_is_five_high() {
        let strength = Strength::best_five(&cards(&["Ah", "2d", "3c", "4s", "5h", "9d", "Kd"]));
        assert_eq!(strength.ranking(), Ranking::Straight);
        assert_eq!(strength.kicks()[0], Rank::Five);
    }

    #[test]
    fn wheel_loses_to_six_high_straight() {
        let wheel = Strength::best_five(&cards(&["Ah", "2d", "3c", "4s", "5h"]));
        let sixer = Strength::best_five(&cards(&["2h", "3d", "4c", "5s", "6h"]));
        assert!(wheel < sixer);
    }

    #[test]
    fn kickers_break_equal_pairs() {
        let a = Strength::best_five(&cards(&["Ah", "Ad", "Kc", "Qs", "9h", "2d", "3c"]));
        let b = Strength::best_five(&cards(&["As", "Ac", "Qc", "Js", "8h", "2s", "3d"]));
        assert!(a > b);
    }

    #[test]
    fn equal_boards_tie() {
        // Both holes play the board: community quads with an ace kicker.
        let board = ["Qc", "Qd", "Qh", "Qs", "Ad"];
        let a = Strength::best_five(&cards(&[&["2h", "3s"][..], &board[..]].concat()));
        let b = Strength::best_five(&cards(&[&["4h", "5s"][..], &board[..]].concat()));
        assert_eq!(a, b);
    }

    #[test]
    fn permutation_invariance() {
        let mut labels = vec!["Ah", "Kd", "7c", "7h", "2s", "Jd", "9c"];
        let forward = Strength::best_five(&cards(&labels));
        labels.reverse();
        let backward = Strength::best_five(&cards(&labels));
        labels.swap(0, 3);
        let swapped = Strength::best_five(&cards(&labels));
        assert_eq!(forward, backward);
        assert_eq!(forward, swapped);
    }

    #[test]
    fn full_house_beats_flush() {
        let full = Strength::best_five(&cards(&["Qc", "Qd", "Qs", "9h", "9s"]));
        let flush = Strength::best_five(&cards(&["Ah", "Jh", "9h", "6h", "2h"]));
        assert!(full > flush);
    }

    #[test]
    fn seven_card_hands_score() {
        let mut deck = crate::Deck::shuffled(777);
        for _ in 0..6 {
            let seven = deck.deal_n(7);
            let _ = Strength::best_five(&seven);
        }
    }
}
