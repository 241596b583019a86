use super::card::Card;
use super::rank::Rank;
use super::ranking::Ranking;
use super::strength::Strength;

/// Scores exactly five cards.
///
/// Groups ranks by multiplicity (then rank) and walks the categories from
/// best to worst. Kicker lists are emitted in comparison order so the
/// resulting [`Strength`] values order lexicographically.
pub(crate) fn evaluate_five(cards: &[Card; 5]) -> Strength {
    let flush = cards.iter().all(|c| c.suit() == cards[0].suit());
    let straight = straight_high(cards);

    let mut counts = [0u8; 13];
    for card in cards {
        counts[u8::from(card.rank()) as usize] += 1;
    }
    // (multiplicity, rank) groups, highest multiplicity then highest rank first
    let mut groups = counts
        .iter()
        .enumerate()
        .filter(|(_, &n)| n > 0)
        .map(|(r, &n)| (n, Rank::from(r as u8)))
        .collect::<Vec<_>>();
    groups.sort_unstable_by(|a, b| b.cmp(a));

    if let (true, Some(high)) = (flush, straight) {
        return Strength::new(Ranking::StraightFlush, vec![high]);
    }
    if groups[0].0 == 4 {
        return Strength::new(Ranking::FourOAK, vec![groups[0].1, groups[1].1]);
    }
    if groups[0].0 == 3 && groups[1].0 == 2 {
        return Strength::new(Ranking::FullHouse, vec![groups[0].1, groups[1].1]);
    }
    if flush {
        return Strength::new(Ranking::Flush, ranks_desc(cards));
    }
    if let Some(high) = straight {
        return Strength::new(Ranking::Straight, vec![high]);
    }
    if groups[0].0 == 3 {
        return Strength::new(
            Ranking::ThreeOAK,
            vec![groups[0].1, groups[1].1, groups[2].1],
        );
    }
    if groups[0].0 == 2 && groups[1].0 == 2 {
        return Strength::new(
            Ranking::TwoPair,
            vec![groups[0].1, groups[1].1, groups[2].1],
        );
    }
    if groups[0].0 == 2 {
        let kicks = std::iter::once(groups[0].1)
            .chain(groups.iter().skip(1).map(|&(_, r)| r))
            .collect();
        return Strength::new(Ranking::OnePair, kicks);
    }
    Strength::new(Ranking::HighCard, ranks_desc(cards))
}

fn ranks_desc(cards: &[Card; 5]) -> Vec<Rank> {
    let mut ranks = cards.iter().map(Card::rank).collect::<Vec<_>>();
    ranks.sort_unstable_by(|a, b| b.cmp(a));
    ranks
}

/// Highest rank of any five-card run, with the ace counting low for the
/// wheel (A-2-3-4-5 reports Five).
fn straight_high(cards: &[Card; 5]) -> Option<Rank> {
    // bit i set ⇔ a card of rank value i is present, values 2..=14, ace also at 1
    let mut mask = 0u16;
    for card in cards {
        let value = u8::from(card.rank()) + 2;
        mask |= 1 << value;
        if card.rank() == Rank::Ace {
            mask |= 1 << 1;
        }
    }
    (5..=14u8)
        .rev()
        .find(|&high| {
            let run = 0b11111u16 << (high - 4);
            mask & run == run
        })
        .map(|high| Rank::from(high - 2))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn five(labels: [&str; 5]) -> [Card; 5] {
        labels.map(|s| Card::try_from(s).expect("valid label"))
    }

    #[test]
    fn straight_high_finds_runs() {
        assert_eq!(
            straight_high(&five(["9h", "8d", "7c", "6s", "5h"])),
            Some(Rank::Nine)
        );
        assert_eq!(
            straight_high(&five(["Ah", "Kd", "Qc", "Js", "Th"])),
            Some(Rank::Ace)
        );
        assert_eq!(
            straight_high(&five(["Ah", "2d", "3c", "4s", "5h"])),
            Some(Rank::Five)
        );
        assert_eq!(straight_high(&five(["Ah", "Kd", "Qc", "Js", "9h"])), None);
    }

    #[test]
    fn paired_boards_are_not_straights() {
        assert_eq!(straight_high(&five(["9h", "9d", "8c", "7s", "6h"])), None);
    }

    #[test]
    fn two_pair_kicker_order() {
        let strength = evaluate_five(&five(["7h", "7d", "4s", "4c", "As"]));
        assert_eq!(strength.ranking(), Ranking::TwoPair);
        assert_eq!(strength.kicks(), [Rank::Seven, Rank::Four, Rank::Ace]);
    }

    #[test]
    fn one_pair_kicker_order() {
        let strength = evaluate_five(&five(["6h", "6s", "Qh", "8d", "4c"]));
        assert_eq!(strength.ranking(), Ranking::OnePair);
        assert_eq!(
            strength.kicks(),
            [Rank::Six, Rank::Queen, Rank::Eight, Rank::Four]
        );
    }
}
