use crate::model::card::Card;
use crate::model::meld::{Meld, find_melds};
use serde::Serialize;

pub const CLOSING_HAND_SIZE: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ClosingType {
    /// All seven cards in one run.
    SevenRun,
    /// A three-card meld and a four-card meld.
    ThreeAndFour,
    /// Two melds of three or more plus one loose suited card below five.
    TwoGroupsAndLowCard,
}

impl ClosingType {
    pub const fn as_str(self) -> &'static str {
        match self {
            ClosingType::SevenRun => "seven_run",
            ClosingType::ThreeAndFour => "three_and_four",
            ClosingType::TwoGroupsAndLowCard => "two_groups_and_low_card",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClosingResult {
    closing: Option<ClosingType>,
    wildcards_in_run: usize,
}

impl ClosingResult {
    pub const fn none() -> Self {
        Self {
            closing: None,
            wildcards_in_run: 0,
        }
    }

    pub const fn seven_run(wildcards: usize) -> Self {
        Self {
            closing: Some(ClosingType::SevenRun),
            wildcards_in_run: wildcards,
        }
    }

    pub const fn of(closing: ClosingType) -> Self {
        Self {
            closing: Some(closing),
            wildcards_in_run: 0,
        }
    }

    pub const fn can_close(&self) -> bool {
        self.closing.is_some()
    }

    pub const fn closing(&self) -> Option<ClosingType> {
        self.closing
    }

    /// Wildcards used by a seven-card run; zero for the other shapes.
    pub const fn wildcards_in_run(&self) -> usize {
        self.wildcards_in_run
    }

    /// A seven-card run without wildcards wins the match outright.
    pub const fn is_instant_win(&self) -> bool {
        matches!(self.closing, Some(ClosingType::SevenRun)) && self.wildcards_in_run == 0
    }
}

/// Checks the three closing shapes in order; the first match wins.
pub fn verify_closing(cards: &[Card]) -> ClosingResult {
    if cards.len() != CLOSING_HAND_SIZE {
        return ClosingResult::none();
    }

    let melds = find_melds(cards);

    for meld in &melds {
        if meld.is_run()
            && meld.len() == CLOSING_HAND_SIZE
            && covers_exactly(cards, &[meld.cards()])
        {
            return ClosingResult::seven_run(meld.wildcard_count());
        }
    }

    for (i, first) in melds.iter().enumerate() {
        for (j, second) in melds.iter().enumerate() {
            if i == j || !is_three_and_four(first, second) {
                continue;
            }
            if covers_exactly(cards, &[first.cards(), second.cards()]) {
                return ClosingResult::of(ClosingType::ThreeAndFour);
            }
        }
    }

    for (i, first) in melds.iter().enumerate() {
        for (j, second) in melds.iter().enumerate() {
            if i == j || first.len() < 3 || second.len() < 3 {
                continue;
            }
            let loose = cards
                .iter()
                .copied()
                .filter(|card| !first.contains(*card) && !second.contains(*card))
                .filter(|card| card.is_low());
            for card in loose {
                let single = [card];
                if covers_exactly(cards, &[first.cards(), second.cards(), &single]) {
                    return ClosingResult::of(ClosingType::TwoGroupsAndLowCard);
                }
            }
        }
    }

    ClosingResult::none()
}

fn is_three_and_four(first: &Meld, second: &Meld) -> bool {
    matches!((first.len(), second.len()), (3, 4) | (4, 3))
}

/// True when `parts` hold as many cards as the hand and every hand card
/// appears among them, which rules out both overlap and omission.
fn covers_exactly(hand: &[Card], parts: &[&[Card]]) -> bool {
    let total: usize = parts.iter().map(|part| part.len()).sum();
    total == hand.len()
        && hand
            .iter()
            .all(|card| parts.iter().any(|part| part.contains(card)))
}

#[cfg(test)]
mod tests {
    use super::{ClosingResult, ClosingType, verify_closing};
    use crate::model::card::Card;
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;

    fn c(rank: Rank, suit: Suit) -> Card {
        Card::new(rank, suit)
    }

    fn run_of(suit: Suit, ranks: &[Rank]) -> Vec<Card> {
        ranks.iter().map(|rank| c(*rank, suit)).collect()
    }

    #[test]
    fn pure_seven_run_is_instant_win() {
        let cards = run_of(
            Suit::Swords,
            &[
                Rank::One,
                Rank::Two,
                Rank::Three,
                Rank::Four,
                Rank::Five,
                Rank::Six,
                Rank::Seven,
            ],
        );
        let result = verify_closing(&cards);
        assert_eq!(result, ClosingResult::seven_run(0));
        assert!(result.is_instant_win());
    }

    #[test]
    fn low_run_and_court_run_close_three_and_four() {
        let cards = run_of(
            Suit::Cups,
            &[
                Rank::Four,
                Rank::Five,
                Rank::Six,
                Rank::Seven,
                Rank::Jack,
                Rank::Knight,
                Rank::King,
            ],
        );
        let result = verify_closing(&cards);
        assert_eq!(result.closing(), Some(ClosingType::ThreeAndFour));
        assert!(!result.is_instant_win());
    }

    #[test]
    fn wildcard_spent_on_a_dropped_run_blocks_closing() {
        let cards = vec![
            c(Rank::One, Suit::Clubs),
            c(Rank::Four, Suit::Clubs),
            c(Rank::Five, Suit::Clubs),
            Card::wildcard(1),
            c(Rank::King, Suit::Coins),
            c(Rank::King, Suit::Cups),
            c(Rank::King, Suit::Swords),
        ];
        assert_eq!(verify_closing(&cards), ClosingResult::none());
    }

    #[test]
    fn seven_run_counts_gap_wildcards() {
        let mut cards = run_of(
            Suit::Coins,
            &[Rank::One, Rank::Three, Rank::Four, Rank::Six, Rank::Seven],
        );
        cards.push(Card::wildcard(1));
        cards.push(Card::wildcard(2));
        cards.sort();
        let result = verify_closing(&cards);
        assert_eq!(result.closing(), Some(ClosingType::SevenRun));
        assert_eq!(result.wildcards_in_run(), 2);
        assert!(!result.is_instant_win());
    }

    #[test]
    fn set_and_run_close_three_and_four() {
        let mut cards = vec![
            c(Rank::King, Suit::Coins),
            c(Rank::King, Suit::Cups),
            c(Rank::King, Suit::Swords),
        ];
        cards.extend(run_of(
            Suit::Clubs,
            &[Rank::Two, Rank::Three, Rank::Four, Rank::Five],
        ));
        let result = verify_closing(&cards);
        assert_eq!(result.closing(), Some(ClosingType::ThreeAndFour));
        assert_eq!(result.wildcards_in_run(), 0);
    }

    #[test]
    fn two_sets_and_a_low_card_close() {
        let cards = vec![
            c(Rank::Six, Suit::Coins),
            c(Rank::Six, Suit::Cups),
            c(Rank::Six, Suit::Swords),
            c(Rank::Jack, Suit::Coins),
            c(Rank::Jack, Suit::Cups),
            c(Rank::Jack, Suit::Clubs),
            c(Rank::Two, Suit::Clubs),
        ];
        assert_eq!(
            verify_closing(&cards).closing(),
            Some(ClosingType::TwoGroupsAndLowCard)
        );
    }

    #[test]
    fn high_loose_card_cannot_close() {
        let cards = vec![
            c(Rank::Six, Suit::Coins),
            c(Rank::Six, Suit::Cups),
            c(Rank::Six, Suit::Swords),
            c(Rank::Jack, Suit::Coins),
            c(Rank::Jack, Suit::Cups),
            c(Rank::Jack, Suit::Clubs),
            c(Rank::Five, Suit::Clubs),
        ];
        assert!(!verify_closing(&cards).can_close());
    }

    #[test]
    fn overlapping_melds_are_rejected() {
        // 1-4 of Swords and the four fours both claim the Four of Swords.
        let mut cards = run_of(
            Suit::Swords,
            &[Rank::One, Rank::Two, Rank::Three, Rank::Four],
        );
        cards.extend([
            c(Rank::Four, Suit::Coins),
            c(Rank::Four, Suit::Cups),
            c(Rank::Four, Suit::Clubs),
        ]);
        assert!(!verify_closing(&cards).can_close());
    }

    #[test]
    fn wrong_size_never_closes() {
        let cards = run_of(
            Suit::Swords,
            &[
                Rank::One,
                Rank::Two,
                Rank::Three,
                Rank::Four,
                Rank::Five,
                Rank::Six,
            ],
        );
        assert_eq!(verify_closing(&cards), ClosingResult::none());
    }

    #[test]
    fn repeated_evaluation_is_stable() {
        let cards = run_of(
            Suit::Swords,
            &[
                Rank::One,
                Rank::Two,
                Rank::Three,
                Rank::Four,
                Rank::Five,
                Rank::Six,
                Rank::Seven,
            ],
        );
        assert_eq!(verify_closing(&cards), verify_closing(&cards));
    }
}
