use crate::model::card::Card;

/// Face-up LIFO pile. Only the top card can be taken.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscardPile {
    cards: Vec<Card>,
}

impl DiscardPile {
    pub fn new() -> Self {
        Self { cards: Vec::new() }
    }

    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn take(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    pub fn top(&self) -> Option<Card> {
        self.cards.last().copied()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}

#[cfg(test)]
mod tests {
    use super::DiscardPile;
    use crate::model::card::Card;
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;

    #[test]
    fn take_returns_last_pushed() {
        let mut pile = DiscardPile::new();
        pile.push(Card::new(Rank::One, Suit::Cups));
        pile.push(Card::new(Rank::King, Suit::Coins));
        assert_eq!(pile.top(), Some(Card::new(Rank::King, Suit::Coins)));
        assert_eq!(pile.take(), Some(Card::new(Rank::King, Suit::Coins)));
        assert_eq!(pile.len(), 1);
        assert_eq!(pile.take(), Some(Card::new(Rank::One, Suit::Cups)));
        assert_eq!(pile.take(), None);
        assert!(pile.top().is_none());
    }
}
