use crate::model::card::Card;
use crate::model::closing::{ClosingResult, verify_closing};
use crate::model::meld::{Meld, find_melds};

/// A player's cards, kept sorted by suit then rank with wildcards last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    pub fn new() -> Self {
        Self { cards: Vec::new() }
    }

    pub fn with_cards(cards: Vec<Card>) -> Self {
        let mut hand = Self { cards };
        hand.sort();
        hand
    }

    pub fn add(&mut self, card: Card) {
        self.cards.push(card);
        self.sort();
    }

    pub fn remove(&mut self, card: Card) -> bool {
        if let Some(index) = self.cards.iter().position(|&c| c == card) {
            self.cards.remove(index);
            true
        } else {
            false
        }
    }

    pub fn remove_at(&mut self, index: usize) -> Option<Card> {
        (index < self.cards.len()).then(|| self.cards.remove(index))
    }

    pub fn card(&self, index: usize) -> Option<Card> {
        self.cards.get(index).copied()
    }

    pub fn contains(&self, card: Card) -> bool {
        self.cards.contains(&card)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn clear(&mut self) {
        self.cards.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn find_melds(&self) -> Vec<Meld> {
        find_melds(&self.cards)
    }

    pub fn verify_closing(&self) -> ClosingResult {
        verify_closing(&self.cards)
    }

    /// Points of the cards that appear in none of `melds`.
    pub fn unmatched_points(&self, melds: &[Meld]) -> u32 {
        self.cards
            .iter()
            .filter(|card| !melds.iter().any(|meld| meld.contains(**card)))
            .map(|card| card.points())
            .sum()
    }

    pub fn total_points(&self) -> u32 {
        self.cards.iter().map(|card| card.points()).sum()
    }

    fn sort(&mut self) {
        self.cards.sort();
    }
}
