use crate::model::card::Card;
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

pub const SUITED_CARDS: usize = 40;

/// Draw source. Cards are dealt from the tail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn standard(wildcards: u8) -> Self {
        let mut cards = Vec::with_capacity(SUITED_CARDS + wildcards as usize);
        for suit in Suit::ALL.iter().copied() {
            for rank in Rank::ORDERED.iter().copied() {
                cards.push(Card::new(rank, suit));
            }
        }
        cards.extend((1..=wildcards).map(Card::wildcard));
        Self { cards }
    }

    /// Builds a deck whose draw order is the reverse of `cards`.
    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    pub fn shuffled<R: rand::Rng + ?Sized>(wildcards: u8, rng: &mut R) -> Self {
        let mut deck = Self::standard(wildcards);
        deck.shuffle_in_place(rng);
        deck
    }

    pub fn shuffled_with_seed(wildcards: u8, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::shuffled(wildcards, &mut rng)
    }

    pub fn shuffle_in_place<R: rand::Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
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
