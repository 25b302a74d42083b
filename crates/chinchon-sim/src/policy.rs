use chinchon_core::model::card::Card;
use chinchon_core::model::hand::Hand;
use chinchon_core::model::round::DrawSource;
use std::cmp::Reverse;
use tracing::{Level, event};

/// What a seat sees when it is asked for a decision.
pub struct PolicyContext<'a> {
    pub seat: usize,
    pub hand: &'a Hand,
    pub discard_top: Option<Card>,
    pub score: u32,
    /// False while the opening circuit is still running.
    pub may_close: bool,
}

/// Decision interface used by the simulator for every seat.
pub trait Policy {
    fn choose_draw(&mut self, ctx: &PolicyContext) -> DrawSource;

    /// Index into `ctx.hand` of the card to throw away.
    fn choose_discard(&mut self, ctx: &PolicyContext) -> usize;

    fn wants_rebuy(&mut self, _ctx: &PolicyContext) -> bool {
        true
    }
}

/// Minimises unmatched points one move ahead and closes whenever it can.
#[derive(Debug, Default, Clone, Copy)]
pub struct GreedyPolicy;

impl GreedyPolicy {
    pub fn new() -> Self {
        Self
    }
}

impl Policy for GreedyPolicy {
    fn choose_draw(&mut self, ctx: &PolicyContext) -> DrawSource {
        let Some(top) = ctx.discard_top else {
            return DrawSource::Deck;
        };

        let current = leftover(ctx.hand.cards());
        let mut with_top = ctx.hand.cards().to_vec();
        with_top.push(top);
        let take = best_discard(&with_top, ctx.may_close)
            .is_some_and(|(_, option)| option.closes || option.leftover < current);

        event!(
            target: "chinchon_sim::draw",
            Level::DEBUG,
            seat = ctx.seat,
            top = %top,
            current,
            take
        );
        if take {
            DrawSource::DiscardPile
        } else {
            DrawSource::Deck
        }
    }

    fn choose_discard(&mut self, ctx: &PolicyContext) -> usize {
        let (index, option) = best_discard(ctx.hand.cards(), ctx.may_close).unwrap_or_default();
        event!(
            target: "chinchon_sim::discard",
            Level::DEBUG,
            seat = ctx.seat,
            index,
            closes = option.closes,
            leftover = option.leftover
        );
        index
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct DiscardOption {
    closes: bool,
    leftover: u32,
    dropped: u32,
}

fn best_discard(cards: &[Card], may_close: bool) -> Option<(usize, DiscardOption)> {
    (0..cards.len())
        .map(|index| {
            let mut rest = cards.to_vec();
            let dropped = rest.remove(index);
            let hand = Hand::with_cards(rest);
            let option = DiscardOption {
                closes: may_close && hand.verify_closing().can_close(),
                leftover: hand.unmatched_points(&hand.find_melds()),
                dropped: dropped.points(),
            };
            (index, option)
        })
        .min_by_key(|(_, option)| (!option.closes, option.leftover, Reverse(option.dropped)))
}

fn leftover(cards: &[Card]) -> u32 {
    let hand = Hand::with_cards(cards.to_vec());
    hand.unmatched_points(&hand.find_melds())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chinchon_core::model::rank::Rank;
    use chinchon_core::model::suit::Suit;

    fn c(rank: Rank, suit: Suit) -> Card {
        Card::new(rank, suit)
    }

    fn ctx(hand: &Hand, discard_top: Option<Card>) -> PolicyContext<'_> {
        PolicyContext {
            seat: 0,
            hand,
            discard_top,
            score: 0,
            may_close: true,
        }
    }

    #[test]
    fn drops_the_costliest_loose_card() {
        let hand = Hand::with_cards(vec![
            c(Rank::One, Suit::Coins),
            c(Rank::Two, Suit::Coins),
            c(Rank::Three, Suit::Coins),
            c(Rank::Five, Suit::Cups),
            c(Rank::Five, Suit::Swords),
            c(Rank::Five, Suit::Clubs),
            c(Rank::Seven, Suit::Cups),
            c(Rank::King, Suit::Swords),
        ]);
        let index = GreedyPolicy::new().choose_discard(&ctx(&hand, None));
        assert_eq!(hand.card(index), Some(c(Rank::King, Suit::Swords)));
    }

    #[test]
    fn discards_into_a_closing_when_allowed() {
        let hand = Hand::with_cards(vec![
            c(Rank::One, Suit::Coins),
            c(Rank::Two, Suit::Coins),
            c(Rank::Three, Suit::Coins),
            c(Rank::Five, Suit::Cups),
            c(Rank::Five, Suit::Swords),
            c(Rank::Five, Suit::Clubs),
            c(Rank::Two, Suit::Swords),
            c(Rank::King, Suit::Clubs),
        ]);
        let cards = hand.cards();
        let (index, option) = best_discard(cards, true).expect("non-empty hand");
        assert!(option.closes);
        assert_eq!(option.leftover, 2);
        assert_eq!(cards[index], c(Rank::King, Suit::Clubs));

        let (_, blocked) = best_discard(cards, false).expect("non-empty hand");
        assert!(!blocked.closes);
    }

    #[test]
    fn takes_the_discard_only_when_it_helps() {
        let hand = Hand::with_cards(vec![
            c(Rank::One, Suit::Coins),
            c(Rank::Two, Suit::Coins),
            c(Rank::Five, Suit::Cups),
            c(Rank::Five, Suit::Swords),
            c(Rank::King, Suit::Clubs),
            c(Rank::Jack, Suit::Clubs),
            c(Rank::Knight, Suit::Swords),
        ]);
        let mut policy = GreedyPolicy::new();

        let useful = ctx(&hand, Some(c(Rank::Three, Suit::Coins)));
        assert_eq!(policy.choose_draw(&useful), DrawSource::DiscardPile);

        let useless = ctx(&hand, Some(c(Rank::King, Suit::Cups)));
        assert_eq!(policy.choose_draw(&useless), DrawSource::Deck);

        assert_eq!(policy.choose_draw(&ctx(&hand, None)), DrawSource::Deck);
    }
}
