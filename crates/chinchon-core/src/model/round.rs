use crate::model::card::Card;
use crate::model::closing::ClosingResult;
use crate::model::deck::Deck;
use crate::model::discard::DiscardPile;
use crate::model::meld::Meld;
use crate::model::player::Player;
use serde::Serialize;
use std::collections::VecDeque;
use thiserror::Error;
use tracing::debug;

pub const HAND_SIZE: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RoundPhase {
    /// The current player holds seven cards and must draw.
    Draw,
    /// The current player holds eight cards and must discard.
    Discard,
    /// Someone closed; the remaining players take turns laying down melds.
    AwaitingPlacement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DrawSource {
    Deck,
    DiscardPile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("the match is already finished")]
    MatchFinished,
    #[error("the round is closed")]
    RoundClosed,
    #[error("the round has not been closed")]
    RoundNotClosed,
    #[error("action not allowed while the round is in the {0:?} phase")]
    WrongPhase(RoundPhase),
    #[error("no card at index {index} (hand holds {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("the deck is empty")]
    EmptyDeck,
    #[error("the discard pile is empty")]
    EmptyDiscardPile,
    #[error("re-buy is not available to this player")]
    RebuyNotAllowed,
    #[error("the deck still has {0} cards")]
    DeckNotExhausted(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardOutcome {
    /// Turn passed on; `next` is `None` when no active seat could be found.
    Passed { card: Card, next: Option<usize> },
    Closed { card: Card, result: ClosingResult },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub seat: usize,
    pub melds: usize,
    /// The placement circuit is over and the round can be settled.
    pub round_over: bool,
}

#[derive(Debug, Clone)]
pub struct RoundState {
    deck: Deck,
    discard: DiscardPile,
    current: usize,
    turns_elapsed: usize,
    phase: RoundPhase,
    closer: Option<usize>,
    closing: Option<ClosingResult>,
    table_melds: Vec<Meld>,
    placement_queue: VecDeque<usize>,
}

impl RoundState {
    /// Deals seven cards to every active player in seat order and turns the
    /// next card face up. Eliminated players are left with an empty hand.
    pub fn deal(mut deck: Deck, players: &mut [Player]) -> Self {
        for player in players.iter_mut() {
            player.hand_mut().clear();
        }
        for player in players.iter_mut().filter(|p| p.is_active()) {
            for _ in 0..HAND_SIZE {
                if let Some(card) = deck.draw() {
                    player.hand_mut().add(card);
                }
            }
        }

        let mut discard = DiscardPile::new();
        if let Some(card) = deck.draw() {
            discard.push(card);
        }

        let current = players.iter().position(|p| p.is_active()).unwrap_or(0);
        Self::from_parts(deck, discard, current)
    }

    /// Builds a fresh round around an already dealt table.
    pub fn from_parts(deck: Deck, discard: DiscardPile, current: usize) -> Self {
        Self {
            deck,
            discard,
            current,
            turns_elapsed: 0,
            phase: RoundPhase::Draw,
            closer: None,
            closing: None,
            table_melds: Vec::new(),
            placement_queue: VecDeque::new(),
        }
    }

    pub fn current_seat(&self) -> usize {
        self.current
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn discard_pile(&self) -> &DiscardPile {
        &self.discard
    }

    pub fn turns_elapsed(&self) -> usize {
        self.turns_elapsed
    }

    pub(crate) fn set_turns_elapsed(&mut self, turns: usize) {
        self.turns_elapsed = turns;
    }

    pub fn is_closed(&self) -> bool {
        self.closer.is_some()
    }

    pub fn closer(&self) -> Option<usize> {
        self.closer
    }

    pub fn closing(&self) -> Option<ClosingResult> {
        self.closing
    }

    pub fn table_melds(&self) -> &[Meld] {
        &self.table_melds
    }

    /// Nobody may close until every seat has discarded once.
    pub fn in_first_circuit(&self, seats: usize) -> bool {
        self.turns_elapsed < seats
    }

    fn require_phase(&self, wanted: RoundPhase) -> Result<(), ActionError> {
        if self.phase == wanted {
            Ok(())
        } else if self.is_closed() {
            Err(ActionError::RoundClosed)
        } else {
            Err(ActionError::WrongPhase(self.phase))
        }
    }

    pub fn draw(
        &mut self,
        players: &mut [Player],
        source: DrawSource,
    ) -> Result<Card, ActionError> {
        self.require_phase(RoundPhase::Draw)?;
        let hand = players[self.current].hand_mut();
        if hand.len() != HAND_SIZE {
            return Err(ActionError::WrongPhase(self.phase));
        }

        let card = match source {
            DrawSource::Deck => self.deck.draw().ok_or(ActionError::EmptyDeck)?,
            DrawSource::DiscardPile => self.discard.take().ok_or(ActionError::EmptyDiscardPile)?,
        };
        hand.add(card);
        self.phase = RoundPhase::Discard;
        debug!(seat = self.current, ?source, %card, "card drawn");
        Ok(card)
    }

    pub fn discard(
        &mut self,
        players: &mut [Player],
        index: usize,
    ) -> Result<DiscardOutcome, ActionError> {
        self.require_phase(RoundPhase::Discard)?;
        let seat = self.current;
        let hand = players[seat].hand_mut();
        if hand.len() != HAND_SIZE + 1 {
            return Err(ActionError::WrongPhase(self.phase));
        }
        let len = hand.len();
        let card = hand
            .remove_at(index)
            .ok_or(ActionError::IndexOutOfRange { index, len })?;
        self.discard.push(card);
        debug!(seat, %card, "card discarded");

        if !self.in_first_circuit(players.len()) {
            let result = players[seat].hand().verify_closing();
            if result.can_close() {
                self.closer = Some(seat);
                self.closing = Some(result);
                self.table_melds = players[seat].hand().find_melds();
                self.phase = RoundPhase::AwaitingPlacement;
                return Ok(DiscardOutcome::Closed { card, result });
            }
        }

        self.turns_elapsed += 1;
        self.phase = RoundPhase::Draw;
        let next = next_active_after(players, seat);
        if let Some(next) = next {
            self.current = next;
        }
        Ok(DiscardOutcome::Passed { card, next })
    }

    /// Queues every other active player, starting after the closer. Returns
    /// `false` when nobody is left to place.
    pub fn begin_placement(&mut self, players: &[Player]) -> bool {
        let Some(closer) = self.closer else {
            return false;
        };
        let seats = players.len();
        self.placement_queue = (1..seats)
            .map(|offset| (closer + offset) % seats)
            .filter(|seat| players[*seat].is_active())
            .collect();
        match self.placement_queue.pop_front() {
            Some(first) => {
                self.current = first;
                true
            }
            None => false,
        }
    }

    /// Lays the current player's melds on the table and moves the circuit on.
    /// Once the closer has no unmatched points left nothing more may be
    /// placed and the circuit ends straight away.
    pub fn place_melds(&mut self, players: &[Player]) -> Result<Placement, ActionError> {
        let Some(closer) = self.closer else {
            return Err(ActionError::RoundNotClosed);
        };
        if self.phase != RoundPhase::AwaitingPlacement {
            return Err(ActionError::WrongPhase(self.phase));
        }

        let seat = self.current;
        if players[closer].hand().unmatched_points(&self.table_melds) == 0 {
            self.placement_queue.clear();
            return Ok(Placement {
                seat,
                melds: 0,
                round_over: true,
            });
        }

        let melds = players[seat].hand().find_melds();
        let placed = melds.len();
        self.table_melds.extend(melds);

        let round_over = match self.placement_queue.pop_front() {
            Some(next) => {
                self.current = next;
                false
            }
            None => true,
        };
        Ok(Placement {
            seat,
            melds: placed,
            round_over,
        })
    }
}

/// Next non-eliminated seat after `seat`, trying each seat at most once.
pub fn next_active_after(players: &[Player], seat: usize) -> Option<usize> {
    let seats = players.len();
    (1..=seats)
        .map(|offset| (seat + offset) % seats)
        .find(|candidate| players[*candidate].is_active())
}
