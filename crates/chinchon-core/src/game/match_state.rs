use crate::game::config::{ConfigError, MatchConfig};
use crate::game::events::{ListenerId, Listeners, MatchEvent};
use crate::model::card::Card;
use crate::model::closing::ClosingResult;
use crate::model::deck::Deck;
use crate::model::discard::DiscardPile;
use crate::model::hand::Hand;
use crate::model::meld::Meld;
use crate::model::player::Player;
use crate::model::round::{
    ActionError, DiscardOutcome, DrawSource, Placement, RoundPhase, RoundState,
};
use crate::model::score::{ELIMINATION_THRESHOLD, Standing, settle_closing};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchStatus {
    InProgress,
    /// `winner` is `None` only when the table emptied without a survivor.
    Finished { winner: Option<usize> },
}

/// A mid-round table laid out by hand, mostly for scenario tests.
#[derive(Debug, Clone, Default)]
pub struct TableSetup {
    pub seed: u64,
    /// One hand per seat; eliminated seats should be empty.
    pub hands: Vec<Vec<Card>>,
    /// Drawn from the end.
    pub deck: Vec<Card>,
    /// The last card is the face-up top.
    pub discard: Vec<Card>,
    /// Starting scores per seat; missing seats start at zero.
    pub scores: Vec<u32>,
    pub current: usize,
    pub turns_elapsed: usize,
    pub eliminated: Vec<usize>,
    pub rebought: Vec<usize>,
}

/// The round state machine plus everything that persists between rounds:
/// the roster, cumulative scores and the shuffle source.
#[derive(Debug)]
pub struct MatchState {
    config: MatchConfig,
    players: Vec<Player>,
    round: RoundState,
    status: MatchStatus,
    rng: StdRng,
    seed: u64,
    listeners: Listeners,
}

impl MatchState {
    pub fn new(config: MatchConfig) -> Result<Self, ConfigError> {
        let seed: u64 = rand::random();
        Self::with_seed(config, seed)
    }

    pub fn with_seed(config: MatchConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(seed);
        let mut players: Vec<Player> = config.seat_names().into_iter().map(Player::new).collect();
        let deck = Deck::shuffled(config.wildcards, &mut rng);
        let round = RoundState::deal(deck, &mut players);

        Ok(Self {
            config,
            players,
            round,
            status: MatchStatus::InProgress,
            rng,
            seed,
            listeners: Listeners::default(),
        })
    }

    pub fn from_table(config: MatchConfig, setup: TableSetup) -> Result<Self, ConfigError> {
        config.validate()?;
        if setup.hands.len() != config.players {
            return Err(ConfigError::HandCount {
                expected: config.players,
                actual: setup.hands.len(),
            });
        }

        let mut players: Vec<Player> = config.seat_names().into_iter().map(Player::new).collect();
        for (seat, (player, cards)) in players.iter_mut().zip(setup.hands).enumerate() {
            *player.hand_mut() = Hand::with_cards(cards);
            player.add_points(setup.scores.get(seat).copied().unwrap_or(0));
            if setup.rebought.contains(&seat) {
                player.mark_rebought();
            }
            if setup.eliminated.contains(&seat) {
                player.eliminate();
            }
        }

        let mut discard = DiscardPile::new();
        for card in setup.discard {
            discard.push(card);
        }
        let current = setup.current.min(config.players - 1);
        let mut round = RoundState::from_parts(Deck::from_cards(setup.deck), discard, current);
        round.set_turns_elapsed(setup.turns_elapsed);

        Ok(Self {
            config,
            players,
            round,
            status: MatchStatus::InProgress,
            rng: StdRng::seed_from_u64(setup.seed),
            seed: setup.seed,
            listeners: Listeners::default(),
        })
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn status(&self) -> MatchStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.status, MatchStatus::Finished { .. })
    }

    pub fn winner(&self) -> Option<usize> {
        match self.status {
            MatchStatus::Finished { winner } => winner,
            MatchStatus::InProgress => None,
        }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, seat: usize) -> Option<&Player> {
        self.players.get(seat)
    }

    pub fn active_seats(&self) -> Vec<usize> {
        (0..self.players.len())
            .filter(|seat| self.players[*seat].is_active())
            .collect()
    }

    pub fn current_seat(&self) -> usize {
        self.round.current_seat()
    }

    pub fn current_player(&self) -> &Player {
        &self.players[self.round.current_seat()]
    }

    pub fn hand(&self, seat: usize) -> Option<&Hand> {
        self.players.get(seat).map(Player::hand)
    }

    pub fn round(&self) -> &RoundState {
        &self.round
    }

    pub fn phase(&self) -> RoundPhase {
        self.round.phase()
    }

    pub fn discard_top(&self) -> Option<Card> {
        self.round.discard_pile().top()
    }

    pub fn deck_remaining(&self) -> usize {
        self.round.deck().len()
    }

    pub fn table_melds(&self) -> &[Meld] {
        self.round.table_melds()
    }

    pub fn is_round_closed(&self) -> bool {
        self.round.is_closed()
    }

    pub fn closer(&self) -> Option<usize> {
        self.round.closer()
    }

    pub fn closing(&self) -> Option<ClosingResult> {
        self.round.closing()
    }

    pub fn in_first_circuit(&self) -> bool {
        self.round.in_first_circuit(self.players.len())
    }

    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&MatchState, &MatchEvent) + 'static,
    ) -> ListenerId {
        self.listeners.subscribe(Box::new(listener))
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    pub fn draw_from_deck(&mut self) -> Result<Card, ActionError> {
        self.draw(DrawSource::Deck)
    }

    pub fn draw_from_discard(&mut self) -> Result<Card, ActionError> {
        self.draw(DrawSource::DiscardPile)
    }

    fn draw(&mut self, source: DrawSource) -> Result<Card, ActionError> {
        self.ensure_in_progress()?;
        let seat = self.round.current_seat();
        let card = self.round.draw(&mut self.players, source)?;
        self.notify(MatchEvent::CardDrawn { seat, source });
        Ok(card)
    }

    /// Discards the card at `index` of the current hand. A discard that leaves
    /// a legal closing after the first circuit closes the round and scores it.
    pub fn discard(&mut self, index: usize) -> Result<DiscardOutcome, ActionError> {
        self.ensure_in_progress()?;
        let seat = self.round.current_seat();
        let outcome = self.round.discard(&mut self.players, index)?;

        let event = match outcome {
            DiscardOutcome::Passed { card, next } => {
                if next.is_none() {
                    warn!(seat, "no active seat left to take the turn");
                    self.finish(None);
                }
                MatchEvent::CardDiscarded { seat, card }
            }
            DiscardOutcome::Closed { card, result } => {
                self.resolve_closing(seat, result);
                MatchEvent::RoundClosed {
                    seat,
                    card,
                    closing: result,
                }
            }
        };
        self.notify(event);
        Ok(outcome)
    }

    /// Lays the current player's melds on the table during the post-closing
    /// circuit. The round is settled and the next one dealt once the circuit
    /// is over.
    pub fn place_melds(&mut self) -> Result<Placement, ActionError> {
        self.ensure_in_progress()?;
        let placement = self.round.place_melds(&self.players)?;
        info!(
            seat = placement.seat,
            melds = placement.melds,
            round_over = placement.round_over,
            "melds placed"
        );
        if placement.round_over {
            self.start_round();
        }
        self.notify(MatchEvent::MeldsPlaced {
            seat: placement.seat,
            melds: placement.melds,
            round_settled: placement.round_over,
        });
        Ok(placement)
    }

    /// Lets the current player, once above the limit, buy back in at the
    /// highest score among the other active players. Returns the new score.
    pub fn rebuy(&mut self) -> Result<u32, ActionError> {
        self.ensure_in_progress()?;
        let seat = self.round.current_seat();
        let active = self.active_seats();
        let player = &self.players[seat];
        if player.score() <= ELIMINATION_THRESHOLD || player.has_rebought() || active.len() <= 2 {
            return Err(ActionError::RebuyNotAllowed);
        }

        let highest_other = active
            .iter()
            .copied()
            .filter(|other| *other != seat)
            .map(|other| self.players[other].score())
            .max()
            .unwrap_or(0);
        let player = &mut self.players[seat];
        let score = player.score().min(highest_other);
        player.set_score(score);
        player.mark_rebought();
        info!(seat, score, "player rebought");

        self.notify(MatchEvent::Rebought { seat, score });
        Ok(score)
    }

    /// Voids a round whose deck ran out: nothing is scored and the active
    /// players get a fresh deal.
    pub fn redeal(&mut self) -> Result<(), ActionError> {
        self.ensure_in_progress()?;
        if self.round.is_closed() {
            return Err(ActionError::RoundClosed);
        }
        let remaining = self.round.deck().len();
        if remaining > 0 {
            return Err(ActionError::DeckNotExhausted(remaining));
        }
        info!("deck exhausted, round voided");
        self.start_round();
        self.notify(MatchEvent::RoundRedealt);
        Ok(())
    }

    fn ensure_in_progress(&self) -> Result<(), ActionError> {
        if self.is_finished() {
            Err(ActionError::MatchFinished)
        } else {
            Ok(())
        }
    }

    fn resolve_closing(&mut self, closer: usize, result: ClosingResult) {
        info!(
            seat = closer,
            closing = ?result.closing(),
            wildcards = result.wildcards_in_run(),
            "round closed"
        );
        if result.is_instant_win() {
            info!(seat = closer, "pure seven-card run, instant win");
            self.finish(Some(closer));
            return;
        }

        let settlement = settle_closing(
            &mut self.players,
            closer,
            &result,
            self.round.table_melds(),
        );
        for line in &settlement.lines {
            match line.standing {
                Standing::Safe => {}
                Standing::RebuyOffered => info!(seat = line.seat, score = line.score, "re-buy offered"),
                Standing::Eliminated => info!(seat = line.seat, score = line.score, "player eliminated"),
            }
        }

        if settlement.finished {
            self.finish(settlement.winner);
        } else if !self.round.begin_placement(&self.players) {
            self.start_round();
        }
    }

    fn start_round(&mut self) {
        let deck = Deck::shuffled(self.config.wildcards, &mut self.rng);
        self.round = RoundState::deal(deck, &mut self.players);
    }

    fn finish(&mut self, winner: Option<usize>) {
        self.status = MatchStatus::Finished { winner };
        info!(?winner, "match finished");
    }

    fn notify(&mut self, event: MatchEvent) {
        let mut listeners = std::mem::take(&mut self.listeners);
        listeners.notify(self, &event);
        self.listeners = listeners;
    }
}

#[cfg(test)]
mod tests {
    use super::{MatchState, MatchStatus};
    use crate::game::config::{ConfigError, MatchConfig};
    use crate::game::events::MatchEvent;
    use crate::model::round::{ActionError, RoundPhase};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn new_match_deals_every_seat() {
        let state = MatchState::with_seed(MatchConfig::default(), 5).unwrap();
        assert_eq!(state.players().len(), 4);
        for player in state.players() {
            assert_eq!(player.hand().len(), 7);
        }
        assert!(state.discard_top().is_some());
        assert_eq!(state.deck_remaining(), 42 - 28 - 1);
        assert_eq!(state.current_seat(), 0);
        assert_eq!(state.status(), MatchStatus::InProgress);
        assert!(state.in_first_circuit());
    }

    #[test]
    fn same_seed_same_deal() {
        let a = MatchState::with_seed(MatchConfig::default(), 77).unwrap();
        let b = MatchState::with_seed(MatchConfig::default(), 77).unwrap();
        assert_eq!(a.hand(2), b.hand(2));
        assert_eq!(a.seed(), 77);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let err = MatchState::with_seed(MatchConfig::with_players(9), 1).unwrap_err();
        assert_eq!(err, ConfigError::PlayerCount(9));
    }

    #[test]
    fn listeners_fire_once_per_successful_operation() {
        let mut state = MatchState::with_seed(MatchConfig::default(), 11).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let id = state.subscribe(move |state, event| {
            sink.borrow_mut().push((event.clone(), state.phase()));
        });

        assert!(state.discard(0).is_err());
        assert!(seen.borrow().is_empty());

        state.draw_from_deck().unwrap();
        state.discard(0).unwrap();
        {
            let events = seen.borrow();
            assert_eq!(events.len(), 2);
            assert!(matches!(events[0].0, MatchEvent::CardDrawn { seat: 0, .. }));
            assert_eq!(events[0].1, RoundPhase::Discard);
            assert!(matches!(events[1].0, MatchEvent::CardDiscarded { seat: 0, .. }));
        }

        assert!(state.unsubscribe(id));
        assert!(!state.unsubscribe(id));
        state.draw_from_discard().unwrap();
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn placement_outside_closed_round_fails() {
        let mut state = MatchState::with_seed(MatchConfig::default(), 3).unwrap();
        assert_eq!(state.place_melds(), Err(ActionError::RoundNotClosed));
    }

    #[test]
    fn redeal_requires_exhausted_deck() {
        let mut state = MatchState::with_seed(MatchConfig::default(), 3).unwrap();
        assert_eq!(state.redeal(), Err(ActionError::DeckNotExhausted(13)));
    }
}
