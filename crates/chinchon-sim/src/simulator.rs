use std::cell::RefCell;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use chinchon_core::game::config::ConfigError as GameConfigError;
use chinchon_core::game::events::MatchEvent;
use chinchon_core::game::match_state::MatchState;
use chinchon_core::model::round::{ActionError, DrawSource, RoundPhase};
use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event, warn};

use crate::config::{ResolvedOutputs, SimulationConfig};
use crate::logging::telemetry_path;
use crate::policy::{GreedyPolicy, Policy, PolicyContext};
use crate::summary::{ClosingTally, SummaryCollector};

/// Matches that keep going past this many rounds are cut short and reported
/// as truncated.
pub const MAX_ROUNDS_PER_MATCH: usize = 1_000;

/// Plays seeded matches with the greedy policy at every seat.
pub struct Simulator {
    config: SimulationConfig,
    outputs: ResolvedOutputs,
}

/// Summary details returned after a run.
#[derive(Debug)]
pub struct RunSummary {
    pub matches_played: usize,
    pub matches_finished: usize,
    pub rows_written: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub telemetry_path: Option<PathBuf>,
}

/// One JSONL row per match.
#[derive(Debug, Clone, Serialize)]
pub struct MatchRecord {
    pub run_id: String,
    pub match_index: usize,
    pub seed: u64,
    pub players: usize,
    pub winner_seat: Option<usize>,
    pub winner: Option<String>,
    pub rounds: usize,
    pub voided_rounds: usize,
    pub turns: usize,
    pub closings: ClosingTally,
    pub instant_win: bool,
    pub eliminations: usize,
    pub rebuys: usize,
    pub final_scores: Vec<u32>,
    pub truncated: bool,
}

/// Counters fed by the match's event listener.
#[derive(Debug, Default)]
struct MatchTally {
    match_index: usize,
    turns: usize,
    closings: ClosingTally,
    instant_win: bool,
    rebuys: usize,
    voided_rounds: usize,
}

impl MatchTally {
    fn observe(&mut self, event: &MatchEvent) {
        match event {
            MatchEvent::CardDiscarded { .. } => self.turns += 1,
            MatchEvent::RoundClosed { seat, closing, .. } => {
                self.turns += 1;
                if let Some(kind) = closing.closing() {
                    self.closings.record(kind);
                }
                self.instant_win |= closing.is_instant_win();
                event!(
                    target: "chinchon_sim::round",
                    Level::DEBUG,
                    match_index = self.match_index,
                    round = self.rounds(),
                    closer = *seat,
                    closing = ?closing.closing(),
                    instant_win = closing.is_instant_win(),
                    turns = self.turns
                );
            }
            MatchEvent::Rebought { seat, score } => {
                self.rebuys += 1;
                event!(
                    target: "chinchon_sim::round",
                    Level::DEBUG,
                    match_index = self.match_index,
                    seat = *seat,
                    rebuy_score = *score
                );
            }
            MatchEvent::RoundRedealt => {
                self.voided_rounds += 1;
                event!(
                    target: "chinchon_sim::round",
                    Level::DEBUG,
                    match_index = self.match_index,
                    round = self.rounds(),
                    voided = true
                );
            }
            MatchEvent::CardDrawn { .. } | MatchEvent::MeldsPlaced { .. } => {}
        }
    }

    fn rounds(&self) -> usize {
        self.closings.total() + self.voided_rounds
    }
}

impl Simulator {
    pub fn new(config: SimulationConfig, outputs: ResolvedOutputs) -> Self {
        Self { config, outputs }
    }

    /// Execute every match, streaming JSONL rows to disk, then write the
    /// Markdown summary.
    pub fn run(&self) -> Result<RunSummary, SimError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        event!(
            target: "chinchon_sim::run",
            Level::INFO,
            run_id = %self.config.run_id,
            matches = self.config.matches.count,
            seed = self.config.matches.seed,
            players = self.config.game.players,
            wildcards = self.config.game.wildcards,
        );

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut rng = StdRng::seed_from_u64(self.config.matches.seed);
        let mut collector = SummaryCollector::new(self.config.game.seat_names());
        let mut rows_written = 0usize;

        for match_index in 0..self.config.matches.count {
            let seed = rng.next_u64();
            let record = self.play_match(match_index, seed)?;
            collector.record(&record);
            serde_json::to_writer(&mut writer, &record)?;
            writer.write_all(b"\n")?;
            rows_written += 1;
        }
        writer.flush()?;

        collector.write_markdown(&self.outputs.summary_md, &self.config.run_id)?;

        let telemetry = self
            .config
            .telemetry
            .enabled
            .then(|| telemetry_path(&self.outputs));

        Ok(RunSummary {
            matches_played: collector.matches(),
            matches_finished: collector.finished(),
            rows_written,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            telemetry_path: telemetry,
        })
    }

    /// Plays one match to completion (or to the round cap).
    pub fn play_match(&self, match_index: usize, seed: u64) -> Result<MatchRecord, SimError> {
        let mut state = MatchState::with_seed(self.config.game.clone(), seed)?;
        let tally = Rc::new(RefCell::new(MatchTally {
            match_index,
            ..MatchTally::default()
        }));
        let sink = Rc::clone(&tally);
        state.subscribe(move |_, event| sink.borrow_mut().observe(event));

        let mut policies: Vec<Box<dyn Policy>> = (0..state.players().len())
            .map(|_| Box::new(GreedyPolicy::new()) as Box<dyn Policy>)
            .collect();

        let mut truncated = false;
        while !state.is_finished() {
            if tally.borrow().rounds() >= MAX_ROUNDS_PER_MATCH {
                warn!(match_index, seed, "round cap reached, match truncated");
                truncated = true;
                break;
            }
            self.step(&mut state, &mut policies)
                .map_err(|source| SimError::Action {
                    match_index,
                    source,
                })?;
        }

        let tally = tally.borrow();
        let winner_seat = state.winner();
        let record = MatchRecord {
            run_id: self.config.run_id.clone(),
            match_index,
            seed,
            players: state.players().len(),
            winner_seat,
            winner: winner_seat
                .and_then(|seat| state.player(seat))
                .map(|player| player.name().to_string()),
            rounds: tally.rounds(),
            voided_rounds: tally.voided_rounds,
            turns: tally.turns,
            closings: tally.closings,
            instant_win: tally.instant_win,
            eliminations: state
                .players()
                .iter()
                .filter(|player| player.is_eliminated())
                .count(),
            rebuys: tally.rebuys,
            final_scores: state.players().iter().map(|player| player.score()).collect(),
            truncated,
        };

        event!(
            target: "chinchon_sim::match",
            Level::INFO,
            run_id = %self.config.run_id,
            match_index,
            seed,
            winner = ?record.winner_seat,
            rounds = record.rounds,
            voided_rounds = record.voided_rounds,
            turns = record.turns,
            rebuys = record.rebuys,
            eliminations = record.eliminations,
            truncated
        );
        Ok(record)
    }

    fn step(
        &self,
        state: &mut MatchState,
        policies: &mut [Box<dyn Policy>],
    ) -> Result<(), ActionError> {
        let seat = state.current_seat();
        match state.phase() {
            RoundPhase::Draw => {
                offer_rebuy(state, policies)?;
                if state.deck_remaining() == 0 {
                    return state.redeal();
                }
                let source = if state.round().turns_elapsed() >= self.config.matches.max_turns_per_round
                {
                    DrawSource::Deck
                } else {
                    policies[seat].choose_draw(&context(state))
                };
                match source {
                    DrawSource::Deck => state.draw_from_deck()?,
                    DrawSource::DiscardPile => state.draw_from_discard()?,
                };
            }
            RoundPhase::Discard => {
                let index = policies[seat].choose_discard(&context(state));
                state.discard(index)?;
            }
            RoundPhase::AwaitingPlacement => {
                offer_rebuy(state, policies)?;
                state.place_melds()?;
            }
        }
        Ok(())
    }
}

fn context(state: &MatchState) -> PolicyContext<'_> {
    let player = state.current_player();
    PolicyContext {
        seat: state.current_seat(),
        hand: player.hand(),
        discard_top: state.discard_top(),
        score: player.score(),
        may_close: !state.in_first_circuit(),
    }
}

/// Gives the current seat its pending re-buy if its policy wants it.
fn offer_rebuy(state: &mut MatchState, policies: &mut [Box<dyn Policy>]) -> Result<(), ActionError> {
    let seat = state.current_seat();
    if !state.current_player().rebuy_offered() {
        return Ok(());
    }
    if !policies[seat].wants_rebuy(&context(state)) {
        return Ok(());
    }
    match state.rebuy() {
        Ok(_) | Err(ActionError::RebuyNotAllowed) => Ok(()),
        Err(err) => Err(err),
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), SimError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum SimError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize match record: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("invalid game setup: {0}")]
    Game(#[from] GameConfigError),
    #[error("match {match_index} stopped on a refused action: {source}")]
    Action {
        match_index: usize,
        #[source]
        source: ActionError,
    },
}
