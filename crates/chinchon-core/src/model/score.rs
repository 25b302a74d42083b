use crate::model::closing::{ClosingResult, ClosingType};
use crate::model::meld::Meld;
use crate::model::player::Player;
use serde::Serialize;

pub const ELIMINATION_THRESHOLD: u32 = 100;
pub const SEVEN_RUN_ONE_WILDCARD_BONUS: u32 = 50;
pub const SEVEN_RUN_TWO_WILDCARD_BONUS: u32 = 25;
pub const THREE_AND_FOUR_BONUS: u32 = 10;

/// Points taken off a closer who left nothing unmatched.
pub fn closing_bonus(result: &ClosingResult) -> Option<u32> {
    match result.closing()? {
        ClosingType::SevenRun => match result.wildcards_in_run() {
            1 => Some(SEVEN_RUN_ONE_WILDCARD_BONUS),
            2 => Some(SEVEN_RUN_TWO_WILDCARD_BONUS),
            _ => None,
        },
        ClosingType::ThreeAndFour => Some(THREE_AND_FOUR_BONUS),
        ClosingType::TwoGroupsAndLowCard => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScoreChange {
    Added(u32),
    Bonus(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Standing {
    Safe,
    RebuyOffered,
    Eliminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreLine {
    pub seat: usize,
    pub change: ScoreChange,
    pub score: u32,
    pub standing: Standing,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Settlement {
    pub lines: Vec<ScoreLine>,
    /// Set when the pass leaves the match decided.
    pub winner: Option<usize>,
    pub finished: bool,
}

/// Scores every active player against the melds on the table, then applies
/// the over-100 rule in seat order.
pub fn settle_closing(
    players: &mut [Player],
    closer: usize,
    result: &ClosingResult,
    table: &[Meld],
) -> Settlement {
    let mut settlement = Settlement::default();
    let mut knocked_out = Vec::new();

    for seat in 0..players.len() {
        if players[seat].is_eliminated() {
            continue;
        }

        let unmatched = players[seat].hand().unmatched_points(table);
        let change = match closing_bonus(result) {
            Some(bonus) if seat == closer && unmatched == 0 => ScoreChange::Bonus(bonus),
            _ => ScoreChange::Added(unmatched),
        };

        let player = &mut players[seat];
        match change {
            ScoreChange::Added(points) => player.add_points(points),
            ScoreChange::Bonus(points) => player.subtract_points(points),
        }

        let standing = if player.score() > ELIMINATION_THRESHOLD {
            let active = players.iter().filter(|p| p.is_active()).count();
            let player = &mut players[seat];
            if !player.has_rebought() && active > 2 {
                player.set_rebuy_offered(true);
                Standing::RebuyOffered
            } else {
                player.eliminate();
                knocked_out.push(seat);
                Standing::Eliminated
            }
        } else {
            players[seat].set_rebuy_offered(false);
            Standing::Safe
        };

        settlement.lines.push(ScoreLine {
            seat,
            change,
            score: players[seat].score(),
            standing,
        });
    }

    let active: Vec<usize> = (0..players.len())
        .filter(|seat| players[*seat].is_active())
        .collect();
    match active.as_slice() {
        [survivor] => {
            settlement.finished = true;
            settlement.winner = Some(*survivor);
        }
        [] => {
            // Everybody went over together; the lowest of them takes it.
            settlement.finished = true;
            settlement.winner = knocked_out
                .iter()
                .copied()
                .min_by_key(|seat| players[*seat].score());
        }
        _ => {}
    }

    settlement
}
